// ==========================================
// 業務時間分析ダッシュボード - AI プロンプトテンプレート
// ==========================================
// 各 AI 機能用のシステムプロンプトとユーザープロンプト構築
// ==========================================

use std::collections::BTreeSet;

use serde_json::Value;

use crate::domain::types::ReportKind;
use crate::engine::aggregator::SummaryReport;

use super::provider::{ChatTurn, KeywordRuleSummary, WorkItem};

/// プロンプトに載せる既存ルールの上限
const MAX_RULES_IN_PROMPT: usize = 50;

/// チャットプロンプトに含める会話履歴の上限
const MAX_HISTORY_TURNS: usize = 5;

// ==========================================
// カテゴリ分類
// ==========================================

pub const CATEGORIZATION_SYSTEM_PROMPT: &str = r#"あなたは業務分析システムのカテゴリ分類アシスタントです。
繁雑で多様な業務名（work_name）を、経営管理・業務改善の観点から適切なグループに分類します。

【目的】
- 多数の業務名を意味的にグルーピングし、業務全体を把握可能にする
- 削減対象業務と付加価値業務を区別し、改善施策に活用する
- 同種の業務は同じカテゴリにまとめ、一貫した分類を維持する

【分類判断のポイント】
1. work_name（業務名）の内容を最重視して判断
2. category1やcategory2は参考情報として活用
3. 同じ種類の作業（例: 「〇〇作成」「△△作成」）は同じカテゴリに統一
4. 曖昧な業務名は文脈から類推し、最も近いカテゴリを選択
5. 既存キーワードルールがあれば優先的に従う

【出力形式】JSON配列
各要素:
- item_index: int（入力リストのインデックス）
- category: string（必ず指定されたカテゴリから選択）
- confidence: float（0.0-1.0）
- reasoning: string（日本語で簡潔に）

【確信度の目安】
- 0.9以上: 業務内容が明確でカテゴリが確実
- 0.7-0.9: 類似業務との一貫性から判断
- 0.5-0.7: 複数カテゴリに該当する可能性あり
- 0.5未満: 不明確、ユーザー確認推奨"#;

/// カテゴリ分類用のユーザープロンプトを構築
pub fn build_categorization_prompt(
    items: &[WorkItem],
    categories: &[String],
    existing_rules: &[KeywordRuleSummary],
) -> String {
    let items_text = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. work_name=「{}」 (分類1:{}, 分類2:{})",
                i,
                item.work_name,
                item.category1.as_deref().unwrap_or("-"),
                item.category2.as_deref().unwrap_or("-"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let rules_text = if existing_rules.is_empty() {
        "（既存ルールなし）".to_string()
    } else {
        existing_rules
            .iter()
            .take(MAX_RULES_IN_PROMPT)
            .map(|r| format!("- 「{}」→ {}", r.keyword, r.category))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "【利用可能なカテゴリ】\n{}\n\n\
         【既存のキーワードルール】（これらに従って一貫性を保つ）\n{}\n\n\
         【分類対象の業務一覧】\n{}\n\n\
         【指示】\n\
         上記の業務を適切なカテゴリにグルーピングしてください。\n\
         - 同種の業務（作成系、チェック系、対応系など）は同じカテゴリに統一\n\
         - work_name（業務名）の内容を最重視\n\
         - 既存ルールと矛盾しない分類を心がける\n\n\
         JSON配列のみを出力してください。",
        categories.join(", "),
        rules_text,
        items_text,
    )
}

// ==========================================
// インサイト生成
// ==========================================

pub const INSIGHT_SYSTEM_PROMPT: &str = r#"あなたは業務分析のエキスパートです。
業務時間データを分析し、実用的なインサイトを日本語で提供します。

分析の観点:
1. 重要なパターンや傾向
2. 注意が必要な異常値
3. 具体的で実行可能な改善提案

出力ルール:
- 簡潔に（各項目2-3点）
- 数値を含める（割合、時間など）
- 業務改善に直結する提案を優先"#;

/// インサイト生成用のプロンプトを構築
pub fn build_insight_prompt(
    summary: &SummaryReport,
    trend: &Value,
    alerts: &[Value],
    period: &str,
) -> String {
    let alerts_text = if alerts.is_empty() {
        "なし".to_string()
    } else {
        pretty_json(&Value::Array(alerts.to_vec()))
    };

    format!(
        "分析期間: {period}\n\n\
         ■ サマリーデータ\n\
         - 総稼働時間: {hours}時間\n\
         - 推定コスト: ¥{cost}\n\
         - タスク種類数: {types}\n\
         - 削減対象比率: {ratio}%\n\n\
         ■ 推移データ\n{trend}\n\n\
         ■ 検知されたアラート\n{alerts}\n\n\
         上記データを分析し、以下のJSON形式で出力してください:\n\
         {{\n\
           \"highlights\": [\"ポジティブな発見1\", \"ポジティブな発見2\"],\n\
           \"concerns\": [\"懸念事項1\"],\n\
           \"recommendations\": [\"具体的な提案1\", \"具体的な提案2\", \"具体的な提案3\"]\n\
         }}\n\n\
         JSON形式のみを出力してください。",
        period = period,
        hours = summary.total_hours,
        cost = format_yen(summary.total_cost),
        types = summary.task_types,
        ratio = summary.reduction_ratio,
        trend = pretty_json(trend),
        alerts = alerts_text,
    )
}

// ==========================================
// チャット
// ==========================================

pub const CHAT_SYSTEM_PROMPT: &str = r#"あなたは業務分析ダッシュボードのAIアシスタントです。
ユーザーの質問に対し、提供されたデータを基に日本語で回答します。

回答ルール:
1. データに基づいた正確な回答
2. 具体的な数値を含める
3. データがない場合は正直に伝える
4. 簡潔でわかりやすい表現"#;

/// チャット用のプロンプトを構築
pub fn build_chat_prompt(question: &str, context: &Value, history: &[ChatTurn]) -> String {
    let recent = if history.len() > MAX_HISTORY_TURNS {
        &history[history.len() - MAX_HISTORY_TURNS..]
    } else {
        history
    };
    let history_text = if recent.is_empty() {
        "（なし）".to_string()
    } else {
        recent
            .iter()
            .map(|turn| format!("ユーザー: {}\nアシスタント: {}", turn.user, turn.assistant))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "■ 利用可能なデータ\n{}\n\n\
         ■ 会話履歴\n{}\n\n\
         ■ ユーザーの質問\n{}\n\n\
         上記のデータを参照して、質問に回答してください。\n\
         回答は自然な日本語で、必要に応じて具体的な数値を含めてください。",
        pretty_json(context),
        history_text,
        question,
    )
}

// ==========================================
// レポート生成
// ==========================================

pub const REPORT_SYSTEM_PROMPT: &str = r#"あなたはビジネスレポートライターです。
業務分析データから、経営層向けの専門的なレポートを作成します。

レポート品質:
- 明確な構造
- 重要な指標の強調
- 実行可能な結論"#;

/// レポート生成用のプロンプトを構築
pub fn build_report_prompt(
    kind: ReportKind,
    data: &Value,
    period_start: &str,
    period_end: &str,
) -> String {
    let report_title = match kind {
        ReportKind::Weekly => "週次",
        ReportKind::Monthly => "月次",
    };

    format!(
        "レポートタイプ: {}業務分析レポート\n\
         対象期間: {} 〜 {}\n\n\
         ■ 分析データ\n{}\n\n\
         上記データを基に、以下の構成でMarkdown形式のレポートを作成してください:\n\n\
         1. エグゼクティブサマリー（2-3文）\n\
         2. 主要指標（箇条書き）\n\
         3. カテゴリ別分析\n\
         4. 傾向と所見\n\
         5. 改善提案（3項目）\n\n\
         Markdown形式で出力してください。",
        report_title, period_start, period_end, pretty_json(data),
    )
}

// ==========================================
// タスクグルーピング
// ==========================================

pub const TASK_GROUPING_SYSTEM_PROMPT: &str = r#"あなたは業務タスク整理のエキスパートです。
類似した業務名を識別し、代表名にグループ化する役割を担います。

【目的】
多数の細かい業務名（表記揺れを含む）を、管理しやすい代表名にまとめる。

【グループ化のルール】
1. 意味的に同じ業務は1つのグループに統合
2. 表記揺れを吸収:
   - 括弧内の補足（修正、追加、A、B等）は無視
   - 番号・日付の違いは無視
   - 略語と正式名（TEL/電話、MTG/会議等）は同一視
3. 代表名の選び方:
   - 最も一般的・簡潔な表現を選択
   - 括弧や補足は除去
4. 関連性の判断:
   - 同じ動詞（入力、作成、対応、チェック等）を含む類似業務
   - 同じ対象物（ノート、書類、メール等）を扱う業務

【出力形式】JSON配列
[
  {
    "representative": "代表名",
    "members": ["元の業務名1", "元の業務名2", ...]
  },
  ...
]

JSON配列のみを出力してください。説明文は不要です。"#;

/// タスクグルーピング用のユーザープロンプトを構築
pub fn build_task_grouping_prompt(work_names: &[String]) -> String {
    // 重複を除去してソート
    let unique: BTreeSet<&str> = work_names.iter().map(|s| s.as_str()).collect();
    let names_text = unique
        .iter()
        .map(|name| format!("- {}", name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "【グループ化対象の業務名一覧】\n{}\n\n\
         【指示】\n\
         上記の業務名を類似性に基づいてグループ化してください。\n\
         - 表記揺れ（括弧内の補足、番号、略語等）を吸収\n\
         - 各グループに代表名を決定\n\
         - すべての業務名をいずれかのグループに含める\n\n\
         JSON配列のみを出力してください。",
        names_text,
    )
}

// ==========================================
// 内部ヘルパ
// ==========================================

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// 金額を3桁区切りで表記（小数は四捨五入）
fn format_yen(value: f64) -> String {
    let rounded = value.round() as i64;
    let negative = rounded < 0;
    let digits = rounded.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        out.push(ch);
        let remaining = digits.len() - i - 1;
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(work_name: &str, category2: Option<&str>) -> WorkItem {
        WorkItem {
            category1: Some("通常".to_string()),
            category2: category2.map(|s| s.to_string()),
            work_name: work_name.to_string(),
        }
    }

    #[test]
    fn test_categorization_prompt_アイテム行の形式() {
        let items = vec![item("ノート入力", Some("制作")), item("電話対応", None)];
        let categories = vec!["コア業務".to_string(), "事務".to_string()];

        let prompt = build_categorization_prompt(&items, &categories, &[]);

        assert!(prompt.contains("0. work_name=「ノート入力」 (分類1:通常, 分類2:制作)"));
        assert!(prompt.contains("1. work_name=「電話対応」 (分類1:通常, 分類2:-)"));
        assert!(prompt.contains("コア業務, 事務"));
        assert!(prompt.contains("（既存ルールなし）"));
    }

    #[test]
    fn test_categorization_prompt_ルールは50件まで() {
        let rules: Vec<KeywordRuleSummary> = (0..60)
            .map(|i| KeywordRuleSummary {
                keyword: format!("キーワード{}", i),
                category: "事務".to_string(),
            })
            .collect();

        let prompt = build_categorization_prompt(&[item("x", None)], &["事務".to_string()], &rules);

        assert!(prompt.contains("「キーワード49」"));
        assert!(!prompt.contains("「キーワード50」"));
    }

    #[test]
    fn test_insight_prompt_金額の3桁区切り() {
        let summary = SummaryReport {
            total_hours: 123.4,
            total_cost: 1_234_567.0,
            estimated_cost: 0.0,
            task_types: 42,
            reduction_ratio: 18.5,
        };

        let prompt = build_insight_prompt(&summary, &json!({}), &[], "2025-04");

        assert!(prompt.contains("総稼働時間: 123.4時間"));
        assert!(prompt.contains("¥1,234,567"));
        assert!(prompt.contains("タスク種類数: 42"));
        assert!(prompt.contains("削減対象比率: 18.5%"));
        assert!(prompt.contains("検知されたアラート\nなし"));
    }

    #[test]
    fn test_chat_prompt_履歴は直近5件() {
        let history: Vec<ChatTurn> = (0..8)
            .map(|i| ChatTurn {
                user: format!("質問{}", i),
                assistant: format!("回答{}", i),
            })
            .collect();

        let prompt = build_chat_prompt("最新の状況は？", &json!({}), &history);

        assert!(!prompt.contains("質問2"));
        assert!(prompt.contains("質問3"));
        assert!(prompt.contains("質問7"));
    }

    #[test]
    fn test_chat_prompt_履歴なし() {
        let prompt = build_chat_prompt("こんにちは", &json!({}), &[]);
        assert!(prompt.contains("（なし）"));
    }

    #[test]
    fn test_report_prompt_種別の表記() {
        let weekly = build_report_prompt(ReportKind::Weekly, &json!({}), "2025-04-01", "2025-04-07");
        assert!(weekly.contains("週次業務分析レポート"));
        assert!(weekly.contains("2025-04-01 〜 2025-04-07"));

        let monthly =
            build_report_prompt(ReportKind::Monthly, &json!({}), "2025-04-01", "2025-04-30");
        assert!(monthly.contains("月次業務分析レポート"));
    }

    #[test]
    fn test_grouping_prompt_重複除去とソート() {
        let names = vec![
            "電話対応".to_string(),
            "ノート入力".to_string(),
            "電話対応".to_string(),
        ];

        let prompt = build_task_grouping_prompt(&names);

        let first = prompt.find("- ノート入力").unwrap();
        let second = prompt.find("- 電話対応").unwrap();
        assert!(first < second);
        assert_eq!(prompt.matches("- 電話対応").count(), 1);
    }

    #[test]
    fn test_format_yen() {
        assert_eq!(format_yen(0.0), "0");
        assert_eq!(format_yen(999.0), "999");
        assert_eq!(format_yen(1000.0), "1,000");
        assert_eq!(format_yen(1_234_567.89), "1,234,568");
        assert_eq!(format_yen(-1500.0), "-1,500");
    }
}
