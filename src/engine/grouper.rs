// ==========================================
// 業務時間分析ダッシュボード - 業務名グルーピングエンジン
// ==========================================
// 責務: 業務名の正規化・ローカルグルーピング・中分類抽出
// 位置付け: AI グルーピングの前処理（API 呼び出し回数の削減）
// ==========================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::aggregator::RankingEntry;

// ==========================================
// 変換テーブル
// ==========================================

/// 略語の統一（表記ゆれの吸収）
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("TEL", "電話"),
    ("tel", "電話"),
    ("Tel", "電話"),
    ("MTG", "会議"),
    ("mtg", "会議"),
    ("Mtg", "会議"),
    ("ＴＥＬ", "電話"),
    ("ＭＴＧ", "会議"),
];

/// 末尾キーワード → 中分類（先に評価）
const SUFFIX_TO_GROUP: &[(&str, &str)] = &[
    ("入力", "入力系"),
    ("対応", "対応系"),
    ("作成", "作成系"),
    ("確認", "確認系"),
    ("管理", "管理系"),
    ("チェック", "チェック系"),
    ("処理", "処理系"),
    ("登録", "登録系"),
    ("発注", "発注系"),
    ("手配", "手配系"),
];

/// 含有キーワード → 中分類
const CONTAINS_TO_GROUP: &[(&str, &str)] = &[
    ("MTG", "MTG系"),
    ("ミーティング", "MTG系"),
    ("会議", "MTG系"),
    ("打ち合わせ", "MTG系"),
    ("打合せ", "MTG系"),
    ("面談", "面談系"),
    ("移動", "移動系"),
    ("キッズ", "キッズ系"),
    ("研修", "研修系"),
    ("説明会", "説明会系"),
];

/// 中分類のフォールバック名
const FALLBACK_GROUP: &str = "その他";

// ==========================================
// 結果型
// ==========================================

/// 1グループ（代表名と元の業務名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGroup {
    /// 代表名
    pub representative: String,
    /// 元の業務名（重複除去・昇順）
    pub members: Vec<String>,
}

/// ローカルグルーピングの結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGroupingResult {
    /// 代表名の昇順に並んだグループ
    pub groups: Vec<TaskGroup>,
    /// グルーピング前のユニーク業務名数
    pub original_count: usize,
    /// グルーピング後のグループ数
    pub grouped_count: usize,
}

/// 中分類単位でまとめたランキング
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGroupRanking {
    /// 中分類名（入力系 / 対応系 など）
    pub group_name: String,
    /// 正規化済みの代表業務名
    pub normalized_name: String,
    /// 合計時間
    pub total_hours: f64,
    /// 合計金額
    pub total_cost: f64,
    /// 表示カテゴリ（最初の構成項目から引き継ぐ）
    pub category: String,
    /// 構成項目数
    pub member_count: usize,
    /// 構成項目（時間降順）
    pub members: Vec<RankingEntry>,
}

// ==========================================
// TaskGrouper - 業務名グルーピングエンジン
// ==========================================

pub struct TaskGrouper;

impl TaskGrouper {
    /// 新しいグルーピングエンジンを作成
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 正規化
    // ==========================================

    /// 業務名を正規化して代表名を生成
    ///
    /// 正規化ルール（順に適用）:
    /// 1) 前後の空白を除去
    /// 2) 括弧内の補足を除去: 「施工ノート入力（修正）」→「施工ノート入力」
    /// 3) 末尾の英字1文字を除去: 「施工ノートA」→「施工ノート」
    /// 4) 末尾の数字（1〜2桁）を除去: 「チェック業務2」→「チェック業務」
    /// 5) 略語を統一: TEL→電話, MTG→会議
    /// 6) 連続空白を1つにまとめる
    pub fn normalize(&self, name: &str) -> String {
        if name.trim().is_empty() {
            return String::new();
        }

        let mut result = name.trim().to_string();
        result = strip_parenthesized(&result);
        result = strip_trailing_letter(&result);
        result = strip_trailing_counter(&result);
        result = unify_abbreviations(&result);
        collapse_whitespace(&result)
    }

    /// 業務名リストを正規化名でグループ化
    ///
    /// 戻り値は 代表名 → 元の業務名リスト（代表名の昇順）。
    pub fn group_names(&self, names: &[String]) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in names {
            if name.is_empty() {
                continue;
            }
            let normalized = self.normalize(name);
            if normalized.is_empty() {
                continue;
            }
            groups.entry(normalized).or_default().push(name.clone());
        }
        groups
    }

    /// 追加マージパターンでグループを統合
    ///
    /// 例: 「電話対応」「電話対応（折り返し）」「TEL対応」→「電話対応」
    pub fn apply_merge_patterns(
        &self,
        groups: BTreeMap<String, Vec<String>>,
    ) -> BTreeMap<String, Vec<String>> {
        let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (representative, members) in groups {
            let target = match merge_target(&representative) {
                Some(unified) => unified.to_string(),
                None => representative,
            };
            merged.entry(target).or_default().extend(members);
        }
        merged
    }

    // ==========================================
    // ローカルグルーピング
    // ==========================================

    /// ローカルグルーピングの本体
    ///
    /// # 引数
    /// - `work_names`: 業務名のリスト（重複可）
    /// - `apply_merge`: 追加マージパターンを適用するか
    pub fn group_tasks(&self, work_names: &[String], apply_merge: bool) -> TaskGroupingResult {
        let mut unique: Vec<String> = work_names
            .iter()
            .filter(|n| !n.is_empty())
            .cloned()
            .collect();
        unique.sort();
        unique.dedup();
        let original_count = unique.len();

        if original_count == 0 {
            return TaskGroupingResult {
                groups: Vec::new(),
                original_count: 0,
                grouped_count: 0,
            };
        }

        let mut grouped = self.group_names(&unique);
        if apply_merge {
            grouped = self.apply_merge_patterns(grouped);
        }

        let groups: Vec<TaskGroup> = grouped
            .into_iter()
            .map(|(representative, mut members)| {
                members.sort();
                members.dedup();
                TaskGroup {
                    representative,
                    members,
                }
            })
            .collect();

        let grouped_count = groups.len();
        TaskGroupingResult {
            groups,
            original_count,
            grouped_count,
        }
    }

    // ==========================================
    // 中分類（業務グループ）抽出
    // ==========================================

    /// 業務名から中分類と正規化名を抽出
    ///
    /// # 戻り値
    /// (中分類名, 正規化された業務名)
    ///
    /// 末尾キーワード表 → 含有キーワード表の順に評価し、
    /// どちらにも掛からなければ「その他」。
    /// MTG系だけは代表名を「MTG」に統一する。
    pub fn extract_task_group(&self, work_name: &str) -> (String, String) {
        if work_name.is_empty() {
            return (FALLBACK_GROUP.to_string(), String::new());
        }

        let stripped = strip_parenthesized(work_name);
        let normalized = strip_trailing_letter(stripped.trim()).trim().to_string();

        for (suffix, group_name) in SUFFIX_TO_GROUP {
            if normalized.ends_with(suffix) {
                return ((*group_name).to_string(), normalized);
            }
        }

        for (keyword, group_name) in CONTAINS_TO_GROUP {
            if normalized.contains(keyword) || work_name.contains(keyword) {
                if *group_name == "MTG系" {
                    return ((*group_name).to_string(), "MTG".to_string());
                }
                return ((*group_name).to_string(), normalized);
            }
        }

        (FALLBACK_GROUP.to_string(), normalized)
    }

    /// ランキングを中分類でまとめる
    ///
    /// (中分類, 正規化名) をキーに時間・金額を合算し、
    /// グループは合計時間の降順、構成項目は時間の降順で返す。
    pub fn group_ranking(&self, items: &[RankingEntry]) -> Vec<TaskGroupRanking> {
        let mut groups: BTreeMap<(String, String), TaskGroupRanking> = BTreeMap::new();

        for item in items {
            let (group_name, normalized) = self.extract_task_group(&item.work_name);
            let key = (group_name, normalized);
            let entry = groups.entry(key.clone()).or_insert_with(|| TaskGroupRanking {
                group_name: key.0.clone(),
                normalized_name: key.1.clone(),
                total_hours: 0.0,
                total_cost: 0.0,
                category: String::new(),
                member_count: 0,
                members: Vec::new(),
            });
            entry.total_hours += item.hours;
            entry.total_cost += item.cost;
            if entry.category.is_empty() && !item.category.is_empty() {
                entry.category = item.category.clone();
            }
            entry.members.push(item.clone());
        }

        let mut result: Vec<TaskGroupRanking> = groups
            .into_values()
            .map(|mut group| {
                group.total_hours = (group.total_hours * 10.0).round() / 10.0;
                group.member_count = group.members.len();
                group.members.sort_by(|a, b| b.hours.total_cmp(&a.hours));
                group
            })
            .collect();
        result.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
        result
    }
}

// ==========================================
// 正規化の内部関数
// ==========================================

/// 対応の取れた括弧（全角・半角）を中身ごと除去
///
/// 閉じ括弧が見つからない場合はそのまま残す。
fn strip_parenthesized(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '(' || c == '（' {
            if let Some(offset) = chars[i + 1..].iter().position(|&c| c == ')' || c == '）') {
                i += offset + 2;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// 末尾の英字（半角・全角）1文字と直前の空白を除去
fn strip_trailing_letter(input: &str) -> String {
    let mut out = input.to_string();
    if let Some(c) = out.chars().last() {
        if c.is_ascii_alphabetic() || ('Ａ'..='Ｚ').contains(&c) || ('ａ'..='ｚ').contains(&c) {
            out.pop();
            return out.trim_end().to_string();
        }
    }
    out
}

/// 末尾の数字（最大2桁、半角・全角）と直前の空白を除去
///
/// 3桁以上は日付などの可能性があるため末尾2桁に留める。
fn strip_trailing_counter(input: &str) -> String {
    let mut out = input.to_string();
    let mut removed = 0;
    while removed < 2 {
        match out.chars().last() {
            Some(c) if c.is_ascii_digit() || ('０'..='９').contains(&c) => {
                out.pop();
                removed += 1;
            }
            _ => break,
        }
    }
    if removed > 0 {
        out.trim_end().to_string()
    } else {
        out
    }
}

/// 略語を統一表記へ置換
fn unify_abbreviations(input: &str) -> String {
    let mut out = input.to_string();
    for (abbr, unified) in ABBREVIATIONS {
        if out.contains(abbr) {
            out = out.replace(abbr, unified);
        }
    }
    out
}

/// 連続する空白を半角スペース1つへ正規化
fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 代表名にマージパターンを適用（最初に一致した統一名を返す）
fn merge_target(representative: &str) -> Option<&'static str> {
    let lower = representative.to_lowercase();
    if contains_in_order(&lower, &["電話", "対応"]) {
        return Some("電話対応");
    }
    if contains_in_order(&lower, &["メール", "対応"]) {
        return Some("メール対応");
    }
    if contains_in_order(&lower, &["電話", "メール"]) {
        return Some("電話/メール対応");
    }
    if lower.contains("移動") {
        return Some("移動");
    }
    if lower.contains("打ち合わせ") || lower.contains("打合わせ") {
        return Some("打ち合わせ");
    }
    if lower.contains("ミーティング") {
        return Some("会議");
    }
    None
}

/// 複数キーワードがこの順で出現するか
fn contains_in_order(text: &str, parts: &[&str]) -> bool {
    let mut rest = text;
    for part in parts {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    true
}

// ==========================================
// 単体テスト
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn grouper() -> TaskGrouper {
        TaskGrouper::new()
    }

    // ==========================================
    // 正規化
    // ==========================================

    #[test]
    fn test_normalize_括弧除去() {
        let g = grouper();
        assert_eq!(g.normalize("施工ノート入力（修正）"), "施工ノート入力");
        assert_eq!(g.normalize("Wチェック業務(1号登録)"), "Wチェック業務");
        // 閉じ括弧が無い場合はそのまま
        assert_eq!(g.normalize("施工ノート入力（修正"), "施工ノート入力（修正");
    }

    #[test]
    fn test_normalize_末尾英字除去() {
        let g = grouper();
        assert_eq!(g.normalize("施工ノートA"), "施工ノート");
        assert_eq!(g.normalize("施工ノート Ｂ"), "施工ノート");
        // 末尾1文字のみ対象
        assert_eq!(g.normalize("ノートAB"), "ノートA");
    }

    #[test]
    fn test_normalize_末尾数字除去() {
        let g = grouper();
        assert_eq!(g.normalize("チェック業務2"), "チェック業務");
        assert_eq!(g.normalize("チェック業務 12"), "チェック業務");
        // 3桁以上は2桁だけ削る（日付らしき値を温存）
        assert_eq!(g.normalize("レセプト0401"), "レセプト04");
    }

    #[test]
    fn test_normalize_略語統一() {
        let g = grouper();
        assert_eq!(g.normalize("TEL対応"), "電話対応");
        assert_eq!(g.normalize("ＭＴＧ資料"), "会議資料");
        // 末尾英字の除去が先に走るため、末尾の MTG は統一対象にならない
        assert_eq!(g.normalize("マネージャーMTG"), "マネージャーMT");
    }

    #[test]
    fn test_normalize_空白正規化() {
        let g = grouper();
        assert_eq!(g.normalize("  電話　　対応  "), "電話 対応");
        assert_eq!(g.normalize(""), "");
        assert_eq!(g.normalize("   "), "");
    }

    // ==========================================
    // グルーピング
    // ==========================================

    #[test]
    fn test_group_tasks_表記ゆれを統合() {
        let g = grouper();
        let names = vec![
            "施工ノート入力".to_string(),
            "施工ノート入力（修正）".to_string(),
            "施工ノート入力A".to_string(),
        ];
        let result = g.group_tasks(&names, false);

        assert_eq!(result.original_count, 3);
        assert_eq!(result.grouped_count, 1);
        assert_eq!(result.groups[0].representative, "施工ノート入力");
        assert_eq!(result.groups[0].members.len(), 3);
    }

    #[test]
    fn test_group_tasks_空入力() {
        let g = grouper();
        let result = g.group_tasks(&[], false);
        assert_eq!(result.original_count, 0);
        assert_eq!(result.grouped_count, 0);
        assert!(result.groups.is_empty());

        // 空文字だけのリストも同じ
        let result = g.group_tasks(&[String::new()], false);
        assert_eq!(result.original_count, 0);
    }

    #[test]
    fn test_group_tasks_代表名昇順かつメンバー重複なし() {
        let g = grouper();
        let names = vec![
            "移動".to_string(),
            "レセチェック".to_string(),
            "移動".to_string(),
        ];
        let result = g.group_tasks(&names, false);

        assert_eq!(result.grouped_count, 2);
        let reps: Vec<&str> = result
            .groups
            .iter()
            .map(|grp| grp.representative.as_str())
            .collect();
        let mut sorted = reps.clone();
        sorted.sort();
        assert_eq!(reps, sorted);
        for group in &result.groups {
            assert_eq!(group.members.len(), 1);
        }
    }

    #[test]
    fn test_merge_patterns_電話対応へ統合() {
        let g = grouper();
        let names = vec![
            "電話対応".to_string(),
            "電話対応（折り返し）".to_string(),
            "TEL対応".to_string(),
        ];
        let result = g.group_tasks(&names, true);

        assert_eq!(result.grouped_count, 1);
        assert_eq!(result.groups[0].representative, "電話対応");
        assert_eq!(result.groups[0].members.len(), 3);
    }

    #[test]
    fn test_merge_patterns_ミーティングは会議へ() {
        let g = grouper();
        let names = vec!["朝ミーティング".to_string(), "定例会議".to_string()];
        let merged = g.group_tasks(&names, true);
        // 「朝ミーティング」→ 会議、「定例会議」はマージパターン対象外
        let reps: Vec<&str> = merged
            .groups
            .iter()
            .map(|grp| grp.representative.as_str())
            .collect();
        assert!(reps.contains(&"会議"));
        assert!(reps.contains(&"定例会議"));
    }

    #[test]
    fn test_merge_patterns_適用なしでは分離() {
        let g = grouper();
        let names = vec!["電話対応".to_string(), "TEL対応（折り返し）".to_string()];

        let without = g.group_tasks(&names, false);
        // 正規化だけでも TEL→電話 の統一で同じ代表名になる
        assert_eq!(without.grouped_count, 1);

        let names = vec!["電話対応".to_string(), "顧客電話の対応".to_string()];
        let without = g.group_tasks(&names, false);
        assert_eq!(without.grouped_count, 2);
        let with = g.group_tasks(&names, true);
        assert_eq!(with.grouped_count, 1);
    }

    // ==========================================
    // 中分類抽出
    // ==========================================

    #[test]
    fn test_extract_task_group_末尾キーワード() {
        let g = grouper();
        assert_eq!(
            g.extract_task_group("電話対応（折り返し）"),
            ("対応系".to_string(), "電話対応".to_string())
        );
        assert_eq!(
            g.extract_task_group("技工物ノート入力"),
            ("入力系".to_string(), "技工物ノート入力".to_string())
        );
    }

    #[test]
    fn test_extract_task_group_含有キーワード() {
        let g = grouper();
        // MTG系は代表名が「MTG」に統一される
        assert_eq!(
            g.extract_task_group("マネージャーMTG"),
            ("MTG系".to_string(), "MTG".to_string())
        );
        assert_eq!(
            g.extract_task_group("新人研修（座学）"),
            ("研修系".to_string(), "新人研修".to_string())
        );
    }

    #[test]
    fn test_extract_task_group_末尾キーワード優先() {
        // 「確認」末尾が含有キーワードより先に評価される
        let g = grouper();
        assert_eq!(
            g.extract_task_group("研修内容確認"),
            ("確認系".to_string(), "研修内容確認".to_string())
        );
    }

    #[test]
    fn test_extract_task_group_フォールバック() {
        let g = grouper();
        assert_eq!(
            g.extract_task_group("レセプト点検"),
            ("その他".to_string(), "レセプト点検".to_string())
        );
        assert_eq!(
            g.extract_task_group(""),
            ("その他".to_string(), String::new())
        );
    }

    // ==========================================
    // ランキングのグループ化
    // ==========================================

    fn ranking_entry(work_name: &str, category: &str, hours: f64, cost: f64) -> RankingEntry {
        RankingEntry {
            work_name: work_name.to_string(),
            category: category.to_string(),
            original_category: None,
            hours,
            ratio: 0.0,
            cost,
            estimated_cost: 0.0,
            is_reduction_target: false,
            unit_suffix: "h".to_string(),
            sub_category: None,
        }
    }

    #[test]
    fn test_group_ranking_合算と並び順() {
        let g = grouper();
        let items = vec![
            ranking_entry("電話対応", "コア業務", 100.0, 200_000.0),
            ranking_entry("電話対応（折り返し）", "コア業務", 50.0, 100_000.0),
            ranking_entry("移動", "移動", 30.0, 60_000.0),
        ];

        let grouped = g.group_ranking(&items);

        assert_eq!(grouped.len(), 2);
        // 合計時間の降順
        assert_eq!(grouped[0].group_name, "対応系");
        assert_eq!(grouped[0].normalized_name, "電話対応");
        assert_eq!(grouped[0].total_hours, 150.0);
        assert_eq!(grouped[0].total_cost, 300_000.0);
        assert_eq!(grouped[0].member_count, 2);
        assert_eq!(grouped[0].category, "コア業務");
        // 構成項目は時間降順
        assert_eq!(grouped[0].members[0].work_name, "電話対応");

        assert_eq!(grouped[1].group_name, "移動系");
        assert_eq!(grouped[1].total_hours, 30.0);
    }
}
