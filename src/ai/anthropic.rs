// ==========================================
// 業務時間分析ダッシュボード - Anthropic プロバイダ
// ==========================================
// Claude Messages API (HTTPS) を使用した AiProvider 実装
// 応答の ```json フェンス除去と途中切断からの復元を行う
// ==========================================

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::domain::types::ReportKind;
use crate::engine::aggregator::SummaryReport;
use crate::engine::grouper::{TaskGroup, TaskGroupingResult};

use super::prompts::{
    build_categorization_prompt, build_chat_prompt, build_insight_prompt, build_report_prompt,
    build_task_grouping_prompt, CATEGORIZATION_SYSTEM_PROMPT, CHAT_SYSTEM_PROMPT,
    INSIGHT_SYSTEM_PROMPT, REPORT_SYSTEM_PROMPT, TASK_GROUPING_SYSTEM_PROMPT,
};
use super::provider::{
    AiError, AiProvider, AiResult, CategorySuggestion, ChatResponse, ChatTurn, InsightResult,
    KeywordRuleSummary, ReportResult, TokenUsage, WorkItem,
};

/// 既定モデル（ANTHROPIC_MODEL で上書き可能）
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// 応答の最大トークン数（切り捨て対策で大きめに確保）
pub const MAX_TOKENS: u32 = 8192;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

// ==========================================
// AnthropicProvider
// ==========================================

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl AnthropicProvider {
    /// 環境変数から設定
    ///
    /// # 環境変数
    /// - ANTHROPIC_API_KEY: APIキー（未設定時は AI 機能が利用不可）
    /// - ANTHROPIC_MODEL: モデル名（省略時は既定モデル）
    pub fn from_env() -> Self {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        let model =
            std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        if api_key.is_none() {
            warn!("ANTHROPIC_API_KEY が未設定のため AI 機能は利用できません");
        }

        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// API を呼び出して応答テキストと使用量を返す
    async fn make_request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> AiResult<(String, TokenUsage)> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AiError::Authentication("ANTHROPIC_API_KEY が設定されていません".to_string())
        })?;

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt,
            "messages": [{"role": "user", "content": user_prompt}],
        });

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimit(
                "しばらく待ってから再試行してください".to_string(),
            ));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AiError::Authentication("APIキーが拒否されました".to_string()));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AiError::Request(format!("HTTP {}: {}", status, detail)));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;
        let usage = TokenUsage {
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
        };
        info!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "AI リクエスト完了"
        );

        let text = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .unwrap_or_default();
        Ok((text, usage))
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: UsageBlock,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct UsageBlock {
    input_tokens: i64,
    output_tokens: i64,
}

// ==========================================
// 応答解析
// ==========================================

/// 応答テキストから JSON を抽出して解析する
///
/// - ```json / ``` フェンスを除去
/// - max_tokens による途中切断から可能な範囲で復元する:
///   配列は最後の完全な要素まで、オブジェクトは空として扱う
fn parse_json_response(raw: &str) -> AiResult<Value> {
    let mut text = raw.trim().to_string();

    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped.strip_prefix('\n').unwrap_or(stripped).to_string();
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped.strip_prefix('\n').unwrap_or(stripped).to_string();
    }

    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped.to_string();
    } else if let Some(pos) = text.find("```") {
        // 閉じフェンスの後に説明文が続く場合はフェンスより前だけを使う
        text.truncate(pos);
    }

    let mut text = text.trim().to_string();

    if text.starts_with('[') && !text.ends_with(']') {
        if let Some(pos) = text.rfind('}') {
            if pos > 0 {
                text.truncate(pos + 1);
                text.push(']');
                warn!("JSON配列が途中で切れていたため復元を試行");
            }
        }
    }

    if text.starts_with('{') && !text.ends_with('}') && text.rfind('"').is_some_and(|pos| pos > 0)
    {
        warn!("JSONオブジェクトが途中で切れていたため空として扱う");
        text = "{}".to_string();
    }

    serde_json::from_str(&text).map_err(|e| {
        let head: String = text.chars().take(200).collect();
        AiError::InvalidResponse(format!("{}（先頭: {}）", e, head))
    })
}

/// 分類応答の JSON 配列を提案リストへ変換
fn suggestions_from_value(
    parsed: &Value,
    categories: &[String],
) -> AiResult<Vec<CategorySuggestion>> {
    let array = parsed
        .as_array()
        .ok_or_else(|| AiError::InvalidResponse("分類応答が配列ではありません".to_string()))?;
    let default_category = categories.first().map(|s| s.as_str()).unwrap_or("その他");

    Ok(array
        .iter()
        .enumerate()
        .map(|(i, entry)| CategorySuggestion {
            item_index: entry
                .get("item_index")
                .and_then(Value::as_u64)
                .map(|v| v as usize)
                .unwrap_or(i),
            category_name: entry
                .get("category")
                .and_then(Value::as_str)
                .unwrap_or(default_category)
                .to_string(),
            confidence: entry
                .get("confidence")
                .and_then(Value::as_f64)
                .unwrap_or(0.5),
            reasoning: entry
                .get("reasoning")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
        })
        .collect())
}

/// グルーピング応答の JSON 配列をグループリストへ変換
fn groups_from_value(parsed: &Value) -> AiResult<Vec<TaskGroup>> {
    let array = parsed.as_array().ok_or_else(|| {
        AiError::InvalidResponse("グルーピング応答が配列ではありません".to_string())
    })?;

    Ok(array
        .iter()
        .map(|entry| TaskGroup {
            representative: entry
                .get("representative")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            members: entry
                .get("members")
                .and_then(Value::as_array)
                .map(|members| {
                    members
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect())
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ==========================================
// AiProvider 実装
// ==========================================

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn categorize_work_items(
        &self,
        items: &[WorkItem],
        categories: &[String],
        existing_rules: &[KeywordRuleSummary],
    ) -> AiResult<(Vec<CategorySuggestion>, TokenUsage)> {
        if items.is_empty() {
            return Ok((Vec::new(), TokenUsage::default()));
        }

        let prompt = build_categorization_prompt(items, categories, existing_rules);
        let (text, usage) = self
            .make_request(CATEGORIZATION_SYSTEM_PROMPT, &prompt)
            .await?;
        let parsed = parse_json_response(&text)?;
        let suggestions = suggestions_from_value(&parsed, categories)?;
        Ok((suggestions, usage))
    }

    async fn generate_insights(
        &self,
        summary: &SummaryReport,
        trend: &Value,
        alerts: &[Value],
        period: &str,
    ) -> AiResult<(InsightResult, TokenUsage)> {
        let prompt = build_insight_prompt(summary, trend, alerts, period);
        let (text, usage) = self.make_request(INSIGHT_SYSTEM_PROMPT, &prompt).await?;
        let parsed = parse_json_response(&text)?;

        let result = InsightResult {
            highlights: string_list(&parsed, "highlights"),
            concerns: string_list(&parsed, "concerns"),
            recommendations: string_list(&parsed, "recommendations"),
        };
        Ok((result, usage))
    }

    async fn chat_query(
        &self,
        question: &str,
        context: &Value,
        history: &[ChatTurn],
    ) -> AiResult<(ChatResponse, TokenUsage)> {
        let prompt = build_chat_prompt(question, context, history);
        let (text, usage) = self.make_request(CHAT_SYSTEM_PROMPT, &prompt).await?;

        // チャットはプレーンテキストのまま返す
        let response = ChatResponse {
            answer: text.trim().to_string(),
            data_references: Vec::new(),
            follow_up_questions: Vec::new(),
        };
        Ok((response, usage))
    }

    async fn generate_report(
        &self,
        kind: ReportKind,
        data: &Value,
        period_start: &str,
        period_end: &str,
    ) -> AiResult<(ReportResult, TokenUsage)> {
        let prompt = build_report_prompt(kind, data, period_start, period_end);
        let (text, usage) = self.make_request(REPORT_SYSTEM_PROMPT, &prompt).await?;

        let result = ReportResult {
            content: text.trim().to_string(),
            format: "markdown".to_string(),
        };
        Ok((result, usage))
    }

    async fn group_similar_tasks(
        &self,
        work_names: &[String],
    ) -> AiResult<(TaskGroupingResult, TokenUsage)> {
        if work_names.is_empty() {
            let empty = TaskGroupingResult {
                groups: Vec::new(),
                original_count: 0,
                grouped_count: 0,
            };
            return Ok((empty, TokenUsage::default()));
        }

        let unique: std::collections::BTreeSet<&str> =
            work_names.iter().map(|s| s.as_str()).collect();
        let original_count = unique.len();

        let prompt = build_task_grouping_prompt(work_names);
        let (text, usage) = self
            .make_request(TASK_GROUPING_SYSTEM_PROMPT, &prompt)
            .await?;
        let parsed = parse_json_response(&text)?;
        let groups = groups_from_value(&parsed)?;

        let result = TaskGroupingResult {
            grouped_count: groups.len(),
            original_count,
            groups,
        };
        Ok((result, usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_素のJSON() {
        let parsed = parse_json_response(r#"[{"category": "事務"}]"#).unwrap();
        assert_eq!(parsed[0]["category"], "事務");
    }

    #[test]
    fn test_parse_json_フェンス除去() {
        let text = "```json\n{\"highlights\": [\"良い\"]}\n```";
        let parsed = parse_json_response(text).unwrap();
        assert_eq!(parsed["highlights"][0], "良い");
    }

    #[test]
    fn test_parse_json_言語指定なしフェンス() {
        let text = "```\n[1, 2, 3]\n```";
        let parsed = parse_json_response(text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_parse_json_フェンス後の説明文を無視() {
        let text = "```json\n[{\"category\": \"事務\"}]\n```\n以上が分類結果です。";
        let parsed = parse_json_response(text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_json_途中で切れた配列を復元() {
        let text = r#"[{"category": "事務", "confidence": 0.9}, {"category": "MTG", "confi"#;
        let parsed = parse_json_response(text).unwrap();
        let array = parsed.as_array().unwrap();
        // 完全な要素だけが残る
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["category"], "事務");
    }

    #[test]
    fn test_parse_json_途中で切れたオブジェクトは空扱い() {
        let text = r#"{"highlights": ["良い発見"], "concerns": ["懸念"#;
        let parsed = parse_json_response(text).unwrap();
        assert_eq!(parsed, json!({}));
    }

    #[test]
    fn test_parse_json_解析不能はエラー() {
        let result = parse_json_response("分類できませんでした");
        assert!(matches!(result, Err(AiError::InvalidResponse(_))));
    }

    #[test]
    fn test_suggestions_変換と既定値() {
        let parsed = json!([
            {"item_index": 1, "category": "MTG", "confidence": 0.95, "reasoning": "会議のため"},
            {}
        ]);
        let categories = vec!["コア業務".to_string(), "MTG".to_string()];

        let suggestions = suggestions_from_value(&parsed, &categories).unwrap();

        assert_eq!(suggestions[0].item_index, 1);
        assert_eq!(suggestions[0].category_name, "MTG");
        assert_eq!(suggestions[0].confidence, 0.95);
        // 欠けたフィールドは位置・先頭カテゴリ・0.5 で補完
        assert_eq!(suggestions[1].item_index, 1);
        assert_eq!(suggestions[1].category_name, "コア業務");
        assert_eq!(suggestions[1].confidence, 0.5);
        assert_eq!(suggestions[1].reasoning, "");
    }

    #[test]
    fn test_suggestions_配列以外はエラー() {
        let result = suggestions_from_value(&json!({"category": "事務"}), &[]);
        assert!(matches!(result, Err(AiError::InvalidResponse(_))));
    }

    #[test]
    fn test_groups_変換() {
        let parsed = json!([
            {"representative": "電話対応", "members": ["電話対応", "TEL対応"]},
            {"representative": "ノート入力"}
        ]);

        let groups = groups_from_value(&parsed).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].representative, "電話対応");
        assert_eq!(groups[0].members, vec!["電話対応", "TEL対応"]);
        assert!(groups[1].members.is_empty());
    }
}
