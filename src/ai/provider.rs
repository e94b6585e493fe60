// ==========================================
// 業務時間分析ダッシュボード - AI プロバイダ抽象
// ==========================================
// 責務: AI プロバイダの共通インターフェースと結果型を定義
// 他プロバイダ（OpenAI, Gemini 等）への差し替えを想定
// ==========================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::ai::estimate_cost_usd;
use crate::domain::types::ReportKind;
use crate::engine::aggregator::SummaryReport;
use crate::engine::grouper::TaskGroupingResult;

/// AI プロバイダのエラー型
#[derive(Error, Debug)]
pub enum AiError {
    #[error("APIキーが無効または未設定です: {0}")]
    Authentication(String),

    #[error("APIのレート制限を超過しました: {0}")]
    RateLimit(String),

    #[error("AIサービスへのリクエストに失敗しました: {0}")]
    Request(String),

    #[error("AI応答をJSONとして解析できません: {0}")]
    InvalidResponse(String),

    #[error("不明なAIプロバイダ: {0}")]
    UnknownProvider(String),
}

/// Result 型エイリアス
pub type AiResult<T> = Result<T, AiError>;

// ==========================================
// リクエスト・結果型
// ==========================================

/// 分類対象の業務アイテム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub work_name: String,
}

/// 既存キーワードルールの要約（プロンプトの参考情報）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRuleSummary {
    pub keyword: String,
    pub category: String,
}

/// 1アイテム分の分類提案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySuggestion {
    /// 入力リスト内のインデックス
    pub item_index: usize,
    /// 提案カテゴリ名
    pub category_name: String,
    /// 確信度（0.0-1.0）
    pub confidence: f64,
    /// 判断理由
    pub reasoning: String,
}

/// インサイト生成結果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightResult {
    /// ポジティブな発見
    pub highlights: Vec<String>,
    /// 懸念事項
    pub concerns: Vec<String>,
    /// 改善提案
    pub recommendations: Vec<String>,
}

/// チャットの1往復
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub assistant: String,
}

/// チャット応答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub data_references: Vec<Value>,
    pub follow_up_questions: Vec<String>,
}

/// レポート生成結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResult {
    /// 本文
    pub content: String,
    /// 形式（現状は markdown のみ）
    pub format: String,
}

/// 1リクエスト分のトークン使用量
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
}

impl TokenUsage {
    /// 推定コスト（USD）
    pub fn cost_usd(&self) -> f64 {
        estimate_cost_usd(self.input_tokens, self.output_tokens)
    }
}

// ==========================================
// AiProvider トレイト
// ==========================================

/// AI プロバイダの共通インターフェース
///
/// 各操作は結果とトークン使用量の組を返す。
/// 使用量はコストログ（AiRequestLogRepository）の記録に使う。
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// 使用中のモデル名（リクエストログ用）
    fn model_name(&self) -> &str;

    /// 業務アイテムをカテゴリ分類する（1回の呼び出しは100件まで）
    async fn categorize_work_items(
        &self,
        items: &[WorkItem],
        categories: &[String],
        existing_rules: &[KeywordRuleSummary],
    ) -> AiResult<(Vec<CategorySuggestion>, TokenUsage)>;

    /// 集計データからインサイトを生成する
    async fn generate_insights(
        &self,
        summary: &SummaryReport,
        trend: &Value,
        alerts: &[Value],
        period: &str,
    ) -> AiResult<(InsightResult, TokenUsage)>;

    /// 自然言語の質問に回答する
    async fn chat_query(
        &self,
        question: &str,
        context: &Value,
        history: &[ChatTurn],
    ) -> AiResult<(ChatResponse, TokenUsage)>;

    /// 週次・月次レポートを生成する
    async fn generate_report(
        &self,
        kind: ReportKind,
        data: &Value,
        period_start: &str,
        period_end: &str,
    ) -> AiResult<(ReportResult, TokenUsage)>;

    /// 類似した業務名をグループ化する
    async fn group_similar_tasks(
        &self,
        work_names: &[String],
    ) -> AiResult<(TaskGroupingResult, TokenUsage)>;
}
