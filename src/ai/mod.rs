// ==========================================
// 業務時間分析ダッシュボード - AI 層
// ==========================================
// 責務: AI プロバイダ抽象・プロンプト・Anthropic 実装
// 分類提案 / インサイト / チャット / レポート / グルーピング
// ==========================================

pub mod anthropic;
pub mod factory;
pub mod prompts;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use factory::create_provider;
pub use provider::{
    AiError, AiProvider, AiResult, CategorySuggestion, ChatResponse, ChatTurn, InsightResult,
    KeywordRuleSummary, ReportResult, TokenUsage, WorkItem,
};

/// 1回の分類リクエストに含めるアイテム数の上限
pub const CATEGORIZE_BATCH_LIMIT: usize = 100;

/// ローカルグルーピング後にこのグループ数を超えている場合のみ AI 統合を行う
pub const AI_GROUPING_MIN_GROUPS: usize = 300;

/// AI 統合に渡す代表名数の上限
pub const AI_GROUPING_MAX_REPRESENTATIVES: usize = 500;

/// インサイトキャッシュの有効期間（時間）
pub const INSIGHT_CACHE_TTL_HOURS: i64 = 1;
