// ==========================================
// 業務時間分析ダッシュボード - ドメインモデル層
// ==========================================
// 責務: ドメインエンティティ・型・業務ルールの定義
// 制約: データアクセスロジック・エンジンロジックを含まない
// ==========================================

pub mod ai;
pub mod category;
pub mod goal;
pub mod record;
pub mod settings;
pub mod types;

// コア型の再エクスポート
pub use ai::{
    estimate_cost_usd, AiCategorySuggestion, AiInsightCacheEntry, AiRequestLog,
    INPUT_COST_PER_MTOK, OUTPUT_COST_PER_MTOK,
};
pub use category::{
    CategoryKeyword, DisplayCategory, DisplayCategoryWithCount, SubCategoryRule, UnitTypeRule,
};
pub use goal::{normalize_progress, MonthlyBusinessItem, MonthlyGoal, ReductionGoal};
pub use record::{ImportBatch, RawWorkRow, RowError, SheetPreview, WorkRecord};
pub use settings::{AppSetting, SettingValue};
pub use types::{
    ConfidenceLevel, GoalType, MatchType, ReportKind, RuleMatchType, SettingType,
    SuggestionStatus, UnitType, ValueRank,
};
