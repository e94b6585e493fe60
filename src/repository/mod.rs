// ==========================================
// 業務時間分析ダッシュボード - リポジトリ層
// ==========================================
// SQLite への永続化を担当する。各リポジトリは Arc<Mutex<Connection>> を
// 共有し、SQL とトランザクション境界をこの層に閉じ込める。
// ==========================================

pub mod ai_repo;
pub mod category_repo;
pub mod error;
pub mod goal_repo;
pub mod record_repo;
pub mod rule_repo;
pub mod settings_repo;

pub use ai_repo::{
    AiInsightCacheRepository, AiRequestLogRepository, AiSuggestionRepository, AiUsageSummary,
};
pub use category_repo::{CategoryKeywordRepository, DisplayCategoryRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use goal_repo::{MonthlyGoalRepository, ReductionGoalRepository, TaskReductionTargetRepository};
pub use record_repo::{
    DailyAggRow, RecordFilter, StaffAggRow, UniqueCombination, WorkAggRow, WorkRecordRepository,
};
pub use rule_repo::{SubCategoryRuleRepository, UnitTypeRuleRepository};
pub use settings_repo::AppSettingRepository;
