// ==========================================
// 業務時間分析ダッシュボード - API 層
// ==========================================
// 責務: UI / コマンド層へ公開する業務インターフェース
// ダッシュボード集計 / 分析 / インポート / 管理 / AI
// ==========================================

pub mod admin_api;
pub mod ai_api;
pub mod analytics_api;
pub mod dashboard_api;
pub mod error;
pub mod import_api;

pub use admin_api::AdminApi;
pub use ai_api::AiApi;
pub use analytics_api::AnalyticsApi;
pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
