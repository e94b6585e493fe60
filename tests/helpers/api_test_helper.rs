// ==========================================
// API 集成テスト補助
// ==========================================
// 責務: API 層の集成テストで使う共通環境を提供
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tempfile::NamedTempFile;

use worktime_insight::api::{AdminApi, AnalyticsApi, DashboardApi, ImportApi};
use worktime_insight::config::SettingsManager;
use worktime_insight::importer::WorkbookImporter;
use worktime_insight::repository::{
    AppSettingRepository, CategoryKeywordRepository, DisplayCategoryRepository,
    MonthlyGoalRepository, ReductionGoalRepository, SubCategoryRuleRepository,
    TaskReductionTargetRepository, UnitTypeRuleRepository, WorkRecordRepository,
};

// ==========================================
// API テスト環境
// ==========================================

/// API 集成テスト環境
///
/// 一時データベースの上に全 API とデータ準備用のリポジトリを構築する。
/// 初期カテゴリ・キーワード・設定は投入済み。
pub struct ApiTestEnv {
    pub db_path: String,
    pub dashboard_api: Arc<DashboardApi>,
    pub analytics_api: Arc<AnalyticsApi>,
    pub import_api: Arc<ImportApi>,
    pub admin_api: Arc<AdminApi>,

    // データ準備用のリポジトリ
    pub records: Arc<WorkRecordRepository>,
    pub categories: Arc<DisplayCategoryRepository>,
    pub keywords: Arc<CategoryKeywordRepository>,
    pub settings: Arc<SettingsManager>,

    // 一時ファイル（生存期間を保持）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 新しいテスト環境を作成
    pub fn new() -> Result<Self, String> {
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("テストデータベースの作成に失敗: {}", e))?;

        let conn = Connection::open(&db_path)
            .map_err(|e| format!("データベースを開けません: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // リポジトリ層
        let records = Arc::new(WorkRecordRepository::from_connection(conn.clone()));
        let categories = Arc::new(DisplayCategoryRepository::from_connection(conn.clone()));
        let keywords = Arc::new(CategoryKeywordRepository::from_connection(conn.clone()));
        let unit_rules = Arc::new(UnitTypeRuleRepository::from_connection(conn.clone()));
        let sub_rules = Arc::new(SubCategoryRuleRepository::from_connection(conn.clone()));
        let reduction_goals = Arc::new(ReductionGoalRepository::from_connection(conn.clone()));
        let monthly_goals = Arc::new(MonthlyGoalRepository::from_connection(conn.clone()));
        let task_targets = Arc::new(TaskReductionTargetRepository::from_connection(conn.clone()));
        let app_settings = Arc::new(AppSettingRepository::from_connection(conn.clone()));

        let settings = Arc::new(SettingsManager::new(app_settings.clone()));

        // 初期データ投入
        categories
            .seed_defaults()
            .map_err(|e| format!("初期カテゴリの投入に失敗: {}", e))?;
        settings
            .seed_defaults()
            .map_err(|e| format!("初期設定の投入に失敗: {}", e))?;

        // API 層
        let dashboard_api = Arc::new(DashboardApi::new(
            records.clone(),
            categories.clone(),
            keywords.clone(),
            unit_rules.clone(),
            sub_rules.clone(),
            task_targets.clone(),
            settings.clone(),
        ));

        let analytics_api = Arc::new(AnalyticsApi::new(
            dashboard_api.clone(),
            records.clone(),
            settings.clone(),
        ));

        let import_api = Arc::new(ImportApi::new(WorkbookImporter::new(
            WorkRecordRepository::from_connection(conn.clone()),
        )));

        let admin_api = Arc::new(AdminApi::new(
            records.clone(),
            categories.clone(),
            keywords.clone(),
            unit_rules,
            sub_rules,
            reduction_goals,
            monthly_goals,
            task_targets,
            app_settings,
            settings.clone(),
        ));

        Ok(Self {
            db_path,
            dashboard_api,
            analytics_api,
            import_api,
            admin_api,
            records,
            categories,
            keywords,
            settings,
            _temp_file: temp_file,
        })
    }
}
