// ==========================================
// 業務時間分析ダッシュボード - アプリケーション状態
// ==========================================
// 責務: 共有リソースと API インスタンスの組み立て
// Tauri アプリではグローバル状態として管理される
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::ai::create_provider;
use crate::api::{AdminApi, AiApi, AnalyticsApi, DashboardApi, ImportApi};
use crate::config::SettingsManager;
use crate::db;
use crate::importer::WorkbookImporter;
use crate::repository::{
    AiInsightCacheRepository, AiRequestLogRepository, AiSuggestionRepository,
    AppSettingRepository, CategoryKeywordRepository, DisplayCategoryRepository,
    MonthlyGoalRepository, ReductionGoalRepository, SubCategoryRuleRepository,
    TaskReductionTargetRepository, UnitTypeRuleRepository, WorkRecordRepository,
};

/// アプリケーション状態
///
/// すべての API インスタンスと共有リソースを保持する
pub struct AppState {
    /// データベースパス
    pub db_path: String,

    /// ダッシュボード集計 API
    pub dashboard_api: Arc<DashboardApi>,

    /// 分析 API（トレンド / 比較 / シミュレーション）
    pub analytics_api: Arc<AnalyticsApi>,

    /// ファイル取込 API
    pub import_api: Arc<ImportApi>,

    /// 管理 API
    pub admin_api: Arc<AdminApi>,

    /// AI API
    pub ai_api: Arc<AiApi>,
}

impl AppState {
    /// AppState を作成
    ///
    /// # 引数
    /// - db_path: データベースファイルのパス
    ///
    /// # 戻り値
    /// - Ok(AppState): 初期化済みのアプリケーション状態
    /// - Err(String): 初期化エラー
    ///
    /// スキーマ作成と初期データ投入（カテゴリ / キーワード / 設定）も
    /// ここで行う。投入は空のデータベースに対してのみ実行される。
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "AppStateを初期化");

        let conn =
            Connection::open(&db_path).map_err(|e| format!("データベースを開けません: {}", e))?;
        db::configure_sqlite_connection(&conn)
            .map_err(|e| format!("データベース設定に失敗: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("スキーマ初期化に失敗: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // リポジトリ層
        // ==========================================

        let records = Arc::new(WorkRecordRepository::from_connection(conn.clone()));
        let categories = Arc::new(DisplayCategoryRepository::from_connection(conn.clone()));
        let keywords = Arc::new(CategoryKeywordRepository::from_connection(conn.clone()));
        let unit_rules = Arc::new(UnitTypeRuleRepository::from_connection(conn.clone()));
        let sub_rules = Arc::new(SubCategoryRuleRepository::from_connection(conn.clone()));
        let reduction_goals = Arc::new(ReductionGoalRepository::from_connection(conn.clone()));
        let monthly_goals = Arc::new(MonthlyGoalRepository::from_connection(conn.clone()));
        let task_targets = Arc::new(TaskReductionTargetRepository::from_connection(conn.clone()));
        let app_settings = Arc::new(AppSettingRepository::from_connection(conn.clone()));
        let suggestions = Arc::new(AiSuggestionRepository::from_connection(conn.clone()));
        let insight_cache = Arc::new(AiInsightCacheRepository::from_connection(conn.clone()));
        let request_log = Arc::new(AiRequestLogRepository::from_connection(conn.clone()));

        let settings = Arc::new(SettingsManager::new(app_settings.clone()));

        // ==========================================
        // 初期データ投入と起動時メンテナンス
        // ==========================================

        let seeded = categories
            .seed_defaults()
            .map_err(|e| format!("初期カテゴリの投入に失敗: {}", e))?;
        if seeded {
            tracing::info!("初期カテゴリとキーワードを投入");
        }
        let seeded_settings = settings
            .seed_defaults()
            .map_err(|e| format!("初期設定の投入に失敗: {}", e))?;
        if seeded_settings > 0 {
            tracing::info!(count = seeded_settings, "初期設定を投入");
        }

        // 期限切れキャッシュの掃除は失敗しても起動を止めない
        match insight_cache.purge_expired() {
            Ok(purged) if purged > 0 => {
                tracing::info!(purged, "期限切れのインサイトキャッシュを削除")
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "インサイトキャッシュの掃除に失敗"),
        }

        // ==========================================
        // AI プロバイダ
        // ==========================================

        let provider =
            create_provider().map_err(|e| format!("AIプロバイダの初期化に失敗: {}", e))?;

        // ==========================================
        // API 層
        // ==========================================

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

        let ai_api = Arc::new(AiApi::new(
            provider,
            dashboard_api.clone(),
            analytics_api.clone(),
            records,
            categories,
            keywords,
            suggestions,
            insight_cache,
            request_log,
            settings,
        ));

        tracing::info!("AppState初期化完了");

        Ok(Self {
            db_path,
            dashboard_api,
            analytics_api,
            import_api,
            admin_api,
            ai_api,
        })
    }

    /// データベースパスを取得
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// デフォルトデータベースパス
// ==========================================

/// デフォルトのデータベースパスを取得
///
/// # 戻り値
/// - 環境変数 `WORKTIME_INSIGHT_DB_PATH` が設定されていればその値
/// - 開発ビルド: ユーザーデータディレクトリ/worktime-insight-dev/worktime_insight.db
/// - リリースビルド: ユーザーデータディレクトリ/worktime-insight/worktime_insight.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("WORKTIME_INSIGHT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // データディレクトリが取れない環境ではカレントディレクトリへ退避
    let mut path = PathBuf::from("./worktime_insight.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 開発ビルドは独立ディレクトリを使い、本番データを汚さない
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("worktime-insight-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("worktime-insight");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("worktime_insight.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_初期化と初期データ() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state_test.db");

        let state = AppState::new(db_path.to_string_lossy().to_string()).unwrap();

        // 初期カテゴリ・設定が投入済みで API が使える状態になっている
        let styles = state.dashboard_api.get_category_styles().unwrap();
        assert_eq!(styles.categories.len(), 5);
        let defaults = state.dashboard_api.get_default_settings().unwrap();
        assert_eq!(defaults.default_hourly_rate, 2000);

        // 同じパスで再初期化しても初期データは重複しない
        drop(state);
        let state = AppState::new(db_path.to_string_lossy().to_string()).unwrap();
        let overview = state.admin_api.get_overview().unwrap();
        assert_eq!(overview.categories_count, 5);
    }
}
