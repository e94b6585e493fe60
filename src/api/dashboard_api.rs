// ==========================================
// 業務時間分析ダッシュボード - ダッシュボード API
// ==========================================
// 責務: サマリー / 内訳 / ランキングなどダッシュボード系クエリの提供
// 構成: API 層 → エンジン層 (Aggregator) → リポジトリ層
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::SettingsManager;
use crate::engine::aggregator::{
    Aggregator, CategoryHours, ChartBreakdown, DepartmentSummary, RankingEntry, SummaryReport,
};
use crate::engine::{KeywordClassifier, SubCategoryResolver, UnitRuleResolver};
use crate::repository::{
    CategoryKeywordRepository, DisplayCategoryRepository, RecordFilter, SubCategoryRuleRepository,
    TaskReductionTargetRepository, UnitTypeRuleRepository, WorkRecordRepository,
};

// ==========================================
// DTO
// ==========================================

/// データ全体の日付範囲
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

/// 担当者一覧の1件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffEntry {
    pub name: String,
}

/// バッジの配色
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeStyle {
    pub bg: String,
    pub text: String,
}

/// チャート描画用のカテゴリ配色情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStyleMap {
    /// カテゴリ名（表示順）
    pub categories: Vec<String>,
    /// カテゴリ名 → チャート色
    pub colors: HashMap<String, String>,
    /// 削減対象のカテゴリ名
    pub reduction_targets: Vec<String>,
    /// カテゴリ名 → バッジ配色
    pub badge_styles: HashMap<String, BadgeStyle>,
}

/// フロントエンドの初期値設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultSettings {
    pub default_hourly_rate: i64,
    pub ranking_limit: i64,
    pub default_category: String,
}

// ==========================================
// DashboardApi
// ==========================================

/// ダッシュボード API
///
/// 分類ルールは呼び出しごとにリポジトリから読み直す。
/// 管理画面での変更が即座に集計へ反映される。
pub struct DashboardApi {
    records: Arc<WorkRecordRepository>,
    categories: Arc<DisplayCategoryRepository>,
    keywords: Arc<CategoryKeywordRepository>,
    unit_rules: Arc<UnitTypeRuleRepository>,
    sub_rules: Arc<SubCategoryRuleRepository>,
    task_targets: Arc<TaskReductionTargetRepository>,
    settings: Arc<SettingsManager>,
}

impl DashboardApi {
    pub fn new(
        records: Arc<WorkRecordRepository>,
        categories: Arc<DisplayCategoryRepository>,
        keywords: Arc<CategoryKeywordRepository>,
        unit_rules: Arc<UnitTypeRuleRepository>,
        sub_rules: Arc<SubCategoryRuleRepository>,
        task_targets: Arc<TaskReductionTargetRepository>,
        settings: Arc<SettingsManager>,
    ) -> Self {
        Self {
            records,
            categories,
            keywords,
            unit_rules,
            sub_rules,
            task_targets,
            settings,
        }
    }

    /// 現在の DB 状態から集計エンジンを構築
    pub(crate) fn build_aggregator(&self) -> ApiResult<Aggregator> {
        let default_category = self.settings.default_category()?;
        let classifier = KeywordClassifier::load(&self.keywords, default_category)?;
        let categories = self.categories.list_all()?;
        let task_targets = self.task_targets.list_all()?.into_iter().collect();
        Ok(Aggregator::new(classifier, categories, task_targets))
    }

    /// 適用する時給を決定（指定がなければ設定値）
    fn effective_hourly_rate(&self, hourly_rate: Option<f64>) -> ApiResult<f64> {
        match hourly_rate {
            Some(rate) if rate > 0.0 => Ok(rate),
            Some(_) => Err(ApiError::InvalidInput("時給は正の値で指定してください".to_string())),
            None => Ok(self.settings.default_hourly_rate()? as f64),
        }
    }

    // ==========================================
    // 集計クエリ
    // ==========================================

    /// 集計サマリーを取得
    ///
    /// # 引数
    /// - filter: 絞り込み条件（分類1 / 担当者 / 期間）
    /// - hourly_rate: 時給（未指定なら設定値）
    pub fn get_summary(
        &self,
        filter: &RecordFilter,
        hourly_rate: Option<f64>,
    ) -> ApiResult<SummaryReport> {
        let rate = self.effective_hourly_rate(hourly_rate)?;
        let rows = self.records.aggregate_by_work(filter)?;
        let aggregator = self.build_aggregator()?;
        Ok(aggregator.summary(&rows, rate))
    }

    /// カテゴリ別内訳を取得（表示順、時間ゼロのカテゴリも含む）
    pub fn get_category_breakdown(&self, filter: &RecordFilter) -> ApiResult<Vec<CategoryHours>> {
        let rows = self.records.aggregate_by_work(filter)?;
        let aggregator = self.build_aggregator()?;
        Ok(aggregator.category_breakdown(&rows))
    }

    /// 日次カテゴリ別内訳を取得（積み上げチャート用）
    pub fn get_daily_breakdown(&self, filter: &RecordFilter) -> ApiResult<ChartBreakdown> {
        let rows = self.records.aggregate_by_day(filter)?;
        let aggregator = self.build_aggregator()?;
        Ok(aggregator.daily_breakdown(&rows))
    }

    /// 業務別時間消費ランキングを取得
    ///
    /// # 引数
    /// - filter: 絞り込み条件
    /// - limit: 件数上限（未指定なら設定値）
    /// - hourly_rate: 時給（未指定なら設定値）
    pub fn get_ranking(
        &self,
        filter: &RecordFilter,
        limit: Option<i64>,
        hourly_rate: Option<f64>,
    ) -> ApiResult<Vec<RankingEntry>> {
        let limit = match limit {
            Some(n) if n > 0 => n,
            Some(_) => {
                return Err(ApiError::InvalidInput("limit は正の値で指定してください".to_string()))
            }
            None => self.settings.ranking_limit()?,
        };
        let rate = self.effective_hourly_rate(hourly_rate)?;

        let rows = self.records.aggregate_by_work(filter)?;
        let aggregator = self.build_aggregator()?;
        let units = UnitRuleResolver::load(&self.unit_rules)?;
        let subs = SubCategoryResolver::load(&self.sub_rules)?;
        Ok(aggregator.ranking(&rows, limit as usize, rate, &units, &subs))
    }

    /// 部門別サマリーを取得（ランク別時間と効率スコア）
    pub fn get_department_summary(
        &self,
        filter: &RecordFilter,
    ) -> ApiResult<Vec<DepartmentSummary>> {
        let rows = self.records.aggregate_by_staff(filter)?;
        let aggregator = self.build_aggregator()?;
        Ok(aggregator.department_summary(&rows))
    }

    // ==========================================
    // 参照データ
    // ==========================================

    /// データの日付範囲を取得（データ無しなら両端 None）
    pub fn get_date_range(&self) -> ApiResult<DateRange> {
        let range = self.records.date_range()?;
        Ok(DateRange {
            min_date: range.map(|(min, _)| min),
            max_date: range.map(|(_, max)| max),
        })
    }

    /// 分類1の一覧を取得
    pub fn list_category1(&self) -> ApiResult<Vec<String>> {
        Ok(self.records.distinct_category1()?)
    }

    /// 担当者一覧を取得（分類1での絞り込み可能）
    pub fn list_staff(&self, category1: Option<&str>) -> ApiResult<Vec<StaffEntry>> {
        let names = self.records.distinct_staff(category1)?;
        Ok(names.into_iter().map(|name| StaffEntry { name }).collect())
    }

    /// カテゴリ配色情報を取得
    pub fn get_category_styles(&self) -> ApiResult<CategoryStyleMap> {
        let mut categories = self.categories.list_all()?;
        categories.sort_by_key(|c| c.sort_order);

        let names: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
        let colors = categories
            .iter()
            .map(|c| (c.name.clone(), c.color.clone()))
            .collect();
        let reduction_targets = categories
            .iter()
            .filter(|c| c.is_reduction_target)
            .map(|c| c.name.clone())
            .collect();
        let badge_styles = categories
            .iter()
            .map(|c| {
                (
                    c.name.clone(),
                    BadgeStyle {
                        bg: c.badge_bg_color.clone(),
                        text: c.badge_text_color.clone(),
                    },
                )
            })
            .collect();

        Ok(CategoryStyleMap {
            categories: names,
            colors,
            reduction_targets,
            badge_styles,
        })
    }

    /// フロントエンドの初期値設定を取得
    pub fn get_default_settings(&self) -> ApiResult<DefaultSettings> {
        Ok(DefaultSettings {
            default_hourly_rate: self.settings.default_hourly_rate()?,
            ranking_limit: self.settings.ranking_limit()?,
            default_category: self.settings.default_category()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::domain::WorkRecord;
    use crate::repository::AppSettingRepository;
    use chrono::Utc;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn test_api() -> DashboardApi {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        let categories = Arc::new(DisplayCategoryRepository::from_connection(conn.clone()));
        categories.seed_defaults().unwrap();
        let settings_repo = Arc::new(AppSettingRepository::from_connection(conn.clone()));
        let settings = Arc::new(SettingsManager::new(settings_repo));
        settings.seed_defaults().unwrap();

        DashboardApi::new(
            Arc::new(WorkRecordRepository::from_connection(conn.clone())),
            categories,
            Arc::new(CategoryKeywordRepository::from_connection(conn.clone())),
            Arc::new(UnitTypeRuleRepository::from_connection(conn.clone())),
            Arc::new(SubCategoryRuleRepository::from_connection(conn.clone())),
            Arc::new(TaskReductionTargetRepository::from_connection(conn.clone())),
            settings,
        )
    }

    fn record(date: &str, staff: &str, work_name: &str, hours: f64) -> WorkRecord {
        WorkRecord {
            record_id: uuid::Uuid::new_v4().to_string(),
            work_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            staff_name: staff.to_string(),
            department: Some("第一営業部".to_string()),
            category1: Some("通常".to_string()),
            category2: Some("社内".to_string()),
            work_name: Some(work_name.to_string()),
            unit_price: Some(2000.0),
            quantity: hours,
            total_amount: Some(hours * 2000.0),
            status: None,
            source_month: Some("4月請求".to_string()),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn seed_records(api: &DashboardApi) {
        let records = vec![
            record("2025-04-01", "山田", "定例会議", 10.0),
            record("2025-04-01", "山田", "顧客提案", 30.0),
            record("2025-04-02", "佐藤", "データ入力", 20.0),
        ];
        api.records.batch_insert(&records).unwrap();
    }

    #[test]
    fn test_summary_設定時給で見積もる() {
        let api = test_api();
        seed_records(&api);

        let summary = api.get_summary(&RecordFilter::default(), None).unwrap();
        assert_eq!(summary.total_hours, 60.0);
        // デフォルト時給 2000 円
        assert_eq!(summary.estimated_cost, 120_000.0);
        assert_eq!(summary.task_types, 3);
    }

    #[test]
    fn test_summary_時給ゼロは拒否() {
        let api = test_api();
        let result = api.get_summary(&RecordFilter::default(), Some(0.0));
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_category_breakdown_初期カテゴリで分類() {
        let api = test_api();
        seed_records(&api);

        let breakdown = api.get_category_breakdown(&RecordFilter::default()).unwrap();
        let hours: HashMap<&str, f64> = breakdown
            .iter()
            .map(|c| (c.category.as_str(), c.hours))
            .collect();
        // 「定例会議」→ MTG、「データ入力」→ 事務、「顧客提案」→ デフォルト（コア業務）
        assert_eq!(hours["MTG"], 10.0);
        assert_eq!(hours["事務"], 20.0);
        assert_eq!(hours["コア業務"], 30.0);
    }

    #[test]
    fn test_ranking_設定の件数上限() {
        let api = test_api();
        seed_records(&api);

        let ranking = api.get_ranking(&RecordFilter::default(), None, None).unwrap();
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].work_name, "顧客提案");

        let top1 = api.get_ranking(&RecordFilter::default(), Some(1), None).unwrap();
        assert_eq!(top1.len(), 1);
    }

    #[test]
    fn test_ranking_不正なlimitは拒否() {
        let api = test_api();
        let result = api.get_ranking(&RecordFilter::default(), Some(0), None);
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_date_range_データ無しは両端none() {
        let api = test_api();
        let range = api.get_date_range().unwrap();
        assert!(range.min_date.is_none());
        assert!(range.max_date.is_none());

        seed_records(&api);
        let range = api.get_date_range().unwrap();
        assert_eq!(range.min_date, NaiveDate::from_ymd_opt(2025, 4, 1));
        assert_eq!(range.max_date, NaiveDate::from_ymd_opt(2025, 4, 2));
    }

    #[test]
    fn test_staff_分類1で絞り込み() {
        let api = test_api();
        seed_records(&api);

        let all = api.list_staff(None).unwrap();
        assert_eq!(all.len(), 2);

        let filtered = api.list_staff(Some("通常")).unwrap();
        assert_eq!(filtered.len(), 2);
        let none = api.list_staff(Some("臨時")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_category_styles_初期データの形() {
        let api = test_api();
        let styles = api.get_category_styles().unwrap();

        assert_eq!(styles.categories[0], "コア業務");
        assert!(styles.reduction_targets.contains(&"その他".to_string()));
        assert!(styles.reduction_targets.contains(&"移動".to_string()));
        assert_eq!(styles.badge_styles["コア業務"].bg, "#dbeafe");
        assert_eq!(styles.colors["MTG"], "#8B5CF6");
    }

    #[test]
    fn test_default_settings_初期値() {
        let api = test_api();
        let defaults = api.get_default_settings().unwrap();
        assert_eq!(defaults.default_hourly_rate, 2000);
        assert_eq!(defaults.ranking_limit, 10);
        assert_eq!(defaults.default_category, "コア業務");
    }
}
