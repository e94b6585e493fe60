// ==========================================
// 業務時間分析ダッシュボード - 分析 API
// ==========================================
// 責務: 推移 / 期間比較 / 稼働シミュレーションの提供
// 構成: API 層 → エンジン層 (Aggregator / CapacitySimulator)
// ==========================================

use std::sync::Arc;

use crate::api::dashboard_api::DashboardApi;
use crate::api::error::{ApiError, ApiResult};
use crate::config::SettingsManager;
use crate::engine::aggregator::{ChartBreakdown, ComparisonReport, TrendInterval};
use crate::engine::simulator::{RankReductions, SimulationResult};
use crate::engine::CapacitySimulator;
use crate::repository::{RecordFilter, WorkRecordRepository};

// ==========================================
// AnalyticsApi
// ==========================================

/// 分析 API
///
/// 集計エンジンの構築はダッシュボード API に委譲する。
pub struct AnalyticsApi {
    dashboard: Arc<DashboardApi>,
    records: Arc<WorkRecordRepository>,
    settings: Arc<SettingsManager>,
}

impl AnalyticsApi {
    pub fn new(
        dashboard: Arc<DashboardApi>,
        records: Arc<WorkRecordRepository>,
        settings: Arc<SettingsManager>,
    ) -> Self {
        Self {
            dashboard,
            records,
            settings,
        }
    }

    /// カテゴリ別時間の推移を取得
    ///
    /// # 引数
    /// - filter: 絞り込み条件
    /// - interval: 集計間隔（日別 / 月別）
    pub fn get_trend(
        &self,
        filter: &RecordFilter,
        interval: TrendInterval,
    ) -> ApiResult<ChartBreakdown> {
        let rows = self.records.aggregate_by_day(filter)?;
        let aggregator = self.dashboard.build_aggregator()?;
        Ok(aggregator.trend(&rows, interval))
    }

    /// 2期間の比較を取得
    ///
    /// # 引数
    /// - current: 当期間の絞り込み条件
    /// - previous: 前期間の絞り込み条件
    pub fn get_comparison(
        &self,
        current: &RecordFilter,
        previous: &RecordFilter,
    ) -> ApiResult<ComparisonReport> {
        let current_rows = self.records.aggregate_by_work(current)?;
        let previous_rows = self.records.aggregate_by_work(previous)?;
        let aggregator = self.dashboard.build_aggregator()?;
        Ok(aggregator.comparison(&current_rows, &previous_rows))
    }

    /// 稼働シミュレーションを実行
    ///
    /// ランク別の削減率を適用し、創出時間・創出コスト・人日換算を算出する。
    ///
    /// # 引数
    /// - filter: 対象データの絞り込み条件
    /// - reductions: ランク別の削減率（%）
    /// - hourly_rate: 時給（未指定なら設定値）
    pub fn simulate(
        &self,
        filter: &RecordFilter,
        reductions: &RankReductions,
        hourly_rate: Option<f64>,
    ) -> ApiResult<SimulationResult> {
        let rate = match hourly_rate {
            Some(rate) if rate > 0.0 => rate,
            Some(_) => {
                return Err(ApiError::InvalidInput("時給は正の値で指定してください".to_string()))
            }
            None => self.settings.default_hourly_rate()? as f64,
        };

        let rows = self.records.aggregate_by_work(filter)?;
        let aggregator = self.dashboard.build_aggregator()?;
        let hours = aggregator.rank_hours(&rows);
        Ok(CapacitySimulator::new(hours, rate).simulate(reductions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::domain::WorkRecord;
    use crate::repository::{
        AppSettingRepository, CategoryKeywordRepository, DisplayCategoryRepository,
        SubCategoryRuleRepository, TaskReductionTargetRepository, UnitTypeRuleRepository,
    };
    use chrono::{NaiveDate, Utc};
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn test_api() -> AnalyticsApi {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        let categories = Arc::new(DisplayCategoryRepository::from_connection(conn.clone()));
        categories.seed_defaults().unwrap();
        let settings_repo = Arc::new(AppSettingRepository::from_connection(conn.clone()));
        let settings = Arc::new(SettingsManager::new(settings_repo));
        settings.seed_defaults().unwrap();
        let records = Arc::new(WorkRecordRepository::from_connection(conn.clone()));

        let dashboard = Arc::new(DashboardApi::new(
            records.clone(),
            categories,
            Arc::new(CategoryKeywordRepository::from_connection(conn.clone())),
            Arc::new(UnitTypeRuleRepository::from_connection(conn.clone())),
            Arc::new(SubCategoryRuleRepository::from_connection(conn.clone())),
            Arc::new(TaskReductionTargetRepository::from_connection(conn.clone())),
            settings.clone(),
        ));

        AnalyticsApi::new(dashboard, records, settings)
    }

    fn record(date: &str, work_name: &str, hours: f64) -> WorkRecord {
        WorkRecord {
            record_id: uuid::Uuid::new_v4().to_string(),
            work_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            staff_name: "山田".to_string(),
            department: None,
            category1: Some("通常".to_string()),
            category2: None,
            work_name: Some(work_name.to_string()),
            unit_price: None,
            quantity: hours,
            total_amount: None,
            status: None,
            source_month: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_trend_月別集計() {
        let api = test_api();
        api.records
            .batch_insert(&[
                record("2025-04-10", "定例会議", 8.0),
                record("2025-05-12", "定例会議", 4.0),
            ])
            .unwrap();

        let chart = api
            .get_trend(&RecordFilter::default(), TrendInterval::Monthly)
            .unwrap();
        assert_eq!(chart.labels, vec!["2025-04", "2025-05"]);

        let mtg = chart.datasets.iter().find(|d| d.label == "MTG").unwrap();
        assert_eq!(mtg.data, vec![8.0, 4.0]);
    }

    #[test]
    fn test_comparison_期間差分() {
        let api = test_api();
        api.records
            .batch_insert(&[
                record("2025-04-10", "定例会議", 30.0),
                record("2025-05-10", "定例会議", 45.0),
            ])
            .unwrap();

        let april = RecordFilter {
            start: NaiveDate::from_ymd_opt(2025, 4, 1),
            end: NaiveDate::from_ymd_opt(2025, 4, 30),
            ..Default::default()
        };
        let may = RecordFilter {
            start: NaiveDate::from_ymd_opt(2025, 5, 1),
            end: NaiveDate::from_ymd_opt(2025, 5, 31),
            ..Default::default()
        };

        let report = api.get_comparison(&may, &april).unwrap();
        assert_eq!(report.current_hours, 45.0);
        assert_eq!(report.previous_hours, 30.0);
        assert_eq!(report.diff_hours, 15.0);
        assert_eq!(report.diff_ratio, 50.0);
    }

    #[test]
    fn test_simulate_ランク別削減() {
        let api = test_api();
        // 定例会議 → MTG (A ランク)、顧客提案 → コア業務 (S ランク)
        api.records
            .batch_insert(&[
                record("2025-04-10", "定例会議", 40.0),
                record("2025-04-11", "顧客提案", 60.0),
            ])
            .unwrap();

        let reductions = RankReductions {
            a: 50.0,
            ..Default::default()
        };
        let result = api
            .simulate(&RecordFilter::default(), &reductions, None)
            .unwrap();

        assert_eq!(result.total_hours, 100.0);
        assert_eq!(result.freed_hours, 20.0);
        // デフォルト時給 2000 円
        assert_eq!(result.freed_cost, 40_000.0);
    }

    #[test]
    fn test_simulate_負の時給は拒否() {
        let api = test_api();
        let result = api.simulate(
            &RecordFilter::default(),
            &RankReductions::default(),
            Some(-1.0),
        );
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }
}
