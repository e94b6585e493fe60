// ==========================================
// DashboardApi 集成テスト
// ==========================================
// テスト範囲:
// 1. 集計サマリー: get_summary
// 2. 内訳: get_category_breakdown, get_daily_breakdown
// 3. ランキング: get_ranking
// 4. 部門サマリー: get_department_summary
// 5. 参照データ: get_date_range, list_category1, list_staff,
//               get_category_styles, get_default_settings
// ==========================================

mod helpers;

use chrono::NaiveDate;
use helpers::api_test_helper::ApiTestEnv;
use helpers::test_data_builder::RecordBuilder;
use worktime_insight::api::ApiError;
use worktime_insight::repository::RecordFilter;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 5件の標準データを投入
///
/// 分類結果: 定例会議→MTG(A) / 電話対応→コア業務(S) / データ入力→事務(B)
///          / 社内移動→移動(C,削減) / 雑務処理→その他(C,削減)
fn seed_standard_records(env: &ApiTestEnv) {
    let records = vec![
        RecordBuilder::new("定例会議", 2.0)
            .staff("山田")
            .department("制作部")
            .date(date(2025, 4, 1))
            .total_amount(4000.0)
            .build(),
        RecordBuilder::new("電話対応", 1.5)
            .staff("佐藤")
            .department("営業部")
            .date(date(2025, 4, 2))
            .total_amount(3000.0)
            .build(),
        RecordBuilder::new("データ入力", 1.0)
            .staff("山田")
            .department("制作部")
            .date(date(2025, 4, 1))
            .total_amount(2000.0)
            .build(),
        RecordBuilder::new("社内移動", 0.5)
            .staff("佐藤")
            .department("営業部")
            .date(date(2025, 4, 3))
            .build(),
        RecordBuilder::new("雑務処理", 1.0)
            .staff("山田")
            .department("制作部")
            .date(date(2025, 4, 2))
            .build(),
    ];
    env.records.batch_insert(&records).expect("投入失敗");
}

// ==========================================
// 集計サマリー
// ==========================================

#[test]
fn test_get_summary_データなしはゼロ() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");

    let summary = env
        .dashboard_api
        .get_summary(&RecordFilter::default(), None)
        .expect("取得失敗");

    assert_eq!(summary.total_hours, 0.0);
    assert_eq!(summary.total_cost, 0.0);
    assert_eq!(summary.estimated_cost, 0.0);
    assert_eq!(summary.task_types, 0);
    assert_eq!(summary.reduction_ratio, 0.0);
}

#[test]
fn test_get_summary_全体集計() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let summary = env
        .dashboard_api
        .get_summary(&RecordFilter::default(), None)
        .expect("取得失敗");

    assert_eq!(summary.total_hours, 6.0);
    assert_eq!(summary.total_cost, 9000.0);
    // 既定時給 2000 円
    assert_eq!(summary.estimated_cost, 12000.0);
    assert_eq!(summary.task_types, 5);
    // 削減対象は 移動 0.5h + その他 1.0h = 1.5h / 6.0h = 25%
    assert_eq!(summary.reduction_ratio, 25.0);
}

#[test]
fn test_get_summary_時給指定で推定人件費が変わる() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let summary = env
        .dashboard_api
        .get_summary(&RecordFilter::default(), Some(3000.0))
        .expect("取得失敗");

    assert_eq!(summary.estimated_cost, 18000.0);
}

#[test]
fn test_get_summary_担当者で絞り込み() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let filter = RecordFilter {
        staff: Some("佐藤".to_string()),
        ..Default::default()
    };
    let summary = env.dashboard_api.get_summary(&filter, None).expect("取得失敗");

    // 電話対応 1.5h + 社内移動 0.5h
    assert_eq!(summary.total_hours, 2.0);
    assert_eq!(summary.task_types, 2);
}

#[test]
fn test_get_summary_期間で絞り込み() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let filter = RecordFilter {
        start: Some(date(2025, 4, 2)),
        end: Some(date(2025, 4, 3)),
        ..Default::default()
    };
    let summary = env.dashboard_api.get_summary(&filter, None).expect("取得失敗");

    // 4/2 の 2.5h + 4/3 の 0.5h
    assert_eq!(summary.total_hours, 3.0);
}

// ==========================================
// カテゴリ別内訳
// ==========================================

#[test]
fn test_get_category_breakdown_表示順とゼロ埋め() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let breakdown = env
        .dashboard_api
        .get_category_breakdown(&RecordFilter::default())
        .expect("取得失敗");

    let names: Vec<&str> = breakdown.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["コア業務", "MTG", "事務", "その他", "移動"]);

    let hours: Vec<f64> = breakdown.iter().map(|c| c.hours).collect();
    assert_eq!(hours, vec![1.5, 2.0, 1.0, 1.0, 0.5]);
}

#[test]
fn test_get_category_breakdown_データなしでも全カテゴリ() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");

    let breakdown = env
        .dashboard_api
        .get_category_breakdown(&RecordFilter::default())
        .expect("取得失敗");

    assert_eq!(breakdown.len(), 5);
    assert!(breakdown.iter().all(|c| c.hours == 0.0));
}

// ==========================================
// 日次内訳
// ==========================================

#[test]
fn test_get_daily_breakdown_日付順ラベルとカテゴリ別データ() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let chart = env
        .dashboard_api
        .get_daily_breakdown(&RecordFilter::default())
        .expect("取得失敗");

    assert_eq!(chart.labels, vec!["04-01", "04-02", "04-03"]);
    assert_eq!(chart.datasets.len(), 5);

    let mtg = chart
        .datasets
        .iter()
        .find(|d| d.label == "MTG")
        .expect("MTG データセットがない");
    assert_eq!(mtg.data, vec![2.0, 0.0, 0.0]);
    // カテゴリ色が引き継がれる
    assert_eq!(mtg.background_color, "#8B5CF6");

    let idou = chart
        .datasets
        .iter()
        .find(|d| d.label == "移動")
        .expect("移動 データセットがない");
    assert_eq!(idou.data, vec![0.0, 0.0, 0.5]);
}

// ==========================================
// ランキング
// ==========================================

#[test]
fn test_get_ranking_時間降順と比率() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let ranking = env
        .dashboard_api
        .get_ranking(&RecordFilter::default(), None, None)
        .expect("取得失敗");

    assert_eq!(ranking.len(), 5);
    assert_eq!(ranking[0].work_name, "定例会議");
    assert_eq!(ranking[0].category, "MTG");
    assert_eq!(ranking[0].hours, 2.0);
    // 2.0 / 6.0 = 33.3%
    assert_eq!(ranking[0].ratio, 33.3);
    assert_eq!(ranking[0].cost, 4000.0);
    assert_eq!(ranking[0].estimated_cost, 4000.0);
    assert!(!ranking[0].is_reduction_target);

    assert_eq!(ranking[1].work_name, "電話対応");

    // 削減対象カテゴリに落ちた業務はフラグが立つ
    let idou = ranking
        .iter()
        .find(|e| e.work_name == "社内移動")
        .expect("社内移動がない");
    assert!(idou.is_reduction_target);
}

#[test]
fn test_get_ranking_件数制限() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let ranking = env
        .dashboard_api
        .get_ranking(&RecordFilter::default(), Some(2), None)
        .expect("取得失敗");

    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].work_name, "定例会議");
    assert_eq!(ranking[1].work_name, "電話対応");
}

#[test]
fn test_get_ranking_ゼロ件指定はエラー() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");

    let result = env
        .dashboard_api
        .get_ranking(&RecordFilter::default(), Some(0), None);

    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

// ==========================================
// 部門サマリー
// ==========================================

#[test]
fn test_get_department_summary_ランク別時間と効率スコア() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let departments = env
        .dashboard_api
        .get_department_summary(&RecordFilter::default())
        .expect("取得失敗");

    assert_eq!(departments.len(), 2);

    // 合計時間の降順: 制作部 4.0h → 営業部 2.0h
    assert_eq!(departments[0].department, "制作部");
    assert_eq!(departments[0].total_hours, 4.0);
    assert_eq!(departments[0].rank_hours.a, 2.0);
    assert_eq!(departments[0].rank_hours.b, 1.0);
    assert_eq!(departments[0].rank_hours.c, 1.0);
    assert_eq!(departments[0].staff_count, 1);
    // (S+A) / 合計 = 2.0 / 4.0 = 50%
    assert_eq!(departments[0].efficiency_score, 50.0);

    assert_eq!(departments[1].department, "営業部");
    assert_eq!(departments[1].rank_hours.s, 1.5);
    assert_eq!(departments[1].rank_hours.c, 0.5);
    assert_eq!(departments[1].efficiency_score, 75.0);
}

// ==========================================
// 参照データ
// ==========================================

#[test]
fn test_get_date_range_データなしはnone() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");

    let range = env.dashboard_api.get_date_range().expect("取得失敗");

    assert_eq!(range.min_date, None);
    assert_eq!(range.max_date, None);
}

#[test]
fn test_get_date_range_最小最大() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);

    let range = env.dashboard_api.get_date_range().expect("取得失敗");

    assert_eq!(range.min_date, Some(date(2025, 4, 1)));
    assert_eq!(range.max_date, Some(date(2025, 4, 3)));
}

#[test]
fn test_list_category1_とlist_staff() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    seed_standard_records(&env);
    env.records
        .batch_insert(&[RecordBuilder::new("特別案件", 1.0)
            .staff("田中")
            .category1("特別")
            .build()])
        .expect("投入失敗");

    let category1 = env.dashboard_api.list_category1().expect("取得失敗");
    assert_eq!(category1, vec!["特別", "通常"]);

    let all_staff = env.dashboard_api.list_staff(None).expect("取得失敗");
    let names: Vec<&str> = all_staff.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["佐藤", "山田", "田中"]);

    // 分類1で絞り込むとその分類の担当者のみ
    let tokubetsu = env.dashboard_api.list_staff(Some("特別")).expect("取得失敗");
    let names: Vec<&str> = tokubetsu.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["田中"]);
}

#[test]
fn test_get_category_styles_初期カテゴリ() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");

    let styles = env.dashboard_api.get_category_styles().expect("取得失敗");

    assert_eq!(
        styles.categories,
        vec!["コア業務", "MTG", "事務", "その他", "移動"]
    );
    assert_eq!(styles.colors.get("コア業務").map(String::as_str), Some("#3B82F6"));
    assert_eq!(styles.reduction_targets, vec!["その他", "移動"]);
}

#[test]
fn test_get_default_settings_初期値() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");

    let defaults = env.dashboard_api.get_default_settings().expect("取得失敗");

    assert_eq!(defaults.default_hourly_rate, 2000);
    assert_eq!(defaults.ranking_limit, 10);
    assert_eq!(defaults.default_category, "コア業務");
}
