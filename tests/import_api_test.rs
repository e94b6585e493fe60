// ==========================================
// ImportApi 集成テスト
// ==========================================
// テスト範囲:
// 1. プレビュー: preview（DB 非変更）
// 2. 取込確定: confirm_import（全置換・有効行ゼロ時の保護）
// 3. 全削除と件数: clear_all, record_count
// 4. 取込結果がダッシュボード集計へ反映されること
// ==========================================

mod helpers;

use std::io::Write;

use helpers::api_test_helper::ApiTestEnv;
use tempfile::NamedTempFile;
use worktime_insight::api::ApiError;
use worktime_insight::repository::RecordFilter;

const HEADER: &str = "日付,担当者,部門,分類1,分類2,業務名,単価,数量,金額,ステータス";

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("一時ファイルの作成に失敗");
    for line in lines {
        writeln!(file, "{}", line).expect("書き込み失敗");
    }
    file
}

#[test]
fn test_preview_dbを変更しない() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    let file = csv_file(&[
        HEADER,
        "2025-04-01,山田,制作部,通常,制作,ノート入力,2000,1.5,3000,確定",
        "不正な日付,佐藤,営業部,通常,対応,電話対応,2000,0.5,1000,確定",
    ]);

    let previews = env.import_api.preview(file.path()).expect("プレビュー失敗");

    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].row_count, 1);
    assert_eq!(previews[0].errors.len(), 1);
    assert!(previews[0].errors[0].message.contains("日付"));

    assert_eq!(env.import_api.record_count().expect("件数取得失敗"), 0);
}

#[test]
fn test_confirm_import_取込と集計反映() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    let file = csv_file(&[
        HEADER,
        "2025-04-01,山田,制作部,通常,制作,定例会議,2000,2.0,4000,確定",
        "2025-04-02,佐藤,営業部,通常,対応,電話対応,2000,1.5,3000,確定",
    ]);

    let batch = env
        .import_api
        .confirm_import(file.path(), "4月請求.csv")
        .expect("取込失敗");

    assert_eq!(batch.file_name, "4月請求.csv");
    assert_eq!(batch.inserted_rows, 2);
    assert_eq!(batch.skipped_rows, 0);
    assert_eq!(batch.total_rows, 2);

    // 取り込んだデータがそのまま集計に乗る
    let summary = env
        .dashboard_api
        .get_summary(&RecordFilter::default(), None)
        .expect("取得失敗");
    assert_eq!(summary.total_hours, 3.5);
    assert_eq!(summary.total_cost, 7000.0);

    let ranking = env
        .dashboard_api
        .get_ranking(&RecordFilter::default(), None, None)
        .expect("取得失敗");
    assert_eq!(ranking[0].work_name, "定例会議");
    assert_eq!(ranking[0].category, "MTG");
}

#[test]
fn test_confirm_import_再取込で全置換() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    let first = csv_file(&[
        HEADER,
        "2025-04-01,山田,制作部,通常,制作,定例会議,2000,2.0,4000,確定",
        "2025-04-02,佐藤,営業部,通常,対応,電話対応,2000,1.5,3000,確定",
    ]);
    env.import_api
        .confirm_import(first.path(), "4月請求.csv")
        .expect("取込失敗");

    let second = csv_file(&[
        HEADER,
        "2025-05-01,山田,制作部,通常,制作,データ入力,2000,1.0,2000,確定",
    ]);
    let batch = env
        .import_api
        .confirm_import(second.path(), "5月請求.csv")
        .expect("取込失敗");

    assert_eq!(batch.inserted_rows, 1);
    assert_eq!(env.import_api.record_count().expect("件数取得失敗"), 1);

    // 前回分は残らない
    let range = env.dashboard_api.get_date_range().expect("取得失敗");
    assert_eq!(
        range.min_date,
        chrono::NaiveDate::from_ymd_opt(2025, 5, 1)
    );
    assert_eq!(range.min_date, range.max_date);
}

#[test]
fn test_confirm_import_有効行ゼロは既存データを守る() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    let good = csv_file(&[
        HEADER,
        "2025-04-01,山田,制作部,通常,制作,定例会議,2000,2.0,4000,確定",
    ]);
    env.import_api
        .confirm_import(good.path(), "4月請求.csv")
        .expect("取込失敗");

    let empty = csv_file(&[HEADER]);
    let result = env.import_api.confirm_import(empty.path(), "空.csv");

    assert!(matches!(result, Err(ApiError::Import(_))));
    assert_eq!(env.import_api.record_count().expect("件数取得失敗"), 1);
}

#[test]
fn test_confirm_import_ファイル名未指定はエラー() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    let file = csv_file(&[
        HEADER,
        "2025-04-01,山田,制作部,通常,制作,定例会議,2000,2.0,4000,確定",
    ]);

    let result = env.import_api.confirm_import(file.path(), "  ");

    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[test]
fn test_存在しないファイルはエラー() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");

    let result = env.import_api.preview("/no/such/file.csv");

    assert!(matches!(result, Err(ApiError::Import(_))));
}

#[test]
fn test_clear_all_全削除() {
    let env = ApiTestEnv::new().expect("テスト環境の作成に失敗");
    let file = csv_file(&[
        HEADER,
        "2025-04-01,山田,制作部,通常,制作,定例会議,2000,2.0,4000,確定",
        "2025-04-02,佐藤,営業部,通常,対応,電話対応,2000,1.5,3000,確定",
    ]);
    env.import_api
        .confirm_import(file.path(), "4月請求.csv")
        .expect("取込失敗");

    let deleted = env.import_api.clear_all().expect("削除失敗");

    assert_eq!(deleted, 2);
    assert_eq!(env.import_api.record_count().expect("件数取得失敗"), 0);

    let summary = env
        .dashboard_api
        .get_summary(&RecordFilter::default(), None)
        .expect("取得失敗");
    assert_eq!(summary.total_hours, 0.0);
}
