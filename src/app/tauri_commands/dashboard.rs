use crate::app::state::AppState;

use super::common::{build_filter, map_api_error};

// ==========================================
// ダッシュボード関連コマンド
// ==========================================

/// 集計サマリーを取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_work_summary(
    state: tauri::State<'_, AppState>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    hourly_rate: Option<f64>,
) -> Result<String, String> {
    let filter = build_filter(category1, staff, start_date, end_date)?;

    let result = state
        .dashboard_api
        .get_summary(&filter, hourly_rate)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// カテゴリ別内訳を取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_category_breakdown(
    state: tauri::State<'_, AppState>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<String, String> {
    let filter = build_filter(category1, staff, start_date, end_date)?;

    let result = state
        .dashboard_api
        .get_category_breakdown(&filter)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 日次カテゴリ別内訳を取得（積み上げチャート用）
#[tauri::command(rename_all = "snake_case")]
pub async fn get_daily_breakdown(
    state: tauri::State<'_, AppState>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<String, String> {
    let filter = build_filter(category1, staff, start_date, end_date)?;

    let result = state
        .dashboard_api
        .get_daily_breakdown(&filter)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 業務別時間消費ランキングを取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_work_ranking(
    state: tauri::State<'_, AppState>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    limit: Option<i64>,
    hourly_rate: Option<f64>,
) -> Result<String, String> {
    let filter = build_filter(category1, staff, start_date, end_date)?;

    let result = state
        .dashboard_api
        .get_ranking(&filter, limit, hourly_rate)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 部門別サマリーを取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_department_summary(
    state: tauri::State<'_, AppState>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<String, String> {
    let filter = build_filter(category1, staff, start_date, end_date)?;

    let result = state
        .dashboard_api
        .get_department_summary(&filter)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 記録が存在する日付範囲を取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_date_range(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.dashboard_api.get_date_range().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 分類1の候補一覧を取得（フィルタ用）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_category1(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.dashboard_api.list_category1().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 担当者の候補一覧を取得（フィルタ用、分類1で絞り込み可）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_staff(
    state: tauri::State<'_, AppState>,
    category1: Option<String>,
) -> Result<String, String> {
    let result = state
        .dashboard_api
        .list_staff(category1.as_deref().filter(|s| !s.is_empty()))
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// カテゴリの表示スタイル一式を取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_category_styles(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.dashboard_api.get_category_styles().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 既定の表示設定（時給・ランキング件数など）を取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_default_settings(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.dashboard_api.get_default_settings().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}
