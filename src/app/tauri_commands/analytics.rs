use crate::app::state::AppState;
use crate::engine::aggregator::TrendInterval;
use crate::engine::simulator::RankReductions;

use super::common::{build_filter, map_api_error};

// ==========================================
// 分析・シミュレーション関連コマンド
// ==========================================

/// カテゴリ別の時間推移を取得（日次 / 月次）
#[tauri::command(rename_all = "snake_case")]
pub async fn get_trend(
    state: tauri::State<'_, AppState>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    interval: Option<String>,
) -> Result<String, String> {
    let filter = build_filter(category1, staff, start_date, end_date)?;
    let interval = match interval.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse::<TrendInterval>()
            .map_err(|_| format!("interval が不正です（daily / monthly）: {}", s))?,
        None => TrendInterval::Daily,
    };

    let result = state
        .analytics_api
        .get_trend(&filter, interval)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 2期間の比較レポートを取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_period_comparison(
    state: tauri::State<'_, AppState>,
    current_start: String,
    current_end: String,
    previous_start: String,
    previous_end: String,
    category1: Option<String>,
    staff: Option<String>,
) -> Result<String, String> {
    let current = build_filter(
        category1.clone(),
        staff.clone(),
        Some(current_start),
        Some(current_end),
    )?;
    let previous = build_filter(category1, staff, Some(previous_start), Some(previous_end))?;

    let result = state
        .analytics_api
        .get_comparison(&current, &previous)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// ランク別削減シミュレーションを実行
///
/// # 引数
/// - reductions: ランク別削減率（%）の JSON（例: {"s": 0, "a": 10, "b": 30, "c": 50}）
#[tauri::command(rename_all = "snake_case")]
pub async fn simulate_capacity(
    state: tauri::State<'_, AppState>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    reductions: String,
    hourly_rate: Option<f64>,
) -> Result<String, String> {
    let filter = build_filter(category1, staff, start_date, end_date)?;
    let reductions: RankReductions = serde_json::from_str(&reductions)
        .map_err(|e| format!("削減率の解析に失敗しました: {}", e))?;

    let result = state
        .analytics_api
        .simulate(&filter, &reductions, hourly_rate)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}
