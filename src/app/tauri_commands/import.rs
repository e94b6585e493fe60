use std::path::Path;

use crate::app::state::AppState;

use super::common::map_api_error;

// ==========================================
// 取込関連コマンド
// ==========================================

/// ファイルを解析して取込プレビューを返す（DB は変更しない）
#[tauri::command(rename_all = "snake_case")]
pub async fn preview_import(
    state: tauri::State<'_, AppState>,
    file_path: String,
) -> Result<String, String> {
    tracing::info!("[preview_import] file_path: {}", file_path);

    let result = state.import_api.preview(&file_path).map_err(|e| {
        tracing::error!("[preview_import] プレビュー失敗: {:?}", e);
        map_api_error(e)
    })?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 取込を確定する（既存データを全置換）
#[tauri::command(rename_all = "snake_case")]
pub async fn confirm_import(
    state: tauri::State<'_, AppState>,
    file_path: String,
    file_name: Option<String>,
) -> Result<String, String> {
    tracing::info!("[confirm_import] file_path: {}", file_path);

    // 表示用ファイル名が未指定ならパスの末尾を使う
    let file_name = match file_name.filter(|s| !s.trim().is_empty()) {
        Some(name) => name,
        None => Path::new(&file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.clone()),
    };

    let result = state
        .import_api
        .confirm_import(&file_path, &file_name)
        .map_err(|e| {
            tracing::error!("[confirm_import] 取込失敗: {:?}", e);
            map_api_error(e)
        })?;

    tracing::info!(
        "[confirm_import] 取込完了: {}件 (batch={})",
        result.inserted_rows,
        result.batch_id
    );

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 業務記録を全件削除
#[tauri::command(rename_all = "snake_case")]
pub async fn clear_work_records(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let deleted = state.import_api.clear_all().map_err(map_api_error)?;

    tracing::info!("[clear_work_records] {}件削除", deleted);

    serde_json::to_string(&serde_json::json!({ "deleted": deleted }))
        .map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 現在の業務記録件数を取得
#[tauri::command(rename_all = "snake_case")]
pub async fn count_work_records(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let count = state.import_api.record_count().map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "count": count }))
        .map_err(|e| format!("シリアライズに失敗しました: {}", e))
}
