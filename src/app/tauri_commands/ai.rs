use crate::ai::provider::{ChatTurn, WorkItem};
use crate::api::ai_api::CategorizedItem;
use crate::app::state::AppState;
use crate::domain::types::{ReportKind, SuggestionStatus};

use super::common::{build_filter, map_api_error};

// ==========================================
// AI 関連コマンド
// ==========================================

/// 業務アイテムを AI 分類（プレビューのみ、DB は変更しない）
///
/// # 引数
/// - items: 分類対象の JSON 配列（例: [{"work_name": "...", "category1": "...", "hours": 1.5}]）
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_categorize_preview(
    state: tauri::State<'_, AppState>,
    items: String,
) -> Result<String, String> {
    let items: Vec<WorkItem> = serde_json::from_str(&items)
        .map_err(|e| format!("分類対象の解析に失敗しました: {}", e))?;

    let result = state
        .ai_api
        .categorize_preview(&items)
        .await
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 分類プレビューの結果を提案キューへ保存
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_save_suggestions(
    state: tauri::State<'_, AppState>,
    items: String,
) -> Result<String, String> {
    let items: Vec<CategorizedItem> = serde_json::from_str(&items)
        .map_err(|e| format!("提案の解析に失敗しました: {}", e))?;

    let saved = state.ai_api.save_suggestions(&items).map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "saved": saved }))
        .map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 提案キューの一覧（ステータス絞り込み可）
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_list_suggestions(
    state: tauri::State<'_, AppState>,
    status: Option<String>,
) -> Result<String, String> {
    let status = match status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            s.parse::<SuggestionStatus>()
                .map_err(|_| format!("ステータスが不正です（pending / accepted / rejected）: {}", s))?,
        ),
        None => None,
    };

    let result = state.ai_api.list_suggestions(status).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 提案をレビュー（承認 / 却下）
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_review_suggestion(
    state: tauri::State<'_, AppState>,
    suggestion_id: String,
    status: String,
) -> Result<String, String> {
    let status = status
        .parse::<SuggestionStatus>()
        .map_err(|_| format!("ステータスが不正です（accepted / rejected）: {}", status))?;

    state
        .ai_api
        .review_suggestion(&suggestion_id, status)
        .map_err(map_api_error)?;

    Ok("{}".to_string())
}

/// 類似業務名をグルーピング（閾値超過時のみ AI を併用）
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_group_tasks(
    state: tauri::State<'_, AppState>,
    work_names: Vec<String>,
    use_ai: Option<bool>,
) -> Result<String, String> {
    let result = state
        .ai_api
        .group_tasks(&work_names, use_ai.unwrap_or(true))
        .await
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 分類1×分類2×業務名のユニークな組み合わせ一覧
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_unique_combinations(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.ai_api.unique_combinations().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// AI インサイトを取得（1時間キャッシュ）
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_get_insights(
    state: tauri::State<'_, AppState>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<String, String> {
    let filter = build_filter(category1, staff, start_date, end_date)?;

    let result = state.ai_api.get_insights(&filter).await.map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 期限切れのインサイトキャッシュを削除
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_purge_insight_cache(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let purged = state.ai_api.purge_expired_insights().map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "purged": purged }))
        .map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// データについて AI に質問する
///
/// # 引数
/// - history: 過去の往復の JSON 配列（例: [{"role": "user", "content": "..."}]）
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_chat(
    state: tauri::State<'_, AppState>,
    question: String,
    history: Option<String>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<String, String> {
    let history: Vec<ChatTurn> = match history.filter(|s| !s.trim().is_empty()) {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| format!("会話履歴の解析に失敗しました: {}", e))?,
        None => Vec::new(),
    };
    let filter = build_filter(category1, staff, start_date, end_date)?;

    let result = state
        .ai_api
        .chat(&question, &history, &filter)
        .await
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 週次 / 月次レポートを AI 生成
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_generate_report(
    state: tauri::State<'_, AppState>,
    report_type: Option<String>,
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<String, String> {
    let kind = match report_type.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse::<ReportKind>()
            .map_err(|_| format!("report_type が不正です（weekly / monthly）: {}", s))?,
        None => ReportKind::Weekly,
    };
    let filter = build_filter(category1, staff, start_date, end_date)?;

    let result = state
        .ai_api
        .generate_report(kind, &filter)
        .await
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// AI 利用状況のサマリー（件数・トークン・推定コスト）
#[tauri::command(rename_all = "snake_case")]
pub async fn ai_usage_summary(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.ai_api.usage_summary().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}
