use std::collections::BTreeMap;

use crate::api::admin_api::{
    CategoryUpdate, KeywordUpdate, MonthlyGoalInput, MonthlyItemInput, NewCategory, NewKeyword,
    NewReductionGoal, NewSubCategoryRule, NewUnitRule, ReductionGoalUpdate, SubCategoryRuleUpdate,
    SuggestionApplication, UnitRuleUpdate,
};
use crate::app::state::AppState;

use super::common::map_api_error;

// ==========================================
// 管理画面関連コマンド
// ==========================================

/// 管理画面の概況（件数と既定設定）を取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_admin_overview(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.admin_api.get_overview().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

// ==========================================
// 表示カテゴリ
// ==========================================

/// 表示カテゴリ一覧（キーワード件数付き）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_display_categories(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.admin_api.list_categories().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 表示カテゴリを作成
#[tauri::command(rename_all = "snake_case")]
pub async fn create_display_category(
    state: tauri::State<'_, AppState>,
    input: String,
) -> Result<String, String> {
    let input: NewCategory = serde_json::from_str(&input)
        .map_err(|e| format!("カテゴリ入力の解析に失敗しました: {}", e))?;

    let result = state.admin_api.create_category(&input).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 表示カテゴリを更新
#[tauri::command(rename_all = "snake_case")]
pub async fn update_display_category(
    state: tauri::State<'_, AppState>,
    category_id: String,
    update: String,
) -> Result<String, String> {
    let update: CategoryUpdate = serde_json::from_str(&update)
        .map_err(|e| format!("カテゴリ入力の解析に失敗しました: {}", e))?;

    let result = state
        .admin_api
        .update_category(&category_id, &update)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 表示カテゴリを削除（キーワードが残っていると拒否）
#[tauri::command(rename_all = "snake_case")]
pub async fn delete_display_category(
    state: tauri::State<'_, AppState>,
    category_id: String,
) -> Result<String, String> {
    state
        .admin_api
        .delete_category(&category_id)
        .map_err(map_api_error)?;

    Ok("{}".to_string())
}

/// 表示カテゴリの並び順を一括更新
#[tauri::command(rename_all = "snake_case")]
pub async fn reorder_display_categories(
    state: tauri::State<'_, AppState>,
    ordered_ids: Vec<String>,
) -> Result<String, String> {
    state
        .admin_api
        .reorder_categories(&ordered_ids)
        .map_err(map_api_error)?;

    Ok("{}".to_string())
}

// ==========================================
// 分類キーワード
// ==========================================

/// キーワード一覧（カテゴリ絞り込み可）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_category_keywords(
    state: tauri::State<'_, AppState>,
    category_id: Option<String>,
    active_only: Option<bool>,
) -> Result<String, String> {
    let result = state
        .admin_api
        .list_keywords(
            category_id.as_deref().filter(|s| !s.is_empty()),
            active_only.unwrap_or(false),
        )
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// キーワードを作成
#[tauri::command(rename_all = "snake_case")]
pub async fn create_category_keyword(
    state: tauri::State<'_, AppState>,
    input: String,
) -> Result<String, String> {
    let input: NewKeyword = serde_json::from_str(&input)
        .map_err(|e| format!("キーワード入力の解析に失敗しました: {}", e))?;

    let result = state.admin_api.create_keyword(&input).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// キーワードを更新
#[tauri::command(rename_all = "snake_case")]
pub async fn update_category_keyword(
    state: tauri::State<'_, AppState>,
    keyword_id: String,
    update: String,
) -> Result<String, String> {
    let update: KeywordUpdate = serde_json::from_str(&update)
        .map_err(|e| format!("キーワード入力の解析に失敗しました: {}", e))?;

    let result = state
        .admin_api
        .update_keyword(&keyword_id, &update)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// キーワードを削除
#[tauri::command(rename_all = "snake_case")]
pub async fn delete_category_keyword(
    state: tauri::State<'_, AppState>,
    keyword_id: String,
) -> Result<String, String> {
    state
        .admin_api
        .delete_keyword(&keyword_id)
        .map_err(map_api_error)?;

    Ok("{}".to_string())
}

/// 未分類業務からキーワード候補を提案
#[tauri::command(rename_all = "snake_case")]
pub async fn suggest_category_keywords(
    state: tauri::State<'_, AppState>,
) -> Result<String, String> {
    let result = state.admin_api.suggest_keywords().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 提案されたキーワードを一括登録
#[tauri::command(rename_all = "snake_case")]
pub async fn apply_keyword_suggestions(
    state: tauri::State<'_, AppState>,
    applications: String,
) -> Result<String, String> {
    let applications: Vec<SuggestionApplication> = serde_json::from_str(&applications)
        .map_err(|e| format!("提案リストの解析に失敗しました: {}", e))?;

    let result = state
        .admin_api
        .apply_suggestions(&applications)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

// ==========================================
// アプリ設定
// ==========================================

/// アプリ設定の一覧を取得
#[tauri::command(rename_all = "snake_case")]
pub async fn get_app_settings(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.admin_api.get_settings().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// アプリ設定を一括更新
///
/// # 引数
/// - settings: キーと値の JSON オブジェクト（例: {"default_hourly_rate": "2500"}）
#[tauri::command(rename_all = "snake_case")]
pub async fn update_app_settings(
    state: tauri::State<'_, AppState>,
    settings: String,
) -> Result<String, String> {
    let entries: BTreeMap<String, String> = serde_json::from_str(&settings)
        .map_err(|e| format!("設定の解析に失敗しました: {}", e))?;
    let entries: Vec<(String, String)> = entries.into_iter().collect();

    let updated = state
        .admin_api
        .update_settings(&entries)
        .map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "updated": updated }))
        .map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

// ==========================================
// 単位種別ルール
// ==========================================

/// 単位種別ルール一覧
#[tauri::command(rename_all = "snake_case")]
pub async fn list_unit_rules(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.admin_api.list_unit_rules().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 単位種別ルールを作成
#[tauri::command(rename_all = "snake_case")]
pub async fn create_unit_rule(
    state: tauri::State<'_, AppState>,
    input: String,
) -> Result<String, String> {
    let input: NewUnitRule = serde_json::from_str(&input)
        .map_err(|e| format!("ルール入力の解析に失敗しました: {}", e))?;

    let result = state.admin_api.create_unit_rule(&input).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 単位種別ルールを更新
#[tauri::command(rename_all = "snake_case")]
pub async fn update_unit_rule(
    state: tauri::State<'_, AppState>,
    rule_id: String,
    update: String,
) -> Result<String, String> {
    let update: UnitRuleUpdate = serde_json::from_str(&update)
        .map_err(|e| format!("ルール入力の解析に失敗しました: {}", e))?;

    let result = state
        .admin_api
        .update_unit_rule(&rule_id, &update)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 単位種別ルールを削除
#[tauri::command(rename_all = "snake_case")]
pub async fn delete_unit_rule(
    state: tauri::State<'_, AppState>,
    rule_id: String,
) -> Result<String, String> {
    state.admin_api.delete_unit_rule(&rule_id).map_err(map_api_error)?;

    Ok("{}".to_string())
}

/// 既定の単位種別ルールを投入
#[tauri::command(rename_all = "snake_case")]
pub async fn seed_unit_rules(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let seeded = state.admin_api.seed_unit_rules().map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "seeded": seeded }))
        .map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 業務名の単位判定をテスト
#[tauri::command(rename_all = "snake_case")]
pub async fn test_unit_rule(
    state: tauri::State<'_, AppState>,
    work_name: String,
) -> Result<String, String> {
    let result = state.admin_api.test_unit_rule(&work_name).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

// ==========================================
// サブカテゴリルール
// ==========================================

/// サブカテゴリルール一覧
#[tauri::command(rename_all = "snake_case")]
pub async fn list_sub_category_rules(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.admin_api.list_sub_category_rules().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// サブカテゴリルールを作成
#[tauri::command(rename_all = "snake_case")]
pub async fn create_sub_category_rule(
    state: tauri::State<'_, AppState>,
    input: String,
) -> Result<String, String> {
    let input: NewSubCategoryRule = serde_json::from_str(&input)
        .map_err(|e| format!("ルール入力の解析に失敗しました: {}", e))?;

    let result = state
        .admin_api
        .create_sub_category_rule(&input)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// サブカテゴリルールを更新
#[tauri::command(rename_all = "snake_case")]
pub async fn update_sub_category_rule(
    state: tauri::State<'_, AppState>,
    rule_id: String,
    update: String,
) -> Result<String, String> {
    let update: SubCategoryRuleUpdate = serde_json::from_str(&update)
        .map_err(|e| format!("ルール入力の解析に失敗しました: {}", e))?;

    let result = state
        .admin_api
        .update_sub_category_rule(&rule_id, &update)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// サブカテゴリルールを削除
#[tauri::command(rename_all = "snake_case")]
pub async fn delete_sub_category_rule(
    state: tauri::State<'_, AppState>,
    rule_id: String,
) -> Result<String, String> {
    state
        .admin_api
        .delete_sub_category_rule(&rule_id)
        .map_err(map_api_error)?;

    Ok("{}".to_string())
}

/// 既定のサブカテゴリルールを投入
#[tauri::command(rename_all = "snake_case")]
pub async fn seed_sub_category_rules(
    state: tauri::State<'_, AppState>,
) -> Result<String, String> {
    let seeded = state.admin_api.seed_sub_category_rules().map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "seeded": seeded }))
        .map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 業務名のサブカテゴリ判定をテスト
#[tauri::command(rename_all = "snake_case")]
pub async fn test_sub_category(
    state: tauri::State<'_, AppState>,
    work_name: String,
) -> Result<String, String> {
    let result = state.admin_api.test_sub_category(&work_name).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

// ==========================================
// 削減目標
// ==========================================

/// 削減目標一覧（カテゴリ名付き）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_reduction_goals(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.admin_api.list_reduction_goals().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 削減目標を作成
#[tauri::command(rename_all = "snake_case")]
pub async fn create_reduction_goal(
    state: tauri::State<'_, AppState>,
    input: String,
) -> Result<String, String> {
    let input: NewReductionGoal = serde_json::from_str(&input)
        .map_err(|e| format!("目標入力の解析に失敗しました: {}", e))?;

    let result = state
        .admin_api
        .create_reduction_goal(&input)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 削減目標を更新
#[tauri::command(rename_all = "snake_case")]
pub async fn update_reduction_goal(
    state: tauri::State<'_, AppState>,
    goal_id: String,
    update: String,
) -> Result<String, String> {
    let update: ReductionGoalUpdate = serde_json::from_str(&update)
        .map_err(|e| format!("目標入力の解析に失敗しました: {}", e))?;

    let result = state
        .admin_api
        .update_reduction_goal(&goal_id, &update)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 削減目標を削除
#[tauri::command(rename_all = "snake_case")]
pub async fn delete_reduction_goal(
    state: tauri::State<'_, AppState>,
    goal_id: String,
) -> Result<String, String> {
    state
        .admin_api
        .delete_reduction_goal(&goal_id)
        .map_err(map_api_error)?;

    Ok("{}".to_string())
}

// ==========================================
// 月次目標
// ==========================================

/// 月次重点目標を登録・更新（部門×年月×担当×番号で upsert）
#[tauri::command(rename_all = "snake_case")]
pub async fn upsert_monthly_goal(
    state: tauri::State<'_, AppState>,
    input: String,
) -> Result<String, String> {
    let input: MonthlyGoalInput = serde_json::from_str(&input)
        .map_err(|e| format!("月次目標の解析に失敗しました: {}", e))?;

    let result = state.admin_api.upsert_monthly_goal(&input).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 月次通常業務項目を登録・更新
#[tauri::command(rename_all = "snake_case")]
pub async fn upsert_monthly_item(
    state: tauri::State<'_, AppState>,
    input: String,
) -> Result<String, String> {
    let input: MonthlyItemInput = serde_json::from_str(&input)
        .map_err(|e| format!("月次項目の解析に失敗しました: {}", e))?;

    let result = state.admin_api.upsert_monthly_item(&input).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 月次重点目標の一覧（部門と年月で絞り込み）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_monthly_goals(
    state: tauri::State<'_, AppState>,
    department: String,
    year_month: String,
    staff_name: Option<String>,
) -> Result<String, String> {
    let result = state
        .admin_api
        .list_monthly_goals(
            &department,
            &year_month,
            staff_name.as_deref().filter(|s| !s.is_empty()),
        )
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 月次通常業務項目の一覧（部門と年月で絞り込み）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_monthly_items(
    state: tauri::State<'_, AppState>,
    department: String,
    year_month: String,
    staff_name: Option<String>,
) -> Result<String, String> {
    let result = state
        .admin_api
        .list_monthly_items(
            &department,
            &year_month,
            staff_name.as_deref().filter(|s| !s.is_empty()),
        )
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 月次目標が登録されている年月の一覧
#[tauri::command(rename_all = "snake_case")]
pub async fn list_goal_year_months(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.admin_api.list_goal_year_months().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

// ==========================================
// 業務名単位の削減対象
// ==========================================

/// 削減対象の業務名一覧
#[tauri::command(rename_all = "snake_case")]
pub async fn list_task_targets(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.admin_api.list_task_targets().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 業務名の削減対象フラグを切り替え
#[tauri::command(rename_all = "snake_case")]
pub async fn toggle_task_target(
    state: tauri::State<'_, AppState>,
    work_name: String,
) -> Result<String, String> {
    let is_target = state
        .admin_api
        .toggle_task_target(&work_name)
        .map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({
        "work_name": work_name,
        "is_target": is_target,
    }))
    .map_err(|e| format!("シリアライズに失敗しました: {}", e))
}

/// 複数業務名の削減対象フラグを一括設定
#[tauri::command(rename_all = "snake_case")]
pub async fn bulk_set_task_targets(
    state: tauri::State<'_, AppState>,
    work_names: Vec<String>,
    is_target: bool,
) -> Result<String, String> {
    let changed = state
        .admin_api
        .bulk_set_task_targets(&work_names, is_target)
        .map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "changed": changed }))
        .map_err(|e| format!("シリアライズに失敗しました: {}", e))
}
