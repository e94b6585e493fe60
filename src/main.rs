// ==========================================
// 業務時間分析ダッシュボード - Tauri 主エントリ
// ==========================================
// 技術スタック: Tauri + Rust + SQLite
// 位置付け: 業務時間の可視化・意思決定支援
// ==========================================

// コンソールウィンドウを抑止 (Windows)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use worktime_insight::app::{get_default_db_path, AppState};

#[cfg(feature = "tauri-app")]
fn main() {
    use worktime_insight::app::tauri_commands::*;

    // ログシステムを初期化
    worktime_insight::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", worktime_insight::APP_NAME);
    tracing::info!("バージョン: {}", worktime_insight::VERSION);
    tracing::info!("==================================================");

    // データベースパスを取得
    let db_path = get_default_db_path();
    tracing::info!("使用データベース: {}", db_path);

    // AppState を構築
    tracing::info!("AppState を初期化しています...");
    let app_state = AppState::new(db_path)
        .expect("AppState の初期化に失敗しました");

    tracing::info!("AppState 初期化成功");
    tracing::info!("Tauri アプリを起動します...");

    // Tauri アプリを起動
    tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // ==========================================
            // ダッシュボード関連コマンド（10件）
            // ==========================================
            get_work_summary,
            get_category_breakdown,
            get_daily_breakdown,
            get_work_ranking,
            get_department_summary,
            get_date_range,
            list_category1,
            list_staff,
            get_category_styles,
            get_default_settings,

            // ==========================================
            // 分析・シミュレーション関連コマンド（3件）
            // ==========================================
            get_trend,
            get_period_comparison,
            simulate_capacity,

            // ==========================================
            // 取込関連コマンド（4件）
            // ==========================================
            preview_import,
            confirm_import,
            clear_work_records,
            count_work_records,

            // ==========================================
            // 管理画面関連コマンド（38件）
            // ==========================================
            get_admin_overview,
            list_display_categories,
            create_display_category,
            update_display_category,
            delete_display_category,
            reorder_display_categories,
            list_category_keywords,
            create_category_keyword,
            update_category_keyword,
            delete_category_keyword,
            suggest_category_keywords,
            apply_keyword_suggestions,
            get_app_settings,
            update_app_settings,
            list_unit_rules,
            create_unit_rule,
            update_unit_rule,
            delete_unit_rule,
            seed_unit_rules,
            test_unit_rule,
            list_sub_category_rules,
            create_sub_category_rule,
            update_sub_category_rule,
            delete_sub_category_rule,
            seed_sub_category_rules,
            test_sub_category,
            list_reduction_goals,
            create_reduction_goal,
            update_reduction_goal,
            delete_reduction_goal,
            upsert_monthly_goal,
            upsert_monthly_item,
            list_monthly_goals,
            list_monthly_items,
            list_goal_year_months,
            list_task_targets,
            toggle_task_target,
            bulk_set_task_targets,

            // ==========================================
            // AI 関連コマンド（11件）
            // ==========================================
            ai_categorize_preview,
            ai_save_suggestions,
            ai_list_suggestions,
            ai_review_suggestion,
            ai_group_tasks,
            ai_unique_combinations,
            ai_get_insights,
            ai_purge_insight_cache,
            ai_chat,
            ai_generate_report,
            ai_usage_summary,
        ])
        .run(tauri::generate_context!())
        .expect("Tauri アプリの起動に失敗しました");

    tracing::info!("Tauri アプリが終了しました");
}

#[cfg(not(feature = "tauri-app"))]
fn main() {
    println!("==================================================");
    println!("{}", worktime_insight::APP_NAME);
    println!("バージョン: {}", worktime_insight::VERSION);
    println!("==================================================");
    println!();
    println!("この実行ファイルは tauri-app フィーチャーが必要です");
    println!("使用方法: cargo run --features tauri-app");
    println!();
    println!("ライブラリとして使う場合:");
    println!("use worktime_insight::app::AppState;");
}
