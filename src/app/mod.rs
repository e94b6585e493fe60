// ==========================================
// 業務時間分析ダッシュボード - アプリケーション層
// ==========================================
// 責務: Tauri 統合。フロントエンドとバックエンドをつなぐ
// ==========================================

pub mod state;
pub mod tauri_commands;

// 再エクスポート
pub use state::{AppState, get_default_db_path};

#[cfg(feature = "tauri-app")]
pub use tauri_commands::*;
