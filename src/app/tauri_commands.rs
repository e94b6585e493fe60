// ==========================================
// 業務時間分析ダッシュボード - Tauri コマンド（ドメイン別に分割）
// ==========================================
// 責務: Tauri コマンド定義。フロントエンドとバックエンド API をつなぐ
// ==========================================

#![cfg(feature = "tauri-app")]

mod admin;
mod ai;
mod analytics;
mod common;
mod dashboard;
mod import;

pub use admin::*;
pub use ai::*;
pub use analytics::*;
pub use dashboard::*;
pub use import::*;
