// ==========================================
// 業務時間分析ダッシュボード - 設定層
// ==========================================

pub mod settings_manager;

pub use settings_manager::{setting_keys, SettingsManager};
