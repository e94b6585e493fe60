// ==========================================
// 業務時間分析ダッシュボード - 設定マネージャ
// ==========================================
// 責務: app_setting テーブル上の型付き設定の読み出しと初期値投入
// 保管: app_setting テーブル (key-value + value_type)
// ==========================================

use crate::domain::settings::AppSetting;
use crate::domain::types::SettingType;
use crate::repository::settings_repo::AppSettingRepository;
use crate::repository::RepositoryResult;
use std::sync::Arc;

// ==========================================
// 設定キー定数
// ==========================================
pub mod setting_keys {
    /// デフォルト時給（円）
    pub const DEFAULT_HOURLY_RATE: &str = "default_hourly_rate";
    /// ランキング表示件数
    pub const RANKING_LIMIT: &str = "ranking_limit";
    /// デフォルト分類カテゴリ
    pub const DEFAULT_CATEGORY: &str = "default_category";
}

/// 設定の初期データ（キー, 値, 型, 説明）
const DEFAULT_SETTINGS: &[(&str, &str, SettingType, &str)] = &[
    (
        setting_keys::DEFAULT_HOURLY_RATE,
        "2000",
        SettingType::Int,
        "デフォルト時給（円）",
    ),
    (
        setting_keys::RANKING_LIMIT,
        "10",
        SettingType::Int,
        "ランキング表示件数",
    ),
    (
        setting_keys::DEFAULT_CATEGORY,
        "コア業務",
        SettingType::String,
        "デフォルト分類カテゴリ",
    ),
];

// ==========================================
// SettingsManager - 設定マネージャ
// ==========================================

/// 型付き設定のファサード
///
/// リポジトリの生の文字列値を型付きで取り出す。値が欠けている・
/// パースできない場合は既定値に落とす。
pub struct SettingsManager {
    settings: Arc<AppSettingRepository>,
}

impl SettingsManager {
    /// リポジトリから設定マネージャを作成
    pub fn new(settings: Arc<AppSettingRepository>) -> Self {
        Self { settings }
    }

    /// 文字列設定を取得（未設定時は既定値）
    pub fn get_string(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .settings
            .get(key)?
            .map(|s| s.value)
            .unwrap_or_else(|| default.to_string()))
    }

    /// 整数設定を取得（未設定・パース不能時は既定値）
    pub fn get_int(&self, key: &str, default: i64) -> RepositoryResult<i64> {
        Ok(self
            .settings
            .get(key)?
            .and_then(|s| s.as_int())
            .unwrap_or(default))
    }

    /// 小数設定を取得（未設定・パース不能時は既定値）
    pub fn get_float(&self, key: &str, default: f64) -> RepositoryResult<f64> {
        Ok(self
            .settings
            .get(key)?
            .and_then(|s| s.as_float())
            .unwrap_or(default))
    }

    /// 真偽設定を取得（未設定・パース不能時は既定値）
    pub fn get_bool(&self, key: &str, default: bool) -> RepositoryResult<bool> {
        Ok(self
            .settings
            .get(key)?
            .and_then(|s| s.as_bool())
            .unwrap_or(default))
    }

    // ===== ドメイン設定のショートカット =====

    /// デフォルト時給（円）
    pub fn default_hourly_rate(&self) -> RepositoryResult<i64> {
        self.get_int(setting_keys::DEFAULT_HOURLY_RATE, 2000)
    }

    /// ランキング表示件数
    pub fn ranking_limit(&self) -> RepositoryResult<i64> {
        self.get_int(setting_keys::RANKING_LIMIT, 10)
    }

    /// デフォルト分類カテゴリ名
    pub fn default_category(&self) -> RepositoryResult<String> {
        self.get_string(setting_keys::DEFAULT_CATEGORY, "コア業務")
    }

    /// 設定一覧
    pub fn list_all(&self) -> RepositoryResult<Vec<AppSetting>> {
        self.settings.list_all()
    }

    /// 初期設定を投入（既存キーの値は保持）。追加した件数を返す。
    pub fn seed_defaults(&self) -> RepositoryResult<usize> {
        let mut added = 0usize;
        for (key, value, value_type, description) in DEFAULT_SETTINGS {
            if self.settings.get(key)?.is_none() {
                self.settings
                    .set_value(key, value, Some(*value_type), Some(description))?;
                added += 1;
            }
        }
        Ok(added)
    }
}
