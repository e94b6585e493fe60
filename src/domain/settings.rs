// ==========================================
// 業務時間分析ダッシュボード - アプリケーション設定
// ==========================================
// 責務: 型付き設定値の表現と変換
// 格納先: app_setting テーブル
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::types::SettingType;

/// 型付きの設定値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// アプリケーション設定（キー・値・型・説明）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSetting {
    /// 設定キー
    pub key: String,
    /// 文字列としての設定値
    pub value: String,
    /// 値の型
    pub value_type: SettingType,
    /// 説明
    pub description: Option<String>,
    /// 更新日時
    pub updated_at: NaiveDateTime,
}

impl AppSetting {
    /// value_type に従って型付き値へ変換
    ///
    /// 変換に失敗した場合は文字列のまま返す（設定破損で全体を止めない）
    pub fn typed_value(&self) -> SettingValue {
        match self.value_type {
            SettingType::Int => self
                .value
                .trim()
                .parse::<i64>()
                .map(SettingValue::Int)
                .unwrap_or_else(|_| SettingValue::Str(self.value.clone())),
            SettingType::Float => self
                .value
                .trim()
                .parse::<f64>()
                .map(SettingValue::Float)
                .unwrap_or_else(|_| SettingValue::Str(self.value.clone())),
            SettingType::Bool => SettingValue::Bool(matches!(
                self.value.trim().to_lowercase().as_str(),
                "true" | "1" | "yes"
            )),
            SettingType::String => SettingValue::Str(self.value.clone()),
        }
    }

    /// 整数として取得（型不一致は None）
    pub fn as_int(&self) -> Option<i64> {
        match self.typed_value() {
            SettingValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// 浮動小数として取得（int 型の値も許容）
    pub fn as_float(&self) -> Option<f64> {
        match self.typed_value() {
            SettingValue::Float(v) => Some(v),
            SettingValue::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    /// 真偽値として取得
    pub fn as_bool(&self) -> Option<bool> {
        match self.typed_value() {
            SettingValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}
