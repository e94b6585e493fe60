use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::repository::RecordFilter;

// ==========================================
// 共通ユーティリティ: エラー変換・日付とフィルタの解析
// ==========================================

/// フロントエンドへ返すエラー応答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct ErrorResponse {
    /// エラーコード
    pub code: String,

    /// エラーメッセージ
    pub message: String,
}

/// ApiError を JSON 文字列へ変換（Tauri の Err 値）
pub(super) fn map_api_error(err: ApiError) -> String {
    let response = ErrorResponse {
        code: match &err {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::Import(_) => "IMPORT_ERROR",
            ApiError::AiServiceUnavailable(_) => "AI_SERVICE_UNAVAILABLE",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
        .to_string(),
        message: err.to_string(),
    };

    serde_json::to_string(&response).unwrap_or_else(|_| err.to_string())
}

/// 日付文字列を解析（YYYY-MM-DD）
pub(super) fn parse_date(date_str: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| format!("日付形式が不正です（YYYY-MM-DD）: {}", e))
}

/// クエリパラメータ相当の引数から検索フィルタを構築
///
/// 空文字は未指定として扱う。
pub(super) fn build_filter(
    category1: Option<String>,
    staff: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<RecordFilter, String> {
    let start = match start_date.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };
    let end = match end_date.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };

    Ok(RecordFilter {
        category1: category1.filter(|s| !s.is_empty()),
        staff: staff.filter(|s| !s.is_empty()),
        start,
        end,
    })
}
