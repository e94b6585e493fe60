// ==========================================
// 業務時間分析ダッシュボード - API 層エラー型
// ==========================================
// 責務: リポジトリ / インポート / AI 層のエラーを
//       フロントエンド向けメッセージへ変換する
// ==========================================

use thiserror::Error;

use crate::ai::AiError;
use crate::importer::ImportError;
use crate::repository::RepositoryError;

/// API 層のエラー型
///
/// Tauri コマンド層ではこのエラーを文字列化してフロントエンドへ返す。
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 入力検証 =====
    #[error("入力値が不正です: {0}")]
    InvalidInput(String),

    #[error("対象が見つかりません: {0}")]
    NotFound(String),

    #[error("既に存在します: {0}")]
    DuplicateEntry(String),

    // ===== 業務ルール =====
    #[error("操作を実行できません: {0}")]
    BusinessRuleViolation(String),

    // ===== 下位層のエラー =====
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("AI機能が一時的に利用できません: {0}")]
    AiServiceUnavailable(String),

    #[error("データベースエラー: {0}")]
    DatabaseError(String),

    // ===== 汎用 =====
    #[error("内部エラー: {0}")]
    InternalError(String),
}

/// RepositoryError から ApiError への変換
///
/// リポジトリ層の技術的なエラーを利用者向けの区分へ写像する。
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicateEntry(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("参照整合性に違反しています: {}", msg))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("{}: {}", field, message))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

/// AiError から ApiError への変換
///
/// プロバイダ側の失敗はすべて「AI 利用不可」として退行させる。
/// 呼び出し元（分類プレビュー等）がフォールバックを持つ場合は
/// 変換前の AiError を直接処理する。
impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::AiServiceUnavailable(err.to_string())
    }
}

/// Result 型エイリアス
pub type ApiResult<T> = Result<T, ApiError>;
