// ==========================================
// 業務時間分析ダッシュボード - リポジトリ層エラー型
// ==========================================
// ツール: thiserror 派生マクロ
// ==========================================

use thiserror::Error;

/// リポジトリ層のエラー型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== データベースエラー =====
    #[error("レコードが見つかりません: {entity} (id={id})")]
    NotFound { entity: String, id: String },

    #[error("データベース接続に失敗しました: {0}")]
    DatabaseConnectionError(String),

    #[error("データベースロックの取得に失敗しました: {0}")]
    LockError(String),

    #[error("データベーストランザクションに失敗しました: {0}")]
    DatabaseTransactionError(String),

    #[error("データベースクエリに失敗しました: {0}")]
    DatabaseQueryError(String),

    #[error("一意制約違反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外部キー制約違反: {0}")]
    ForeignKeyViolation(String),

    // ===== 業務ルールエラー =====
    #[error("業務ルール違反: {0}")]
    BusinessRuleViolation(String),

    // ===== データ品質エラー =====
    #[error("データ検証に失敗しました: {0}")]
    ValidationError(String),

    #[error("フィールド値が不正です (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== 汎用エラー =====
    #[error("内部エラー: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// From<rusqlite::Error> の実装
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 型エイリアス
pub type RepositoryResult<T> = Result<T, RepositoryError>;
