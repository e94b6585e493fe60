// ==========================================
// 業務時間分析ダッシュボード - 取込層エラー型
// ==========================================
// thiserror 派生マクロを使用
// ==========================================

use thiserror::Error;

use crate::repository::RepositoryError;

/// 取込層のエラー型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== ファイル関連 =====
    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("未対応のファイル形式です: {0}（.xlsx / .csv のみ対応）")]
    UnsupportedFormat(String),

    #[error("ファイル読み込みに失敗しました: {0}")]
    FileReadError(String),

    #[error("Excel の解析に失敗しました: {0}")]
    ExcelParseError(String),

    #[error("CSV の解析に失敗しました: {0}")]
    CsvParseError(String),

    // ===== ワークブック内容 =====
    #[error("請求月シート（シート名に「月請求」を含む）が見つかりません")]
    NoBillingSheets,

    #[error("取り込める行がありません")]
    NoImportableRows,

    // ===== 永続化 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 型エイリアス
pub type ImportResult<T> = Result<T, ImportError>;
