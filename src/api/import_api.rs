// ==========================================
// 業務時間分析ダッシュボード - 取込 API
// ==========================================
// 責務: ファイル取込（プレビュー / 確定 / 全削除）の提供
// 構成: API 層 → インポート層 (WorkbookImporter)
// ==========================================

use std::path::Path;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{ImportBatch, SheetPreview};
use crate::importer::WorkbookImporter;

// ==========================================
// ImportApi
// ==========================================

/// 取込 API
pub struct ImportApi {
    importer: WorkbookImporter,
}

impl ImportApi {
    pub fn new(importer: WorkbookImporter) -> Self {
        Self { importer }
    }

    /// ファイルを解析し、取込内容のプレビューを返す（DB は変更しない）
    ///
    /// # 引数
    /// - path: 取込対象ファイルのパス
    pub fn preview<P: AsRef<Path>>(&self, path: P) -> ApiResult<Vec<SheetPreview>> {
        Ok(self.importer.preview(path)?)
    }

    /// 取込を確定する（既存データを全置換）
    ///
    /// # 引数
    /// - path: 取込対象ファイルのパス
    /// - file_name: 取込元として記録するファイル名
    ///
    /// # 戻り値
    /// - Ok(ImportBatch): 取込結果（件数・処理時間）
    pub fn confirm_import<P: AsRef<Path>>(
        &self,
        path: P,
        file_name: &str,
    ) -> ApiResult<ImportBatch> {
        if file_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("ファイル名が指定されていません".to_string()));
        }
        Ok(self.importer.import(path, file_name)?)
    }

    /// 全業務記録を削除する。削除件数を返す。
    pub fn clear_all(&self) -> ApiResult<usize> {
        Ok(self.importer.clear()?)
    }

    /// 現在の業務記録件数を取得
    pub fn record_count(&self) -> ApiResult<i64> {
        Ok(self.importer.record_count()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::repository::WorkRecordRepository;
    use rusqlite::Connection;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    const HEADER: &str = "作業日,担当者,部門,分類1,分類2,業務名,単価,数量,金額,ステータス\n";

    fn test_api() -> ImportApi {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        let records = WorkRecordRepository::from_connection(Arc::new(Mutex::new(conn)));
        ImportApi::new(WorkbookImporter::new(records))
    }

    fn csv_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_プレビューから確定までの流れ() {
        let api = test_api();
        let file = csv_file("2025-04-01,山田,営業部,通常,社内,定例会議,2000,2,4000,完了\n");

        let previews = api.preview(file.path()).unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].row_count, 1);
        assert_eq!(api.record_count().unwrap(), 0);

        let batch = api.confirm_import(file.path(), "April.csv").unwrap();
        assert_eq!(batch.inserted_rows, 1);
        assert_eq!(api.record_count().unwrap(), 1);

        assert_eq!(api.clear_all().unwrap(), 1);
        assert_eq!(api.record_count().unwrap(), 0);
    }

    #[test]
    fn test_ファイル名未指定は拒否() {
        let api = test_api();
        let file = csv_file("2025-04-01,山田,営業部,通常,社内,定例会議,2000,2,4000,完了\n");
        let result = api.confirm_import(file.path(), "  ");
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_未対応形式はインポートエラー() {
        let api = test_api();
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let result = api.preview(file.path());
        assert!(matches!(result, Err(ApiError::Import(_))));
    }
}
