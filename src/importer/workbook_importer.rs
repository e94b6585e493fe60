// ==========================================
// 業務時間分析ダッシュボード - ワークブック取込サービス
// ==========================================
// 流れ: 解析 → 行変換 → 全置換登録
// プレビューは同じ解析・変換を通すが、DB には書き込まない
// ==========================================

use std::path::Path;
use std::time::Instant;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::record::{ImportBatch, SheetPreview};
use crate::repository::WorkRecordRepository;

use super::error::{ImportError, ImportResult};
use super::file_parser::UniversalFileParser;
use super::record_mapper::RecordMapper;

pub struct WorkbookImporter {
    records: WorkRecordRepository,
}

impl WorkbookImporter {
    pub fn new(records: WorkRecordRepository) -> Self {
        Self { records }
    }

    /// 取込プレビュー
    ///
    /// シートごとの有効行数・読み飛ばし数・検証エラーを返す。
    /// データベースの状態は変更しない。
    #[instrument(skip(self, path))]
    pub fn preview<P: AsRef<Path>>(&self, path: P) -> ImportResult<Vec<SheetPreview>> {
        let sheets = UniversalFileParser.parse(path)?;
        let mapper = RecordMapper;

        Ok(sheets
            .iter()
            .map(|sheet| {
                let (records, errors) = mapper.map_sheet(sheet);
                SheetPreview {
                    sheet_name: sheet.sheet_name.clone(),
                    row_count: records.len(),
                    skipped_rows: sheet.skipped_rows,
                    errors,
                }
            })
            .collect())
    }

    /// 取込確定（全レコードを置き換える）
    ///
    /// # 引数
    /// - path: 取込ファイルのパス
    /// - file_name: 元のファイル名（結果の記録用）
    ///
    /// # 戻り値
    /// - Ok(ImportBatch): 取込結果
    /// - Err(NoImportableRows): 有効行が1つもない（既存データは保持される）
    #[instrument(skip(self, path))]
    pub fn import<P: AsRef<Path>>(&self, path: P, file_name: &str) -> ImportResult<ImportBatch> {
        let started = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, file = %file_name, "取込を開始");

        let sheets = UniversalFileParser.parse(path)?;
        let mapper = RecordMapper;

        let mut all_records = Vec::new();
        let mut total_rows = 0usize;
        let mut skipped_rows = 0usize;
        let mut source_months = Vec::with_capacity(sheets.len());
        for sheet in &sheets {
            total_rows += sheet.rows.len() + sheet.skipped_rows;
            skipped_rows += sheet.skipped_rows;

            let (records, errors) = mapper.map_sheet(sheet);
            for error in &errors {
                warn!(
                    sheet = %error.sheet_name,
                    row = error.row_number,
                    message = %error.message,
                    "行を読み飛ばし"
                );
            }
            skipped_rows += errors.len();
            all_records.extend(records);
            source_months.push(sheet.sheet_name.clone());
        }

        // 有効行ゼロで確定すると既存データを消すだけになるため、置換前に止める
        if all_records.is_empty() {
            return Err(ImportError::NoImportableRows);
        }

        let inserted_rows = self.records.replace_all(&all_records)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            batch_id = %batch_id,
            inserted = inserted_rows,
            skipped = skipped_rows,
            elapsed_ms,
            "取込が完了"
        );

        Ok(ImportBatch {
            batch_id,
            file_name: file_name.to_string(),
            source_months,
            total_rows,
            inserted_rows,
            skipped_rows,
            elapsed_ms,
        })
    }

    /// 全業務記録を削除
    pub fn clear(&self) -> ImportResult<usize> {
        let deleted = self.records.delete_all()?;
        info!(deleted, "業務記録をクリア");
        Ok(deleted)
    }

    /// 現在の登録件数
    pub fn record_count(&self) -> ImportResult<i64> {
        Ok(self.records.count()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use rusqlite::Connection;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    fn importer() -> WorkbookImporter {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        WorkbookImporter::new(WorkRecordRepository::from_connection(Arc::new(Mutex::new(
            conn,
        ))))
    }

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    const HEADER: &str = "日付,担当者,部門,分類1,分類2,業務名,単価,数量,金額,ステータス";

    #[test]
    fn test_preview_状態を変更しない() {
        let importer = importer();
        let file = csv_file(&[
            HEADER,
            "2025-04-01,山田,制作部,通常,制作,ノート入力,2000,1.5,3000,確定",
            "不正な日付,佐藤,営業部,通常,対応,電話対応,2000,0.5,1000,確定",
        ]);

        let previews = importer.preview(file.path()).unwrap();

        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].row_count, 1);
        assert_eq!(previews[0].errors.len(), 1);
        // プレビューでは登録しない
        assert_eq!(importer.record_count().unwrap(), 0);
    }

    #[test]
    fn test_import_確定で全置換() {
        let importer = importer();
        let first = csv_file(&[
            HEADER,
            "2025-04-01,山田,制作部,通常,制作,ノート入力,2000,1.5,3000,確定",
            "2025-04-02,佐藤,営業部,通常,対応,電話対応,2000,0.5,1000,確定",
        ]);

        let batch = importer.import(first.path(), "4月.csv").unwrap();
        assert_eq!(batch.inserted_rows, 2);
        assert_eq!(batch.skipped_rows, 0);
        assert_eq!(importer.record_count().unwrap(), 2);

        // 2回目の取込は前回分を置き換える
        let second = csv_file(&[
            HEADER,
            "2025-05-01,山田,制作部,通常,制作,レセプト点検,2000,2.0,4000,確定",
        ]);
        let batch = importer.import(second.path(), "5月.csv").unwrap();
        assert_eq!(batch.inserted_rows, 1);
        assert_eq!(importer.record_count().unwrap(), 1);
    }

    #[test]
    fn test_import_不正行は読み飛ばして続行() {
        let importer = importer();
        let file = csv_file(&[
            HEADER,
            "2025-04-01,山田,制作部,通常,制作,ノート入力,2000,1.5,3000,確定",
            "不正な日付,佐藤,営業部,通常,対応,電話対応,2000,0.5,1000,確定",
            ",,,,,,,,,",
        ]);

        let batch = importer.import(file.path(), "4月.csv").unwrap();

        assert_eq!(batch.inserted_rows, 1);
        // 日付不正 1 + 先頭セル空 1
        assert_eq!(batch.skipped_rows, 2);
        assert_eq!(batch.total_rows, 3);
        assert_eq!(importer.record_count().unwrap(), 1);
    }

    #[test]
    fn test_import_有効行ゼロならエラーで既存データ保持() {
        let importer = importer();
        let good = csv_file(&[
            HEADER,
            "2025-04-01,山田,制作部,通常,制作,ノート入力,2000,1.5,3000,確定",
        ]);
        importer.import(good.path(), "4月.csv").unwrap();

        let empty = csv_file(&[HEADER]);
        let result = importer.import(empty.path(), "空.csv");

        assert!(matches!(result, Err(ImportError::NoImportableRows)));
        // 置換前に止まるため既存データは残る
        assert_eq!(importer.record_count().unwrap(), 1);
    }

    #[test]
    fn test_clear_全削除() {
        let importer = importer();
        let file = csv_file(&[
            HEADER,
            "2025-04-01,山田,制作部,通常,制作,ノート入力,2000,1.5,3000,確定",
        ]);
        importer.import(file.path(), "4月.csv").unwrap();

        let deleted = importer.clear().unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(importer.record_count().unwrap(), 0);
    }
}
