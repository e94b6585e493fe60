// ==========================================
// 業務時間分析ダッシュボード - 取込層
// ==========================================
// 責務: 請求月ワークブック（Excel / CSV）を業務記録へ取り込む
// 流れ: 解析 → 行変換 → 全置換登録
// ==========================================

pub mod error;
pub mod file_parser;
pub mod record_mapper;
pub mod workbook_importer;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, ParsedSheet, UniversalFileParser, BILLING_SHEET_MARKER};
pub use record_mapper::RecordMapper;
pub use workbook_importer::WorkbookImporter;
