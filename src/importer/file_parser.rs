// ==========================================
// 業務時間分析ダッシュボード - ファイル解析器
// ==========================================
// 対応形式: Excel (.xlsx) / CSV (.csv)
// Excel は「月請求」を含むシートのみを対象とし、
// 2行目以降をデータ行として読み取る
// ==========================================

use std::fs::File;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use tracing::debug;

use crate::domain::record::RawWorkRow;
use crate::importer::error::{ImportError, ImportResult};

/// 取込対象シート名に含まれるマーカー（例: 「SSA4月請求」）
pub const BILLING_SHEET_MARKER: &str = "月請求";

/// 1シート分の解析結果
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    /// シート名（source_month として記録される）
    pub sheet_name: String,
    /// 先頭セルが埋まっているデータ行
    pub rows: Vec<RawWorkRow>,
    /// 読み飛ばした行数（先頭の日付セルが空）
    pub skipped_rows: usize,
}

// ==========================================
// Excel Parser
// ==========================================

pub struct ExcelParser;

impl ExcelParser {
    /// ワークブックを解析して請求月シートの行を返す
    ///
    /// # 引数
    /// - path: .xlsx ファイルのパス
    ///
    /// # 戻り値
    /// - Ok(Vec<ParsedSheet>): シートごとの解析結果
    /// - Err(NoBillingSheets): 対象シートが1つもない
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> ImportResult<Vec<ParsedSheet>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(path)?;

        let sheet_names = workbook.sheet_names();
        let billing_sheets: Vec<String> = sheet_names
            .iter()
            .filter(|name| name.contains(BILLING_SHEET_MARKER))
            .cloned()
            .collect();
        if billing_sheets.is_empty() {
            return Err(ImportError::NoBillingSheets);
        }

        let mut sheets = Vec::new();
        for sheet_name in billing_sheets {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

            let mut rows = Vec::new();
            let mut skipped_rows = 0usize;

            // 1行目はヘッダ。2行目以降をデータとして読む
            for (idx, cells) in range.rows().enumerate().skip(1) {
                let row_number = idx + 1;
                let leading = cells.first().map(cell_to_string).unwrap_or_default();
                if leading.is_empty() {
                    skipped_rows += 1;
                    continue;
                }
                rows.push(raw_row_from_cells(&sheet_name, row_number, cells));
            }

            debug!(
                sheet = %sheet_name,
                rows = rows.len(),
                skipped = skipped_rows,
                "シートを解析"
            );
            sheets.push(ParsedSheet {
                sheet_name,
                rows,
                skipped_rows,
            });
        }

        Ok(sheets)
    }
}

/// セルを文字列へ変換（日付セルは YYYY-MM-DD 形式）
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_float(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.split('T').next().unwrap_or("").to_string(),
        Data::DurationIso(s) => s.trim().to_string(),
        // エラーセル (#DIV/0! など) は空として扱う
        Data::Error(_) => String::new(),
    }
}

/// 整数値の浮動小数は小数点なしで表記する（"1500.0" → "1500"）
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// 固定列順 [日付, 担当者, 部門, 分類1, 分類2, 業務名, 単価, 数量, 金額, ステータス]
fn raw_row_from_cells(sheet_name: &str, row_number: usize, cells: &[Data]) -> RawWorkRow {
    let col = |i: usize| cells.get(i).map(cell_to_string).unwrap_or_default();
    RawWorkRow {
        row_number,
        sheet_name: sheet_name.to_string(),
        work_date: col(0),
        staff_name: col(1),
        department: col(2),
        category1: col(3),
        category2: col(4),
        work_name: col(5),
        unit_price: col(6),
        quantity: col(7),
        total_amount: col(8),
        status: col(9),
    }
}

// ==========================================
// CSV Parser
// ==========================================

pub struct CsvParser;

impl CsvParser {
    /// CSV を解析して1シート分の行として返す
    ///
    /// 列順は Excel と同じ固定順。1行目はヘッダとして読み飛ばす。
    /// source_month にはファイル名（拡張子なし）が入る。
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> ImportResult<ParsedSheet> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let sheet_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("CSV")
            .to_string();

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut rows = Vec::new();
        let mut skipped_rows = 0usize;
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            // ヘッダを1行目として数えるため、データは2行目から
            let row_number = idx + 2;
            let col = |i: usize| record.get(i).unwrap_or("").trim().to_string();

            if col(0).is_empty() {
                skipped_rows += 1;
                continue;
            }

            rows.push(RawWorkRow {
                row_number,
                sheet_name: sheet_name.clone(),
                work_date: col(0),
                staff_name: col(1),
                department: col(2),
                category1: col(3),
                category2: col(4),
                work_name: col(5),
                unit_price: col(6),
                quantity: col(7),
                total_amount: col(8),
                status: col(9),
            });
        }

        Ok(ParsedSheet {
            sheet_name,
            rows,
            skipped_rows,
        })
    }
}

// ==========================================
// 拡張子で自動選択する解析器
// ==========================================

pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> ImportResult<Vec<ParsedSheet>> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" => ExcelParser.parse(path),
            "csv" => CsvParser.parse(path).map(|sheet| vec![sheet]),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

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

    #[test]
    fn test_csv_正常読み込み() {
        let file = csv_file(&[
            "日付,担当者,部門,分類1,分類2,業務名,単価,数量,金額,ステータス",
            "2025-04-01,山田,制作部,通常,制作,ノート入力,2000,1.5,3000,確定",
            "2025-04-02,佐藤,営業部,通常,対応,電話対応,2000,0.5,1000,確定",
        ]);

        let sheet = CsvParser.parse(file.path()).unwrap();

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.skipped_rows, 0);
        let first = &sheet.rows[0];
        assert_eq!(first.row_number, 2);
        assert_eq!(first.work_date, "2025-04-01");
        assert_eq!(first.staff_name, "山田");
        assert_eq!(first.work_name, "ノート入力");
        assert_eq!(first.quantity, "1.5");
    }

    #[test]
    fn test_csv_先頭セルが空の行は読み飛ばす() {
        let file = csv_file(&[
            "日付,担当者,部門,分類1,分類2,業務名,単価,数量,金額,ステータス",
            "2025-04-01,山田,制作部,通常,制作,ノート入力,2000,1.5,3000,確定",
            ",,,,,,,,,",
            "2025-04-02,佐藤,営業部,通常,対応,電話対応,2000,0.5,1000,確定",
        ]);

        let sheet = CsvParser.parse(file.path()).unwrap();

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.skipped_rows, 1);
        // 読み飛ばした行も行番号には数える
        assert_eq!(sheet.rows[1].row_number, 4);
    }

    #[test]
    fn test_csv_列が足りない行は空文字で埋める() {
        let file = csv_file(&[
            "日付,担当者,部門,分類1,分類2,業務名,単価,数量,金額,ステータス",
            "2025-04-01,山田",
        ]);

        let sheet = CsvParser.parse(file.path()).unwrap();

        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].staff_name, "山田");
        assert_eq!(sheet.rows[0].work_name, "");
        assert_eq!(sheet.rows[0].quantity, "");
    }

    #[test]
    fn test_csv_存在しないファイル() {
        let result = CsvParser.parse(Path::new("存在しない.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_未対応の拡張子() {
        let result = UniversalFileParser.parse(Path::new("data.pdf"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1500.0), "1500");
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(0.0), "0");
    }
}
