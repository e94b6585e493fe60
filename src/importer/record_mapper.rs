// ==========================================
// 業務時間分析ダッシュボード - 行マッパー
// ==========================================
// 責務: 生データ行 (RawWorkRow) を検証して WorkRecord へ変換
// 失敗した行は RowError として報告し、取込全体は止めない
// ==========================================

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::record::{RawWorkRow, RowError, WorkRecord};

use super::file_parser::ParsedSheet;

pub struct RecordMapper;

impl RecordMapper {
    /// 1行を検証して WorkRecord へ変換
    ///
    /// # 戻り値
    /// - Ok(WorkRecord): 変換済みレコード（record_id は新規 UUID）
    /// - Err(RowError): 日付・数値の形式不正
    pub fn map_row(&self, row: &RawWorkRow) -> Result<WorkRecord, RowError> {
        let work_date = parse_date(&row.work_date).ok_or_else(|| {
            row_error(row, format!("日付を解釈できません: {}", row.work_date))
        })?;

        let unit_price = parse_optional_number(row, "単価", &row.unit_price)?;
        let quantity = parse_optional_number(row, "数量", &row.quantity)?.unwrap_or(0.0);
        let total_amount = parse_optional_number(row, "金額", &row.total_amount)?;

        Ok(WorkRecord {
            record_id: Uuid::new_v4().to_string(),
            work_date,
            staff_name: row.staff_name.clone(),
            department: optional_text(&row.department),
            category1: optional_text(&row.category1),
            category2: optional_text(&row.category2),
            work_name: optional_text(&row.work_name),
            unit_price,
            quantity,
            total_amount,
            status: optional_text(&row.status),
            source_month: Some(row.sheet_name.clone()),
            created_at: Utc::now().naive_utc(),
        })
    }

    /// シート内の全行を変換し、成功分と失敗分に振り分ける
    pub fn map_sheet(&self, sheet: &ParsedSheet) -> (Vec<WorkRecord>, Vec<RowError>) {
        let mut records = Vec::with_capacity(sheet.rows.len());
        let mut errors = Vec::new();
        for row in &sheet.rows {
            match self.map_row(row) {
                Ok(record) => records.push(record),
                Err(error) => errors.push(error),
            }
        }
        (records, errors)
    }
}

/// 日付文字列を解釈（YYYY-MM-DD / YYYY/MM/DD）
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .ok()
}

/// 空文字列は None、それ以外は Some
fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 空は None、数値文字列は Some(f64)、それ以外はエラー
fn parse_optional_number(
    row: &RawWorkRow,
    field: &str,
    value: &str,
) -> Result<Option<f64>, RowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| row_error(row, format!("{}を数値として解釈できません: {}", field, value)))
}

fn row_error(row: &RawWorkRow, message: String) -> RowError {
    RowError {
        sheet_name: row.sheet_name.clone(),
        row_number: row.row_number,
        message,
    }
}
