// ==========================================
// 業務時間分析ダッシュボード - 業務記録エンティティ
// ==========================================
// 責務: 請求月シート由来の業務記録と取込関連の型を定義
// 制約: データアクセスロジックを含まない
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// 業務記録 (Work Record)
// ==========================================

/// 業務記録（請求月シートの1行に対応）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRecord {
    /// レコードID (UUID)
    pub record_id: String,

    // ===== 基本情報 =====
    /// 作業日
    pub work_date: NaiveDate,
    /// 担当者名
    pub staff_name: String,
    /// 部門
    pub department: Option<String>,

    // ===== 分類情報 =====
    /// 元ファイルの分類1
    pub category1: Option<String>,
    /// 元ファイルの分類2
    pub category2: Option<String>,
    /// 業務名
    pub work_name: Option<String>,

    // ===== 数量・金額 =====
    /// 単価
    pub unit_price: Option<f64>,
    /// 数量（時間単位の業務では時間数）
    pub quantity: f64,
    /// 合計金額
    pub total_amount: Option<f64>,

    // ===== 付帯情報 =====
    /// ステータス
    pub status: Option<String>,
    /// 取込元シート名（例: 「4月請求」）
    pub source_month: Option<String>,
    /// 登録日時
    pub created_at: NaiveDateTime,
}

impl WorkRecord {
    /// 業務名（未設定時はプレースホルダ）
    pub fn work_name_or_placeholder(&self) -> &str {
        match self.work_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "(未設定)",
        }
    }
}

// ==========================================
// 取込用の生データ行 (Raw Work Row)
// ==========================================

/// ファイルから読み取った未検証の1行
///
/// すべて文字列として保持し、検証・変換はインポート層で行う
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWorkRow {
    /// シート内の行番号（1始まり、ヘッダ行を含む）
    pub row_number: usize,
    /// 取込元シート名
    pub sheet_name: String,

    // ===== 列データ（固定列順） =====
    /// 作業日
    pub work_date: String,
    /// 担当者名
    pub staff_name: String,
    /// 部門
    pub department: String,
    /// 分類1
    pub category1: String,
    /// 分類2
    pub category2: String,
    /// 業務名
    pub work_name: String,
    /// 単価
    pub unit_price: String,
    /// 数量
    pub quantity: String,
    /// 合計金額
    pub total_amount: String,
    /// ステータス
    pub status: String,
}

// ==========================================
// 取込結果 (Import Batch)
// ==========================================

/// 行単位の取込エラー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    /// シート名
    pub sheet_name: String,
    /// 行番号（1始まり）
    pub row_number: usize,
    /// エラーメッセージ
    pub message: String,
}

/// シート単位のプレビュー結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetPreview {
    /// シート名
    pub sheet_name: String,
    /// 有効行数
    pub row_count: usize,
    /// 読み飛ばした行数（先頭セルが空など）
    pub skipped_rows: usize,
    /// 検証エラー
    pub errors: Vec<RowError>,
}

/// 取込バッチの実行結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    /// バッチID (UUID)
    pub batch_id: String,
    /// 取込元ファイル名
    pub file_name: String,
    /// 対象シート名の一覧
    pub source_months: Vec<String>,
    /// 読み取った総行数
    pub total_rows: usize,
    /// 登録した行数
    pub inserted_rows: usize,
    /// 読み飛ばした行数
    pub skipped_rows: usize,
    /// 処理時間（ミリ秒）
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(work_name: Option<&str>) -> WorkRecord {
        WorkRecord {
            record_id: "r-1".to_string(),
            work_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            staff_name: "山田".to_string(),
            department: Some("制作部".to_string()),
            category1: Some("通常".to_string()),
            category2: Some("制作".to_string()),
            work_name: work_name.map(|s| s.to_string()),
            unit_price: Some(2000.0),
            quantity: 1.5,
            total_amount: Some(3000.0),
            status: None,
            source_month: Some("4月請求".to_string()),
            created_at: NaiveDate::from_ymd_opt(2025, 4, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_work_name_プレースホルダ() {
        assert_eq!(sample_record(Some("電話対応")).work_name_or_placeholder(), "電話対応");
        assert_eq!(sample_record(None).work_name_or_placeholder(), "(未設定)");
        assert_eq!(sample_record(Some("  ")).work_name_or_placeholder(), "(未設定)");
    }
}
