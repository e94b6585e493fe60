// ==========================================
// 業務時間分析ダッシュボード - 業務記録リポジトリ
// ==========================================
// 責務: work_record テーブルの CRUD と集計クエリ
// 制約: Repository は業務ロジックを含まない（分類はエンジン層）
// ==========================================

use crate::domain::record::WorkRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// バッチ挿入の1チャンクあたり行数
const INSERT_BATCH_SIZE: usize = 1000;

// ==========================================
// 検索フィルタ
// ==========================================

/// 業務記録の共通検索フィルタ
///
/// ダッシュボード系 API のクエリパラメータに対応する
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    /// 分類1での絞り込み
    pub category1: Option<String>,
    /// 担当者名での絞り込み
    pub staff: Option<String>,
    /// 開始日（この日を含む）
    pub start: Option<NaiveDate>,
    /// 終了日（この日を含む）
    pub end: Option<NaiveDate>,
}

impl RecordFilter {
    /// WHERE 句と束縛パラメータを構築
    fn where_clause(&self) -> (String, Vec<String>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut bindings: Vec<String> = Vec::new();

        if let Some(c1) = self.category1.as_deref().filter(|s| !s.is_empty()) {
            bindings.push(c1.to_string());
            clauses.push(format!("category1 = ?{}", bindings.len()));
        }
        if let Some(staff) = self.staff.as_deref().filter(|s| !s.is_empty()) {
            bindings.push(staff.to_string());
            clauses.push(format!("staff_name = ?{}", bindings.len()));
        }
        if let Some(start) = self.start {
            bindings.push(start.format("%Y-%m-%d").to_string());
            clauses.push(format!("work_date >= ?{}", bindings.len()));
        }
        if let Some(end) = self.end {
            bindings.push(end.format("%Y-%m-%d").to_string());
            clauses.push(format!("work_date <= ?{}", bindings.len()));
        }

        if clauses.is_empty() {
            (String::new(), bindings)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), bindings)
        }
    }
}

// ==========================================
// 集計行
// ==========================================

/// (分類2, 業務名) 単位の集計行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkAggRow {
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub work_name: Option<String>,
    /// 合計時間（quantity の総和）
    pub hours: f64,
    /// 合計金額
    pub amount: f64,
    /// レコード数
    pub record_count: i64,
}

/// 日別 × (分類2, 業務名) の集計行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAggRow {
    pub work_date: NaiveDate,
    pub category2: Option<String>,
    pub work_name: Option<String>,
    pub hours: f64,
}

/// 部門 × 担当者 × (分類2, 業務名) の集計行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAggRow {
    pub department: Option<String>,
    pub staff_name: String,
    pub category2: Option<String>,
    pub work_name: Option<String>,
    pub hours: f64,
}

/// (分類1, 分類2, 業務名) のユニーク組合せ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniqueCombination {
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub work_name: Option<String>,
    pub record_count: i64,
}

// ==========================================
// WorkRecordRepository
// ==========================================

/// 業務記録リポジトリ
pub struct WorkRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkRecordRepository {
    /// 既存接続からリポジトリを作成
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// データベース接続を取得
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 総レコード数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM work_record", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 全件削除
    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM work_record", [])?;
        Ok(deleted)
    }

    /// バッチ挿入（1000行ごとのチャンクで1トランザクション）
    pub fn batch_insert(&self, records: &[WorkRecord]) -> RepositoryResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let result = (|| -> RepositoryResult<usize> {
            let mut inserted = 0usize;
            for chunk in records.chunks(INSERT_BATCH_SIZE) {
                let mut stmt = conn.prepare_cached(
                    r#"
                    INSERT INTO work_record (
                        record_id, work_date, staff_name, department,
                        category1, category2, work_name,
                        unit_price, quantity, total_amount,
                        status, source_month, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                    "#,
                )?;
                for record in chunk {
                    stmt.execute(params![
                        record.record_id,
                        record.work_date.format("%Y-%m-%d").to_string(),
                        record.staff_name,
                        record.department,
                        record.category1,
                        record.category2,
                        record.work_name,
                        record.unit_price,
                        record.quantity,
                        record.total_amount,
                        record.status,
                        record.source_month,
                        record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    ])?;
                    inserted += 1;
                }
            }
            Ok(inserted)
        })();

        match result {
            Ok(inserted) => {
                conn.execute_batch("COMMIT")
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(inserted)
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// 全件置換（全削除 + バッチ挿入を1トランザクションで実行）
    ///
    /// 取込確定時の操作。部分的な置換状態を残さない。
    pub fn replace_all(&self, records: &[WorkRecord]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let result = (|| -> RepositoryResult<usize> {
            conn.execute("DELETE FROM work_record", [])?;

            let mut inserted = 0usize;
            for chunk in records.chunks(INSERT_BATCH_SIZE) {
                let mut stmt = conn.prepare_cached(
                    r#"
                    INSERT INTO work_record (
                        record_id, work_date, staff_name, department,
                        category1, category2, work_name,
                        unit_price, quantity, total_amount,
                        status, source_month, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                    "#,
                )?;
                for record in chunk {
                    stmt.execute(params![
                        record.record_id,
                        record.work_date.format("%Y-%m-%d").to_string(),
                        record.staff_name,
                        record.department,
                        record.category1,
                        record.category2,
                        record.work_name,
                        record.unit_price,
                        record.quantity,
                        record.total_amount,
                        record.status,
                        record.source_month,
                        record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    ])?;
                    inserted += 1;
                }
            }
            Ok(inserted)
        })();

        match result {
            Ok(inserted) => {
                conn.execute_batch("COMMIT")
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(inserted)
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// フィルタ付きの全レコード取得
    pub fn find_filtered(&self, filter: &RecordFilter) -> RepositoryResult<Vec<WorkRecord>> {
        let conn = self.get_conn()?;
        let (where_sql, bindings) = filter.where_clause();

        let sql = format!(
            r#"
            SELECT
                record_id, work_date, staff_name, department,
                category1, category2, work_name,
                unit_price, quantity, total_amount,
                status, source_month, created_at
            FROM work_record{}
            ORDER BY work_date, staff_name
            "#,
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(bindings.iter()), |row| {
                Ok(WorkRecord {
                    record_id: row.get(0)?,
                    work_date: parse_date(&row.get::<_, String>(1)?),
                    staff_name: row.get(2)?,
                    department: row.get(3)?,
                    category1: row.get(4)?,
                    category2: row.get(5)?,
                    work_name: row.get(6)?,
                    unit_price: row.get(7)?,
                    quantity: row.get(8)?,
                    total_amount: row.get(9)?,
                    status: row.get(10)?,
                    source_month: row.get(11)?,
                    created_at: parse_datetime(&row.get::<_, String>(12)?),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    /// フィルタ付きの合計（時間, 金額）
    pub fn total_hours_and_amount(&self, filter: &RecordFilter) -> RepositoryResult<(f64, f64)> {
        let conn = self.get_conn()?;
        let (where_sql, bindings) = filter.where_clause();

        let sql = format!(
            "SELECT COALESCE(SUM(quantity), 0), COALESCE(SUM(total_amount), 0) FROM work_record{}",
            where_sql
        );

        let totals = conn.query_row(&sql, params_from_iter(bindings.iter()), |row| {
            Ok((row.get::<_, f64>(0)?, row.get::<_, f64>(1)?))
        })?;

        Ok(totals)
    }

    /// フィルタ付きのユニーク業務名数
    pub fn distinct_work_name_count(&self, filter: &RecordFilter) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let (where_sql, bindings) = filter.where_clause();

        let sql = format!(
            "SELECT COUNT(DISTINCT work_name) FROM work_record{}",
            where_sql
        );

        let count = conn.query_row(&sql, params_from_iter(bindings.iter()), |row| {
            row.get::<_, i64>(0)
        })?;

        Ok(count)
    }

    /// 分類1の一覧（重複なし、昇順）
    pub fn distinct_category1(&self) -> RepositoryResult<Vec<String>> {
        self.distinct_column("category1")
    }

    /// 担当者名の一覧（重複なし、昇順）
    ///
    /// category1 を指定した場合はその分類1のレコードに限定する。
    pub fn distinct_staff(&self, category1: Option<&str>) -> RepositoryResult<Vec<String>> {
        match category1.filter(|s| !s.is_empty()) {
            None => self.distinct_column("staff_name"),
            Some(c1) => {
                let conn = self.get_conn()?;
                let mut stmt = conn.prepare(
                    r#"
                    SELECT DISTINCT staff_name FROM work_record
                    WHERE category1 = ?1 AND staff_name != ''
                    ORDER BY staff_name
                    "#,
                )?;
                let values = stmt
                    .query_map(params![c1], |row| row.get::<_, String>(0))?
                    .collect::<SqliteResult<Vec<_>>>()?;
                Ok(values)
            }
        }
    }

    /// 部門の一覧（重複なし、昇順）
    pub fn distinct_departments(&self) -> RepositoryResult<Vec<String>> {
        self.distinct_column("department")
    }

    fn distinct_column(&self, column: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        // column は本モジュール内の固定値のみ（SQL 組立に外部入力を使わない）
        let sql = format!(
            "SELECT DISTINCT {col} FROM work_record WHERE {col} IS NOT NULL AND {col} != '' ORDER BY {col}",
            col = column
        );
        let mut stmt = conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(values)
    }

    /// データ全体の日付範囲（最小日, 最大日）
    pub fn date_range(&self) -> RepositoryResult<Option<(NaiveDate, NaiveDate)>> {
        let conn = self.get_conn()?;
        let row: (Option<String>, Option<String>) = conn.query_row(
            "SELECT MIN(work_date), MAX(work_date) FROM work_record",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        match row {
            (Some(min), Some(max)) => Ok(Some((parse_date(&min), parse_date(&max)))),
            _ => Ok(None),
        }
    }

    /// (分類2, 業務名) 単位の集計
    pub fn aggregate_by_work(&self, filter: &RecordFilter) -> RepositoryResult<Vec<WorkAggRow>> {
        let conn = self.get_conn()?;
        let (where_sql, bindings) = filter.where_clause();

        let sql = format!(
            r#"
            SELECT
                MIN(category1), category2, work_name,
                COALESCE(SUM(quantity), 0),
                COALESCE(SUM(total_amount), 0),
                COUNT(*)
            FROM work_record{}
            GROUP BY category2, work_name
            ORDER BY SUM(quantity) DESC
            "#,
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(bindings.iter()), |row| {
                Ok(WorkAggRow {
                    category1: row.get(0)?,
                    category2: row.get(1)?,
                    work_name: row.get(2)?,
                    hours: row.get(3)?,
                    amount: row.get(4)?,
                    record_count: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 日別 × (分類2, 業務名) の集計
    pub fn aggregate_by_day(&self, filter: &RecordFilter) -> RepositoryResult<Vec<DailyAggRow>> {
        let conn = self.get_conn()?;
        let (where_sql, bindings) = filter.where_clause();

        let sql = format!(
            r#"
            SELECT work_date, category2, work_name, COALESCE(SUM(quantity), 0)
            FROM work_record{}
            GROUP BY work_date, category2, work_name
            ORDER BY work_date
            "#,
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(bindings.iter()), |row| {
                Ok(DailyAggRow {
                    work_date: parse_date(&row.get::<_, String>(0)?),
                    category2: row.get(1)?,
                    work_name: row.get(2)?,
                    hours: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 部門 × 担当者 × (分類2, 業務名) の集計（部門サマリー用）
    pub fn aggregate_by_staff(&self, filter: &RecordFilter) -> RepositoryResult<Vec<StaffAggRow>> {
        let conn = self.get_conn()?;
        let (where_sql, bindings) = filter.where_clause();

        let sql = format!(
            r#"
            SELECT department, staff_name, category2, work_name, COALESCE(SUM(quantity), 0)
            FROM work_record{}
            GROUP BY department, staff_name, category2, work_name
            ORDER BY department, staff_name
            "#,
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(bindings.iter()), |row| {
                Ok(StaffAggRow {
                    department: row.get(0)?,
                    staff_name: row.get(1)?,
                    category2: row.get(2)?,
                    work_name: row.get(3)?,
                    hours: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// (分類1, 分類2, 業務名) のユニーク組合せ（件数降順）
    pub fn unique_combinations(&self, limit: i64) -> RepositoryResult<Vec<UniqueCombination>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category1, category2, work_name, COUNT(*)
            FROM work_record
            GROUP BY category1, category2, work_name
            ORDER BY COUNT(*) DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(UniqueCombination {
                    category1: row.get(0)?,
                    category2: row.get(1)?,
                    work_name: row.get(2)?,
                    record_count: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 業務名または分類2にキーワードを含むレコード数
    ///
    /// キーワード提案のヒット数算出に使用。LIKE のメタ文字はエスケープする。
    pub fn count_matching(&self, keyword: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let escaped = keyword.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let pattern = format!("%{}%", escaped);

        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM work_record
            WHERE work_name LIKE ?1 ESCAPE '\'
               OR category2 LIKE ?1 ESCAPE '\'
            "#,
            params![pattern],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// キーワードに一致する最初のレコードの (分類2, 業務名)
    ///
    /// 提案キーワードの現在の分類先を判定するためのサンプル取得。
    pub fn first_matching(
        &self,
        keyword: &str,
    ) -> RepositoryResult<Option<(Option<String>, Option<String>)>> {
        let conn = self.get_conn()?;
        let escaped = keyword.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let pattern = format!("%{}%", escaped);

        let mut stmt = conn.prepare(
            r#"
            SELECT category2, work_name
            FROM work_record
            WHERE work_name LIKE ?1 ESCAPE '\'
               OR category2 LIKE ?1 ESCAPE '\'
            LIMIT 1
            "#,
        )?;
        let mut rows = stmt.query_map(params![pattern], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?))
        })?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}

// ===== 日付パースヘルパ =====

pub(crate) fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

pub(crate) fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap_or_default()
}
