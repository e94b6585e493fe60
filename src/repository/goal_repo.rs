// ==========================================
// 業務時間分析ダッシュボード - 目標リポジトリ
// ==========================================
// 責務: reduction_goal / monthly_goal / monthly_business_item /
//       task_reduction_target テーブルの CRUD
// ==========================================

use crate::domain::goal::{
    MonthlyBusinessItem, MonthlyGoal, ReductionGoal, ReductionGoalWithCategory,
};
use crate::domain::types::GoalType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// ReductionGoalRepository
// ==========================================

/// 削減目標リポジトリ
pub struct ReductionGoalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReductionGoalRepository {
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

    /// 目標一覧（カテゴリ名付き、作成日時降順）
    pub fn list_all(&self) -> RepositoryResult<Vec<ReductionGoalWithCategory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT g.goal_id, g.goal_type, g.target_percent, g.baseline_hours,
                   g.baseline_start, g.baseline_end, g.category_id, g.staff_name,
                   g.is_active, g.created_at, g.updated_at, c.name
            FROM reduction_goal g
            LEFT JOIN display_category c ON c.category_id = g.category_id
            ORDER BY g.created_at DESC
            "#,
        )?;

        let goals = stmt
            .query_map([], |row| {
                Ok(ReductionGoalWithCategory {
                    goal: map_goal_row(row)?,
                    category_name: row.get(11)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(goals)
    }

    /// 有効な目標のみ取得
    pub fn list_active(&self) -> RepositoryResult<Vec<ReductionGoal>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT goal_id, goal_type, target_percent, baseline_hours,
                   baseline_start, baseline_end, category_id, staff_name,
                   is_active, created_at, updated_at
            FROM reduction_goal
            WHERE is_active = 1
            ORDER BY created_at DESC
            "#,
        )?;

        let goals = stmt
            .query_map([], map_goal_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(goals)
    }

    /// ID で目標を取得
    pub fn find_by_id(&self, goal_id: &str) -> RepositoryResult<ReductionGoal> {
        let conn = self.get_conn()?;
        let goal = conn
            .query_row(
                r#"
                SELECT goal_id, goal_type, target_percent, baseline_hours,
                       baseline_start, baseline_end, category_id, staff_name,
                       is_active, created_at, updated_at
                FROM reduction_goal
                WHERE goal_id = ?1
                "#,
                params![goal_id],
                map_goal_row,
            )
            .optional()?;

        goal.ok_or_else(|| RepositoryError::NotFound {
            entity: "削減目標".to_string(),
            id: goal_id.to_string(),
        })
    }

    /// 目標を作成
    pub fn create(&self, goal: &ReductionGoal) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO reduction_goal (
                goal_id, goal_type, target_percent, baseline_hours,
                baseline_start, baseline_end, category_id, staff_name,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                goal.goal_id,
                goal.goal_type.to_string(),
                goal.target_percent,
                goal.baseline_hours,
                goal.baseline_start.map(|d| d.format("%Y-%m-%d").to_string()),
                goal.baseline_end.map(|d| d.format("%Y-%m-%d").to_string()),
                goal.category_id,
                goal.staff_name,
                goal.is_active,
                goal.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                goal.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// 目標を更新
    pub fn update(&self, goal: &ReductionGoal) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE reduction_goal
            SET goal_type = ?2, target_percent = ?3, baseline_hours = ?4,
                baseline_start = ?5, baseline_end = ?6, category_id = ?7,
                staff_name = ?8, is_active = ?9, updated_at = ?10
            WHERE goal_id = ?1
            "#,
            params![
                goal.goal_id,
                goal.goal_type.to_string(),
                goal.target_percent,
                goal.baseline_hours,
                goal.baseline_start.map(|d| d.format("%Y-%m-%d").to_string()),
                goal.baseline_end.map(|d| d.format("%Y-%m-%d").to_string()),
                goal.category_id,
                goal.staff_name,
                goal.is_active,
                Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "削減目標".to_string(),
                id: goal.goal_id.clone(),
            });
        }
        Ok(())
    }

    /// 目標を削除
    pub fn delete(&self, goal_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM reduction_goal WHERE goal_id = ?1",
            params![goal_id],
        )?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound {
                entity: "削減目標".to_string(),
                id: goal_id.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// MonthlyGoalRepository
// ==========================================

/// 月次目標・月次通常業務リポジトリ
///
/// (部門, 担当者, 年月, 連番) を自然キーとして UPSERT する。
pub struct MonthlyGoalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MonthlyGoalRepository {
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

    /// 月次目標を UPSERT
    pub fn upsert_goal(&self, goal: &MonthlyGoal) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO monthly_goal (
                goal_id, department, staff_name, year_month, goal_index,
                goal_name, progress_percent, details, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(department, staff_name, year_month, goal_index)
            DO UPDATE SET goal_name = ?6, progress_percent = ?7, details = ?8, updated_at = ?9
            "#,
            params![
                goal.goal_id,
                goal.department,
                goal.staff_name,
                goal.year_month,
                goal.goal_index,
                goal.goal_name,
                goal.progress_percent,
                goal.details,
                Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// 月次通常業務項目を UPSERT
    pub fn upsert_item(&self, item: &MonthlyBusinessItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO monthly_business_item (
                item_id, department, staff_name, year_month, item_index,
                item_name, progress_percent, details, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(department, staff_name, year_month, item_index)
            DO UPDATE SET item_name = ?6, progress_percent = ?7, details = ?8, updated_at = ?9
            "#,
            params![
                item.item_id,
                item.department,
                item.staff_name,
                item.year_month,
                item.item_index,
                item.item_name,
                item.progress_percent,
                item.details,
                Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// 月次目標一覧（部門と年月で絞り込み、担当者は任意）
    pub fn list_goals(
        &self,
        department: &str,
        year_month: &str,
        staff_name: Option<&str>,
    ) -> RepositoryResult<Vec<MonthlyGoal>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"
            SELECT goal_id, department, staff_name, year_month, goal_index,
                   goal_name, progress_percent, details, updated_at
            FROM monthly_goal
            WHERE department = ?1 AND year_month = ?2
            "#,
        );
        let mut bindings: Vec<String> = vec![department.to_string(), year_month.to_string()];
        if let Some(staff) = staff_name {
            bindings.push(staff.to_string());
            sql.push_str(" AND staff_name = ?3");
        }
        sql.push_str(" ORDER BY staff_name, goal_index");

        let mut stmt = conn.prepare(&sql)?;
        let goals = stmt
            .query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
                Ok(MonthlyGoal {
                    goal_id: row.get(0)?,
                    department: row.get(1)?,
                    staff_name: row.get(2)?,
                    year_month: row.get(3)?,
                    goal_index: row.get(4)?,
                    goal_name: row.get(5)?,
                    progress_percent: row.get(6)?,
                    details: row.get(7)?,
                    updated_at: super::record_repo::parse_datetime(&row.get::<_, String>(8)?),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(goals)
    }

    /// 月次通常業務項目一覧（部門と年月で絞り込み、担当者は任意）
    pub fn list_items(
        &self,
        department: &str,
        year_month: &str,
        staff_name: Option<&str>,
    ) -> RepositoryResult<Vec<MonthlyBusinessItem>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"
            SELECT item_id, department, staff_name, year_month, item_index,
                   item_name, progress_percent, details, updated_at
            FROM monthly_business_item
            WHERE department = ?1 AND year_month = ?2
            "#,
        );
        let mut bindings: Vec<String> = vec![department.to_string(), year_month.to_string()];
        if let Some(staff) = staff_name {
            bindings.push(staff.to_string());
            sql.push_str(" AND staff_name = ?3");
        }
        sql.push_str(" ORDER BY staff_name, item_index");

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
                Ok(MonthlyBusinessItem {
                    item_id: row.get(0)?,
                    department: row.get(1)?,
                    staff_name: row.get(2)?,
                    year_month: row.get(3)?,
                    item_index: row.get(4)?,
                    item_name: row.get(5)?,
                    progress_percent: row.get(6)?,
                    details: row.get(7)?,
                    updated_at: super::record_repo::parse_datetime(&row.get::<_, String>(8)?),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(items)
    }

    /// 登録済みの年月一覧（降順）
    pub fn list_year_months(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT year_month FROM monthly_goal ORDER BY year_month DESC",
        )?;
        let months = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(months)
    }
}

// ==========================================
// TaskReductionTargetRepository
// ==========================================

/// 業務名単位の削減対象フラグリポジトリ
///
/// 行が存在する業務名 = 削減対象。トグルは挿入 / 削除で表現する。
pub struct TaskReductionTargetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TaskReductionTargetRepository {
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

    /// 削減対象の業務名一覧
    pub fn list_all(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT work_name FROM task_reduction_target ORDER BY work_name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(names)
    }

    /// 削減対象かどうか
    pub fn is_target(&self, work_name: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM task_reduction_target WHERE work_name = ?1",
                params![work_name],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    /// フラグをトグルし、変更後の状態を返す
    pub fn toggle(&self, work_name: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM task_reduction_target WHERE work_name = ?1",
            params![work_name],
        )?;

        if deleted > 0 {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO task_reduction_target (work_name) VALUES (?1)",
            params![work_name],
        )?;
        Ok(true)
    }

    /// 複数の業務名を一括で設定 / 解除
    pub fn bulk_set(&self, work_names: &[String], is_target: bool) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let mut changed = 0usize;

        for work_name in work_names {
            if is_target {
                changed += conn.execute(
                    "INSERT OR IGNORE INTO task_reduction_target (work_name) VALUES (?1)",
                    params![work_name],
                )?;
            } else {
                changed += conn.execute(
                    "DELETE FROM task_reduction_target WHERE work_name = ?1",
                    params![work_name],
                )?;
            }
        }

        Ok(changed)
    }
}

// ===== 行マッピング =====

fn map_goal_row(row: &rusqlite::Row<'_>) -> SqliteResult<ReductionGoal> {
    let goal_type_text: String = row.get(1)?;
    let start: Option<String> = row.get(4)?;
    let end: Option<String> = row.get(5)?;
    Ok(ReductionGoal {
        goal_id: row.get(0)?,
        goal_type: goal_type_text.parse().unwrap_or(GoalType::Global),
        target_percent: row.get(2)?,
        baseline_hours: row.get(3)?,
        baseline_start: start.map(|s| super::record_repo::parse_date(&s)),
        baseline_end: end.map(|s| super::record_repo::parse_date(&s)),
        category_id: row.get(6)?,
        staff_name: row.get(7)?,
        is_active: row.get(8)?,
        created_at: super::record_repo::parse_datetime(&row.get::<_, String>(9)?),
        updated_at: super::record_repo::parse_datetime(&row.get::<_, String>(10)?),
    })
}
