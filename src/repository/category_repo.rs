// ==========================================
// 業務時間分析ダッシュボード - 表示カテゴリリポジトリ
// ==========================================
// 責務: display_category / category_keyword テーブルの CRUD と初期データ投入
// ==========================================

use crate::domain::category::{
    CategoryKeyword, CategoryKeywordWithName, DisplayCategory, DisplayCategoryWithCount,
};
use crate::domain::types::{MatchType, ValueRank};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 表示カテゴリの初期データ（名前, 基調色, バッジ背景色, バッジ文字色, ランク, 削減対象, 表示順）
const DEFAULT_CATEGORIES: &[(&str, &str, &str, &str, ValueRank, bool, i64)] = &[
    ("コア業務", "#3B82F6", "#dbeafe", "#1d4ed8", ValueRank::S, false, 1),
    ("MTG", "#8B5CF6", "#ede9fe", "#6d28d9", ValueRank::A, false, 2),
    ("事務", "#6B7280", "#f3f4f6", "#374151", ValueRank::B, false, 3),
    ("その他", "#EF4444", "#fee2e2", "#dc2626", ValueRank::C, true, 4),
    ("移動", "#F97316", "#ffedd5", "#ea580c", ValueRank::C, true, 5),
];

/// 分類キーワードの初期データ（キーワード, カテゴリ名, 優先度）
const DEFAULT_KEYWORDS: &[(&str, &str, i32)] = &[
    // MTG（優先度30: 明確に判別可能）
    ("mtg", "MTG", 30),
    ("面談", "MTG", 30),
    ("打ち合わせ", "MTG", 30),
    ("会議", "MTG", 30),
    ("ミーティング", "MTG", 30),
    // 移動（優先度25）
    ("移動", "移動", 25),
    ("出張", "移動", 25),
    // コア業務（優先度20: 営業・電話対応）
    ("営業", "コア業務", 20),
    ("電話", "コア業務", 20),
    ("tel", "コア業務", 20),
    // コア業務（優先度15: 〇〇対応）
    ("対応", "コア業務", 15),
    // 事務（優先度15: 汎用的なので低め）
    ("事務", "事務", 15),
    ("チェック", "事務", 15),
    ("確認", "事務", 15),
    ("集計", "事務", 15),
    ("入力", "事務", 15),
    // その他（優先度5: 最後の手段）
    ("その他", "その他", 5),
    ("雑務", "その他", 5),
    ("待機", "その他", 5),
    ("不明", "その他", 5),
];

// ==========================================
// DisplayCategoryRepository
// ==========================================

/// 表示カテゴリリポジトリ
pub struct DisplayCategoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DisplayCategoryRepository {
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

    /// カテゴリ一覧（キーワード数付き、表示順）
    pub fn list_with_counts(&self) -> RepositoryResult<Vec<DisplayCategoryWithCount>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                c.category_id, c.name, c.color, c.badge_bg_color, c.badge_text_color,
                c.rank, c.is_reduction_target, c.sort_order, c.created_at, c.updated_at,
                COUNT(k.keyword_id)
            FROM display_category c
            LEFT JOIN category_keyword k ON k.display_category_id = c.category_id
            GROUP BY c.category_id
            ORDER BY c.sort_order, c.name
            "#,
        )?;

        let categories = stmt
            .query_map([], |row| {
                Ok(DisplayCategoryWithCount {
                    category: map_category_row(row)?,
                    keyword_count: row.get(10)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(categories)
    }

    /// カテゴリ一覧（表示順）
    pub fn list_all(&self) -> RepositoryResult<Vec<DisplayCategory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category_id, name, color, badge_bg_color, badge_text_color,
                   rank, is_reduction_target, sort_order, created_at, updated_at
            FROM display_category
            ORDER BY sort_order, name
            "#,
        )?;

        let categories = stmt
            .query_map([], map_category_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(categories)
    }

    /// ID でカテゴリを取得
    pub fn find_by_id(&self, category_id: &str) -> RepositoryResult<DisplayCategory> {
        let conn = self.get_conn()?;
        let category = conn
            .query_row(
                r#"
                SELECT category_id, name, color, badge_bg_color, badge_text_color,
                       rank, is_reduction_target, sort_order, created_at, updated_at
                FROM display_category
                WHERE category_id = ?1
                "#,
                params![category_id],
                map_category_row,
            )
            .optional()?;

        category.ok_or_else(|| RepositoryError::NotFound {
            entity: "表示カテゴリ".to_string(),
            id: category_id.to_string(),
        })
    }

    /// 名前でカテゴリを取得
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<DisplayCategory>> {
        let conn = self.get_conn()?;
        let category = conn
            .query_row(
                r#"
                SELECT category_id, name, color, badge_bg_color, badge_text_color,
                       rank, is_reduction_target, sort_order, created_at, updated_at
                FROM display_category
                WHERE name = ?1
                "#,
                params![name],
                map_category_row,
            )
            .optional()?;

        Ok(category)
    }

    /// 現在の最大表示順
    pub fn max_sort_order(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let max: Option<i64> = conn.query_row(
            "SELECT MAX(sort_order) FROM display_category",
            [],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0))
    }

    /// カテゴリ登録数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM display_category", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 削減対象カテゴリ数
    pub fn count_reduction_targets(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM display_category WHERE is_reduction_target = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// カテゴリを作成
    pub fn create(&self, category: &DisplayCategory) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO display_category (
                category_id, name, color, badge_bg_color, badge_text_color,
                rank, is_reduction_target, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                category.category_id,
                category.name,
                category.color,
                category.badge_bg_color,
                category.badge_text_color,
                category.rank.to_string(),
                category.is_reduction_target,
                category.sort_order,
                category.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                category.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// カテゴリを更新（表示順は reorder で別途管理）
    pub fn update(&self, category: &DisplayCategory) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE display_category
            SET name = ?2, color = ?3, badge_bg_color = ?4, badge_text_color = ?5,
                rank = ?6, is_reduction_target = ?7, updated_at = ?8
            WHERE category_id = ?1
            "#,
            params![
                category.category_id,
                category.name,
                category.color,
                category.badge_bg_color,
                category.badge_text_color,
                category.rank.to_string(),
                category.is_reduction_target,
                Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "表示カテゴリ".to_string(),
                id: category.category_id.clone(),
            });
        }
        Ok(())
    }

    /// カテゴリを削除
    pub fn delete(&self, category_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM display_category WHERE category_id = ?1",
            params![category_id],
        )?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound {
                entity: "表示カテゴリ".to_string(),
                id: category_id.to_string(),
            });
        }
        Ok(())
    }

    /// カテゴリに紐付くキーワード数
    pub fn keyword_count(&self, category_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM category_keyword WHERE display_category_id = ?1",
            params![category_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 表示順を一括更新（指定 ID 順に 1 から振り直す）
    pub fn reorder(&self, ordered_ids: &[String]) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let result = (|| -> RepositoryResult<()> {
            let mut stmt = conn.prepare_cached(
                "UPDATE display_category SET sort_order = ?2, updated_at = ?3 WHERE category_id = ?1",
            )?;
            let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
            for (index, category_id) in ordered_ids.iter().enumerate() {
                stmt.execute(params![category_id, (index + 1) as i64, now])?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                conn.execute_batch("COMMIT")
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// 初期カテゴリ・キーワードを投入
    ///
    /// カテゴリが1件でも存在する場合は何もしない。投入した場合 true を返す。
    pub fn seed_defaults(&self) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let existing: i64 =
            conn.query_row("SELECT COUNT(*) FROM display_category", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(false);
        }

        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let result = (|| -> RepositoryResult<()> {
            let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();

            let mut category_ids: Vec<(&str, String)> = Vec::new();
            {
                let mut stmt = conn.prepare_cached(
                    r#"
                    INSERT INTO display_category (
                        category_id, name, color, badge_bg_color, badge_text_color,
                        rank, is_reduction_target, sort_order, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                )?;
                for (name, color, badge_bg, badge_text, rank, is_reduction, sort_order) in
                    DEFAULT_CATEGORIES
                {
                    let category_id = Uuid::new_v4().to_string();
                    stmt.execute(params![
                        category_id,
                        name,
                        color,
                        badge_bg,
                        badge_text,
                        rank.to_string(),
                        is_reduction,
                        sort_order,
                        now,
                        now,
                    ])?;
                    category_ids.push((name, category_id));
                }
            }

            let mut stmt = conn.prepare_cached(
                r#"
                INSERT INTO category_keyword (
                    keyword_id, keyword, display_category_id, match_type, priority, is_active, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;
            for (keyword, category_name, priority) in DEFAULT_KEYWORDS {
                let category_id = category_ids
                    .iter()
                    .find(|(name, _)| name == category_name)
                    .map(|(_, id)| id.clone())
                    .ok_or_else(|| {
                        RepositoryError::InternalError(format!(
                            "初期カテゴリが見つかりません: {}",
                            category_name
                        ))
                    })?;
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    keyword,
                    category_id,
                    MatchType::Contains.to_string(),
                    priority,
                    true,
                    now,
                ])?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                conn.execute_batch("COMMIT")
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(true)
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}

// ==========================================
// CategoryKeywordRepository
// ==========================================

/// 分類キーワードリポジトリ
pub struct CategoryKeywordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CategoryKeywordRepository {
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

    /// キーワード一覧（優先度降順 → キーワード昇順）
    ///
    /// category_id / active_only での絞り込みに対応。
    pub fn list(
        &self,
        category_id: Option<&str>,
        active_only: bool,
    ) -> RepositoryResult<Vec<CategoryKeywordWithName>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"
            SELECT k.keyword_id, k.keyword, k.display_category_id, k.match_type,
                   k.priority, k.is_active, k.created_at, c.name
            FROM category_keyword k
            JOIN display_category c ON c.category_id = k.display_category_id
            "#,
        );
        let mut clauses: Vec<String> = Vec::new();
        let mut bindings: Vec<String> = Vec::new();
        if let Some(id) = category_id {
            bindings.push(id.to_string());
            clauses.push(format!("k.display_category_id = ?{}", bindings.len()));
        }
        if active_only {
            clauses.push("k.is_active = 1".to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY k.priority DESC, k.keyword");

        let mut stmt = conn.prepare(&sql)?;
        let keywords = stmt
            .query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
                Ok(CategoryKeywordWithName {
                    keyword: map_keyword_row(row)?,
                    display_category_name: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(keywords)
    }

    /// 有効なキーワードを優先度降順で取得（分類エンジン用）
    pub fn list_active(&self) -> RepositoryResult<Vec<CategoryKeyword>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT keyword_id, keyword, display_category_id, match_type,
                   priority, is_active, created_at
            FROM category_keyword
            WHERE is_active = 1
            ORDER BY priority DESC, keyword
            "#,
        )?;

        let keywords = stmt
            .query_map([], map_keyword_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(keywords)
    }

    /// ID でキーワードを取得
    pub fn find_by_id(&self, keyword_id: &str) -> RepositoryResult<CategoryKeyword> {
        let conn = self.get_conn()?;
        let keyword = conn
            .query_row(
                r#"
                SELECT keyword_id, keyword, display_category_id, match_type,
                       priority, is_active, created_at
                FROM category_keyword
                WHERE keyword_id = ?1
                "#,
                params![keyword_id],
                map_keyword_row,
            )
            .optional()?;

        keyword.ok_or_else(|| RepositoryError::NotFound {
            entity: "分類キーワード".to_string(),
            id: keyword_id.to_string(),
        })
    }

    /// 文字列完全一致でキーワードを取得（重複チェック用）
    pub fn find_by_keyword(&self, keyword: &str) -> RepositoryResult<Option<CategoryKeyword>> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                r#"
                SELECT keyword_id, keyword, display_category_id, match_type,
                       priority, is_active, created_at
                FROM category_keyword
                WHERE keyword = ?1
                "#,
                params![keyword],
                map_keyword_row,
            )
            .optional()?;

        Ok(found)
    }

    /// 登録済みキーワード文字列の集合（小文字化済み）
    pub fn all_keyword_strings_lower(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT LOWER(keyword) FROM category_keyword")?;
        let keywords = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(keywords)
    }

    /// キーワード登録数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM category_keyword", [], |row| row.get(0))?;
        Ok(count)
    }

    /// キーワードを作成
    pub fn create(&self, keyword: &CategoryKeyword) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO category_keyword (
                keyword_id, keyword, display_category_id, match_type, priority, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                keyword.keyword_id,
                keyword.keyword,
                keyword.display_category_id,
                keyword.match_type.to_string(),
                keyword.priority,
                keyword.is_active,
                keyword.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// キーワードを更新
    pub fn update(&self, keyword: &CategoryKeyword) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE category_keyword
            SET keyword = ?2, display_category_id = ?3, match_type = ?4,
                priority = ?5, is_active = ?6
            WHERE keyword_id = ?1
            "#,
            params![
                keyword.keyword_id,
                keyword.keyword,
                keyword.display_category_id,
                keyword.match_type.to_string(),
                keyword.priority,
                keyword.is_active,
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "分類キーワード".to_string(),
                id: keyword.keyword_id.clone(),
            });
        }
        Ok(())
    }

    /// キーワードを削除
    pub fn delete(&self, keyword_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM category_keyword WHERE keyword_id = ?1",
            params![keyword_id],
        )?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound {
                entity: "分類キーワード".to_string(),
                id: keyword_id.to_string(),
            });
        }
        Ok(())
    }
}

// ===== 行マッピング =====

fn map_category_row(row: &rusqlite::Row<'_>) -> SqliteResult<DisplayCategory> {
    let rank_text: String = row.get(5)?;
    Ok(DisplayCategory {
        category_id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        badge_bg_color: row.get(3)?,
        badge_text_color: row.get(4)?,
        rank: rank_text.parse().unwrap_or(ValueRank::B),
        is_reduction_target: row.get(6)?,
        sort_order: row.get(7)?,
        created_at: super::record_repo::parse_datetime(&row.get::<_, String>(8)?),
        updated_at: super::record_repo::parse_datetime(&row.get::<_, String>(9)?),
    })
}

fn map_keyword_row(row: &rusqlite::Row<'_>) -> SqliteResult<CategoryKeyword> {
    let match_type_text: String = row.get(3)?;
    Ok(CategoryKeyword {
        keyword_id: row.get(0)?,
        keyword: row.get(1)?,
        display_category_id: row.get(2)?,
        match_type: match_type_text.parse().unwrap_or(MatchType::Contains),
        priority: row.get(4)?,
        is_active: row.get(5)?,
        created_at: super::record_repo::parse_datetime(&row.get::<_, String>(6)?),
    })
}
