// ==========================================
// 業務時間分析ダッシュボード - 判定ルールリポジトリ
// ==========================================
// 責務: unit_type_rule / sub_category_rule テーブルの CRUD と初期ルール投入
// ==========================================

use crate::domain::category::{SubCategoryRule, SubCategoryRuleWithParent, UnitTypeRule};
use crate::domain::types::{RuleMatchType, UnitType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 単位種別ルールの初期データ（キーワード, 単位種別, 一致方式, 優先度）
const DEFAULT_UNIT_RULES: &[(&str, UnitType, RuleMatchType, i32)] = &[
    // 時間制（MTG・会議・対応系）
    ("MTG", UnitType::Hours, RuleMatchType::Contains, 20),
    ("会議", UnitType::Hours, RuleMatchType::Contains, 20),
    ("ミーティング", UnitType::Hours, RuleMatchType::Contains, 20),
    ("打ち合わせ", UnitType::Hours, RuleMatchType::Contains, 20),
    ("打合せ", UnitType::Hours, RuleMatchType::Contains, 20),
    ("面談", UnitType::Hours, RuleMatchType::Contains, 20),
    ("研修", UnitType::Hours, RuleMatchType::Contains, 20),
    ("移動", UnitType::Hours, RuleMatchType::Contains, 20),
    ("対応", UnitType::Hours, RuleMatchType::Suffix, 15),
    // 件数制（入力・作成・チェック系）
    ("入力", UnitType::Count, RuleMatchType::Suffix, 15),
    ("作成", UnitType::Count, RuleMatchType::Suffix, 15),
    ("チェック", UnitType::Count, RuleMatchType::Suffix, 15),
    ("確認", UnitType::Count, RuleMatchType::Suffix, 15),
    ("処理", UnitType::Count, RuleMatchType::Suffix, 15),
    ("登録", UnitType::Count, RuleMatchType::Suffix, 15),
    ("発注", UnitType::Count, RuleMatchType::Suffix, 15),
    ("手配", UnitType::Count, RuleMatchType::Suffix, 15),
];

/// サブカテゴリルールの初期データ（サブカテゴリ名, キーワード, 一致方式, 優先度）
///
/// 親カテゴリは投入時に「コア業務」を解決して紐付ける。
const DEFAULT_SUB_CATEGORY_RULES: &[(&str, &str, RuleMatchType, i32)] = &[
    // 制作系
    ("制作系", "ノート作成", RuleMatchType::Contains, 20),
    ("制作系", "書類作成", RuleMatchType::Contains, 20),
    ("制作系", "資料作成", RuleMatchType::Contains, 20),
    ("制作系", "作成", RuleMatchType::Suffix, 10),
    // 専門作業系
    ("専門作業系", "Wチェック", RuleMatchType::Contains, 20),
    ("専門作業系", "レセチェック", RuleMatchType::Contains, 20),
    ("専門作業系", "チェック", RuleMatchType::Suffix, 10),
    // 顧客対応系
    ("顧客対応系", "電話対応", RuleMatchType::Contains, 20),
    ("顧客対応系", "メール対応", RuleMatchType::Contains, 20),
    ("顧客対応系", "TEL対応", RuleMatchType::Contains, 20),
    ("顧客対応系", "対応", RuleMatchType::Suffix, 10),
    // 技術系
    ("技術系", "施工", RuleMatchType::Contains, 15),
    ("技術系", "技工", RuleMatchType::Contains, 15),
    // 入力系
    ("入力系", "ノート入力", RuleMatchType::Contains, 20),
    ("入力系", "入力", RuleMatchType::Suffix, 10),
];

// ==========================================
// UnitTypeRuleRepository
// ==========================================

/// 単位種別ルールリポジトリ
pub struct UnitTypeRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UnitTypeRuleRepository {
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

    /// ルール一覧（優先度降順 → キーワード昇順）
    pub fn list_all(&self) -> RepositoryResult<Vec<UnitTypeRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT rule_id, keyword, unit_type, match_type, priority, is_active, created_at
            FROM unit_type_rule
            ORDER BY priority DESC, keyword
            "#,
        )?;

        let rules = stmt
            .query_map([], map_unit_rule_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rules)
    }

    /// 有効なルールを優先度降順で取得（判定エンジン用）
    pub fn list_active(&self) -> RepositoryResult<Vec<UnitTypeRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT rule_id, keyword, unit_type, match_type, priority, is_active, created_at
            FROM unit_type_rule
            WHERE is_active = 1
            ORDER BY priority DESC, keyword
            "#,
        )?;

        let rules = stmt
            .query_map([], map_unit_rule_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rules)
    }

    /// ID でルールを取得
    pub fn find_by_id(&self, rule_id: &str) -> RepositoryResult<UnitTypeRule> {
        let conn = self.get_conn()?;
        let rule = conn
            .query_row(
                r#"
                SELECT rule_id, keyword, unit_type, match_type, priority, is_active, created_at
                FROM unit_type_rule
                WHERE rule_id = ?1
                "#,
                params![rule_id],
                map_unit_rule_row,
            )
            .optional()?;

        rule.ok_or_else(|| RepositoryError::NotFound {
            entity: "単位種別ルール".to_string(),
            id: rule_id.to_string(),
        })
    }

    /// ルールを作成
    pub fn create(&self, rule: &UnitTypeRule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO unit_type_rule (
                rule_id, keyword, unit_type, match_type, priority, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                rule.rule_id,
                rule.keyword,
                rule.unit_type.to_string(),
                rule.match_type.to_string(),
                rule.priority,
                rule.is_active,
                rule.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// ルールを更新
    pub fn update(&self, rule: &UnitTypeRule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE unit_type_rule
            SET keyword = ?2, unit_type = ?3, match_type = ?4, priority = ?5, is_active = ?6
            WHERE rule_id = ?1
            "#,
            params![
                rule.rule_id,
                rule.keyword,
                rule.unit_type.to_string(),
                rule.match_type.to_string(),
                rule.priority,
                rule.is_active,
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "単位種別ルール".to_string(),
                id: rule.rule_id.clone(),
            });
        }
        Ok(())
    }

    /// ルールを削除
    pub fn delete(&self, rule_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM unit_type_rule WHERE rule_id = ?1",
            params![rule_id],
        )?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound {
                entity: "単位種別ルール".to_string(),
                id: rule_id.to_string(),
            });
        }
        Ok(())
    }

    /// 初期ルールを投入（キーワード重複はスキップ）。追加した件数を返す。
    pub fn seed_defaults(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut added = 0usize;

        for (keyword, unit_type, match_type, priority) in DEFAULT_UNIT_RULES {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM unit_type_rule WHERE keyword = ?1 LIMIT 1",
                    params![keyword],
                    |_row| Ok(true),
                )
                .optional()?
                .unwrap_or(false);
            if exists {
                continue;
            }

            conn.execute(
                r#"
                INSERT INTO unit_type_rule (
                    rule_id, keyword, unit_type, match_type, priority, is_active, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)
                "#,
                params![
                    Uuid::new_v4().to_string(),
                    keyword,
                    unit_type.to_string(),
                    match_type.to_string(),
                    priority,
                    now,
                ],
            )?;
            added += 1;
        }

        Ok(added)
    }
}

// ==========================================
// SubCategoryRuleRepository
// ==========================================

/// サブカテゴリルールリポジトリ
pub struct SubCategoryRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SubCategoryRuleRepository {
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

    /// ルール一覧（優先度降順 → キーワード昇順、親カテゴリ名付き）
    pub fn list_all(&self) -> RepositoryResult<Vec<SubCategoryRuleWithParent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT r.rule_id, r.keyword, r.sub_category_name, r.parent_category_id,
                   r.match_type, r.priority, r.is_active, r.created_at, c.name
            FROM sub_category_rule r
            LEFT JOIN display_category c ON c.category_id = r.parent_category_id
            ORDER BY r.priority DESC, r.keyword
            "#,
        )?;

        let rules = stmt
            .query_map([], |row| {
                Ok(SubCategoryRuleWithParent {
                    rule: map_sub_rule_row(row)?,
                    parent_category_name: row.get(8)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rules)
    }

    /// 有効なルールを優先度降順で取得（判定エンジン用）
    pub fn list_active(&self) -> RepositoryResult<Vec<SubCategoryRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT rule_id, keyword, sub_category_name, parent_category_id,
                   match_type, priority, is_active, created_at
            FROM sub_category_rule
            WHERE is_active = 1
            ORDER BY priority DESC, keyword
            "#,
        )?;

        let rules = stmt
            .query_map([], map_sub_rule_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rules)
    }

    /// ID でルールを取得
    pub fn find_by_id(&self, rule_id: &str) -> RepositoryResult<SubCategoryRule> {
        let conn = self.get_conn()?;
        let rule = conn
            .query_row(
                r#"
                SELECT rule_id, keyword, sub_category_name, parent_category_id,
                       match_type, priority, is_active, created_at
                FROM sub_category_rule
                WHERE rule_id = ?1
                "#,
                params![rule_id],
                map_sub_rule_row,
            )
            .optional()?;

        rule.ok_or_else(|| RepositoryError::NotFound {
            entity: "サブカテゴリルール".to_string(),
            id: rule_id.to_string(),
        })
    }

    /// ルールを作成
    pub fn create(&self, rule: &SubCategoryRule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sub_category_rule (
                rule_id, keyword, sub_category_name, parent_category_id,
                match_type, priority, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                rule.rule_id,
                rule.keyword,
                rule.sub_category_name,
                rule.parent_category_id,
                rule.match_type.to_string(),
                rule.priority,
                rule.is_active,
                rule.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// ルールを更新
    pub fn update(&self, rule: &SubCategoryRule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE sub_category_rule
            SET keyword = ?2, sub_category_name = ?3, parent_category_id = ?4,
                match_type = ?5, priority = ?6, is_active = ?7
            WHERE rule_id = ?1
            "#,
            params![
                rule.rule_id,
                rule.keyword,
                rule.sub_category_name,
                rule.parent_category_id,
                rule.match_type.to_string(),
                rule.priority,
                rule.is_active,
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "サブカテゴリルール".to_string(),
                id: rule.rule_id.clone(),
            });
        }
        Ok(())
    }

    /// ルールを削除
    pub fn delete(&self, rule_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM sub_category_rule WHERE rule_id = ?1",
            params![rule_id],
        )?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound {
                entity: "サブカテゴリルール".to_string(),
                id: rule_id.to_string(),
            });
        }
        Ok(())
    }

    /// 初期ルールを投入（キーワード + サブカテゴリ名の重複はスキップ）。追加した件数を返す。
    ///
    /// parent_category_id には「コア業務」カテゴリを解決して設定する（存在しない場合は NULL）。
    pub fn seed_defaults(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let core_id: Option<String> = conn
            .query_row(
                "SELECT category_id FROM display_category WHERE name = 'コア業務'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut added = 0usize;

        for (sub_category_name, keyword, match_type, priority) in DEFAULT_SUB_CATEGORY_RULES {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM sub_category_rule WHERE keyword = ?1 AND sub_category_name = ?2 LIMIT 1",
                    params![keyword, sub_category_name],
                    |_row| Ok(true),
                )
                .optional()?
                .unwrap_or(false);
            if exists {
                continue;
            }

            conn.execute(
                r#"
                INSERT INTO sub_category_rule (
                    rule_id, keyword, sub_category_name, parent_category_id,
                    match_type, priority, is_active, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)
                "#,
                params![
                    Uuid::new_v4().to_string(),
                    keyword,
                    sub_category_name,
                    core_id,
                    match_type.to_string(),
                    priority,
                    now,
                ],
            )?;
            added += 1;
        }

        Ok(added)
    }
}

// ===== 行マッピング =====

fn map_unit_rule_row(row: &rusqlite::Row<'_>) -> SqliteResult<UnitTypeRule> {
    let unit_type_text: String = row.get(2)?;
    let match_type_text: String = row.get(3)?;
    Ok(UnitTypeRule {
        rule_id: row.get(0)?,
        keyword: row.get(1)?,
        unit_type: unit_type_text.parse().unwrap_or(UnitType::Hours),
        match_type: match_type_text.parse().unwrap_or(RuleMatchType::Suffix),
        priority: row.get(4)?,
        is_active: row.get(5)?,
        created_at: super::record_repo::parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn map_sub_rule_row(row: &rusqlite::Row<'_>) -> SqliteResult<SubCategoryRule> {
    let match_type_text: String = row.get(4)?;
    Ok(SubCategoryRule {
        rule_id: row.get(0)?,
        keyword: row.get(1)?,
        sub_category_name: row.get(2)?,
        parent_category_id: row.get(3)?,
        match_type: match_type_text.parse().unwrap_or(RuleMatchType::Contains),
        priority: row.get(5)?,
        is_active: row.get(6)?,
        created_at: super::record_repo::parse_datetime(&row.get::<_, String>(7)?),
    })
}
