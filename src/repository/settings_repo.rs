// ==========================================
// 業務時間分析ダッシュボード - アプリ設定リポジトリ
// ==========================================
// 責務: app_setting テーブル（型付き KV）の読み書き
// ==========================================

use crate::domain::settings::AppSetting;
use crate::domain::types::SettingType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// アプリ設定リポジトリ
pub struct AppSettingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AppSettingRepository {
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

    /// キーで設定を取得
    pub fn get(&self, key: &str) -> RepositoryResult<Option<AppSetting>> {
        let conn = self.get_conn()?;
        let setting = conn
            .query_row(
                r#"
                SELECT key, value, value_type, description, updated_at
                FROM app_setting
                WHERE key = ?1
                "#,
                params![key],
                map_setting_row,
            )
            .optional()?;

        Ok(setting)
    }

    /// 設定一覧（キー昇順）
    pub fn list_all(&self) -> RepositoryResult<Vec<AppSetting>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT key, value, value_type, description, updated_at
            FROM app_setting
            ORDER BY key
            "#,
        )?;

        let settings = stmt
            .query_map([], map_setting_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(settings)
    }

    /// 設定値を保存（存在すれば更新、なければ作成）
    ///
    /// 更新時は value のみ差し替え、value_type / description は
    /// 指定があった場合のみ上書きする。
    pub fn set_value(
        &self,
        key: &str,
        value: &str,
        value_type: Option<SettingType>,
        description: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();

        let updated = conn.execute(
            r#"
            UPDATE app_setting
            SET value = ?2,
                value_type = COALESCE(?3, value_type),
                description = COALESCE(?4, description),
                updated_at = ?5
            WHERE key = ?1
            "#,
            params![
                key,
                value,
                value_type.map(|t| t.to_string()),
                description,
                now
            ],
        )?;

        if updated == 0 {
            conn.execute(
                r#"
                INSERT INTO app_setting (key, value, value_type, description, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    key,
                    value,
                    value_type.unwrap_or(SettingType::String).to_string(),
                    description,
                    now
                ],
            )?;
        }

        Ok(())
    }

    /// 複数設定の一括保存
    pub fn set_values(&self, entries: &[(String, String)]) -> RepositoryResult<usize> {
        for (key, value) in entries {
            self.set_value(key, value, None, None)?;
        }
        Ok(entries.len())
    }

    /// 設定キーを削除
    pub fn delete(&self, key: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM app_setting WHERE key = ?1", params![key])?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound {
                entity: "アプリ設定".to_string(),
                id: key.to_string(),
            });
        }
        Ok(())
    }
}

fn map_setting_row(row: &rusqlite::Row<'_>) -> SqliteResult<AppSetting> {
    let type_text: String = row.get(2)?;
    Ok(AppSetting {
        key: row.get(0)?,
        value: row.get(1)?,
        value_type: type_text.parse().unwrap_or(SettingType::String),
        description: row.get(3)?,
        updated_at: super::record_repo::parse_datetime(&row.get::<_, String>(4)?),
    })
}
