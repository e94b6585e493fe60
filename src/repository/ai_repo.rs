// ==========================================
// 業務時間分析ダッシュボード - AI 関連リポジトリ
// ==========================================
// 責務: ai_category_suggestion / ai_insight_cache / ai_request_log テーブルの操作
// ==========================================

use crate::domain::ai::{
    estimate_cost_usd, AiCategorySuggestion, AiCategorySuggestionWithName, AiRequestLog,
};
use crate::domain::types::SuggestionStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Duration, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// AiSuggestionRepository
// ==========================================

/// AI カテゴリ提案リポジトリ
pub struct AiSuggestionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AiSuggestionRepository {
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

    /// 提案を保存
    pub fn save(&self, suggestion: &AiCategorySuggestion) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO ai_category_suggestion (
                suggestion_id, work_name, category1, category2,
                suggested_category_id, confidence, reasoning, status,
                created_at, reviewed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                suggestion.suggestion_id,
                suggestion.work_name,
                suggestion.category1,
                suggestion.category2,
                suggestion.suggested_category_id,
                suggestion.confidence,
                suggestion.reasoning,
                suggestion.status.to_string(),
                suggestion.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                suggestion
                    .reviewed_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            ],
        )?;
        Ok(())
    }

    /// 提案一覧（カテゴリ名付き、作成日時降順）。ステータスで絞り込み可能。
    pub fn list(
        &self,
        status: Option<SuggestionStatus>,
    ) -> RepositoryResult<Vec<AiCategorySuggestionWithName>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"
            SELECT s.suggestion_id, s.work_name, s.category1, s.category2,
                   s.suggested_category_id, s.confidence, s.reasoning, s.status,
                   s.created_at, s.reviewed_at, c.name
            FROM ai_category_suggestion s
            LEFT JOIN display_category c ON c.category_id = s.suggested_category_id
            "#,
        );
        let mut bindings: Vec<String> = Vec::new();
        if let Some(status) = status {
            bindings.push(status.to_string());
            sql.push_str(" WHERE s.status = ?1");
        }
        sql.push_str(" ORDER BY s.created_at DESC");

        let mut stmt = conn.prepare(&sql)?;
        let suggestions = stmt
            .query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
                Ok(AiCategorySuggestionWithName {
                    suggestion: map_suggestion_row(row)?,
                    suggested_category_name: row.get(10)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(suggestions)
    }

    /// 提案をレビュー（承認 / 却下）
    pub fn review(&self, suggestion_id: &str, status: SuggestionStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE ai_category_suggestion
            SET status = ?2, reviewed_at = ?3
            WHERE suggestion_id = ?1
            "#,
            params![
                suggestion_id,
                status.to_string(),
                Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "AI カテゴリ提案".to_string(),
                id: suggestion_id.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// AiInsightCacheRepository
// ==========================================

/// AI インサイトキャッシュリポジトリ
pub struct AiInsightCacheRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AiInsightCacheRepository {
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

    /// キャッシュ内容を取得（期限切れの行は None）
    pub fn get(&self, cache_key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT content, expires_at FROM ai_insight_cache WHERE cache_key = ?1",
                params![cache_key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((content, expires_at)) => {
                let expires: NaiveDateTime = super::record_repo::parse_datetime(&expires_at);
                if expires > Utc::now().naive_utc() {
                    Ok(Some(content))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    /// キャッシュを設定（同一キーの既存行は削除してから挿入）
    pub fn set(&self, cache_key: &str, content: &str, ttl_hours: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().naive_utc();
        let expires = now + Duration::hours(ttl_hours);

        conn.execute(
            "DELETE FROM ai_insight_cache WHERE cache_key = ?1",
            params![cache_key],
        )?;
        conn.execute(
            r#"
            INSERT INTO ai_insight_cache (cache_key, content, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                cache_key,
                content,
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                expires.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(())
    }

    /// 期限切れの行を削除。削除件数を返す。
    pub fn purge_expired(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
        let deleted = conn.execute(
            "DELETE FROM ai_insight_cache WHERE expires_at <= ?1",
            params![now],
        )?;
        Ok(deleted)
    }
}

// ==========================================
// AiRequestLogRepository
// ==========================================

/// AI 利用状況の集計
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiUsageSummary {
    pub request_count: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub total_cost_usd: f64,
    pub cached_count: i64,
}

/// AI リクエストログリポジトリ
pub struct AiRequestLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AiRequestLogRepository {
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

    /// リクエストを記録。コストはトークン数から算出する。
    pub fn log_request(
        &self,
        request_type: &str,
        model: Option<&str>,
        input_tokens: i64,
        output_tokens: i64,
        cached: bool,
        success: bool,
        error_message: Option<&str>,
    ) -> RepositoryResult<AiRequestLog> {
        let log = AiRequestLog {
            log_id: Uuid::new_v4().to_string(),
            request_type: request_type.to_string(),
            model: model.map(|m| m.to_string()),
            input_tokens,
            output_tokens,
            cost_usd: estimate_cost_usd(input_tokens, output_tokens),
            cached,
            success,
            error_message: error_message.map(|m| m.to_string()),
            created_at: Utc::now().naive_utc(),
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO ai_request_log (
                log_id, request_type, model, input_tokens, output_tokens,
                cost_usd, cached, success, error_message, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                log.log_id,
                log.request_type,
                log.model,
                log.input_tokens,
                log.output_tokens,
                log.cost_usd,
                log.cached,
                log.success,
                log.error_message,
                log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(log)
    }

    /// 利用状況の集計
    pub fn usage_summary(&self) -> RepositoryResult<AiUsageSummary> {
        let conn = self.get_conn()?;
        let summary = conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(input_tokens), 0),
                   COALESCE(SUM(output_tokens), 0),
                   COALESCE(SUM(cost_usd), 0),
                   COALESCE(SUM(cached), 0)
            FROM ai_request_log
            "#,
            [],
            |row| {
                Ok(AiUsageSummary {
                    request_count: row.get(0)?,
                    total_input_tokens: row.get(1)?,
                    total_output_tokens: row.get(2)?,
                    total_cost_usd: row.get(3)?,
                    cached_count: row.get(4)?,
                })
            },
        )?;
        Ok(summary)
    }
}

// ===== 行マッピング =====

fn map_suggestion_row(row: &rusqlite::Row<'_>) -> SqliteResult<AiCategorySuggestion> {
    let status_text: String = row.get(7)?;
    let reviewed_at: Option<String> = row.get(9)?;
    Ok(AiCategorySuggestion {
        suggestion_id: row.get(0)?,
        work_name: row.get(1)?,
        category1: row.get(2)?,
        category2: row.get(3)?,
        suggested_category_id: row.get(4)?,
        confidence: row.get(5)?,
        reasoning: row.get(6)?,
        status: status_text.parse().unwrap_or(SuggestionStatus::Pending),
        created_at: super::record_repo::parse_datetime(&row.get::<_, String>(8)?),
        reviewed_at: reviewed_at.map(|t| super::record_repo::parse_datetime(&t)),
    })
}
