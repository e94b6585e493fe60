// ==========================================
// 業務時間分析ダッシュボード - SQLite 接続初期化
// ==========================================
// 目的:
// - すべての Connection::open の PRAGMA 挙動を統一し、「一部のモジュールだけ外部キー有効」を防ぐ
// - busy_timeout を統一し、並行書き込み時の busy エラーを減らす
// - 空のデータベースに対してスキーマを冪等に初期化する
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// デフォルトの busy_timeout（ミリ秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 現行コードが期待する schema_version
///
/// 旧いデータベースの上で黙って動作しないよう、起動時の警告に使用する（自動マイグレーションは行わない）。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// SQLite 接続の PRAGMA を統一設定
///
/// 説明:
/// - foreign_keys は「接続ごと」に有効化が必要
/// - busy_timeout も「接続ごと」に設定が必要
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// SQLite 接続を開き、統一設定を適用
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// schema_version を読み取る（テーブルが無ければ None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// スキーマを初期化（冪等）
///
/// すべてのテーブル定義はここに集約する。CREATE TABLE IF NOT EXISTS のみを
/// 使用するため、既存データベースに対して何度呼んでも安全。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 業務記録（請求月シートの1行 = 1レコード）
        CREATE TABLE IF NOT EXISTS work_record (
            record_id TEXT PRIMARY KEY,
            work_date TEXT NOT NULL,
            staff_name TEXT NOT NULL,
            department TEXT,
            category1 TEXT,
            category2 TEXT,
            work_name TEXT,
            unit_price REAL,
            quantity REAL NOT NULL DEFAULT 0,
            total_amount REAL,
            status TEXT,
            source_month TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_work_record_date ON work_record(work_date);
        CREATE INDEX IF NOT EXISTS idx_work_record_staff ON work_record(staff_name);
        CREATE INDEX IF NOT EXISTS idx_work_record_staff_date ON work_record(staff_name, work_date);

        -- 表示カテゴリ（S/A/B/C の価値ランクを持つ）
        CREATE TABLE IF NOT EXISTS display_category (
            category_id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            color TEXT NOT NULL DEFAULT '#6B7280',
            badge_bg_color TEXT NOT NULL DEFAULT '#f3f4f6',
            badge_text_color TEXT NOT NULL DEFAULT '#374151',
            rank TEXT NOT NULL DEFAULT 'B',
            is_reduction_target INTEGER NOT NULL DEFAULT 0,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 分類キーワード（優先度降順で先勝ち）
        CREATE TABLE IF NOT EXISTS category_keyword (
            keyword_id TEXT PRIMARY KEY,
            keyword TEXT NOT NULL UNIQUE,
            display_category_id TEXT NOT NULL REFERENCES display_category(category_id),
            match_type TEXT NOT NULL DEFAULT 'contains',
            priority INTEGER NOT NULL DEFAULT 10,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_category_keyword_category
            ON category_keyword(display_category_id);

        -- アプリケーション設定（型付き KV）
        CREATE TABLE IF NOT EXISTS app_setting (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            value_type TEXT NOT NULL DEFAULT 'string',
            description TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 単位種別ルール（時間 / 件数）
        CREATE TABLE IF NOT EXISTS unit_type_rule (
            rule_id TEXT PRIMARY KEY,
            keyword TEXT NOT NULL,
            unit_type TEXT NOT NULL,
            match_type TEXT NOT NULL DEFAULT 'suffix',
            priority INTEGER NOT NULL DEFAULT 10,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- サブカテゴリルール
        CREATE TABLE IF NOT EXISTS sub_category_rule (
            rule_id TEXT PRIMARY KEY,
            keyword TEXT NOT NULL,
            sub_category_name TEXT NOT NULL,
            parent_category_id TEXT REFERENCES display_category(category_id),
            match_type TEXT NOT NULL DEFAULT 'contains',
            priority INTEGER NOT NULL DEFAULT 10,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 業務名単位の削減対象フラグ
        CREATE TABLE IF NOT EXISTS task_reduction_target (
            work_name TEXT PRIMARY KEY,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 削減目標
        CREATE TABLE IF NOT EXISTS reduction_goal (
            goal_id TEXT PRIMARY KEY,
            goal_type TEXT NOT NULL DEFAULT 'global',
            target_percent REAL NOT NULL DEFAULT 20.0,
            baseline_hours REAL,
            baseline_start TEXT,
            baseline_end TEXT,
            category_id TEXT REFERENCES display_category(category_id),
            staff_name TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 月次目標（部門比較ビューの目標レコード）
        CREATE TABLE IF NOT EXISTS monthly_goal (
            goal_id TEXT PRIMARY KEY,
            department TEXT NOT NULL,
            staff_name TEXT NOT NULL,
            year_month TEXT NOT NULL,
            goal_index INTEGER NOT NULL,
            goal_name TEXT,
            progress_percent REAL NOT NULL DEFAULT 0,
            details TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(department, staff_name, year_month, goal_index)
        );

        -- 月次通常業務項目
        CREATE TABLE IF NOT EXISTS monthly_business_item (
            item_id TEXT PRIMARY KEY,
            department TEXT NOT NULL,
            staff_name TEXT NOT NULL,
            year_month TEXT NOT NULL,
            item_index INTEGER NOT NULL,
            item_name TEXT,
            progress_percent REAL NOT NULL DEFAULT 0,
            details TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(department, staff_name, year_month, item_index)
        );

        -- AI カテゴリ提案（レビュー待ち行列）
        CREATE TABLE IF NOT EXISTS ai_category_suggestion (
            suggestion_id TEXT PRIMARY KEY,
            work_name TEXT NOT NULL,
            category1 TEXT,
            category2 TEXT,
            suggested_category_id TEXT REFERENCES display_category(category_id),
            confidence REAL NOT NULL DEFAULT 0,
            reasoning TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            reviewed_at TEXT
        );

        -- AI インサイトキャッシュ（期限切れ行は読み飛ばす）
        CREATE TABLE IF NOT EXISTS ai_insight_cache (
            cache_key TEXT PRIMARY KEY,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            expires_at TEXT NOT NULL
        );

        -- AI リクエストログ（トークン数とコスト）
        CREATE TABLE IF NOT EXISTS ai_request_log (
            log_id TEXT PRIMARY KEY,
            request_type TEXT NOT NULL,
            model TEXT,
            input_tokens INTEGER NOT NULL DEFAULT 0,
            output_tokens INTEGER NOT NULL DEFAULT 0,
            cost_usd REAL NOT NULL DEFAULT 0,
            cached INTEGER NOT NULL DEFAULT 0,
            success INTEGER NOT NULL DEFAULT 1,
            error_message TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    // schema_version が空なら現行バージョンを記録
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
