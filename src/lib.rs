// ==========================================
// 業務時間分析ダッシュボード - コアライブラリ
// ==========================================
// 技術スタック: Tauri + Rust + SQLite
// システム位置付け: 意思決定支援サービス (最終判断は人間)
// ==========================================

// 国際化システムの初期化
rust_i18n::i18n!("locales", fallback = "ja");

// ==========================================
// モジュール宣言
// ==========================================

// ドメイン層 - エンティティと型
pub mod domain;

// リポジトリ層 - データアクセス
pub mod repository;

// エンジン層 - 業務ルール
pub mod engine;

// インポート層 - 外部データ取込
pub mod importer;

// AI 層 - プロバイダ抽象とプロンプト
pub mod ai;

// 設定層 - アプリケーション設定
pub mod config;

// データベース基盤（接続初期化 / PRAGMA 統一 / スキーマ）
pub mod db;

// ログシステム
pub mod logging;

// 国際化
pub mod i18n;

// API 層 - 業務インターフェース
pub mod api;

// アプリケーション層 - Tauri 統合
pub mod app;

// ==========================================
// コア型の再エクスポート
// ==========================================

// ドメイン型
pub use domain::types::{
    ConfidenceLevel, GoalType, MatchType, ReportKind, RuleMatchType, SettingType,
    SuggestionStatus, UnitType, ValueRank,
};

// ドメインエンティティ
pub use domain::{
    AppSetting, CategoryKeyword, DisplayCategory, ImportBatch, MonthlyBusinessItem, MonthlyGoal,
    RawWorkRow, ReductionGoal, SubCategoryRule, UnitTypeRule, WorkRecord,
};

// エンジン
pub use engine::{
    Aggregator, CapacitySimulator, KeywordClassifier, TaskGrouper, UnitRuleResolver,
};

// API
pub use api::{AdminApi, AiApi, AnalyticsApi, DashboardApi, ImportApi};

// ==========================================
// 定数定義
// ==========================================

// システムバージョン
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// システム名称
pub const APP_NAME: &str = "業務時間分析ダッシュボード";

// データベースバージョン
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// コンパイル時チェック
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
