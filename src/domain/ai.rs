// ==========================================
// 業務時間分析ダッシュボード - AI 関連エンティティ
// ==========================================
// 責務: AI 提案・インサイトキャッシュ・リクエストログの定義
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::types::SuggestionStatus;

// ===== コスト単価（USD / 100万トークン） =====
/// 入力トークン単価
pub const INPUT_COST_PER_MTOK: f64 = 3.0;
/// 出力トークン単価
pub const OUTPUT_COST_PER_MTOK: f64 = 15.0;

// ==========================================
// AI カテゴリ提案 (Category Suggestion)
// ==========================================

/// AI によるカテゴリ分類の提案（レビュー待ち行列に積まれる）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiCategorySuggestion {
    /// 提案ID (UUID)
    pub suggestion_id: String,
    /// 対象の業務名
    pub work_name: String,
    /// 元ファイルの分類1
    pub category1: Option<String>,
    /// 元ファイルの分類2
    pub category2: Option<String>,
    /// 提案先カテゴリID
    pub suggested_category_id: Option<String>,
    /// 確信度（0.0-1.0）
    pub confidence: f64,
    /// 判断理由
    pub reasoning: Option<String>,
    /// レビューステータス
    pub status: SuggestionStatus,
    /// 作成日時
    pub created_at: NaiveDateTime,
    /// レビュー日時
    pub reviewed_at: Option<NaiveDateTime>,
}

/// 提案先カテゴリ名付きの提案（レビュー画面の一覧用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiCategorySuggestionWithName {
    #[serde(flatten)]
    pub suggestion: AiCategorySuggestion,
    /// 提案先カテゴリ名
    pub suggested_category_name: Option<String>,
}

// ==========================================
// AI インサイトキャッシュ (Insight Cache)
// ==========================================

/// インサイト応答のキャッシュ行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiInsightCacheEntry {
    /// キャッシュキー（`insight:` + フィルタのハッシュ）
    pub cache_key: String,
    /// JSON 文字列のキャッシュ内容
    pub content: String,
    /// 作成日時
    pub created_at: NaiveDateTime,
    /// 有効期限
    pub expires_at: NaiveDateTime,
}

// ==========================================
// AI リクエストログ (Request Log)
// ==========================================

/// AI 呼び出し1回分の記録
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRequestLog {
    /// ログID (UUID)
    pub log_id: String,
    /// リクエスト種別（categorize / insights / chat / report / group）
    pub request_type: String,
    /// 使用モデル名
    pub model: Option<String>,
    /// 入力トークン数
    pub input_tokens: i64,
    /// 出力トークン数
    pub output_tokens: i64,
    /// 推定コスト（USD）
    pub cost_usd: f64,
    /// キャッシュ応答フラグ
    pub cached: bool,
    /// 成功フラグ
    pub success: bool,
    /// エラーメッセージ
    pub error_message: Option<String>,
    /// 記録日時
    pub created_at: NaiveDateTime,
}

/// トークン数から推定コスト（USD）を算出
pub fn estimate_cost_usd(input_tokens: i64, output_tokens: i64) -> f64 {
    let input = input_tokens.max(0) as f64 * INPUT_COST_PER_MTOK / 1_000_000.0;
    let output = output_tokens.max(0) as f64 * OUTPUT_COST_PER_MTOK / 1_000_000.0;
    input + output
}
