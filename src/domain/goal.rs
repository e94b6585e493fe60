// ==========================================
// 業務時間分析ダッシュボード - 目標エンティティ
// ==========================================
// 責務: 削減目標と月次目標（部門比較ビュー）の定義
// 不変条件: 進捗率は [0,100] の範囲
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::types::GoalType;

// ==========================================
// 削減目標 (Reduction Goal)
// ==========================================

/// 削減対象業務の削減目標
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionGoal {
    /// 目標ID (UUID)
    pub goal_id: String,
    /// 目標の種別（全体 / カテゴリ別 / 担当者別）
    pub goal_type: GoalType,
    /// 目標削減率（%）
    pub target_percent: f64,

    // ===== 基準値 =====
    /// 基準時間数
    pub baseline_hours: Option<f64>,
    /// 基準期間の開始日
    pub baseline_start: Option<NaiveDate>,
    /// 基準期間の終了日
    pub baseline_end: Option<NaiveDate>,

    // ===== 適用範囲 =====
    /// 対象カテゴリID（goal_type = category の場合）
    pub category_id: Option<String>,
    /// 対象担当者名（goal_type = staff の場合）
    pub staff_name: Option<String>,

    /// 有効フラグ
    pub is_active: bool,
    /// 作成日時
    pub created_at: NaiveDateTime,
    /// 更新日時
    pub updated_at: NaiveDateTime,
}

/// カテゴリ名付きの削減目標（一覧表示用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionGoalWithCategory {
    #[serde(flatten)]
    pub goal: ReductionGoal,
    /// 対象カテゴリ名
    pub category_name: Option<String>,
}

// ==========================================
// 月次目標 (Monthly Goal)
// ==========================================

/// 部門×担当者×年月ごとの目標レコード（最大5件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyGoal {
    /// 目標ID (UUID)
    pub goal_id: String,
    /// 部門
    pub department: String,
    /// 担当者名
    pub staff_name: String,
    /// 年月（例: "2504"）
    pub year_month: String,
    /// 目標番号（1-5）
    pub goal_index: i32,
    /// 目標名
    pub goal_name: Option<String>,
    /// 進捗率（0-100）
    pub progress_percent: f64,
    /// 詳細メモ
    pub details: Option<String>,
    /// 更新日時
    pub updated_at: NaiveDateTime,
}

/// 月次の通常業務項目（最大5件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyBusinessItem {
    /// 項目ID (UUID)
    pub item_id: String,
    /// 部門
    pub department: String,
    /// 担当者名
    pub staff_name: String,
    /// 年月（例: "2504"）
    pub year_month: String,
    /// 項目番号（1-5）
    pub item_index: i32,
    /// 項目名
    pub item_name: Option<String>,
    /// 進捗率（0-100）
    pub progress_percent: f64,
    /// 詳細メモ
    pub details: Option<String>,
    /// 更新日時
    pub updated_at: NaiveDateTime,
}

/// 進捗率を [0,100] に丸める
///
/// 0〜1 の小数で入力された値は百分率へ換算する（例: 0.75 → 75.0）
pub fn normalize_progress(raw: f64) -> f64 {
    let pct = if (0.0..=1.0).contains(&raw) { raw * 100.0 } else { raw };
    pct.clamp(0.0, 100.0)
}
