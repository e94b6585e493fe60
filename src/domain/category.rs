// ==========================================
// 業務時間分析ダッシュボード - カテゴリ関連エンティティ
// ==========================================
// 責務: 表示カテゴリ・分類キーワード・単位/サブカテゴリルールの定義
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::types::{MatchType, RuleMatchType, UnitType, ValueRank};

// ==========================================
// 表示カテゴリ (Display Category)
// ==========================================

/// ダッシュボード表示用のカテゴリ
///
/// 業務記録は分類エンジンによっていずれかの表示カテゴリへ割り当てられ、
/// カテゴリの価値ランク (S/A/B/C) がランク別集計の基準になる。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayCategory {
    /// カテゴリID (UUID)
    pub category_id: String,
    /// カテゴリ名（一意）
    pub name: String,

    // ===== 表示属性 =====
    /// チャート用カラーコード
    pub color: String,
    /// バッジ背景色
    pub badge_bg_color: String,
    /// バッジ文字色
    pub badge_text_color: String,

    // ===== 分析属性 =====
    /// 価値ランク
    pub rank: ValueRank,
    /// 削減対象フラグ
    pub is_reduction_target: bool,
    /// 表示順
    pub sort_order: i32,

    /// 作成日時
    pub created_at: NaiveDateTime,
    /// 更新日時
    pub updated_at: NaiveDateTime,
}

/// キーワード件数付きのカテゴリ（管理画面の一覧用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayCategoryWithCount {
    #[serde(flatten)]
    pub category: DisplayCategory,
    /// 紐づくキーワード数
    pub keyword_count: i64,
}

// ==========================================
// 分類キーワード (Category Keyword)
// ==========================================

/// キーワード分類ルール
///
/// 優先度の降順に評価し、最初に一致したルールで分類が確定する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryKeyword {
    /// キーワードID (UUID)
    pub keyword_id: String,
    /// キーワード（一意）
    pub keyword: String,
    /// 分類先カテゴリID
    pub display_category_id: String,
    /// 一致方式
    pub match_type: MatchType,
    /// 優先度（大きいほど先に評価）
    pub priority: i32,
    /// 有効フラグ
    pub is_active: bool,
    /// 作成日時
    pub created_at: NaiveDateTime,
}

/// 分類先カテゴリ名付きのキーワード（管理画面の一覧用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryKeywordWithName {
    #[serde(flatten)]
    pub keyword: CategoryKeyword,
    /// 分類先カテゴリ名
    pub display_category_name: String,
}

// ==========================================
// 単位種別ルール (Unit Type Rule)
// ==========================================

/// 業務名から単位種別（時間 / 件数）を判定するルール
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTypeRule {
    /// ルールID (UUID)
    pub rule_id: String,
    /// キーワード
    pub keyword: String,
    /// 判定結果の単位種別
    pub unit_type: UnitType,
    /// 一致方式
    pub match_type: RuleMatchType,
    /// 優先度（大きいほど先に評価）
    pub priority: i32,
    /// 有効フラグ
    pub is_active: bool,
    /// 作成日時
    pub created_at: NaiveDateTime,
}

// ==========================================
// サブカテゴリルール (Sub Category Rule)
// ==========================================

/// 業務名からサブカテゴリを判定するルール
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryRule {
    /// ルールID (UUID)
    pub rule_id: String,
    /// キーワード
    pub keyword: String,
    /// サブカテゴリ名
    pub sub_category_name: String,
    /// 親カテゴリID（限定する場合のみ）
    pub parent_category_id: Option<String>,
    /// 一致方式
    pub match_type: RuleMatchType,
    /// 優先度（大きいほど先に評価）
    pub priority: i32,
    /// 有効フラグ
    pub is_active: bool,
    /// 作成日時
    pub created_at: NaiveDateTime,
}

/// 親カテゴリ名付きのサブカテゴリルール（管理画面の一覧用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryRuleWithParent {
    #[serde(flatten)]
    pub rule: SubCategoryRule,
    /// 親カテゴリ名
    pub parent_category_name: Option<String>,
}
