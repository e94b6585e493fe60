// ==========================================
// 業務時間分析ダッシュボード - ドメイン型定義
// ==========================================
// シリアライズ形式: lowercase / 単一文字（データベースと一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 価値ランク (Value Rank)
// ==========================================
// S = 最高価値, C = 無駄（削減候補）
// 並び順は表示順（S が先頭）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueRank {
    S, // 価値創出の中核
    A, // 必要な調整・協働
    B, // 管理・事務
    C, // 削減候補
}

impl ValueRank {
    /// 全ランク（表示順）
    pub const ALL: [ValueRank; 4] = [ValueRank::S, ValueRank::A, ValueRank::B, ValueRank::C];

    /// 削減シミュレーションの既定対象かどうか
    pub fn is_wasteful(&self) -> bool {
        matches!(self, ValueRank::C)
    }
}

impl fmt::Display for ValueRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRank::S => write!(f, "S"),
            ValueRank::A => write!(f, "A"),
            ValueRank::B => write!(f, "B"),
            ValueRank::C => write!(f, "C"),
        }
    }
}

impl FromStr for ValueRank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(ValueRank::S),
            "A" => Ok(ValueRank::A),
            "B" => Ok(ValueRank::B),
            "C" => Ok(ValueRank::C),
            other => Err(format!("不明な価値ランク: {}", other)),
        }
    }
}

// ==========================================
// キーワード一致方式 (Match Type)
// ==========================================
// 分類キーワード / サブカテゴリルールで使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Contains,   // 部分一致
    Exact,      // 完全一致
    Startswith, // 前方一致
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Contains => write!(f, "contains"),
            MatchType::Exact => write!(f, "exact"),
            MatchType::Startswith => write!(f, "startswith"),
        }
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contains" => Ok(MatchType::Contains),
            "exact" => Ok(MatchType::Exact),
            "startswith" => Ok(MatchType::Startswith),
            other => Err(format!("不明な一致方式: {}", other)),
        }
    }
}

// ==========================================
// 単位ルール一致方式 (Rule Match Type)
// ==========================================
// 単位種別ルールで使用（判定順: exact → suffix → contains）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMatchType {
    Suffix,   // 後方一致
    Contains, // 部分一致
    Exact,    // 完全一致
}

impl fmt::Display for RuleMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMatchType::Suffix => write!(f, "suffix"),
            RuleMatchType::Contains => write!(f, "contains"),
            RuleMatchType::Exact => write!(f, "exact"),
        }
    }
}

impl FromStr for RuleMatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suffix" => Ok(RuleMatchType::Suffix),
            "contains" => Ok(RuleMatchType::Contains),
            "exact" => Ok(RuleMatchType::Exact),
            other => Err(format!("不明なルール一致方式: {}", other)),
        }
    }
}

// ==========================================
// 単位種別 (Unit Type)
// ==========================================
// 時間換算する業務と件数カウントする業務の区別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Hours, // 時間 (h)
    Count, // 件数 (件)
}

impl UnitType {
    /// 表示用の単位サフィックス
    pub fn suffix(&self) -> &'static str {
        match self {
            UnitType::Hours => "h",
            UnitType::Count => "件",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitType::Hours => write!(f, "hours"),
            UnitType::Count => write!(f, "count"),
        }
    }
}

impl FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hours" => Ok(UnitType::Hours),
            "count" => Ok(UnitType::Count),
            other => Err(format!("不明な単位種別: {}", other)),
        }
    }
}

// ==========================================
// 設定値の型 (Setting Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    String,
    Int,
    Float,
    Bool,
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingType::String => write!(f, "string"),
            SettingType::Int => write!(f, "int"),
            SettingType::Float => write!(f, "float"),
            SettingType::Bool => write!(f, "bool"),
        }
    }
}

impl FromStr for SettingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(SettingType::String),
            "int" => Ok(SettingType::Int),
            "float" => Ok(SettingType::Float),
            "bool" => Ok(SettingType::Bool),
            other => Err(format!("不明な設定型: {}", other)),
        }
    }
}

// ==========================================
// AI 提案ステータス (Suggestion Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,  // レビュー待ち
    Accepted, // 採用
    Rejected, // 却下
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionStatus::Pending => write!(f, "pending"),
            SuggestionStatus::Accepted => write!(f, "accepted"),
            SuggestionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for SuggestionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SuggestionStatus::Pending),
            "accepted" => Ok(SuggestionStatus::Accepted),
            "rejected" => Ok(SuggestionStatus::Rejected),
            other => Err(format!("不明な提案ステータス: {}", other)),
        }
    }
}

// ==========================================
// 削減目標の種別 (Goal Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Global,   // 全体目標
    Category, // カテゴリ別目標
    Staff,    // 担当者別目標
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalType::Global => write!(f, "global"),
            GoalType::Category => write!(f, "category"),
            GoalType::Staff => write!(f, "staff"),
        }
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(GoalType::Global),
            "category" => Ok(GoalType::Category),
            "staff" => Ok(GoalType::Staff),
            other => Err(format!("不明な目標種別: {}", other)),
        }
    }
}

// ==========================================
// レポート種別 (Report Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Weekly,  // 週次
    Monthly, // 月次
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Weekly => write!(f, "weekly"),
            ReportKind::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(ReportKind::Weekly),
            "monthly" => Ok(ReportKind::Monthly),
            other => Err(format!("不明なレポート種別: {}", other)),
        }
    }
}

// ==========================================
// 確信度レベル (Confidence Level)
// ==========================================
// AI 分類プレビューの行着色に使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,      // 0.9 以上: カテゴリ確実
    Medium,    // 0.7 以上: 類似業務との一貫性から判断
    Low,       // 0.5 以上: 複数カテゴリの可能性あり
    Uncertain, // 0.5 未満: ユーザー確認推奨
}

impl ConfidenceLevel {
    /// 確信度スコア（0.0-1.0）からレベルを判定
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ConfidenceLevel::High
        } else if score >= 0.7 {
            ConfidenceLevel::Medium
        } else if score >= 0.5 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::Uncertain
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "high"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::Low => write!(f, "low"),
            ConfidenceLevel::Uncertain => write!(f, "uncertain"),
        }
    }
}
