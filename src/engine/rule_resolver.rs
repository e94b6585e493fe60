// ==========================================
// 業務時間分析ダッシュボード - ルール判定エンジン
// ==========================================
// 責務: 業務名からの単位種別判定とサブカテゴリ判定
// 入力: ルールのスナップショット + 業務名
// 制約: ルールは優先度降順に評価し、最初の一致で確定
// ==========================================

use crate::domain::category::{SubCategoryRule, UnitTypeRule};
use crate::domain::types::{RuleMatchType, UnitType};
use crate::repository::{RepositoryResult, SubCategoryRuleRepository, UnitTypeRuleRepository};

/// キーワードが業務名（小文字化済み）に一致するか
fn keyword_matches(match_type: RuleMatchType, keyword: &str, text: &str) -> bool {
    match match_type {
        RuleMatchType::Exact => text == keyword,
        RuleMatchType::Suffix => text.ends_with(keyword),
        RuleMatchType::Contains => text.contains(keyword),
    }
}

// ==========================================
// UnitRuleResolver - 単位種別判定エンジン
// ==========================================

struct UnitRuleEntry {
    /// キーワード（小文字化済み）
    keyword: String,
    unit_type: UnitType,
    match_type: RuleMatchType,
}

/// 業務名から単位種別（時間制 / 件数制）を判定するエンジン
///
/// 時間制の業務は数量を時間として、件数制の業務は件数として表示する。
pub struct UnitRuleResolver {
    /// 優先度降順のルール
    rules: Vec<UnitRuleEntry>,
}

impl UnitRuleResolver {
    /// ルール一覧から判定エンジンを作成（内部で優先度降順に安定ソート）
    pub fn new(mut rules: Vec<UnitTypeRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        let rules = rules
            .into_iter()
            .map(|r| UnitRuleEntry {
                keyword: r.keyword.to_lowercase(),
                unit_type: r.unit_type,
                match_type: r.match_type,
            })
            .collect();
        Self { rules }
    }

    /// リポジトリから有効なルールを読み込んで作成
    pub fn load(rules: &UnitTypeRuleRepository) -> RepositoryResult<Self> {
        Ok(Self::new(rules.list_active()?))
    }

    /// 業務名から単位種別を判定
    ///
    /// 空の業務名とルール不一致はいずれも時間制に倒す。
    pub fn resolve(&self, work_name: &str) -> UnitType {
        if work_name.is_empty() {
            return UnitType::Hours;
        }

        let text = work_name.to_lowercase();
        for rule in &self.rules {
            if keyword_matches(rule.match_type, &rule.keyword, &text) {
                return rule.unit_type;
            }
        }

        UnitType::Hours
    }

    /// 表示用の単位サフィックス（"h" / "件"）
    pub fn unit_suffix(&self, work_name: &str) -> &'static str {
        self.resolve(work_name).suffix()
    }
}

// ==========================================
// SubCategoryResolver - サブカテゴリ判定エンジン
// ==========================================

struct SubCategoryEntry {
    /// キーワード（小文字化済み）
    keyword: String,
    sub_category_name: String,
    parent_category_id: Option<String>,
    match_type: RuleMatchType,
}

/// 業務名からサブカテゴリ（コア業務の細分化）を判定するエンジン
pub struct SubCategoryResolver {
    /// 優先度降順のルール
    rules: Vec<SubCategoryEntry>,
}

impl SubCategoryResolver {
    /// ルール一覧から判定エンジンを作成（内部で優先度降順に安定ソート）
    pub fn new(mut rules: Vec<SubCategoryRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        let rules = rules
            .into_iter()
            .map(|r| SubCategoryEntry {
                keyword: r.keyword.to_lowercase(),
                sub_category_name: r.sub_category_name,
                parent_category_id: r.parent_category_id,
                match_type: r.match_type,
            })
            .collect();
        Self { rules }
    }

    /// リポジトリから有効なルールを読み込んで作成
    pub fn load(rules: &SubCategoryRuleRepository) -> RepositoryResult<Self> {
        Ok(Self::new(rules.list_active()?))
    }

    /// 業務名からサブカテゴリを判定
    ///
    /// 親カテゴリの絞り込みは、引数とルールの両方で
    /// 親カテゴリが指定されている場合のみ行う。
    /// 一致するルールが無ければ None。
    pub fn resolve(&self, work_name: &str, parent_category_id: Option<&str>) -> Option<&str> {
        if work_name.is_empty() {
            return None;
        }

        let text = work_name.to_lowercase();
        for rule in &self.rules {
            if let (Some(parent), Some(rule_parent)) =
                (parent_category_id, rule.parent_category_id.as_deref())
            {
                if parent != rule_parent {
                    continue;
                }
            }
            if keyword_matches(rule.match_type, &rule.keyword, &text) {
                return Some(&rule.sub_category_name);
            }
        }

        None
    }
}

// ==========================================
// 単体テスト
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn created_at() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn unit_rule(
        keyword: &str,
        unit_type: UnitType,
        match_type: RuleMatchType,
        priority: i32,
    ) -> UnitTypeRule {
        UnitTypeRule {
            rule_id: format!("unit-{}", keyword),
            keyword: keyword.to_string(),
            unit_type,
            match_type,
            priority,
            is_active: true,
            created_at: created_at(),
        }
    }

    fn sub_rule(
        keyword: &str,
        sub_category_name: &str,
        parent: Option<&str>,
        match_type: RuleMatchType,
        priority: i32,
    ) -> SubCategoryRule {
        SubCategoryRule {
            rule_id: format!("sub-{}", keyword),
            keyword: keyword.to_string(),
            sub_category_name: sub_category_name.to_string(),
            parent_category_id: parent.map(|s| s.to_string()),
            match_type,
            priority,
            is_active: true,
            created_at: created_at(),
        }
    }

    fn unit_resolver() -> UnitRuleResolver {
        UnitRuleResolver::new(vec![
            unit_rule("会議", UnitType::Hours, RuleMatchType::Contains, 20),
            unit_rule("移動", UnitType::Hours, RuleMatchType::Contains, 20),
            unit_rule("対応", UnitType::Hours, RuleMatchType::Suffix, 15),
            unit_rule("入力", UnitType::Count, RuleMatchType::Suffix, 15),
            unit_rule("チェック", UnitType::Count, RuleMatchType::Suffix, 15),
        ])
    }

    #[test]
    fn test_unit_resolve_時間制と件数制() {
        let r = unit_resolver();
        assert_eq!(r.resolve("定例会議"), UnitType::Hours);
        assert_eq!(r.resolve("電話対応"), UnitType::Hours);
        assert_eq!(r.resolve("施工ノート入力"), UnitType::Count);
        assert_eq!(r.resolve("Wチェック"), UnitType::Count);
    }

    #[test]
    fn test_unit_resolve_suffixは末尾のみ() {
        let r = unit_resolver();
        // 「入力」が末尾以外にあっても件数制にはならない
        assert_eq!(r.resolve("入力内容の見直し"), UnitType::Hours);
    }

    #[test]
    fn test_unit_resolve_デフォルトは時間制() {
        let r = unit_resolver();
        assert_eq!(r.resolve(""), UnitType::Hours);
        assert_eq!(r.resolve("レセプト点検"), UnitType::Hours);
    }

    #[test]
    fn test_unit_resolve_優先度降順() {
        // 「会議」(contains, p20) が「対応」(suffix, p15) より先に評価される
        let r = unit_resolver();
        assert_eq!(r.resolve("会議後の顧客対応"), UnitType::Hours);

        let r = UnitRuleResolver::new(vec![
            unit_rule("対応", UnitType::Hours, RuleMatchType::Suffix, 15),
            unit_rule("メール対応", UnitType::Count, RuleMatchType::Contains, 30),
        ]);
        assert_eq!(r.resolve("メール対応"), UnitType::Count);
    }

    #[test]
    fn test_unit_suffix_表示単位() {
        let r = unit_resolver();
        assert_eq!(r.unit_suffix("定例会議"), "h");
        assert_eq!(r.unit_suffix("施工ノート入力"), "件");
    }

    #[test]
    fn test_sub_category_判定() {
        let r = SubCategoryResolver::new(vec![
            sub_rule("電話対応", "顧客対応系", None, RuleMatchType::Contains, 20),
            sub_rule("対応", "顧客対応系", None, RuleMatchType::Suffix, 10),
            sub_rule("作成", "制作系", None, RuleMatchType::Suffix, 10),
        ]);

        assert_eq!(r.resolve("電話対応（折り返し）", None), Some("顧客対応系"));
        assert_eq!(r.resolve("書類作成", None), Some("制作系"));
        assert_eq!(r.resolve("レセプト点検", None), None);
        assert_eq!(r.resolve("", None), None);
    }

    #[test]
    fn test_sub_category_親カテゴリ絞り込み() {
        let r = SubCategoryResolver::new(vec![
            sub_rule("入力", "入力系", Some("cat-core"), RuleMatchType::Suffix, 10),
            sub_rule("作成", "制作系", None, RuleMatchType::Suffix, 10),
        ]);

        // 親カテゴリが一致する場合のみルールが適用される
        assert_eq!(r.resolve("ノート入力", Some("cat-core")), Some("入力系"));
        assert_eq!(r.resolve("ノート入力", Some("cat-other")), None);
        // 引数側が未指定なら親カテゴリ付きルールも評価対象
        assert_eq!(r.resolve("ノート入力", None), Some("入力系"));
        // ルール側が親カテゴリ無しなら引数に関わらず評価対象
        assert_eq!(r.resolve("書類作成", Some("cat-other")), Some("制作系"));
    }
}
