// ==========================================
// 業務時間分析ダッシュボード - キーワード分類エンジン
// ==========================================
// 責務: 分類キーワードによる業務記録 → 表示カテゴリの割当
// 入力: 分類キーワードのスナップショット + (分類2, 業務名)
// 出力: 表示カテゴリ名
// 制約: ルールは優先度降順に評価し、最初の一致で確定
// ==========================================

use crate::domain::types::MatchType;
use crate::repository::{CategoryKeywordRepository, RepositoryResult};

// ==========================================
// 分類ルール (Classification Rule)
// ==========================================

/// 分類エンジンが評価する1ルール
///
/// キーワードは構築時に小文字化して保持する。
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    /// キーワード（小文字化済み）
    pub keyword: String,
    /// 一致方式
    pub match_type: MatchType,
    /// 分類先カテゴリ名
    pub category_name: String,
    /// 優先度（大きいほど先に評価）
    pub priority: i32,
}

impl ClassificationRule {
    pub fn new(
        keyword: impl Into<String>,
        match_type: MatchType,
        category_name: impl Into<String>,
        priority: i32,
    ) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            match_type,
            category_name: category_name.into(),
            priority,
        }
    }
}

// ==========================================
// KeywordClassifier - キーワード分類エンジン
// ==========================================

/// キーワード分類エンジン
///
/// ルールのスナップショットを保持する純粋なエンジン。
/// スナップショットの取得はリポジトリ側の責務で、
/// キーワード変更後は作り直して使う。
pub struct KeywordClassifier {
    /// 優先度降順のルール
    rules: Vec<ClassificationRule>,
    /// どのルールにも一致しなかった場合の分類先
    default_category: String,
}

impl KeywordClassifier {
    /// ルール一覧から分類エンジンを作成
    ///
    /// ルールは内部で優先度降順に安定ソートされるため、
    /// 渡す順序は問わない。
    pub fn new(mut rules: Vec<ClassificationRule>, default_category: impl Into<String>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self {
            rules,
            default_category: default_category.into(),
        }
    }

    /// リポジトリから有効なキーワードを読み込んで作成
    pub fn load(
        keywords: &CategoryKeywordRepository,
        default_category: impl Into<String>,
    ) -> RepositoryResult<Self> {
        let rules = keywords
            .list(None, true)?
            .into_iter()
            .map(|k| {
                ClassificationRule::new(
                    k.keyword.keyword,
                    k.keyword.match_type,
                    k.display_category_name,
                    k.keyword.priority,
                )
            })
            .collect();
        Ok(Self::new(rules, default_category))
    }

    /// (分類2, 業務名) を表示カテゴリへ分類
    ///
    /// 評価順:
    /// 1) 分類2 → 業務名 の順でテキスト候補を作る（空文字は除外）
    /// 2) 候補が無ければデフォルトカテゴリ
    /// 3) ルールを優先度降順に評価し、各ルールで全候補を照合
    /// 4) どれにも一致しなければデフォルトカテゴリ
    pub fn classify(&self, category2: Option<&str>, work_name: Option<&str>) -> &str {
        let mut texts: Vec<String> = Vec::with_capacity(2);
        if let Some(cat2) = category2 {
            if !cat2.is_empty() {
                texts.push(cat2.to_lowercase());
            }
        }
        if let Some(name) = work_name {
            if !name.is_empty() {
                texts.push(name.to_lowercase());
            }
        }

        if texts.is_empty() {
            return &self.default_category;
        }

        for rule in &self.rules {
            for text in &texts {
                let matched = match rule.match_type {
                    MatchType::Exact => text == &rule.keyword,
                    MatchType::Startswith => text.starts_with(&rule.keyword),
                    MatchType::Contains => text.contains(&rule.keyword),
                };
                if matched {
                    return &rule.category_name;
                }
            }
        }

        &self.default_category
    }

    /// デフォルトカテゴリ名
    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// 保持しているルール数
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// ルールへの参照（AI プロンプトの文脈構築用）
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }
}

// ==========================================
// 単体テスト
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> KeywordClassifier {
        KeywordClassifier::new(
            vec![
                ClassificationRule::new("mtg", MatchType::Contains, "MTG", 30),
                ClassificationRule::new("会議", MatchType::Contains, "MTG", 30),
                ClassificationRule::new("移動", MatchType::Contains, "移動", 25),
                ClassificationRule::new("電話", MatchType::Contains, "コア業務", 20),
                ClassificationRule::new("事務", MatchType::Exact, "事務", 15),
                ClassificationRule::new("入力", MatchType::Startswith, "事務", 15),
                ClassificationRule::new("雑務", MatchType::Contains, "その他", 5),
            ],
            "コア業務",
        )
    }

    #[test]
    fn test_classify_contains一致() {
        let c = classifier();
        assert_eq!(c.classify(None, Some("定例MTG")), "MTG");
        assert_eq!(c.classify(Some("社内会議"), None), "MTG");
    }

    #[test]
    fn test_classify_exact一致は完全一致のみ() {
        let c = classifier();
        assert_eq!(c.classify(None, Some("事務")), "事務");
        // 部分一致では exact ルールに掛からず、デフォルトへ落ちる
        assert_eq!(c.classify(None, Some("事務作業")), "コア業務");
    }

    #[test]
    fn test_classify_startswith一致() {
        let c = classifier();
        assert_eq!(c.classify(None, Some("入力業務")), "事務");
        // 先頭以外は対象外
        assert_eq!(c.classify(None, Some("ノート入力")), "コア業務");
    }

    #[test]
    fn test_classify_優先度降順で評価() {
        // 「移動」(25) と「雑務」(5) の両方を含む場合、優先度の高い方が勝つ
        let c = classifier();
        assert_eq!(c.classify(None, Some("雑務のための移動")), "移動");
    }

    #[test]
    fn test_classify_同一優先度は渡した順で評価() {
        let c = KeywordClassifier::new(
            vec![
                ClassificationRule::new("営業", MatchType::Contains, "コア業務", 10),
                ClassificationRule::new("移動", MatchType::Contains, "移動", 10),
            ],
            "その他",
        );
        // 安定ソートのため同一優先度では先頭のルールが勝つ
        assert_eq!(c.classify(Some("営業"), Some("移動")), "コア業務");
    }

    #[test]
    fn test_classify_大文字小文字を無視() {
        let c = classifier();
        assert_eq!(c.classify(None, Some("マネージャーMTG")), "MTG");
        assert_eq!(c.classify(None, Some("ﾏﾈｰｼﾞｬｰmtg")), "MTG");
    }

    #[test]
    fn test_classify_両方空ならデフォルト() {
        let c = classifier();
        assert_eq!(c.classify(None, None), "コア業務");
        assert_eq!(c.classify(Some(""), Some("")), "コア業務");
    }

    #[test]
    fn test_classify_不一致ならデフォルト() {
        let c = classifier();
        assert_eq!(c.classify(Some("通常"), Some("レセプト点検")), "コア業務");
    }

    #[test]
    fn test_new_優先度で並べ替え() {
        let c = KeywordClassifier::new(
            vec![
                ClassificationRule::new("対応", MatchType::Contains, "コア業務", 15),
                ClassificationRule::new("電話対応", MatchType::Contains, "顧客対応", 20),
            ],
            "その他",
        );
        // 渡した順に関わらず優先度 20 のルールが先に評価される
        assert_eq!(c.classify(None, Some("電話対応")), "顧客対応");
        assert_eq!(c.rule_count(), 2);
    }
}
