// ==========================================
// 業務時間分析ダッシュボード - 管理 API
// ==========================================
// 責務: カテゴリ / キーワード / 各種ルール / 設定 / 目標の管理操作
// 構成: API 層 → リポジトリ層
// 注意: 分類ルールはキャッシュしない。変更は次回の集計から即時反映される
// ==========================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::dashboard_api::DefaultSettings;
use crate::api::error::{ApiError, ApiResult};
use crate::config::SettingsManager;
use crate::domain::category::{CategoryKeywordWithName, SubCategoryRuleWithParent};
use crate::domain::goal::ReductionGoalWithCategory;
use crate::domain::{
    normalize_progress, CategoryKeyword, DisplayCategory, DisplayCategoryWithCount, GoalType,
    MatchType, MonthlyBusinessItem, MonthlyGoal, ReductionGoal, RuleMatchType, SubCategoryRule,
    UnitType, UnitTypeRule, ValueRank,
};
use crate::engine::{KeywordClassifier, SubCategoryResolver, UnitRuleResolver};
use crate::repository::{
    AppSettingRepository, CategoryKeywordRepository, DisplayCategoryRepository,
    MonthlyGoalRepository, ReductionGoalRepository, SubCategoryRuleRepository,
    TaskReductionTargetRepository, UnitTypeRuleRepository, WorkRecordRepository,
};

// ==========================================
// キーワード提案パターン
// ==========================================

/// 提案パターン（キーワード, 提案先カテゴリ名）
///
/// 未分類データの業務名を走査し、このテーブルに一致する
/// 未登録キーワードを分類ルール候補として提案する。
const SUGGEST_PATTERNS: &[(&str, &str)] = &[
    ("mtg", "MTG"),
    ("面談", "MTG"),
    ("打合せ", "MTG"),
    ("打ち合わせ", "MTG"),
    ("会議", "MTG"),
    ("ミーティング", "MTG"),
    ("移動", "移動"),
    ("出張", "移動"),
    ("営業", "コア業務"),
    ("電話", "コア業務"),
    ("tel", "コア業務"),
    ("対応", "コア業務"),
    ("事務", "事務"),
    ("入力", "事務"),
    ("チェック", "事務"),
    ("確認", "事務"),
    ("集計", "事務"),
    ("報告", "事務"),
    ("その他", "その他"),
    ("雑務", "その他"),
    ("待機", "その他"),
];

/// 提案キーワードを登録する際の優先度
const SUGGESTED_KEYWORD_PRIORITY: i32 = 10;

// ==========================================
// リクエスト DTO
// ==========================================

/// カテゴリ作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
    pub badge_bg_color: Option<String>,
    pub badge_text_color: Option<String>,
    pub rank: Option<ValueRank>,
    pub is_reduction_target: Option<bool>,
}

/// カテゴリ更新リクエスト（指定したフィールドのみ変更）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub badge_bg_color: Option<String>,
    pub badge_text_color: Option<String>,
    pub rank: Option<ValueRank>,
    pub is_reduction_target: Option<bool>,
}

/// キーワード作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewKeyword {
    pub keyword: String,
    pub display_category_id: String,
    pub match_type: Option<MatchType>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

/// キーワード更新リクエスト
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordUpdate {
    pub keyword: Option<String>,
    pub display_category_id: Option<String>,
    pub match_type: Option<MatchType>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

/// 単位種別ルール作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUnitRule {
    pub keyword: String,
    pub unit_type: Option<UnitType>,
    pub match_type: Option<RuleMatchType>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

/// 単位種別ルール更新リクエスト
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRuleUpdate {
    pub keyword: Option<String>,
    pub unit_type: Option<UnitType>,
    pub match_type: Option<RuleMatchType>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

/// サブカテゴリルール作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubCategoryRule {
    pub keyword: String,
    pub sub_category_name: String,
    pub parent_category_id: Option<String>,
    pub match_type: Option<RuleMatchType>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

/// サブカテゴリルール更新リクエスト
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubCategoryRuleUpdate {
    pub keyword: Option<String>,
    pub sub_category_name: Option<String>,
    pub parent_category_id: Option<Option<String>>,
    pub match_type: Option<RuleMatchType>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

/// 削減目標作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReductionGoal {
    pub goal_type: GoalType,
    pub target_percent: f64,
    pub baseline_hours: Option<f64>,
    pub baseline_start: Option<NaiveDate>,
    pub baseline_end: Option<NaiveDate>,
    pub category_id: Option<String>,
    pub staff_name: Option<String>,
    pub is_active: Option<bool>,
}

/// 削減目標更新リクエスト
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReductionGoalUpdate {
    pub target_percent: Option<f64>,
    pub baseline_hours: Option<f64>,
    pub baseline_start: Option<NaiveDate>,
    pub baseline_end: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// 月次目標の UPSERT リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyGoalInput {
    pub department: String,
    pub staff_name: String,
    /// 年月（例: "2504"）
    pub year_month: String,
    /// 目標番号（1-5）
    pub goal_index: i32,
    pub goal_name: Option<String>,
    pub progress_percent: f64,
    pub details: Option<String>,
}

/// 月次通常業務項目の UPSERT リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyItemInput {
    pub department: String,
    pub staff_name: String,
    pub year_month: String,
    /// 項目番号（1-5）
    pub item_index: i32,
    pub item_name: Option<String>,
    pub progress_percent: f64,
    pub details: Option<String>,
}

/// 提案キーワードの適用指定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionApplication {
    pub keyword: String,
    pub category: String,
}

// ==========================================
// レスポンス DTO
// ==========================================

/// 管理画面トップの概況
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOverview {
    pub categories_count: i64,
    pub keywords_count: i64,
    pub reduction_count: i64,
    pub settings: DefaultSettings,
}

/// 設定1件の内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingEntry {
    pub value: String,
    pub value_type: String,
    pub description: Option<String>,
}

/// キーワード提案1件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSuggestion {
    pub keyword: String,
    pub suggested_category: String,
    pub match_count: i64,
    pub current_category: String,
}

/// カテゴリ参照（ID と名前のみ）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    pub category_id: String,
    pub name: String,
}

/// キーワード提案の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSuggestionReport {
    pub suggestions: Vec<KeywordSuggestion>,
    pub categories: Vec<CategoryRef>,
}

/// 提案キーワードの一括登録結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedKeywords {
    pub added_count: usize,
    pub added_keywords: Vec<String>,
}

/// 単位種別ルールのテスト結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRuleTest {
    pub work_name: String,
    pub unit_type: UnitType,
    pub unit_suffix: String,
    pub display: String,
}

/// サブカテゴリルールのテスト結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryTest {
    pub work_name: String,
    pub sub_category: Option<String>,
    pub display: String,
}

// ==========================================
// AdminApi
// ==========================================

/// 管理 API
pub struct AdminApi {
    records: Arc<WorkRecordRepository>,
    categories: Arc<DisplayCategoryRepository>,
    keywords: Arc<CategoryKeywordRepository>,
    unit_rules: Arc<UnitTypeRuleRepository>,
    sub_rules: Arc<SubCategoryRuleRepository>,
    reduction_goals: Arc<ReductionGoalRepository>,
    monthly_goals: Arc<MonthlyGoalRepository>,
    task_targets: Arc<TaskReductionTargetRepository>,
    app_settings: Arc<AppSettingRepository>,
    settings: Arc<SettingsManager>,
}

impl AdminApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        records: Arc<WorkRecordRepository>,
        categories: Arc<DisplayCategoryRepository>,
        keywords: Arc<CategoryKeywordRepository>,
        unit_rules: Arc<UnitTypeRuleRepository>,
        sub_rules: Arc<SubCategoryRuleRepository>,
        reduction_goals: Arc<ReductionGoalRepository>,
        monthly_goals: Arc<MonthlyGoalRepository>,
        task_targets: Arc<TaskReductionTargetRepository>,
        app_settings: Arc<AppSettingRepository>,
        settings: Arc<SettingsManager>,
    ) -> Self {
        Self {
            records,
            categories,
            keywords,
            unit_rules,
            sub_rules,
            reduction_goals,
            monthly_goals,
            task_targets,
            app_settings,
            settings,
        }
    }

    /// 管理画面トップの概況を取得
    pub fn get_overview(&self) -> ApiResult<AdminOverview> {
        Ok(AdminOverview {
            categories_count: self.categories.count()?,
            keywords_count: self.keywords.count()?,
            reduction_count: self.categories.count_reduction_targets()?,
            settings: DefaultSettings {
                default_hourly_rate: self.settings.default_hourly_rate()?,
                ranking_limit: self.settings.ranking_limit()?,
                default_category: self.settings.default_category()?,
            },
        })
    }

    // ==========================================
    // カテゴリ管理
    // ==========================================

    /// カテゴリ一覧（キーワード件数付き、表示順）
    pub fn list_categories(&self) -> ApiResult<Vec<DisplayCategoryWithCount>> {
        Ok(self.categories.list_with_counts()?)
    }

    /// カテゴリを作成
    ///
    /// # 引数
    /// - input: カテゴリ内容（色・ランク未指定時は既定値）
    pub fn create_category(&self, input: &NewCategory) -> ApiResult<DisplayCategory> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("カテゴリ名を入力してください".to_string()));
        }
        if self.categories.find_by_name(name)?.is_some() {
            return Err(ApiError::DuplicateEntry("同名のカテゴリが既に存在します".to_string()));
        }

        let now = Utc::now().naive_utc();
        let category = DisplayCategory {
            category_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            color: input.color.clone().unwrap_or_else(|| "#6B7280".to_string()),
            badge_bg_color: input
                .badge_bg_color
                .clone()
                .unwrap_or_else(|| "#f3f4f6".to_string()),
            badge_text_color: input
                .badge_text_color
                .clone()
                .unwrap_or_else(|| "#374151".to_string()),
            rank: input.rank.unwrap_or(ValueRank::B),
            is_reduction_target: input.is_reduction_target.unwrap_or(false),
            sort_order: (self.categories.max_sort_order()? + 1) as i32,
            created_at: now,
            updated_at: now,
        };
        self.categories.create(&category)?;
        info!(name = %category.name, "カテゴリを作成");
        Ok(category)
    }

    /// カテゴリを更新（指定フィールドのみ）
    pub fn update_category(
        &self,
        category_id: &str,
        update: &CategoryUpdate,
    ) -> ApiResult<DisplayCategory> {
        let mut category = self.categories.find_by_id(category_id)?;

        if let Some(name) = update.name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(ApiError::InvalidInput("カテゴリ名を入力してください".to_string()));
            }
            if name != category.name && self.categories.find_by_name(name)?.is_some() {
                return Err(ApiError::DuplicateEntry(
                    "同名のカテゴリが既に存在します".to_string(),
                ));
            }
            category.name = name.to_string();
        }
        if let Some(color) = &update.color {
            category.color = color.clone();
        }
        if let Some(bg) = &update.badge_bg_color {
            category.badge_bg_color = bg.clone();
        }
        if let Some(text) = &update.badge_text_color {
            category.badge_text_color = text.clone();
        }
        if let Some(rank) = update.rank {
            category.rank = rank;
        }
        if let Some(flag) = update.is_reduction_target {
            category.is_reduction_target = flag;
        }
        category.updated_at = Utc::now().naive_utc();

        self.categories.update(&category)?;
        Ok(category)
    }

    /// カテゴリを削除
    ///
    /// キーワードが紐付いている間は削除できない。
    pub fn delete_category(&self, category_id: &str) -> ApiResult<()> {
        let count = self.categories.keyword_count(category_id)?;
        if count > 0 {
            return Err(ApiError::BusinessRuleViolation(format!(
                "このカテゴリには{}件のキーワードが紐付いています。先にキーワードを削除してください。",
                count
            )));
        }
        self.categories.delete(category_id)?;
        Ok(())
    }

    /// カテゴリの表示順を更新
    ///
    /// 渡された ID の並びに従って sort_order を 1 から振り直す。
    pub fn reorder_categories(&self, ordered_ids: &[String]) -> ApiResult<()> {
        if ordered_ids.is_empty() {
            return Err(ApiError::InvalidInput("並び順が指定されていません".to_string()));
        }
        self.categories.reorder(ordered_ids)?;
        Ok(())
    }

    // ==========================================
    // キーワード管理
    // ==========================================

    /// キーワード一覧（優先度降順）
    ///
    /// # 引数
    /// - category_id: カテゴリでの絞り込み
    /// - active_only: 有効なルールのみ
    pub fn list_keywords(
        &self,
        category_id: Option<&str>,
        active_only: bool,
    ) -> ApiResult<Vec<CategoryKeywordWithName>> {
        Ok(self.keywords.list(category_id, active_only)?)
    }

    /// キーワードを作成
    pub fn create_keyword(&self, input: &NewKeyword) -> ApiResult<CategoryKeyword> {
        let text = input.keyword.trim();
        if text.is_empty() {
            return Err(ApiError::InvalidInput("キーワードを入力してください".to_string()));
        }
        if self.keywords.find_by_keyword(text)?.is_some() {
            return Err(ApiError::DuplicateEntry("同じキーワードが既に存在します".to_string()));
        }
        // 分類先カテゴリの存在チェック（見つからなければ NotFound）
        self.categories.find_by_id(&input.display_category_id)?;

        let keyword = CategoryKeyword {
            keyword_id: Uuid::new_v4().to_string(),
            keyword: text.to_string(),
            display_category_id: input.display_category_id.clone(),
            match_type: input.match_type.unwrap_or(MatchType::Contains),
            priority: input.priority.unwrap_or(0),
            is_active: input.is_active.unwrap_or(true),
            created_at: Utc::now().naive_utc(),
        };
        self.keywords.create(&keyword)?;
        Ok(keyword)
    }

    /// キーワードを更新（指定フィールドのみ）
    pub fn update_keyword(
        &self,
        keyword_id: &str,
        update: &KeywordUpdate,
    ) -> ApiResult<CategoryKeyword> {
        let mut keyword = self.keywords.find_by_id(keyword_id)?;

        if let Some(text) = update.keyword.as_deref().map(str::trim) {
            if text.is_empty() {
                return Err(ApiError::InvalidInput("キーワードを入力してください".to_string()));
            }
            if text != keyword.keyword && self.keywords.find_by_keyword(text)?.is_some() {
                return Err(ApiError::DuplicateEntry(
                    "同じキーワードが既に存在します".to_string(),
                ));
            }
            keyword.keyword = text.to_string();
        }
        if let Some(category_id) = &update.display_category_id {
            self.categories.find_by_id(category_id)?;
            keyword.display_category_id = category_id.clone();
        }
        if let Some(match_type) = update.match_type {
            keyword.match_type = match_type;
        }
        if let Some(priority) = update.priority {
            keyword.priority = priority;
        }
        if let Some(active) = update.is_active {
            keyword.is_active = active;
        }

        self.keywords.update(&keyword)?;
        Ok(keyword)
    }

    /// キーワードを削除
    pub fn delete_keyword(&self, keyword_id: &str) -> ApiResult<()> {
        self.keywords.delete(keyword_id)?;
        Ok(())
    }

    // ==========================================
    // キーワード提案
    // ==========================================

    /// 未分類データを分析してキーワード候補を提案
    ///
    /// 登録済みキーワードは除外し、提案パターンに一致するレコードが
    /// 存在して、かつ現在デフォルトカテゴリへ落ちている場合のみ提案する。
    /// 結果はヒット件数の降順。
    pub fn suggest_keywords(&self) -> ApiResult<KeywordSuggestionReport> {
        let existing: HashSet<String> =
            self.keywords.all_keyword_strings_lower()?.into_iter().collect();
        let default_category = self.settings.default_category()?;
        let classifier = KeywordClassifier::load(&self.keywords, default_category.clone())?;

        let mut suggestions = Vec::new();
        for (keyword, suggested_category) in SUGGEST_PATTERNS {
            if existing.contains(&keyword.to_lowercase()) {
                continue;
            }

            let match_count = self.records.count_matching(keyword)?;
            if match_count == 0 {
                continue;
            }

            // サンプル1件の現在の分類先を確認し、未分類のものだけ提案する
            let current_category = match self.records.first_matching(keyword)? {
                Some((category2, work_name)) => classifier
                    .classify(category2.as_deref(), work_name.as_deref())
                    .to_string(),
                None => default_category.clone(),
            };
            if current_category != default_category {
                continue;
            }

            suggestions.push(KeywordSuggestion {
                keyword: (*keyword).to_string(),
                suggested_category: (*suggested_category).to_string(),
                match_count,
                current_category,
            });
        }
        suggestions.sort_by(|a, b| b.match_count.cmp(&a.match_count));

        let mut categories = self.categories.list_all()?;
        categories.sort_by_key(|c| c.sort_order);
        let categories = categories
            .into_iter()
            .map(|c| CategoryRef {
                category_id: c.category_id,
                name: c.name,
            })
            .collect();

        Ok(KeywordSuggestionReport {
            suggestions,
            categories,
        })
    }

    /// 提案されたキーワードを一括登録
    ///
    /// 存在しないカテゴリ名や登録済みキーワードは読み飛ばす。
    pub fn apply_suggestions(
        &self,
        applications: &[SuggestionApplication],
    ) -> ApiResult<AppliedKeywords> {
        let now = Utc::now().naive_utc();
        let mut added_keywords = Vec::new();

        for application in applications {
            let Some(category) = self.categories.find_by_name(&application.category)? else {
                continue;
            };
            if self.keywords.find_by_keyword(&application.keyword)?.is_some() {
                continue;
            }

            let keyword = CategoryKeyword {
                keyword_id: Uuid::new_v4().to_string(),
                keyword: application.keyword.clone(),
                display_category_id: category.category_id,
                match_type: MatchType::Contains,
                priority: SUGGESTED_KEYWORD_PRIORITY,
                is_active: true,
                created_at: now,
            };
            self.keywords.create(&keyword)?;
            added_keywords.push(application.keyword.clone());
        }

        info!(added = added_keywords.len(), "提案キーワードを登録");
        Ok(AppliedKeywords {
            added_count: added_keywords.len(),
            added_keywords,
        })
    }

    // ==========================================
    // 設定管理
    // ==========================================

    /// 設定一覧をキー別マップで取得
    pub fn get_settings(&self) -> ApiResult<HashMap<String, SettingEntry>> {
        let settings = self.app_settings.list_all()?;
        Ok(settings
            .into_iter()
            .map(|s| {
                (
                    s.key.clone(),
                    SettingEntry {
                        value: s.value,
                        value_type: s.value_type.to_string(),
                        description: s.description,
                    },
                )
            })
            .collect())
    }

    /// 設定を一括更新（存在しないキーは新規作成、型情報は保持）
    pub fn update_settings(&self, entries: &[(String, String)]) -> ApiResult<usize> {
        Ok(self.app_settings.set_values(entries)?)
    }

    // ==========================================
    // 単位種別ルール管理
    // ==========================================

    /// 単位種別ルール一覧（優先度降順）
    pub fn list_unit_rules(&self) -> ApiResult<Vec<UnitTypeRule>> {
        Ok(self.unit_rules.list_all()?)
    }

    /// 単位種別ルールを作成
    pub fn create_unit_rule(&self, input: &NewUnitRule) -> ApiResult<UnitTypeRule> {
        let keyword = input.keyword.trim();
        if keyword.is_empty() {
            return Err(ApiError::InvalidInput("キーワードを入力してください".to_string()));
        }

        let rule = UnitTypeRule {
            rule_id: Uuid::new_v4().to_string(),
            keyword: keyword.to_string(),
            unit_type: input.unit_type.unwrap_or(UnitType::Hours),
            match_type: input.match_type.unwrap_or(RuleMatchType::Suffix),
            priority: input.priority.unwrap_or(10),
            is_active: input.is_active.unwrap_or(true),
            created_at: Utc::now().naive_utc(),
        };
        self.unit_rules.create(&rule)?;
        Ok(rule)
    }

    /// 単位種別ルールを更新（指定フィールドのみ）
    pub fn update_unit_rule(
        &self,
        rule_id: &str,
        update: &UnitRuleUpdate,
    ) -> ApiResult<UnitTypeRule> {
        let mut rule = self.unit_rules.find_by_id(rule_id)?;

        if let Some(keyword) = update.keyword.as_deref().map(str::trim) {
            if keyword.is_empty() {
                return Err(ApiError::InvalidInput("キーワードを入力してください".to_string()));
            }
            rule.keyword = keyword.to_string();
        }
        if let Some(unit_type) = update.unit_type {
            rule.unit_type = unit_type;
        }
        if let Some(match_type) = update.match_type {
            rule.match_type = match_type;
        }
        if let Some(priority) = update.priority {
            rule.priority = priority;
        }
        if let Some(active) = update.is_active {
            rule.is_active = active;
        }

        self.unit_rules.update(&rule)?;
        Ok(rule)
    }

    /// 単位種別ルールを削除
    pub fn delete_unit_rule(&self, rule_id: &str) -> ApiResult<()> {
        self.unit_rules.delete(rule_id)?;
        Ok(())
    }

    /// デフォルトの単位種別ルールを投入。追加件数を返す。
    pub fn seed_unit_rules(&self) -> ApiResult<usize> {
        Ok(self.unit_rules.seed_defaults()?)
    }

    /// 業務名で単位種別を判定テスト
    pub fn test_unit_rule(&self, work_name: &str) -> ApiResult<UnitRuleTest> {
        let resolver = UnitRuleResolver::load(&self.unit_rules)?;
        let unit_type = resolver.resolve(work_name);
        let unit_suffix = resolver.unit_suffix(work_name).to_string();
        Ok(UnitRuleTest {
            work_name: work_name.to_string(),
            unit_type,
            display: format!("{} → {}", work_name, unit_suffix),
            unit_suffix,
        })
    }

    // ==========================================
    // サブカテゴリルール管理
    // ==========================================

    /// サブカテゴリルール一覧（優先度降順、親カテゴリ名付き）
    pub fn list_sub_category_rules(&self) -> ApiResult<Vec<SubCategoryRuleWithParent>> {
        Ok(self.sub_rules.list_all()?)
    }

    /// サブカテゴリルールを作成
    pub fn create_sub_category_rule(
        &self,
        input: &NewSubCategoryRule,
    ) -> ApiResult<SubCategoryRule> {
        let keyword = input.keyword.trim();
        if keyword.is_empty() {
            return Err(ApiError::InvalidInput("キーワードを入力してください".to_string()));
        }
        let sub_category_name = input.sub_category_name.trim();
        if sub_category_name.is_empty() {
            return Err(ApiError::InvalidInput(
                "サブカテゴリ名を入力してください".to_string(),
            ));
        }
        if let Some(parent_id) = &input.parent_category_id {
            self.categories.find_by_id(parent_id)?;
        }

        let rule = SubCategoryRule {
            rule_id: Uuid::new_v4().to_string(),
            keyword: keyword.to_string(),
            sub_category_name: sub_category_name.to_string(),
            parent_category_id: input.parent_category_id.clone(),
            match_type: input.match_type.unwrap_or(RuleMatchType::Contains),
            priority: input.priority.unwrap_or(10),
            is_active: input.is_active.unwrap_or(true),
            created_at: Utc::now().naive_utc(),
        };
        self.sub_rules.create(&rule)?;
        Ok(rule)
    }

    /// サブカテゴリルールを更新（指定フィールドのみ）
    ///
    /// parent_category_id は `Some(None)` で「親カテゴリ限定を解除」になる。
    pub fn update_sub_category_rule(
        &self,
        rule_id: &str,
        update: &SubCategoryRuleUpdate,
    ) -> ApiResult<SubCategoryRule> {
        let mut rule = self.sub_rules.find_by_id(rule_id)?;

        if let Some(keyword) = update.keyword.as_deref().map(str::trim) {
            if keyword.is_empty() {
                return Err(ApiError::InvalidInput("キーワードを入力してください".to_string()));
            }
            rule.keyword = keyword.to_string();
        }
        if let Some(name) = update.sub_category_name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(ApiError::InvalidInput(
                    "サブカテゴリ名を入力してください".to_string(),
                ));
            }
            rule.sub_category_name = name.to_string();
        }
        if let Some(parent) = &update.parent_category_id {
            if let Some(parent_id) = parent {
                self.categories.find_by_id(parent_id)?;
            }
            rule.parent_category_id = parent.clone();
        }
        if let Some(match_type) = update.match_type {
            rule.match_type = match_type;
        }
        if let Some(priority) = update.priority {
            rule.priority = priority;
        }
        if let Some(active) = update.is_active {
            rule.is_active = active;
        }

        self.sub_rules.update(&rule)?;
        Ok(rule)
    }

    /// サブカテゴリルールを削除
    pub fn delete_sub_category_rule(&self, rule_id: &str) -> ApiResult<()> {
        self.sub_rules.delete(rule_id)?;
        Ok(())
    }

    /// デフォルトのサブカテゴリルールを投入。追加件数を返す。
    pub fn seed_sub_category_rules(&self) -> ApiResult<usize> {
        Ok(self.sub_rules.seed_defaults()?)
    }

    /// 業務名でサブカテゴリを判定テスト
    pub fn test_sub_category(&self, work_name: &str) -> ApiResult<SubCategoryTest> {
        let resolver = SubCategoryResolver::load(&self.sub_rules)?;
        let sub_category = resolver.resolve(work_name, None).map(|s| s.to_string());
        let display = sub_category.clone().unwrap_or_else(|| "(なし)".to_string());
        Ok(SubCategoryTest {
            work_name: work_name.to_string(),
            sub_category,
            display,
        })
    }

    // ==========================================
    // 削減目標管理
    // ==========================================

    /// 削減目標一覧（カテゴリ名付き）
    pub fn list_reduction_goals(&self) -> ApiResult<Vec<ReductionGoalWithCategory>> {
        Ok(self.reduction_goals.list_all()?)
    }

    /// 削減目標を作成
    pub fn create_reduction_goal(&self, input: &NewReductionGoal) -> ApiResult<ReductionGoal> {
        if !(input.target_percent > 0.0 && input.target_percent <= 100.0) {
            return Err(ApiError::InvalidInput(
                "目標削減率は0より大きく100以下で指定してください".to_string(),
            ));
        }
        let category_id = match input.goal_type {
            GoalType::Category => {
                let id = input.category_id.as_deref().ok_or_else(|| {
                    ApiError::InvalidInput("カテゴリ別目標には対象カテゴリが必要です".to_string())
                })?;
                self.categories.find_by_id(id)?;
                Some(id.to_string())
            }
            _ => None,
        };
        let staff_name = match input.goal_type {
            GoalType::Staff => {
                let name = input
                    .staff_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        ApiError::InvalidInput(
                            "担当者別目標には対象担当者が必要です".to_string(),
                        )
                    })?;
                Some(name.to_string())
            }
            _ => None,
        };

        let now = Utc::now().naive_utc();
        let goal = ReductionGoal {
            goal_id: Uuid::new_v4().to_string(),
            goal_type: input.goal_type,
            target_percent: input.target_percent,
            baseline_hours: input.baseline_hours,
            baseline_start: input.baseline_start,
            baseline_end: input.baseline_end,
            category_id,
            staff_name,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.reduction_goals.create(&goal)?;
        Ok(goal)
    }

    /// 削減目標を更新（指定フィールドのみ。対象範囲は変更不可）
    pub fn update_reduction_goal(
        &self,
        goal_id: &str,
        update: &ReductionGoalUpdate,
    ) -> ApiResult<ReductionGoal> {
        let mut goal = self.reduction_goals.find_by_id(goal_id)?;

        if let Some(percent) = update.target_percent {
            if !(percent > 0.0 && percent <= 100.0) {
                return Err(ApiError::InvalidInput(
                    "目標削減率は0より大きく100以下で指定してください".to_string(),
                ));
            }
            goal.target_percent = percent;
        }
        if let Some(hours) = update.baseline_hours {
            goal.baseline_hours = Some(hours);
        }
        if let Some(start) = update.baseline_start {
            goal.baseline_start = Some(start);
        }
        if let Some(end) = update.baseline_end {
            goal.baseline_end = Some(end);
        }
        if let Some(active) = update.is_active {
            goal.is_active = active;
        }
        goal.updated_at = Utc::now().naive_utc();

        self.reduction_goals.update(&goal)?;
        Ok(goal)
    }

    /// 削減目標を削除
    pub fn delete_reduction_goal(&self, goal_id: &str) -> ApiResult<()> {
        self.reduction_goals.delete(goal_id)?;
        Ok(())
    }

    // ==========================================
    // 月次目標管理（部門比較ビュー）
    // ==========================================

    /// 月次目標を UPSERT（部門 × 担当者 × 年月 × 目標番号で一意）
    pub fn upsert_monthly_goal(&self, input: &MonthlyGoalInput) -> ApiResult<MonthlyGoal> {
        validate_monthly_key(&input.department, &input.staff_name, &input.year_month)?;
        if !(1..=5).contains(&input.goal_index) {
            return Err(ApiError::InvalidInput("目標番号は1から5で指定してください".to_string()));
        }

        let goal = MonthlyGoal {
            goal_id: Uuid::new_v4().to_string(),
            department: input.department.trim().to_string(),
            staff_name: input.staff_name.trim().to_string(),
            year_month: input.year_month.trim().to_string(),
            goal_index: input.goal_index,
            goal_name: input.goal_name.clone(),
            progress_percent: normalize_progress(input.progress_percent),
            details: input.details.clone(),
            updated_at: Utc::now().naive_utc(),
        };
        self.monthly_goals.upsert_goal(&goal)?;
        Ok(goal)
    }

    /// 月次通常業務項目を UPSERT
    pub fn upsert_monthly_item(&self, input: &MonthlyItemInput) -> ApiResult<MonthlyBusinessItem> {
        validate_monthly_key(&input.department, &input.staff_name, &input.year_month)?;
        if !(1..=5).contains(&input.item_index) {
            return Err(ApiError::InvalidInput("項目番号は1から5で指定してください".to_string()));
        }

        let item = MonthlyBusinessItem {
            item_id: Uuid::new_v4().to_string(),
            department: input.department.trim().to_string(),
            staff_name: input.staff_name.trim().to_string(),
            year_month: input.year_month.trim().to_string(),
            item_index: input.item_index,
            item_name: input.item_name.clone(),
            progress_percent: normalize_progress(input.progress_percent),
            details: input.details.clone(),
            updated_at: Utc::now().naive_utc(),
        };
        self.monthly_goals.upsert_item(&item)?;
        Ok(item)
    }

    /// 月次目標一覧（部門と年月で絞り込み）
    pub fn list_monthly_goals(
        &self,
        department: &str,
        year_month: &str,
        staff_name: Option<&str>,
    ) -> ApiResult<Vec<MonthlyGoal>> {
        Ok(self.monthly_goals.list_goals(department, year_month, staff_name)?)
    }

    /// 月次通常業務項目一覧（部門と年月で絞り込み）
    pub fn list_monthly_items(
        &self,
        department: &str,
        year_month: &str,
        staff_name: Option<&str>,
    ) -> ApiResult<Vec<MonthlyBusinessItem>> {
        Ok(self.monthly_goals.list_items(department, year_month, staff_name)?)
    }

    /// 月次目標が登録されている年月の一覧（降順）
    pub fn list_goal_year_months(&self) -> ApiResult<Vec<String>> {
        Ok(self.monthly_goals.list_year_months()?)
    }

    // ==========================================
    // 業務名単位の削減対象管理
    // ==========================================

    /// 削減対象の業務名一覧
    pub fn list_task_targets(&self) -> ApiResult<Vec<String>> {
        Ok(self.task_targets.list_all()?)
    }

    /// 業務名の削減対象フラグを切り替え。新しい状態を返す。
    pub fn toggle_task_target(&self, work_name: &str) -> ApiResult<bool> {
        let name = work_name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("業務名が指定されていません".to_string()));
        }
        Ok(self.task_targets.toggle(name)?)
    }

    /// 複数業務名の削減対象フラグを一括設定。変更件数を返す。
    pub fn bulk_set_task_targets(
        &self,
        work_names: &[String],
        is_target: bool,
    ) -> ApiResult<usize> {
        if work_names.is_empty() {
            return Err(ApiError::InvalidInput("業務名が指定されていません".to_string()));
        }
        Ok(self.task_targets.bulk_set(work_names, is_target)?)
    }
}

/// 月次目標のキー項目（部門 / 担当者 / 年月）の必須チェック
fn validate_monthly_key(department: &str, staff_name: &str, year_month: &str) -> ApiResult<()> {
    if department.trim().is_empty() {
        return Err(ApiError::InvalidInput("部門が指定されていません".to_string()));
    }
    if staff_name.trim().is_empty() {
        return Err(ApiError::InvalidInput("担当者が指定されていません".to_string()));
    }
    if year_month.trim().is_empty() {
        return Err(ApiError::InvalidInput("年月が指定されていません".to_string()));
    }
    Ok(())
}
