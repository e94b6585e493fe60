// ==========================================
// 業務時間分析ダッシュボード - AI API
// ==========================================
// 責務: AI 分類プレビュー / グルーピング / インサイト / チャット / レポート
// 構成: API 層 → AI プロバイダ + リポジトリ層
// 注意: プロバイダ呼び出しは毎回リクエストログに記録する。
//       記録自体の失敗は警告に留め、応答は返す
// ==========================================

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::{
    AiProvider, CategorySuggestion, ChatResponse, ChatTurn, InsightResult, KeywordRuleSummary,
    TokenUsage, WorkItem, AI_GROUPING_MAX_REPRESENTATIVES, AI_GROUPING_MIN_GROUPS,
    CATEGORIZE_BATCH_LIMIT, INSIGHT_CACHE_TTL_HOURS,
};
use crate::api::analytics_api::AnalyticsApi;
use crate::api::dashboard_api::DashboardApi;
use crate::api::error::{ApiError, ApiResult};
use crate::config::SettingsManager;
use crate::domain::ai::{AiCategorySuggestion, AiCategorySuggestionWithName};
use crate::domain::types::{ConfidenceLevel, ReportKind, SuggestionStatus};
use crate::engine::aggregator::TrendInterval;
use crate::engine::grouper::{TaskGroup, TaskGrouper};
use crate::engine::KeywordClassifier;
use crate::repository::{
    AiInsightCacheRepository, AiRequestLogRepository, AiSuggestionRepository, AiUsageSummary,
    CategoryKeywordRepository, DisplayCategoryRepository, RecordFilter, UniqueCombination,
    WorkRecordRepository,
};

/// 分類プロンプトに載せる既存キーワードルールの上限
const PROMPT_RULE_LIMIT: usize = 50;

/// ユニーク組み合わせ一覧の取得上限
const UNIQUE_COMBINATION_LIMIT: i64 = 200;

/// キーワードフォールバック時の確信度
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// チャットの AI 障害時にユーザーへ返す文言
const CHAT_UNAVAILABLE_MESSAGE: &str =
    "申し訳ありません。現在AI機能が利用できません。しばらくしてから再度お試しください。";

// ==========================================
// レスポンス DTO
// ==========================================

/// 分類プレビューの1行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedItem {
    /// 入力リスト内のインデックス
    pub item_index: usize,
    /// 対象アイテム
    pub item: WorkItem,
    /// 提案カテゴリ名
    pub suggested_category: String,
    /// 提案カテゴリID（未知のカテゴリ名なら None）
    pub suggested_category_id: Option<String>,
    /// 確信度（0.0-1.0）
    pub confidence: f64,
    /// 確信度レベル（行の色分け用）
    pub confidence_level: ConfidenceLevel,
    /// 判断理由
    pub reasoning: String,
}

/// 分類プレビューの結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizePreview {
    pub suggestions: Vec<CategorizedItem>,
    /// AI が使えずキーワード分類へ退避したか
    pub fallback: bool,
    /// フォールバック時の案内文
    pub message: Option<String>,
}

/// グルーピングの結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedTasks {
    pub groups: Vec<TaskGroup>,
    /// グルーピング前のユニーク業務名数
    pub original_count: usize,
    /// グルーピング後のグループ数
    pub grouped_count: usize,
    /// "local" または "ai"
    pub method: String,
}

/// ユニークな (分類1, 分類2, 業務名) 組み合わせ一覧
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationReport {
    pub combinations: Vec<UniqueCombination>,
    pub total: usize,
}

/// インサイト応答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    pub highlights: Vec<String>,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
    /// 生成日時（RFC 3339）
    pub generated_at: String,
    /// キャッシュから返したか
    pub cached: bool,
}

/// レポート生成応答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedReport {
    /// Markdown 本文
    pub report: String,
    pub format: String,
    pub generated_at: String,
}

// ==========================================
// AiApi
// ==========================================

/// AI API
pub struct AiApi {
    provider: Arc<dyn AiProvider>,
    dashboard: Arc<DashboardApi>,
    analytics: Arc<AnalyticsApi>,
    records: Arc<WorkRecordRepository>,
    categories: Arc<DisplayCategoryRepository>,
    keywords: Arc<CategoryKeywordRepository>,
    suggestions: Arc<AiSuggestionRepository>,
    cache: Arc<AiInsightCacheRepository>,
    request_log: Arc<AiRequestLogRepository>,
    settings: Arc<SettingsManager>,
    grouper: TaskGrouper,
}

impl AiApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn AiProvider>,
        dashboard: Arc<DashboardApi>,
        analytics: Arc<AnalyticsApi>,
        records: Arc<WorkRecordRepository>,
        categories: Arc<DisplayCategoryRepository>,
        keywords: Arc<CategoryKeywordRepository>,
        suggestions: Arc<AiSuggestionRepository>,
        cache: Arc<AiInsightCacheRepository>,
        request_log: Arc<AiRequestLogRepository>,
        settings: Arc<SettingsManager>,
    ) -> Self {
        Self {
            provider,
            dashboard,
            analytics,
            records,
            categories,
            keywords,
            suggestions,
            cache,
            request_log,
            settings,
            grouper: TaskGrouper::new(),
        }
    }

    // ==========================================
    // 分類プレビュー
    // ==========================================

    /// 業務アイテムを AI でカテゴリ分類（プレビューのみ、保存しない）
    ///
    /// # 引数
    /// - items: 分類対象（1回につき100件まで）
    ///
    /// # 戻り値
    /// アイテムごとの提案。AI 障害時はキーワード分類へ退避し、
    /// `fallback: true` と案内文を添えて返す。
    pub async fn categorize_preview(&self, items: &[WorkItem]) -> ApiResult<CategorizePreview> {
        if items.is_empty() {
            return Err(ApiError::InvalidInput("分類対象が指定されていません".to_string()));
        }
        if items.len() > CATEGORIZE_BATCH_LIMIT {
            return Err(ApiError::InvalidInput(format!(
                "一度に分類できるのは{}件までです",
                CATEGORIZE_BATCH_LIMIT
            )));
        }

        let mut categories = self.categories.list_all()?;
        categories.sort_by_key(|c| c.sort_order);
        let category_names: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
        let category_ids: HashMap<String, String> = categories
            .into_iter()
            .map(|c| (c.name, c.category_id))
            .collect();

        let rules: Vec<KeywordRuleSummary> = self
            .keywords
            .list(None, true)?
            .into_iter()
            .take(PROMPT_RULE_LIMIT)
            .map(|k| KeywordRuleSummary {
                keyword: k.keyword.keyword,
                category: k.display_category_name,
            })
            .collect();

        match self
            .provider
            .categorize_work_items(items, &category_names, &rules)
            .await
        {
            Ok((suggestions, usage)) => {
                self.log_ai_request("categorize", Some(usage), false, true, None);
                let merged = merge_suggestions(items, &suggestions, &category_ids);
                Ok(CategorizePreview {
                    suggestions: merged,
                    fallback: false,
                    message: None,
                })
            }
            Err(err) => {
                warn!(error = %err, "AI分類に失敗。キーワード分類へ退避");
                self.log_ai_request("categorize", None, false, false, Some(&err.to_string()));
                let fallback = self.classify_by_keywords(items, &category_ids)?;
                Ok(CategorizePreview {
                    suggestions: fallback,
                    fallback: true,
                    message: Some(
                        "AI機能が利用できないため、キーワードベースで分類しました".to_string(),
                    ),
                })
            }
        }
    }

    /// キーワード分類によるフォールバック提案を作成
    fn classify_by_keywords(
        &self,
        items: &[WorkItem],
        category_ids: &HashMap<String, String>,
    ) -> ApiResult<Vec<CategorizedItem>> {
        let default_category = self.settings.default_category()?;
        let classifier = KeywordClassifier::load(&self.keywords, default_category)?;

        Ok(items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let category = classifier
                    .classify(item.category2.as_deref(), Some(&item.work_name))
                    .to_string();
                CategorizedItem {
                    item_index: index,
                    item: item.clone(),
                    suggested_category_id: category_ids.get(&category).cloned(),
                    suggested_category: category,
                    confidence: FALLBACK_CONFIDENCE,
                    confidence_level: ConfidenceLevel::from_score(FALLBACK_CONFIDENCE),
                    reasoning: "キーワードベースで分類（AI利用不可）".to_string(),
                }
            })
            .collect())
    }

    // ==========================================
    // 提案レビュー
    // ==========================================

    /// 分類提案をレビュー待ち行列へ保存
    ///
    /// カテゴリIDを解決できなかった行は読み飛ばす。保存件数を返す。
    pub fn save_suggestions(&self, items: &[CategorizedItem]) -> ApiResult<usize> {
        let now = Utc::now().naive_utc();
        let mut saved = 0usize;
        for item in items {
            let Some(category_id) = item.suggested_category_id.clone() else {
                continue;
            };
            let suggestion = AiCategorySuggestion {
                suggestion_id: Uuid::new_v4().to_string(),
                work_name: item.item.work_name.clone(),
                category1: item.item.category1.clone(),
                category2: item.item.category2.clone(),
                suggested_category_id: Some(category_id),
                confidence: item.confidence,
                reasoning: Some(item.reasoning.clone()),
                status: SuggestionStatus::Pending,
                created_at: now,
                reviewed_at: None,
            };
            self.suggestions.save(&suggestion)?;
            saved += 1;
        }
        info!(saved, "分類提案を保存");
        Ok(saved)
    }

    /// 提案一覧（作成日時降順）。ステータスで絞り込み可能。
    pub fn list_suggestions(
        &self,
        status: Option<SuggestionStatus>,
    ) -> ApiResult<Vec<AiCategorySuggestionWithName>> {
        Ok(self.suggestions.list(status)?)
    }

    /// 提案をレビュー（承認または却下）
    pub fn review_suggestion(
        &self,
        suggestion_id: &str,
        status: SuggestionStatus,
    ) -> ApiResult<()> {
        if status == SuggestionStatus::Pending {
            return Err(ApiError::InvalidInput(
                "レビュー結果には承認か却下を指定してください".to_string(),
            ));
        }
        self.suggestions.review(suggestion_id, status)?;
        Ok(())
    }

    // ==========================================
    // 業務名グルーピング
    // ==========================================

    /// 類似業務名をグループ化
    ///
    /// ローカルグルーピングは常に実行する。`use_ai` が指定され、
    /// ローカル処理後もグループ数が多い場合のみ AI で追加統合する。
    /// AI 障害時はローカル結果をそのまま返す。
    pub async fn group_tasks(
        &self,
        work_names: &[String],
        use_ai: bool,
    ) -> ApiResult<GroupedTasks> {
        if work_names.is_empty() {
            return Err(ApiError::InvalidInput("業務名が指定されていません".to_string()));
        }

        let local = self.grouper.group_tasks(work_names, true);

        if use_ai && local.grouped_count > AI_GROUPING_MIN_GROUPS {
            let representatives: Vec<String> =
                local.groups.iter().map(|g| g.representative.clone()).collect();

            if representatives.len() <= AI_GROUPING_MAX_REPRESENTATIVES {
                match self.provider.group_similar_tasks(&representatives).await {
                    Ok((ai_result, usage)) => {
                        self.log_ai_request("grouping", Some(usage), false, true, None);
                        let groups = merge_ai_groups(&local.groups, &ai_result.groups);
                        return Ok(GroupedTasks {
                            original_count: local.original_count,
                            grouped_count: groups.len(),
                            groups,
                            method: "ai".to_string(),
                        });
                    }
                    Err(err) => {
                        warn!(error = %err, "AIグルーピングに失敗。ローカル結果を返却");
                        self.log_ai_request(
                            "grouping",
                            None,
                            false,
                            false,
                            Some(&err.to_string()),
                        );
                    }
                }
            }
        }

        Ok(GroupedTasks {
            groups: local.groups,
            original_count: local.original_count,
            grouped_count: local.grouped_count,
            method: "local".to_string(),
        })
    }

    /// ユニークな (分類1, 分類2, 業務名) の組み合わせ一覧（件数降順）
    pub fn unique_combinations(&self) -> ApiResult<CombinationReport> {
        let combinations = self.records.unique_combinations(UNIQUE_COMBINATION_LIMIT)?;
        let total = combinations.len();
        Ok(CombinationReport {
            combinations,
            total,
        })
    }

    // ==========================================
    // インサイト
    // ==========================================

    /// ダッシュボード向けインサイトを生成
    ///
    /// 同一フィルタの結果は1時間キャッシュされる。
    /// AI 障害時はエラーを返す（フォールバック文面は持たない）。
    pub async fn get_insights(&self, filter: &RecordFilter) -> ApiResult<InsightReport> {
        let cache_key = insight_cache_key(filter)?;

        if let Some(content) = self.cache.get(&cache_key)? {
            // 壊れたキャッシュは読み飛ばして再生成する
            if let Ok(result) = serde_json::from_str::<InsightResult>(&content) {
                self.log_ai_request("insight", None, true, true, None);
                return Ok(insight_report(result, true));
            }
        }

        let summary = self.dashboard.get_summary(filter, None)?;
        let trend = self.analytics.get_trend(filter, TrendInterval::Daily)?;
        let trend = serde_json::to_value(&trend)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        let alerts: Vec<Value> = Vec::new();
        let period = period_label(filter);

        match self
            .provider
            .generate_insights(&summary, &trend, &alerts, &period)
            .await
        {
            Ok((result, usage)) => {
                self.log_ai_request("insight", Some(usage), false, true, None);
                match serde_json::to_string(&result) {
                    Ok(content) => {
                        if let Err(e) = self.cache.set(&cache_key, &content, INSIGHT_CACHE_TTL_HOURS)
                        {
                            warn!(error = %e, "インサイトのキャッシュ保存に失敗");
                        }
                    }
                    Err(e) => warn!(error = %e, "インサイトのシリアライズに失敗"),
                }
                Ok(insight_report(result, false))
            }
            Err(err) => {
                self.log_ai_request("insight", None, false, false, Some(&err.to_string()));
                Err(ApiError::AiServiceUnavailable(err.to_string()))
            }
        }
    }

    /// 期限切れのインサイトキャッシュを削除。削除件数を返す。
    pub fn purge_expired_insights(&self) -> ApiResult<usize> {
        Ok(self.cache.purge_expired()?)
    }

    // ==========================================
    // チャット
    // ==========================================

    /// 業務データについての自然言語の質問に回答
    ///
    /// # 引数
    /// - question: 質問文
    /// - history: 直近の会話履歴
    /// - filter: 回答の根拠データを絞り込む条件
    pub async fn chat(
        &self,
        question: &str,
        history: &[ChatTurn],
        filter: &RecordFilter,
    ) -> ApiResult<ChatResponse> {
        if question.trim().is_empty() {
            return Err(ApiError::InvalidInput("質問が入力されていません".to_string()));
        }

        let summary = self.dashboard.get_summary(filter, None)?;
        let ranking = self.dashboard.get_ranking(filter, Some(5), None)?;
        let mut categories = self.categories.list_all()?;
        categories.sort_by_key(|c| c.sort_order);
        let category_names: Vec<String> = categories.into_iter().map(|c| c.name).collect();
        let context = json!({
            "summary": summary,
            "ranking": ranking,
            "categories": category_names,
        });

        match self.provider.chat_query(question, &context, history).await {
            Ok((reply, usage)) => {
                self.log_ai_request("chat", Some(usage), false, true, None);
                Ok(reply)
            }
            Err(err) => {
                self.log_ai_request("chat", None, false, false, Some(&err.to_string()));
                Err(ApiError::AiServiceUnavailable(CHAT_UNAVAILABLE_MESSAGE.to_string()))
            }
        }
    }

    // ==========================================
    // レポート
    // ==========================================

    /// 週次・月次レポートを生成
    pub async fn generate_report(
        &self,
        kind: ReportKind,
        filter: &RecordFilter,
    ) -> ApiResult<GeneratedReport> {
        let summary = self.dashboard.get_summary(filter, None)?;
        let trend = self.analytics.get_trend(filter, TrendInterval::Daily)?;
        let ranking = self.dashboard.get_ranking(filter, Some(10), None)?;
        let data = json!({
            "summary": summary,
            "trend": trend,
            "ranking": ranking,
        });
        let period_start = filter
            .start
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let period_end = filter
            .end
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        match self
            .provider
            .generate_report(kind, &data, &period_start, &period_end)
            .await
        {
            Ok((result, usage)) => {
                self.log_ai_request("report", Some(usage), false, true, None);
                Ok(GeneratedReport {
                    report: result.content,
                    format: result.format,
                    generated_at: Utc::now().to_rfc3339(),
                })
            }
            Err(err) => {
                self.log_ai_request("report", None, false, false, Some(&err.to_string()));
                Err(ApiError::AiServiceUnavailable(err.to_string()))
            }
        }
    }

    // ==========================================
    // 使用量
    // ==========================================

    /// AI リクエストの累計使用量（件数・トークン・推定コスト）
    pub fn usage_summary(&self) -> ApiResult<AiUsageSummary> {
        Ok(self.request_log.usage_summary()?)
    }

    /// プロバイダ呼び出しをリクエストログへ記録。失敗しても応答は止めない。
    fn log_ai_request(
        &self,
        request_type: &str,
        usage: Option<TokenUsage>,
        cached: bool,
        success: bool,
        error_message: Option<&str>,
    ) {
        let usage = usage.unwrap_or_default();
        if let Err(e) = self.request_log.log_request(
            request_type,
            Some(self.provider.model_name()),
            usage.input_tokens,
            usage.output_tokens,
            cached,
            success,
            error_message,
        ) {
            warn!(error = %e, request_type, "AIリクエストログの記録に失敗");
        }
    }
}

// ==========================================
// 内部ヘルパー
// ==========================================

/// AI の提案をインデックスで元アイテムへ突き合わせる
///
/// 範囲外のインデックスを指す提案は読み飛ばす。
fn merge_suggestions(
    items: &[WorkItem],
    suggestions: &[CategorySuggestion],
    category_ids: &HashMap<String, String>,
) -> Vec<CategorizedItem> {
    suggestions
        .iter()
        .filter_map(|suggestion| {
            let item = items.get(suggestion.item_index)?;
            Some(CategorizedItem {
                item_index: suggestion.item_index,
                item: item.clone(),
                suggested_category: suggestion.category_name.clone(),
                suggested_category_id: category_ids.get(&suggestion.category_name).cloned(),
                confidence: suggestion.confidence,
                confidence_level: ConfidenceLevel::from_score(suggestion.confidence),
                reasoning: suggestion.reasoning.clone(),
            })
        })
        .collect()
}

/// ローカルグループを AI の統合結果の下へ束ね直す
///
/// AI グループの構成名はローカルの代表名を指す。AI が触れなかった
/// 代表名は元のグループのまま残す。結果は代表名の昇順。
fn merge_ai_groups(local_groups: &[TaskGroup], ai_groups: &[TaskGroup]) -> Vec<TaskGroup> {
    let mut rep_of: HashMap<&str, &str> = HashMap::new();
    for group in ai_groups {
        for member in &group.members {
            rep_of.insert(member.as_str(), group.representative.as_str());
        }
    }

    let mut merged: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for local in local_groups {
        let representative = rep_of
            .get(local.representative.as_str())
            .copied()
            .unwrap_or(local.representative.as_str());
        merged
            .entry(representative.to_string())
            .or_default()
            .extend(local.members.iter().cloned());
    }

    merged
        .into_iter()
        .map(|(representative, members)| TaskGroup {
            representative,
            members: members.into_iter().collect(),
        })
        .collect()
}

/// フィルタからインサイトのキャッシュキーを算出
///
/// `insight:` + フィルタ JSON の SHA-256 先頭16桁（hex）。
fn insight_cache_key(filter: &RecordFilter) -> ApiResult<String> {
    let canonical =
        serde_json::to_vec(filter).map_err(|e| ApiError::InternalError(e.to_string()))?;
    let digest = Sha256::digest(&canonical);
    let hex = format!("{:x}", digest);
    Ok(format!("insight:{}", &hex[..16]))
}

/// フィルタ期間の表示ラベル（例: "2025-04-01 ~ 2025-04-30"）
fn period_label(filter: &RecordFilter) -> String {
    let start = filter
        .start
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "開始日".to_string());
    let end = filter
        .end
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "終了日".to_string());
    format!("{} ~ {}", start, end)
}

fn insight_report(result: InsightResult, cached: bool) -> InsightReport {
    InsightReport {
        highlights: result.highlights,
        concerns: result.concerns,
        recommendations: result.recommendations,
        generated_at: Utc::now().to_rfc3339(),
        cached,
    }
}
