// ==========================================
// 業務時間分析ダッシュボード - 集計エンジン
// ==========================================
// 責務: 集計行（リポジトリ出力）からダッシュボード表示用データを構築
// 入力: 分類エンジン + カテゴリ一覧 + 集計行
// 出力: サマリー / 内訳 / ランキング / 部門サマリー / 比較
// 制約: SQL は書かない（集計行の整形に徹する）
// ==========================================

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::category::DisplayCategory;
use crate::domain::types::ValueRank;
use crate::repository::{DailyAggRow, StaffAggRow, WorkAggRow};

use super::classifier::KeywordClassifier;
use super::rule_resolver::{SubCategoryResolver, UnitRuleResolver};

/// 業務名が未設定の場合の表示名
pub const UNSET_WORK_NAME: &str = "(未設定)";

/// 小数第1位へ丸める
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ==========================================
// 集計結果型
// ==========================================

/// 集計サマリー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    /// 合計時間（小数第1位）
    pub total_hours: f64,
    /// 合計金額（請求額の総和）
    pub total_cost: f64,
    /// 推定人件費（合計時間 × 時給）
    pub estimated_cost: f64,
    /// ユニーク業務数
    pub task_types: i64,
    /// 削減対象カテゴリの時間比率（%）
    pub reduction_ratio: f64,
}

/// カテゴリ別の時間
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryHours {
    pub category: String,
    pub hours: f64,
}

/// チャート用データセット（Chart.js 互換の形）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
}

/// チャート用の内訳（ラベル + カテゴリ別データセット）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartBreakdown {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

/// ランキング1行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEntry {
    /// 業務名（未設定時はプレースホルダ）
    pub work_name: String,
    /// 分類後の表示カテゴリ
    pub category: String,
    /// 元ファイルの分類2
    pub original_category: Option<String>,
    /// 合計時間（小数第1位）
    pub hours: f64,
    /// 全体に占める比率（%）
    pub ratio: f64,
    /// 合計金額
    pub cost: f64,
    /// 推定人件費（時間 × 時給）
    pub estimated_cost: f64,
    /// 削減対象か（カテゴリ単位または業務名単位）
    pub is_reduction_target: bool,
    /// 表示単位（"h" / "件"）
    pub unit_suffix: String,
    /// サブカテゴリ
    pub sub_category: Option<String>,
}

/// ランク別の時間バケット
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankHours {
    pub s: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl RankHours {
    /// ランクのバケットへ時間を加算
    pub fn add(&mut self, rank: ValueRank, hours: f64) {
        match rank {
            ValueRank::S => self.s += hours,
            ValueRank::A => self.a += hours,
            ValueRank::B => self.b += hours,
            ValueRank::C => self.c += hours,
        }
    }

    /// ランクのバケット値を取得
    pub fn get(&self, rank: ValueRank) -> f64 {
        match rank {
            ValueRank::S => self.s,
            ValueRank::A => self.a,
            ValueRank::B => self.b,
            ValueRank::C => self.c,
        }
    }

    /// 全ランクの合計時間
    pub fn total(&self) -> f64 {
        self.s + self.a + self.b + self.c
    }

    /// 各バケットを小数第1位へ丸めた複製
    pub fn rounded(&self) -> RankHours {
        RankHours {
            s: round1(self.s),
            a: round1(self.a),
            b: round1(self.b),
            c: round1(self.c),
        }
    }
}

/// 部門サマリー（部門比較ビュー用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentSummary {
    /// 部門名
    pub department: String,
    /// 合計時間（小数第1位）
    pub total_hours: f64,
    /// ランク別の時間バケット
    pub rank_hours: RankHours,
    /// 担当者数
    pub staff_count: usize,
    /// 効率スコア: (S+A時間) ÷ 合計時間 × 100 を [0,100] に制限
    pub efficiency_score: f64,
}

/// カテゴリ単位の期間比較
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryComparison {
    pub category: String,
    pub current_hours: f64,
    pub previous_hours: f64,
    pub diff_hours: f64,
    /// 増減率（%、前期間が 0 のときは 0）
    pub diff_ratio: f64,
}

/// 期間比較レポート
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub current_hours: f64,
    pub previous_hours: f64,
    pub diff_hours: f64,
    pub diff_ratio: f64,
    pub categories: Vec<CategoryComparison>,
}

// ==========================================
// 集計間隔 (Trend Interval)
// ==========================================

/// トレンド集計の間隔
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendInterval {
    Daily,   // 日別 (%m-%d)
    Monthly, // 月別 (%Y-%m)
}

impl fmt::Display for TrendInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendInterval::Daily => write!(f, "daily"),
            TrendInterval::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for TrendInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(TrendInterval::Daily),
            "monthly" => Ok(TrendInterval::Monthly),
            other => Err(format!("不明な集計間隔: {}", other)),
        }
    }
}

// ==========================================
// Aggregator - 集計エンジン
// ==========================================

/// 集計エンジン
///
/// 分類エンジンとカテゴリ一覧のスナップショットを保持し、
/// リポジトリが返す集計行を表示用の形へ整形する。
/// カテゴリやキーワードの変更後は作り直して使う。
pub struct Aggregator {
    classifier: KeywordClassifier,
    /// 表示順に並んだカテゴリ
    categories: Vec<DisplayCategory>,
    /// 業務名単位の削減対象
    task_targets: HashSet<String>,
}

impl Aggregator {
    /// 分類エンジンとカテゴリ一覧から集計エンジンを作成
    pub fn new(
        classifier: KeywordClassifier,
        mut categories: Vec<DisplayCategory>,
        task_targets: HashSet<String>,
    ) -> Self {
        categories.sort_by_key(|c| c.sort_order);
        Self {
            classifier,
            categories,
            task_targets,
        }
    }

    /// 表示カテゴリ一覧（表示順）
    pub fn categories(&self) -> &[DisplayCategory] {
        &self.categories
    }

    /// 分類エンジンへの参照
    pub fn classifier(&self) -> &KeywordClassifier {
        &self.classifier
    }

    // ==========================================
    // サマリー
    // ==========================================

    /// 集計サマリーを構築
    ///
    /// 削減対象時間は (分類2, 業務名) ごとに分類した結果が
    /// 削減対象カテゴリに落ちた行の時間合計。
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn summary(&self, rows: &[WorkAggRow], hourly_rate: f64) -> SummaryReport {
        let total_hours: f64 = rows.iter().map(|r| r.hours).sum();
        let total_cost: f64 = rows.iter().map(|r| r.amount).sum();
        let task_types = rows
            .iter()
            .filter_map(|r| r.work_name.as_deref())
            .collect::<HashSet<_>>()
            .len() as i64;

        let mut reduction_hours = 0.0;
        for row in rows {
            let category = self.classify_row(row.category2.as_deref(), row.work_name.as_deref());
            if self.is_reduction_category(category) {
                reduction_hours += row.hours;
            }
        }
        let reduction_ratio = if total_hours > 0.0 {
            reduction_hours / total_hours * 100.0
        } else {
            0.0
        };

        SummaryReport {
            total_hours: round1(total_hours),
            total_cost,
            estimated_cost: total_hours * hourly_rate,
            task_types,
            reduction_ratio: round1(reduction_ratio),
        }
    }

    // ==========================================
    // カテゴリ別内訳
    // ==========================================

    /// カテゴリ別の時間内訳（表示順、該当なしは 0 埋め）
    pub fn category_breakdown(&self, rows: &[WorkAggRow]) -> Vec<CategoryHours> {
        let hours_by_category = self.hours_by_category(rows);
        self.categories
            .iter()
            .map(|c| CategoryHours {
                category: c.name.clone(),
                hours: round1(hours_by_category.get(c.name.as_str()).copied().unwrap_or(0.0)),
            })
            .collect()
    }

    // ==========================================
    // 日次内訳 / トレンド
    // ==========================================

    /// 日次カテゴリ別内訳（ラベルは %m-%d の昇順）
    pub fn daily_breakdown(&self, rows: &[DailyAggRow]) -> ChartBreakdown {
        self.breakdown_by_label(rows, "%m-%d")
    }

    /// トレンド（日別 / 月別のカテゴリ別時間推移）
    pub fn trend(&self, rows: &[DailyAggRow], interval: TrendInterval) -> ChartBreakdown {
        match interval {
            TrendInterval::Daily => self.breakdown_by_label(rows, "%m-%d"),
            TrendInterval::Monthly => self.breakdown_by_label(rows, "%Y-%m"),
        }
    }

    fn breakdown_by_label(&self, rows: &[DailyAggRow], format: &str) -> ChartBreakdown {
        let mut by_label: BTreeMap<String, HashMap<&str, f64>> = BTreeMap::new();
        for row in rows {
            let label = row.work_date.format(format).to_string();
            let category = self.classify_row(row.category2.as_deref(), row.work_name.as_deref());
            *by_label.entry(label).or_default().entry(category).or_insert(0.0) += row.hours;
        }

        let labels: Vec<String> = by_label.keys().cloned().collect();
        let datasets = self
            .categories
            .iter()
            .map(|c| ChartDataset {
                label: c.name.clone(),
                data: by_label
                    .values()
                    .map(|per_category| {
                        round1(per_category.get(c.name.as_str()).copied().unwrap_or(0.0))
                    })
                    .collect(),
                background_color: c.color.clone(),
            })
            .collect();

        ChartBreakdown { labels, datasets }
    }

    // ==========================================
    // ランキング
    // ==========================================

    /// 業務別時間消費ランキング
    ///
    /// 比率の分母は limit 適用前の全行の合計時間。
    /// 削減対象フラグはカテゴリ単位のフラグと
    /// 業務名単位の指定のどちらかが立っていれば true。
    pub fn ranking(
        &self,
        rows: &[WorkAggRow],
        limit: usize,
        hourly_rate: f64,
        units: &UnitRuleResolver,
        sub_categories: &SubCategoryResolver,
    ) -> Vec<RankingEntry> {
        let total_hours: f64 = rows.iter().map(|r| r.hours).sum();

        let mut sorted: Vec<&WorkAggRow> = rows.iter().collect();
        sorted.sort_by(|a, b| b.hours.total_cmp(&a.hours));

        sorted
            .into_iter()
            .take(limit)
            .map(|row| {
                let raw_name = row.work_name.as_deref().unwrap_or("");
                let category = self
                    .classify_row(row.category2.as_deref(), row.work_name.as_deref())
                    .to_string();
                let is_reduction_target = self.is_reduction_category(&category)
                    || (!raw_name.is_empty() && self.task_targets.contains(raw_name));
                let ratio = if total_hours > 0.0 {
                    row.hours / total_hours * 100.0
                } else {
                    0.0
                };

                RankingEntry {
                    work_name: if raw_name.is_empty() {
                        UNSET_WORK_NAME.to_string()
                    } else {
                        raw_name.to_string()
                    },
                    category,
                    original_category: row.category2.clone(),
                    hours: round1(row.hours),
                    ratio: round1(ratio),
                    cost: row.amount,
                    estimated_cost: row.hours * hourly_rate,
                    is_reduction_target,
                    unit_suffix: units.unit_suffix(raw_name).to_string(),
                    sub_category: sub_categories.resolve(raw_name, None).map(|s| s.to_string()),
                }
            })
            .collect()
    }

    // ==========================================
    // 部門サマリー
    // ==========================================

    /// 部門サマリー（合計時間の降順、同率は部門名の昇順）
    ///
    /// 効率スコア = (S+A時間) ÷ 合計時間 × 100 を [0,100] に制限。
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn department_summary(&self, rows: &[StaffAggRow]) -> Vec<DepartmentSummary> {
        struct DeptAcc {
            rank_hours: RankHours,
            staff: HashSet<String>,
        }

        let mut departments: BTreeMap<String, DeptAcc> = BTreeMap::new();
        for row in rows {
            let department = match row.department.as_deref() {
                Some(d) if !d.is_empty() => d.to_string(),
                _ => UNSET_WORK_NAME.to_string(),
            };
            let category = self.classify_row(row.category2.as_deref(), row.work_name.as_deref());
            let rank = self.rank_of(category);

            let acc = departments.entry(department).or_insert_with(|| DeptAcc {
                rank_hours: RankHours::default(),
                staff: HashSet::new(),
            });
            acc.rank_hours.add(rank, row.hours);
            acc.staff.insert(row.staff_name.clone());
        }

        let mut result: Vec<DepartmentSummary> = departments
            .into_iter()
            .map(|(department, acc)| {
                let total = acc.rank_hours.total();
                let efficiency = if total > 0.0 {
                    ((acc.rank_hours.s + acc.rank_hours.a) / total * 100.0).clamp(0.0, 100.0)
                } else {
                    0.0
                };
                DepartmentSummary {
                    department,
                    total_hours: round1(total),
                    rank_hours: acc.rank_hours.rounded(),
                    staff_count: acc.staff.len(),
                    efficiency_score: round1(efficiency),
                }
            })
            .collect();
        result.sort_by(|a, b| {
            b.total_hours
                .total_cmp(&a.total_hours)
                .then_with(|| a.department.cmp(&b.department))
        });
        result
    }

    // ==========================================
    // ランク別バケット / 期間比較
    // ==========================================

    /// ランク別の時間バケット（余力シミュレーターの入力）
    pub fn rank_hours(&self, rows: &[WorkAggRow]) -> RankHours {
        let mut buckets = RankHours::default();
        for row in rows {
            let category = self.classify_row(row.category2.as_deref(), row.work_name.as_deref());
            buckets.add(self.rank_of(category), row.hours);
        }
        buckets
    }

    /// 期間比較（当期間と前期間のカテゴリ別時間）
    pub fn comparison(&self, current: &[WorkAggRow], previous: &[WorkAggRow]) -> ComparisonReport {
        let current_map = self.hours_by_category(current);
        let previous_map = self.hours_by_category(previous);
        let current_total: f64 = current.iter().map(|r| r.hours).sum();
        let previous_total: f64 = previous.iter().map(|r| r.hours).sum();

        let categories = self
            .categories
            .iter()
            .map(|c| {
                let cur = current_map.get(c.name.as_str()).copied().unwrap_or(0.0);
                let prev = previous_map.get(c.name.as_str()).copied().unwrap_or(0.0);
                CategoryComparison {
                    category: c.name.clone(),
                    current_hours: round1(cur),
                    previous_hours: round1(prev),
                    diff_hours: round1(cur - prev),
                    diff_ratio: round1(percent_change(cur, prev)),
                }
            })
            .collect();

        ComparisonReport {
            current_hours: round1(current_total),
            previous_hours: round1(previous_total),
            diff_hours: round1(current_total - previous_total),
            diff_ratio: round1(percent_change(current_total, previous_total)),
            categories,
        }
    }

    // ==========================================
    // 内部ヘルパ
    // ==========================================

    fn classify_row(&self, category2: Option<&str>, work_name: Option<&str>) -> &str {
        self.classifier.classify(category2, work_name)
    }

    /// 削減対象カテゴリか
    fn is_reduction_category(&self, name: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.is_reduction_target && c.name == name)
    }

    /// カテゴリ名 → 価値ランク（未知のカテゴリは B 扱い）
    fn rank_of(&self, name: &str) -> ValueRank {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.rank)
            .unwrap_or(ValueRank::B)
    }

    /// 分類後のカテゴリ名 → 時間合計
    fn hours_by_category<'a>(&'a self, rows: &[WorkAggRow]) -> HashMap<&'a str, f64> {
        let mut hours: HashMap<&str, f64> = HashMap::new();
        for row in rows {
            let category = self.classify_row(row.category2.as_deref(), row.work_name.as_deref());
            *hours.entry(category).or_insert(0.0) += row.hours;
        }
        hours
    }
}

/// 増減率（%）。前値が 0 のときは 0 を返す
fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

// ==========================================
// 単体テスト
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::MatchType;
    use crate::engine::classifier::ClassificationRule;
    use chrono::NaiveDate;

    fn ts() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn category(
        name: &str,
        rank: ValueRank,
        is_reduction_target: bool,
        sort_order: i32,
        color: &str,
    ) -> DisplayCategory {
        DisplayCategory {
            category_id: format!("cat-{}", sort_order),
            name: name.to_string(),
            color: color.to_string(),
            badge_bg_color: "#f3f4f6".to_string(),
            badge_text_color: "#374151".to_string(),
            rank,
            is_reduction_target,
            sort_order,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn aggregator() -> Aggregator {
        let classifier = KeywordClassifier::new(
            vec![
                ClassificationRule::new("会議", MatchType::Contains, "MTG", 30),
                ClassificationRule::new("移動", MatchType::Contains, "移動", 25),
                ClassificationRule::new("入力", MatchType::Contains, "事務", 15),
                ClassificationRule::new("雑務", MatchType::Contains, "その他", 5),
            ],
            "コア業務",
        );
        let categories = vec![
            category("コア業務", ValueRank::S, false, 1, "#3B82F6"),
            category("MTG", ValueRank::A, false, 2, "#8B5CF6"),
            category("事務", ValueRank::B, false, 3, "#6B7280"),
            category("その他", ValueRank::C, true, 4, "#EF4444"),
            category("移動", ValueRank::C, true, 5, "#F97316"),
        ];
        Aggregator::new(classifier, categories, HashSet::new())
    }

    fn work_row(category2: Option<&str>, work_name: Option<&str>, hours: f64, amount: f64) -> WorkAggRow {
        WorkAggRow {
            category1: Some("通常".to_string()),
            category2: category2.map(|s| s.to_string()),
            work_name: work_name.map(|s| s.to_string()),
            hours,
            amount,
            record_count: 1,
        }
    }

    fn daily_row(date: (i32, u32, u32), work_name: &str, hours: f64) -> DailyAggRow {
        DailyAggRow {
            work_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category2: None,
            work_name: Some(work_name.to_string()),
            hours,
        }
    }

    fn staff_row(department: Option<&str>, staff: &str, work_name: &str, hours: f64) -> StaffAggRow {
        StaffAggRow {
            department: department.map(|s| s.to_string()),
            staff_name: staff.to_string(),
            category2: None,
            work_name: Some(work_name.to_string()),
            hours,
        }
    }

    // ==========================================
    // サマリー
    // ==========================================

    #[test]
    fn test_summary_基本集計() {
        let agg = aggregator();
        let rows = vec![
            work_row(None, Some("レセプト点検"), 60.0, 120_000.0),
            work_row(None, Some("定例会議"), 20.0, 40_000.0),
            work_row(None, Some("現場移動"), 15.0, 30_000.0),
            work_row(None, Some("雑務"), 5.0, 10_000.0),
        ];

        let summary = agg.summary(&rows, 2000.0);

        assert_eq!(summary.total_hours, 100.0);
        assert_eq!(summary.total_cost, 200_000.0);
        assert_eq!(summary.estimated_cost, 200_000.0);
        assert_eq!(summary.task_types, 4);
        // 削減対象は 移動 15h + その他 5h = 20h → 20.0%
        assert_eq!(summary.reduction_ratio, 20.0);
    }

    #[test]
    fn test_summary_空データはゼロ() {
        let agg = aggregator();
        let summary = agg.summary(&[], 2000.0);

        assert_eq!(summary.total_hours, 0.0);
        assert_eq!(summary.total_cost, 0.0);
        assert_eq!(summary.estimated_cost, 0.0);
        assert_eq!(summary.task_types, 0);
        assert_eq!(summary.reduction_ratio, 0.0);
    }

    #[test]
    fn test_summary_同一業務名は1種類と数える() {
        let agg = aggregator();
        let rows = vec![
            work_row(Some("制作"), Some("ノート入力"), 10.0, 0.0),
            work_row(Some("技工"), Some("ノート入力"), 5.0, 0.0),
        ];
        assert_eq!(agg.summary(&rows, 2000.0).task_types, 1);
    }

    // ==========================================
    // カテゴリ別内訳
    // ==========================================

    #[test]
    fn test_category_breakdown_表示順とゼロ埋め() {
        let agg = aggregator();
        let rows = vec![
            work_row(None, Some("定例会議"), 12.3, 0.0),
            work_row(None, Some("レセプト点検"), 7.77, 0.0),
        ];

        let breakdown = agg.category_breakdown(&rows);

        assert_eq!(breakdown.len(), 5);
        assert_eq!(breakdown[0].category, "コア業務");
        assert_eq!(breakdown[0].hours, 7.8);
        assert_eq!(breakdown[1].category, "MTG");
        assert_eq!(breakdown[1].hours, 12.3);
        // データの無いカテゴリも 0 で現れる
        assert_eq!(breakdown[2].category, "事務");
        assert_eq!(breakdown[2].hours, 0.0);
        assert_eq!(breakdown[4].category, "移動");
        assert_eq!(breakdown[4].hours, 0.0);
    }

    // ==========================================
    // 日次内訳 / トレンド
    // ==========================================

    #[test]
    fn test_daily_breakdown_ラベル昇順とデータセット() {
        let agg = aggregator();
        let rows = vec![
            daily_row((2025, 4, 2), "定例会議", 3.0),
            daily_row((2025, 4, 1), "レセプト点検", 5.0),
            daily_row((2025, 4, 2), "レセプト点検", 2.0),
        ];

        let chart = agg.daily_breakdown(&rows);

        assert_eq!(chart.labels, vec!["04-01", "04-02"]);
        assert_eq!(chart.datasets.len(), 5);

        let core = &chart.datasets[0];
        assert_eq!(core.label, "コア業務");
        assert_eq!(core.data, vec![5.0, 2.0]);
        assert_eq!(core.background_color, "#3B82F6");

        let mtg = &chart.datasets[1];
        assert_eq!(mtg.data, vec![0.0, 3.0]);
    }

    #[test]
    fn test_trend_月別ラベル() {
        let agg = aggregator();
        let rows = vec![
            daily_row((2025, 4, 10), "レセプト点検", 5.0),
            daily_row((2025, 5, 1), "レセプト点検", 3.0),
            daily_row((2025, 4, 20), "定例会議", 2.0),
        ];

        let chart = agg.trend(&rows, TrendInterval::Monthly);

        assert_eq!(chart.labels, vec!["2025-04", "2025-05"]);
        assert_eq!(chart.datasets[0].data, vec![5.0, 3.0]);
        assert_eq!(chart.datasets[1].data, vec![2.0, 0.0]);
    }

    // ==========================================
    // ランキング
    // ==========================================

    #[test]
    fn test_ranking_降順と比率() {
        let agg = aggregator();
        let units = UnitRuleResolver::new(vec![]);
        let subs = SubCategoryResolver::new(vec![]);
        let rows = vec![
            work_row(None, Some("レセプト点検"), 30.0, 60_000.0),
            work_row(None, Some("現場移動"), 50.0, 100_000.0),
            work_row(None, Some("定例会議"), 20.0, 40_000.0),
        ];

        let ranking = agg.ranking(&rows, 2, 2000.0, &units, &subs);

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].work_name, "現場移動");
        assert_eq!(ranking[0].category, "移動");
        assert_eq!(ranking[0].hours, 50.0);
        assert_eq!(ranking[0].ratio, 50.0);
        assert_eq!(ranking[0].estimated_cost, 100_000.0);
        assert!(ranking[0].is_reduction_target);

        assert_eq!(ranking[1].work_name, "レセプト点検");
        assert_eq!(ranking[1].category, "コア業務");
        // 比率の分母は limit 適用前の合計 100h
        assert_eq!(ranking[1].ratio, 30.0);
        assert!(!ranking[1].is_reduction_target);
    }

    #[test]
    fn test_ranking_業務名未設定はプレースホルダ() {
        let agg = aggregator();
        let units = UnitRuleResolver::new(vec![]);
        let subs = SubCategoryResolver::new(vec![]);
        let rows = vec![work_row(Some("制作"), None, 10.0, 0.0)];

        let ranking = agg.ranking(&rows, 10, 2000.0, &units, &subs);

        assert_eq!(ranking[0].work_name, "(未設定)");
        assert_eq!(ranking[0].original_category.as_deref(), Some("制作"));
    }

    #[test]
    fn test_ranking_業務名単位の削減対象() {
        let classifier = KeywordClassifier::new(vec![], "コア業務");
        let categories = vec![category("コア業務", ValueRank::S, false, 1, "#3B82F6")];
        let mut targets = HashSet::new();
        targets.insert("電話対応".to_string());
        let agg = Aggregator::new(classifier, categories, targets);

        let units = UnitRuleResolver::new(vec![]);
        let subs = SubCategoryResolver::new(vec![]);
        let rows = vec![
            work_row(None, Some("電話対応"), 10.0, 0.0),
            work_row(None, Some("書類整理"), 5.0, 0.0),
        ];

        let ranking = agg.ranking(&rows, 10, 2000.0, &units, &subs);

        // カテゴリは削減対象でなくても業務名指定でフラグが立つ
        assert!(ranking[0].is_reduction_target);
        assert!(!ranking[1].is_reduction_target);
    }

    // ==========================================
    // 部門サマリー
    // ==========================================

    #[test]
    fn test_department_summary_ランク集計と効率スコア() {
        let agg = aggregator();
        let rows = vec![
            staff_row(Some("制作部"), "山田", "レセプト点検", 60.0),
            staff_row(Some("制作部"), "佐藤", "定例会議", 20.0),
            staff_row(Some("制作部"), "山田", "ノート入力", 10.0),
            staff_row(Some("制作部"), "佐藤", "現場移動", 10.0),
            staff_row(Some("営業部"), "鈴木", "現場移動", 5.0),
        ];

        let summaries = agg.department_summary(&rows);

        assert_eq!(summaries.len(), 2);
        let seisaku = &summaries[0];
        assert_eq!(seisaku.department, "制作部");
        assert_eq!(seisaku.total_hours, 100.0);
        assert_eq!(seisaku.rank_hours.s, 60.0);
        assert_eq!(seisaku.rank_hours.a, 20.0);
        assert_eq!(seisaku.rank_hours.b, 10.0);
        assert_eq!(seisaku.rank_hours.c, 10.0);
        assert_eq!(seisaku.staff_count, 2);
        // (60 + 20) / 100 × 100 = 80
        assert_eq!(seisaku.efficiency_score, 80.0);

        let eigyo = &summaries[1];
        assert_eq!(eigyo.department, "営業部");
        assert_eq!(eigyo.staff_count, 1);
        assert_eq!(eigyo.efficiency_score, 0.0);
    }

    #[test]
    fn test_department_summary_部門未設定はプレースホルダ() {
        let agg = aggregator();
        let rows = vec![staff_row(None, "山田", "レセプト点検", 5.0)];
        let summaries = agg.department_summary(&rows);
        assert_eq!(summaries[0].department, "(未設定)");
    }

    #[test]
    fn test_department_summary_空データ() {
        let agg = aggregator();
        assert!(agg.department_summary(&[]).is_empty());
    }

    // ==========================================
    // ランク別バケット / 期間比較
    // ==========================================

    #[test]
    fn test_rank_hours_バケット集計() {
        let agg = aggregator();
        let rows = vec![
            work_row(None, Some("レセプト点検"), 40.0, 0.0),
            work_row(None, Some("定例会議"), 30.0, 0.0),
            work_row(None, Some("現場移動"), 20.0, 0.0),
            work_row(None, Some("雑務"), 10.0, 0.0),
        ];

        let buckets = agg.rank_hours(&rows);

        assert_eq!(buckets.s, 40.0);
        assert_eq!(buckets.a, 30.0);
        assert_eq!(buckets.b, 0.0);
        // 移動とその他はどちらもランク C
        assert_eq!(buckets.c, 30.0);
        assert_eq!(buckets.total(), 100.0);
    }

    #[test]
    fn test_comparison_増減率() {
        let agg = aggregator();
        let current = vec![
            work_row(None, Some("レセプト点検"), 60.0, 0.0),
            work_row(None, Some("定例会議"), 40.0, 0.0),
        ];
        let previous = vec![
            work_row(None, Some("レセプト点検"), 50.0, 0.0),
            work_row(None, Some("現場移動"), 10.0, 0.0),
        ];

        let report = agg.comparison(&current, &previous);

        assert_eq!(report.current_hours, 100.0);
        assert_eq!(report.previous_hours, 60.0);
        assert_eq!(report.diff_hours, 40.0);
        assert_eq!(report.diff_ratio, 66.7);

        let core = &report.categories[0];
        assert_eq!(core.category, "コア業務");
        assert_eq!(core.current_hours, 60.0);
        assert_eq!(core.previous_hours, 50.0);
        assert_eq!(core.diff_ratio, 20.0);

        // 前期間 0 の場合は増減率 0
        let mtg = &report.categories[1];
        assert_eq!(mtg.previous_hours, 0.0);
        assert_eq!(mtg.diff_ratio, 0.0);
    }
}
