// ==========================================
// 業務時間分析ダッシュボード - 余力シミュレーター
// ==========================================
// 責務: ランク別削減率から創出可能な時間・コスト・人日を試算
// 入力: ランク別時間バケット + 時給 + ランク別削減率
// 出力: シミュレーション結果（常に有限値）
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::ValueRank;

use super::aggregator::{round1, RankHours};

/// 1人日あたりの労働時間
pub const HOURS_PER_PERSON_DAY: f64 = 8.0;

/// ランク別の削減率（%）
///
/// 欠けたランクは 0%（削減しない）として扱う。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankReductions {
    pub s: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl RankReductions {
    pub fn get(&self, rank: ValueRank) -> f64 {
        match rank {
            ValueRank::S => self.s,
            ValueRank::A => self.a,
            ValueRank::B => self.b,
            ValueRank::C => self.c,
        }
    }
}

/// ランク単位のシミュレーション結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSimulation {
    pub rank: ValueRank,
    /// 現在の時間（小数第1位)
    pub current_hours: f64,
    /// 適用した削減率（制限後の値）
    pub reduction_percent: f64,
    /// 創出される時間
    pub freed_hours: f64,
    /// 削減後に残る時間
    pub remaining_hours: f64,
}

/// シミュレーション結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// 対象期間の合計時間
    pub total_hours: f64,
    /// ランク別の内訳（S → C の順）
    pub ranks: Vec<RankSimulation>,
    /// 創出される合計時間
    pub freed_hours: f64,
    /// 創出時間に相当する人件費（時給換算）
    pub freed_cost: f64,
    /// 合計時間に対する創出時間の比率（%）
    pub freed_ratio: f64,
    /// 削減後に残る合計時間
    pub remaining_hours: f64,
    /// 創出時間の人日換算（8時間 = 1人日）
    pub person_days: f64,
}

// ==========================================
// CapacitySimulator - 余力シミュレーター
// ==========================================

/// 余力シミュレーター
///
/// ランク別の時間バケットのスナップショットを保持し、
/// 削減率の組み合わせごとに試算を返す。
pub struct CapacitySimulator {
    hours: RankHours,
    hourly_rate: f64,
}

impl CapacitySimulator {
    /// ランク別時間と時給からシミュレーターを作成
    pub fn new(hours: RankHours, hourly_rate: f64) -> Self {
        Self { hours, hourly_rate }
    }

    /// ランク別削減率を適用して試算
    ///
    /// 削減率は [0, 100] に制限し、NaN や無限大は 0 として扱う。
    /// 結果の数値はすべて有限値になる。
    pub fn simulate(&self, reductions: &RankReductions) -> SimulationResult {
        let total_hours = self.hours.total();

        let mut freed_total = 0.0;
        let ranks = ValueRank::ALL
            .iter()
            .map(|&rank| {
                let current = self.hours.get(rank);
                let percent = clamp_percent(reductions.get(rank));
                let freed = current * percent / 100.0;
                freed_total += freed;
                RankSimulation {
                    rank,
                    current_hours: round1(current),
                    reduction_percent: percent,
                    freed_hours: round1(freed),
                    remaining_hours: round1(current - freed),
                }
            })
            .collect();

        let freed_ratio = if total_hours > 0.0 {
            (freed_total / total_hours * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        SimulationResult {
            total_hours: round1(total_hours),
            ranks,
            freed_hours: round1(freed_total),
            freed_cost: freed_total * self.hourly_rate,
            freed_ratio: round1(freed_ratio),
            remaining_hours: round1(total_hours - freed_total),
            person_days: round1(freed_total / HOURS_PER_PERSON_DAY),
        }
    }
}

/// 削減率を [0, 100] へ制限（非有限値は 0）
fn clamp_percent(percent: f64) -> f64 {
    if !percent.is_finite() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}
