// ==========================================
// 業務時間分析ダッシュボード - 分析エンジン層
// ==========================================
// 分類・集計・グルーピング・シミュレーションの純粋ロジック。
// DB には触れず、リポジトリ層が渡すスナップショットだけを扱う。
// ==========================================

pub mod aggregator;
pub mod classifier;
pub mod grouper;
pub mod rule_resolver;
pub mod simulator;

pub use aggregator::Aggregator;
pub use classifier::KeywordClassifier;
pub use grouper::TaskGrouper;
pub use rule_resolver::{SubCategoryResolver, UnitRuleResolver};
pub use simulator::CapacitySimulator;
