// ==========================================
// 業務時間分析ダッシュボード - AI プロバイダファクトリ
// ==========================================
// 環境変数 AI_PROVIDER に基づいてプロバイダを生成
// ==========================================

use std::sync::Arc;

use tracing::info;

use super::anthropic::AnthropicProvider;
use super::provider::{AiError, AiProvider, AiResult};

/// 設定された AI プロバイダを生成する
///
/// # 環境変数
/// - AI_PROVIDER: プロバイダ名（省略時は "anthropic"）
///
/// # 戻り値
/// - Err(UnknownProvider): 未知のプロバイダ名が指定された
pub fn create_provider() -> AiResult<Arc<dyn AiProvider>> {
    let provider_name = std::env::var("AI_PROVIDER")
        .unwrap_or_else(|_| "anthropic".to_string())
        .to_lowercase();

    match provider_name.as_str() {
        "anthropic" => {
            let provider = AnthropicProvider::from_env();
            info!(provider = "anthropic", model = %provider.model_name(), "AIプロバイダを初期化");
            Ok(Arc::new(provider))
        }
        other => Err(AiError::UnknownProvider(other.to_string())),
    }
}
