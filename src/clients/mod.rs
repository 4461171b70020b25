pub mod anthropic;
pub mod http;
pub mod openai;
pub mod traits;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;
pub use traits::{Advisor, AdvisorError, AdvisorReply, AdvisorRequest, ChatMessage, Role};

use crate::config::Config;
use crate::error::{MemoBoardError, Result};

impl From<AdvisorError> for MemoBoardError {
    fn from(err: AdvisorError) -> Self {
        match err {
            AdvisorError::Timeout { timeout_ms } => MemoBoardError::Timeout {
                operation: "advisor request".to_string(),
                timeout_ms,
            },
            AdvisorError::MissingApiKey(provider) => MemoBoardError::FeatureDisabled {
                message: format!("no API key configured for {}", provider),
            },
            other => MemoBoardError::Provider {
                message: other.to_string(),
            },
        }
    }
}

/// Build the configured advisor. Missing API keys disable the feature
/// rather than failing startup.
pub fn create_advisor(config: &Config) -> Result<Box<dyn Advisor>> {
    let advisor = &config.advisor;
    let key = config
        .advisor_api_key()
        .ok_or_else(|| MemoBoardError::FeatureDisabled {
            message: format!(
                "advisor '{}' has no API key; set {}",
                advisor.provider,
                if advisor.provider == "openai" {
                    "OPENAI_API_KEY"
                } else {
                    "ANTHROPIC_API_KEY"
                }
            ),
        })?;

    tracing::info!(provider = %advisor.provider, model = %advisor.model, "advisor configured");
    match advisor.provider.as_str() {
        "anthropic" => {
            let mut client = AnthropicClient::new(key, &advisor.model, advisor.timeout_ms)?
                .with_max_tokens(advisor.max_tokens)
                .with_temperature(advisor.temperature);
            if let Some(base) = &advisor.base_url {
                client = client.with_base_url(base);
            }
            Ok(Box::new(client))
        }
        "openai" => {
            let mut client = OpenAiClient::new(key, &advisor.model, advisor.timeout_ms)?
                .with_max_tokens(advisor.max_tokens)
                .with_temperature(advisor.temperature);
            if let Some(base) = &advisor.base_url {
                client = client.with_base_url(base);
            }
            Ok(Box::new(client))
        }
        other => Err(MemoBoardError::Config {
            message: format!("unknown advisor provider '{}'", other),
        }),
    }
}
