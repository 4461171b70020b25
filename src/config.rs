use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure loaded from memo_board.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Where state lives and which layout version it uses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Defaults to `<data_local_dir>/memo-board`
    pub data_dir: Option<PathBuf>,
    /// Stored state written under a different marker is discarded on load
    pub state_version: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            state_version: "1".to_string(),
        }
    }
}

/// External recommendation/chat provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdvisorConfig {
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_ms: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            base_url: None,
            max_tokens: 1024,
            temperature: 0.3,
            timeout_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// User/assistant exchanges kept as conversation history
    pub max_history_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history_turns: 10,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            openai_api_key: None,
            log_level: "memo_board=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            anthropic_api_key: non_empty_env("ANTHROPIC_API_KEY"),
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "memo_board=info".to_string()),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses MEMO_BOARD_CONFIG environment variable or defaults to "memo_board.toml"
    pub fn load() -> anyhow::Result<Self> {
        // MEMO_ENV_FILE if set, otherwise ./.env when present
        if let Ok(env_path) = std::env::var("MEMO_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path =
            std::env::var("MEMO_BOARD_CONFIG").unwrap_or_else(|_| "memo_board.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("MEMO_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
            tracing::debug!("MEMO_DATA_DIR env override applied");
        }
        if let Ok(provider) = std::env::var("MEMO_ADVISOR_PROVIDER") {
            self.advisor.provider = provider;
        }
        if let Ok(model) = std::env::var("MEMO_ADVISOR_MODEL") {
            self.advisor.model = model;
        }
        if let Ok(base) = std::env::var("MEMO_ADVISOR_BASE_URL") {
            self.advisor.base_url = Some(base);
        }
        if let Some(timeout) = std::env::var("MEMO_ADVISOR_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.advisor.timeout_ms = timeout;
        }
        if let Some(max_tokens) = std::env::var("MEMO_ADVISOR_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.advisor.max_tokens = max_tokens;
        }
        if let Some(turns) = std::env::var("MEMO_CHAT_HISTORY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.chat.max_history_turns = turns;
        }
    }

    /// Clamp out-of-range values; reject what cannot be repaired.
    pub fn validate(&mut self) -> anyhow::Result<()> {
        self.advisor.provider = self.advisor.provider.trim().to_lowercase();
        match self.advisor.provider.as_str() {
            "anthropic" | "openai" => {}
            other => anyhow::bail!(
                "unknown advisor provider '{}'; expected anthropic or openai",
                other
            ),
        }

        if self.storage.state_version.trim().is_empty() {
            anyhow::bail!("storage.state_version must not be empty");
        }
        self.storage.state_version = self.storage.state_version.trim().to_string();

        if !(0.0..=1.0).contains(&self.advisor.temperature) {
            tracing::warn!(
                "advisor temperature {} out of range, clamping to [0, 1]",
                self.advisor.temperature
            );
            self.advisor.temperature = self.advisor.temperature.clamp(0.0, 1.0);
        }
        if self.advisor.max_tokens == 0 {
            self.advisor.max_tokens = 1;
        } else if self.advisor.max_tokens > 8192 {
            tracing::warn!(
                "advisor max_tokens {} exceeds max 8192, clamping",
                self.advisor.max_tokens
            );
            self.advisor.max_tokens = 8192;
        }
        if self.advisor.timeout_ms < 1_000 {
            tracing::warn!("advisor timeout_ms {} too low, using 1000", self.advisor.timeout_ms);
            self.advisor.timeout_ms = 1_000;
        }
        if self.chat.max_history_turns > 50 {
            self.chat.max_history_turns = 50;
        }
        Ok(())
    }

    /// Resolved data directory for [`crate::storage::FileStorage`]
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|d| d.join("memo-board"))
                .unwrap_or_else(|| PathBuf::from(".memo-board"))
        })
    }

    /// API key for the configured provider, if any
    pub fn advisor_api_key(&self) -> Option<&str> {
        match self.advisor.provider.as_str() {
            "openai" => self.runtime.openai_api_key.as_deref(),
            _ => self.runtime.anthropic_api_key.as_deref(),
        }
    }
}
