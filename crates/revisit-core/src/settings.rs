use serde::{Deserialize, Serialize};

/// User settings, owned by the settings UI and read-only to the
/// orchestrator. Field names match the persisted extension JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub user_name: String,
    pub default_interval_days: i64,
    pub priority_threshold_days: i64,
    pub onboarding_complete: bool,
    #[serde(rename = "llmGateway")]
    pub gateway: GatewaySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            default_interval_days: 7,
            priority_threshold_days: 3,
            onboarding_complete: false,
            gateway: GatewaySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewaySettings {
    pub enabled: bool,
    pub api_key: String,
    pub transactions: Transactions,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            transactions: Transactions::default(),
        }
    }
}

/// Per-use-case gateway configuration: which provider/model handles each of
/// the three LLM transactions, and with what knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transactions {
    pub youtube_summary: TransactionConfig,
    pub transcript_formatting: TransactionConfig,
    pub page_summary: TransactionConfig,
}

impl Default for Transactions {
    fn default() -> Self {
        Self {
            youtube_summary: TransactionConfig::new("groq", "openai/gpt-oss-120b", 0.7, 10_000),
            transcript_formatting: TransactionConfig::new(
                "groq",
                "openai/gpt-oss-120b",
                0.3,
                64_000,
            ),
            page_summary: TransactionConfig::new("groq", "openai/gpt-oss-120b", 0.7, 2_500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionConfig {
    pub provider: String,
    pub model: String,
    pub options: TransactionOptions,
}

impl TransactionConfig {
    pub fn new(provider: &str, model: &str, temperature: f64, max_tokens: u32) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            options: TransactionOptions {
                temperature: Some(temperature),
                max_tokens: Some(max_tokens),
            },
        }
    }

    /// A config with an empty provider or model is treated as absent.
    pub fn is_configured(&self) -> bool {
        !self.provider.is_empty() && !self.model.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}
