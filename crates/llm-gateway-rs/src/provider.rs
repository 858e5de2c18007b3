use crate::types::{CallOptions, ChatMessage};
use serde_json::{json, Value};

/// Known gateway provider families.
///
/// Providers disagree on where (and whether) the token limit goes, so the
/// request shape is derived from a closed set rather than an open options
/// bag. Unknown providers land in `Other` and pass options through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAi,
    Anthropic,
    Mistral,
    Other(String),
}

impl Provider {
    /// Case-insensitive lookup; `Other` keeps the normalized name.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "groq" => Self::Groq,
            "openai" => Self::OpenAi,
            "anthropic" => Self::Anthropic,
            "mistral" => Self::Mistral,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Mistral => "mistral",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape a generic chat call into the gateway body for one provider.
///
/// groq and openai reject any token-limit field. anthropic requires
/// `max_tokens` as a top-level field. mistral takes snake_case
/// `max_tokens` nested in options. Temperature always rides in the nested
/// options object when present. Violating this table produces upstream
/// 400s, so it is fixed.
pub fn format_request(
    provider: &Provider,
    model: &str,
    messages: &[ChatMessage],
    options: &CallOptions,
) -> Value {
    let mut body = json!({
        "provider": provider.as_str(),
        "model": model,
        "messages": messages,
        "standardFormat": true,
    });

    match provider {
        Provider::Groq | Provider::OpenAi => {
            if let Some(temperature) = options.temperature {
                body["options"] = json!({ "temperature": temperature });
            }
        }
        Provider::Anthropic => {
            if let Some(max_tokens) = options.max_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
            if let Some(temperature) = options.temperature {
                body["options"] = json!({ "temperature": temperature });
            }
        }
        Provider::Mistral => {
            let mut nested = serde_json::Map::new();
            if let Some(max_tokens) = options.max_tokens {
                nested.insert("max_tokens".to_string(), json!(max_tokens));
            }
            if let Some(temperature) = options.temperature {
                nested.insert("temperature".to_string(), json!(temperature));
            }
            if !nested.is_empty() {
                body["options"] = Value::Object(nested);
            }
        }
        Provider::Other(_) => {
            if !options.is_empty() {
                body["options"] = json!(options);
            }
        }
    }

    body
}
