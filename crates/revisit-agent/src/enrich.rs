use llm_gateway_rs::{
    extract_json, CallOptions, ChatMessage, GatewayClient, GatewayError, Provider,
};
use revisit_core::TransactionConfig;
use serde::Deserialize;

/// The structured payload every summary transaction must return.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Enrichment {
    pub summary: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

const JSON_SHAPE: &str = r#"Return ONLY a JSON object with this exact structure:
{
  "summary": "markdown summary",
  "category": "single category name",
  "tags": ["tag1", "tag2", "tag3"]
}"#;

/// Summarize, categorize, and tag a generic page from its scraped text.
pub async fn summarize_page(
    gateway: &GatewayClient,
    cfg: &TransactionConfig,
    api_key: &str,
    content: &str,
    categories: &[String],
) -> Result<Enrichment, GatewayError> {
    require_configured(cfg, "pageSummary")?;
    let prompt = format!(
        "Summarize the following webpage content in under 200 words using markdown. \
         Categorize it: use an existing category if fitting (existing: {existing}), \
         else suggest a new one. Generate up to 10 relevant tags.\n\n\
         Content: {content}\n\n{JSON_SHAPE}",
        existing = categories.join(", "),
    );

    let outcome = dispatch(gateway, cfg, api_key, prompt).await?;
    parse_enrichment(&outcome)
}

/// Summarize a YouTube video from its title, description, and transcript.
pub async fn summarize_video(
    gateway: &GatewayClient,
    cfg: &TransactionConfig,
    api_key: &str,
    title: &str,
    description: &str,
    transcript: &str,
    categories: &[String],
) -> Result<Enrichment, GatewayError> {
    require_configured(cfg, "youtubeSummary")?;
    let prompt = format!(
        "Analyze this YouTube video and provide:\n\
         1. A structured markdown summary of the transcript: open with two or three \
         very short highlight lines, follow with a brief overview (2-3 sentences), \
         then group the important points, data, and conclusions under clear headings, \
         and list any referenced URLs. If the transcript is not in English, summarize \
         in English, favoring natural meaning over literal translation.\n\
         2. A category (use existing if fitting: {existing}, else suggest new).\n\
         3. Up to 10 relevant tags.\n\n\
         Video Title: {title}\n\
         Description: {description}\n\n\
         Transcript:\n{transcript}\n\n{JSON_SHAPE}",
        existing = categories.join(", "),
    );

    let outcome = dispatch(gateway, cfg, api_key, prompt).await?;
    parse_enrichment(&outcome)
}

/// Reformat a raw DOM-scraped transcript into clean timestamped markdown.
pub async fn format_transcript(
    gateway: &GatewayClient,
    cfg: &TransactionConfig,
    api_key: &str,
    transcript: &str,
) -> Result<String, GatewayError> {
    require_configured(cfg, "transcriptFormatting")?;
    let prompt = format!(
        "Reformat this YouTube transcript to make it readable for humans in markdown \
         format. Add timestamps in a clean format and improve readability:\n\n\
         {transcript}\n\n\
         Return ONLY the formatted markdown transcript."
    );

    let outcome = dispatch(gateway, cfg, api_key, prompt).await?;
    Ok(outcome)
}

async fn dispatch(
    gateway: &GatewayClient,
    cfg: &TransactionConfig,
    api_key: &str,
    prompt: String,
) -> Result<String, GatewayError> {
    let outcome = gateway
        .chat(
            &Provider::parse(&cfg.provider),
            &cfg.model,
            &[ChatMessage::user(prompt)],
            &call_options(cfg),
            api_key,
            None,
        )
        .await?;
    Ok(outcome.content)
}

fn require_configured(cfg: &TransactionConfig, name: &str) -> Result<(), GatewayError> {
    if cfg.is_configured() {
        Ok(())
    } else {
        Err(GatewayError::Config(format!(
            "no {name} transaction configured; set a provider and model in settings"
        )))
    }
}

fn call_options(cfg: &TransactionConfig) -> CallOptions {
    CallOptions {
        temperature: cfg.options.temperature,
        max_tokens: cfg.options.max_tokens,
    }
}

fn parse_enrichment(content: &str) -> Result<Enrichment, GatewayError> {
    let value = extract_json(content)?;
    serde_json::from_value(value)
        .map_err(|e| GatewayError::Parse(format!("enrichment shape mismatch: {e}")))
}
