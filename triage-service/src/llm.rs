//! Gemini access with a retry-with-fallback model chain.
//!
//! Each candidate model gets one bounded attempt; the loop advances on call
//! failure or timeout. 429/403/404 failures are logged distinctly.

use anyhow::anyhow;
use rig::{
    agent::Agent,
    client::CompletionClient,
    completion::{Chat, Message},
    providers::gemini,
};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Candidate models, tried in order
pub const MODEL_FALLBACKS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

const CALL_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f64 = 0.4;

/// Read the Gemini key; absence is a configuration error surfaced per request
pub fn api_key() -> anyhow::Result<String> {
    std::env::var("GEMINI_API_KEY").map_err(|_| anyhow!("GEMINI_API_KEY not set"))
}

fn build_agent(
    api_key: &str,
    model: &str,
    preamble: &str,
) -> Agent<gemini::completion::CompletionModel> {
    gemini::Client::new(api_key)
        .agent(model)
        .preamble(preamble)
        .temperature(TEMPERATURE)
        .build()
}

/// Try each fallback model once, bounded by [`CALL_TIMEOUT`].
///
/// Returns the first successful reply text, or an error once the whole
/// chain is exhausted; the caller degrades to the static catalog fallback.
pub async fn complete_with_fallback(
    api_key: &str,
    preamble: &str,
    prompt: &str,
    history: Vec<Message>,
) -> anyhow::Result<String> {
    for &model in MODEL_FALLBACKS {
        let agent = build_agent(api_key, model, preamble);
        match timeout(CALL_TIMEOUT, agent.chat(prompt, history.clone())).await {
            Ok(Ok(reply)) => {
                info!(model, reply_length = reply.len(), "upstream model answered");
                return Ok(reply);
            }
            Ok(Err(e)) => log_call_failure(model, &e.to_string()),
            Err(_) => warn!(
                model,
                timeout_secs = CALL_TIMEOUT.as_secs(),
                "upstream model call timed out, trying next model"
            ),
        }
    }
    Err(anyhow!("all candidate models failed"))
}

fn log_call_failure(model: &str, error: &str) {
    if error.contains("429") {
        warn!(model, "upstream rate limit (429), trying next model");
    } else if error.contains("403") {
        warn!(model, "upstream access denied (403), trying next model");
    } else if error.contains("404") {
        warn!(model, "model unavailable (404), trying next model");
    } else {
        warn!(model, error, "upstream call failed, trying next model");
    }
}
