//! Pipeline orchestration shared by the recommendation routes: prompt
//! building, the upstream call, and the fallback/parse split.

use rig::completion::Message;
use tracing::warn;

use crate::catalog::DiagnosticTest;
use crate::fallback;
use crate::llm;
use crate::parse::{self, ParseError};
use crate::types::{HealthReply, TriageReply, MAX_RECOMMENDATIONS};

const TRIAGE_PREAMBLE: &str = r#"You are a diagnostic test advisor at a self-service health kiosk.

The kiosk offers a fixed catalog of diagnostic tests. You will be given the
visitor's reported symptoms and the catalog tests whose symptom tags matched.

RULES:
- Recommend at most 5 tests, chosen ONLY from the matched tests you are given.
- Never invent test names.
- Use plain, reassuring language. You are not a doctor and must not diagnose.
- If symptoms sound serious (chest pain with breathlessness, severe bleeding),
  set urgencyLevel to "high" and advise seeing the on-site assistant first.

Respond with ONLY this JSON, no surrounding text:
{
  "recommendations": [
    {"testName": "...", "explanation": "...", "category": "..."}
  ],
  "generalAdvice": "...",
  "urgencyLevel": "low" | "medium" | "high"
}"#;

const HEALTH_PREAMBLE: &str = r#"You are a health guidance assistant at a self-service kiosk.

Given the visitor's symptoms, suggest sensible next steps in plain language.
Do not diagnose and do not prescribe medication.

Respond with ONLY this JSON, no surrounding text:
{
  "recommendations": "...",
  "nextSteps": "...",
  "urgencyLevel": "low" | "medium" | "high"
}"#;

/// Pipeline result plus whether the model actually authored it
#[derive(Debug)]
pub struct TriageOutcome {
    pub reply: TriageReply,
    pub ai_generated: bool,
}

#[derive(Debug)]
pub struct HealthOutcome {
    pub reply: HealthReply,
    pub ai_generated: bool,
}

/// Natural-language prompt embedding symptoms, matched tests and any tests
/// already shown this session
pub fn build_triage_prompt(
    message: &str,
    symptoms: &[String],
    matched: &[&'static DiagnosticTest],
    previous: &[String],
) -> String {
    let mut prompt = format!("Visitor message: {message}\n");

    if symptoms.is_empty() {
        prompt.push_str("No known symptom phrases were recognized in the message.\n");
    } else {
        prompt.push_str(&format!("Recognized symptoms: {}.\n", symptoms.join(", ")));
    }

    if matched.is_empty() {
        prompt.push_str("No catalog tests matched these symptoms.\n");
    } else {
        prompt.push_str("Matched catalog tests:\n");
        for test in matched {
            prompt.push_str(&format!(
                "- {} (category: {}; measures: {}; turnaround: {})\n",
                test.name,
                test.category,
                test.parameters.join(", "),
                test.turnaround
            ));
        }
    }

    if !previous.is_empty() {
        prompt.push_str(&format!(
            "Already recommended earlier in this session, avoid repeating unless essential: {}.\n",
            previous.join(", ")
        ));
    }

    prompt.push_str(&format!(
        "Recommend up to {MAX_RECOMMENDATIONS} of the matched tests."
    ));
    prompt
}

/// Assemble the structured outcome from a completion attempt.
///
/// An exhausted model chain degrades to the catalog fallback; a reply with
/// no parsable JSON propagates as a parse error (HTTP 500 upstream).
fn triage_from_completion(
    completion: anyhow::Result<String>,
    matched: &[&'static DiagnosticTest],
) -> Result<TriageOutcome, ParseError> {
    match completion {
        Ok(reply_text) => parse::parse_reply(&reply_text, matched).map(|reply| TriageOutcome {
            reply,
            ai_generated: true,
        }),
        Err(e) => {
            warn!(error = %e, "all upstream models failed, serving catalog fallback");
            Ok(TriageOutcome {
                reply: fallback::fallback_reply(matched),
                ai_generated: false,
            })
        }
    }
}

fn health_from_completion(
    completion: anyhow::Result<String>,
    matched: &[&'static DiagnosticTest],
) -> Result<HealthOutcome, ParseError> {
    match completion {
        Ok(reply_text) => parse::parse_health_reply(&reply_text).map(|reply| HealthOutcome {
            reply,
            ai_generated: true,
        }),
        Err(e) => {
            warn!(error = %e, "all upstream models failed, serving health fallback");
            Ok(HealthOutcome {
                reply: fallback::fallback_health_reply(matched),
                ai_generated: false,
            })
        }
    }
}

/// Run the structured triage pipeline for one turn
pub async fn run_triage(
    api_key: &str,
    message: &str,
    symptoms: &[String],
    matched: &[&'static DiagnosticTest],
    history: Vec<Message>,
    previous: &[String],
) -> Result<TriageOutcome, ParseError> {
    let prompt = build_triage_prompt(message, symptoms, matched, previous);
    let completion = llm::complete_with_fallback(api_key, TRIAGE_PREAMBLE, &prompt, history).await;
    triage_from_completion(completion, matched)
}

/// Run the free-text health-guidance pipeline
pub async fn run_health(
    api_key: &str,
    message: &str,
    symptoms: &[String],
    matched: &[&'static DiagnosticTest],
) -> Result<HealthOutcome, ParseError> {
    let prompt = build_triage_prompt(message, symptoms, matched, &[]);
    let completion =
        llm::complete_with_fallback(api_key, HEALTH_PREAMBLE, &prompt, Vec::new()).await;
    health_from_completion(completion, matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::match_tests;
    use crate::types::UrgencyLevel;
    use anyhow::anyhow;

    #[test]
    fn prompt_lists_symptoms_and_matched_tests() {
        let symptoms = vec!["chest pain".to_string()];
        let matched = match_tests(&symptoms);
        let prompt = build_triage_prompt("my chest hurts", &symptoms, &matched, &[]);

        assert!(prompt.contains("Visitor message: my chest hurts"));
        assert!(prompt.contains("Recognized symptoms: chest pain."));
        assert!(prompt.contains("12-Lead ECG"));
        assert!(!prompt.contains("Already recommended"));
    }

    #[test]
    fn prompt_flags_previously_shown_tests() {
        let previous = vec!["12-Lead ECG".to_string()];
        let prompt = build_triage_prompt("still hurts", &[], &[], &previous);

        assert!(prompt.contains("No known symptom phrases"));
        assert!(prompt.contains("No catalog tests matched"));
        assert!(prompt.contains("avoid repeating unless essential: 12-Lead ECG."));
    }

    #[test]
    fn upstream_429_degrades_to_catalog_fallback() {
        let symptoms = vec!["chest pain".to_string()];
        let matched = match_tests(&symptoms);

        let outcome =
            triage_from_completion(Err(anyhow!("status 429 Too Many Requests")), &matched)
                .unwrap();

        assert!(!outcome.ai_generated);
        assert_eq!(outcome.reply.urgency_level, UrgencyLevel::Medium);
        assert!(!outcome.reply.recommendations.is_empty());
        assert!(outcome.reply.recommendations.len() <= MAX_RECOMMENDATIONS);
        for rec in &outcome.reply.recommendations {
            // Catalog-only: no model-authored names can appear
            assert!(crate::catalog::find_by_name(&rec.test_name).is_some());
        }
    }

    #[test]
    fn unparsable_model_reply_propagates_as_error() {
        let result = triage_from_completion(Ok("I cannot help with that.".to_string()), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn health_upstream_failure_degrades_to_fallback() {
        let matched = match_tests(&["fever".to_string()]);

        let outcome = health_from_completion(Err(anyhow!("connection reset")), &matched).unwrap();

        assert!(!outcome.ai_generated);
        assert_eq!(outcome.reply.urgency_level, UrgencyLevel::Medium);
        assert!(outcome.reply.recommendations.contains("Body Temperature"));
    }
}
