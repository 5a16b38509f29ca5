//! Parse the model's free-text reply into structured recommendations.
//!
//! The first `{...}` block is cut out with a greedy regex before parsing;
//! models often wrap the JSON in prose or code fences. A reply with no
//! parsable JSON is a hard error (HTTP 500 upstream), with no fallback.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

use crate::catalog::DiagnosticTest;
use crate::fallback::GENERAL_ADVICE;
use crate::types::{HealthReply, Recommendation, TriageReply, UrgencyLevel, MAX_RECOMMENDATIONS};

pub const FALLBACK_EXPLANATION: &str = "Contact for details";
pub const FALLBACK_CATEGORY: &str = "general";

static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("hard-coded pattern"));

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model reply")]
    NoJsonBlock,

    #[error("invalid JSON in model reply: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    #[serde(default)]
    recommendations: Vec<ModelRecommendation>,
    #[serde(default)]
    general_advice: Option<String>,
    #[serde(default)]
    urgency_level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelRecommendation {
    test_name: String,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelHealthReply {
    #[serde(default)]
    recommendations: Option<String>,
    #[serde(default)]
    next_steps: Option<String>,
    #[serde(default)]
    urgency_level: Option<String>,
}

/// First `{...}` block in the reply, outermost-greedy
pub fn extract_json_block(reply: &str) -> Option<&str> {
    JSON_BLOCK.find(reply).map(|m| m.as_str())
}

/// Parse a structured triage reply and enrich it against the matched tests.
///
/// Recommendations are capped at [`MAX_RECOMMENDATIONS`]. A `testName` that
/// does not resolve in the matched set degrades silently: empty parameters,
/// no turnaround, category `"general"` unless the model supplied one.
pub fn parse_reply(
    reply: &str,
    matched: &[&'static DiagnosticTest],
) -> Result<TriageReply, ParseError> {
    let block = extract_json_block(reply).ok_or(ParseError::NoJsonBlock)?;
    let parsed: ModelReply = serde_json::from_str(block)?;

    let recommendations = parsed
        .recommendations
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|entry| enrich(entry, matched))
        .collect();

    Ok(TriageReply {
        recommendations,
        general_advice: parsed
            .general_advice
            .filter(|advice| !advice.trim().is_empty())
            .unwrap_or_else(|| GENERAL_ADVICE.to_string()),
        urgency_level: parsed
            .urgency_level
            .as_deref()
            .map(UrgencyLevel::parse_lenient)
            .unwrap_or_default(),
    })
}

/// Parse the simpler free-text variant
pub fn parse_health_reply(reply: &str) -> Result<HealthReply, ParseError> {
    let block = extract_json_block(reply).ok_or(ParseError::NoJsonBlock)?;
    let parsed: ModelHealthReply = serde_json::from_str(block)?;

    Ok(HealthReply {
        recommendations: parsed
            .recommendations
            .unwrap_or_else(|| GENERAL_ADVICE.to_string()),
        next_steps: parsed
            .next_steps
            .unwrap_or_else(|| "Speak with the on-site health assistant.".to_string()),
        urgency_level: parsed
            .urgency_level
            .as_deref()
            .map(UrgencyLevel::parse_lenient)
            .unwrap_or_default(),
    })
}

fn enrich(entry: ModelRecommendation, matched: &[&'static DiagnosticTest]) -> Recommendation {
    let known = matched
        .iter()
        .find(|test| test.name.eq_ignore_ascii_case(entry.test_name.trim()));

    match known {
        Some(test) => Recommendation {
            test_name: test.name.to_string(),
            explanation: entry
                .explanation
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_EXPLANATION.to_string()),
            category: entry.category.unwrap_or_else(|| test.category.to_string()),
            parameters: test.parameters.iter().map(|p| p.to_string()).collect(),
            turnaround: test.turnaround.to_string(),
            available_on_device: test.on_device,
        },
        None => Recommendation {
            test_name: entry.test_name,
            explanation: entry
                .explanation
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_EXPLANATION.to_string()),
            category: entry
                .category
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            parameters: Vec::new(),
            turnaround: String::new(),
            available_on_device: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::match_tests;

    fn matched_for(symptom: &str) -> Vec<&'static DiagnosticTest> {
        match_tests(&[symptom.to_string()])
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let matched = matched_for("chest pain");
        let reply = r#"Sure! Here is my assessment:
            {"recommendations":[{"testName":"12-Lead ECG","explanation":"Checks heart rhythm.","category":"cardiology"}],
             "generalAdvice":"Rest and avoid exertion.","urgencyLevel":"high"}
            Let me know if you need more."#;

        let parsed = parse_reply(reply, &matched).unwrap();
        assert_eq!(parsed.recommendations.len(), 1);
        assert_eq!(parsed.urgency_level, UrgencyLevel::High);

        let rec = &parsed.recommendations[0];
        assert_eq!(rec.test_name, "12-Lead ECG");
        assert_eq!(rec.turnaround, "10 minutes");
        assert!(rec.available_on_device);
        assert!(!rec.parameters.is_empty());
    }

    #[test]
    fn unknown_test_name_degrades_silently() {
        let matched = matched_for("chest pain");
        let reply = r#"{"recommendations":[{"testName":"Full Body MRI"}],"urgencyLevel":"low"}"#;

        let parsed = parse_reply(reply, &matched).unwrap();
        let rec = &parsed.recommendations[0];
        assert_eq!(rec.test_name, "Full Body MRI");
        assert_eq!(rec.explanation, FALLBACK_EXPLANATION);
        assert_eq!(rec.category, FALLBACK_CATEGORY);
        assert!(rec.parameters.is_empty());
        assert!(rec.turnaround.is_empty());
        assert!(!rec.available_on_device);
    }

    #[test]
    fn recommendations_are_capped_at_five() {
        let matched = matched_for("fever");
        let entries: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"testName":"Test {i}"}}"#))
            .collect();
        let reply = format!(r#"{{"recommendations":[{}]}}"#, entries.join(","));

        let parsed = parse_reply(&reply, &matched).unwrap();
        assert_eq!(parsed.recommendations.len(), MAX_RECOMMENDATIONS);
    }

    #[test]
    fn missing_urgency_defaults_to_medium() {
        let parsed = parse_reply(r#"{"recommendations":[]}"#, &[]).unwrap();
        assert_eq!(parsed.urgency_level, UrgencyLevel::Medium);
        assert_eq!(parsed.general_advice, GENERAL_ADVICE);
    }

    #[test]
    fn reply_without_json_is_an_error() {
        let err = parse_reply("I'm sorry, I cannot help with that.", &[]).unwrap_err();
        assert!(matches!(err, ParseError::NoJsonBlock));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_reply(r#"{"recommendations": [unquoted]}"#, &[]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn health_reply_parses_flat_strings() {
        let reply = r#"{"recommendations":"Stay hydrated.","nextSteps":"See a doctor if fever persists.","urgencyLevel":"low"}"#;
        let parsed = parse_health_reply(reply).unwrap();
        assert_eq!(parsed.recommendations, "Stay hydrated.");
        assert_eq!(parsed.next_steps, "See a doctor if fever persists.");
        assert_eq!(parsed.urgency_level, UrgencyLevel::Low);
    }
}
