//! Wire DTOs for the kiosk API. All JSON is camelCase.

use serde::{Deserialize, Serialize};
use triage_session::{ChatMessage, Phase};

use crate::catalog::DiagnosticTest;

/// Upper bound on recommendations in any reply
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Coarse triage classification attached to a recommendation set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl UrgencyLevel {
    /// Tolerant parse for model output; anything unrecognized is `Medium`
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "low" => UrgencyLevel::Low,
            "high" => UrgencyLevel::High,
            _ => UrgencyLevel::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
        }
    }
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        UrgencyLevel::Medium
    }
}

/// One recommended test, enriched from the static catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub test_name: String,
    pub explanation: String,
    pub category: String,
    pub parameters: Vec<String>,
    pub turnaround: String,
    pub available_on_device: bool,
}

impl Recommendation {
    pub fn from_catalog(test: &DiagnosticTest, explanation: String) -> Self {
        Self {
            test_name: test.name.to_string(),
            explanation,
            category: test.category.to_string(),
            parameters: test.parameters.iter().map(|p| p.to_string()).collect(),
            turnaround: test.turnaround.to_string(),
            available_on_device: test.on_device,
        }
    }
}

/// Internal result of the triage pipeline, before response assembly
#[derive(Debug, Clone)]
pub struct TriageReply {
    pub recommendations: Vec<Recommendation>,
    pub general_advice: String,
    pub urgency_level: UrgencyLevel,
}

/// Free-text variant served by `/api/yolo-health/recommend`
#[derive(Debug, Clone)]
pub struct HealthReply {
    pub recommendations: String,
    pub next_steps: String,
    pub urgency_level: UrgencyLevel,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub symptoms: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendContextRequest {
    pub symptoms: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
    /// Symptoms the client believes were already accumulated; merged into
    /// the server-side session set
    #[serde(default)]
    pub accumulated_symptoms: Vec<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub is_follow_up: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecommendRequest {
    pub symptoms: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub symptoms: Vec<String>,
    pub matched_tests_count: usize,
    pub recommendations: Vec<Recommendation>,
    pub general_advice: String,
    pub urgency_level: UrgencyLevel,
    /// False when the reply was computed locally because every model failed
    pub ai_generated: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendContextResponse {
    pub session_id: String,
    pub symptoms: Vec<String>,
    pub accumulated_symptoms: Vec<String>,
    pub is_follow_up: bool,
    pub phase: Phase,
    pub matched_tests_count: usize,
    pub recommendations: Vec<Recommendation>,
    pub general_advice: String,
    pub urgency_level: UrgencyLevel,
    pub ai_generated: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecommendResponse {
    pub symptoms: Vec<String>,
    pub recommendations: String,
    pub next_steps: String,
    pub urgency_level: UrgencyLevel,
    pub ai_generated: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UrgencyLevel::High).unwrap(),
            "\"high\""
        );
    }

    #[test]
    fn urgency_parse_is_lenient() {
        assert_eq!(UrgencyLevel::parse_lenient(" LOW "), UrgencyLevel::Low);
        assert_eq!(UrgencyLevel::parse_lenient("High"), UrgencyLevel::High);
        assert_eq!(UrgencyLevel::parse_lenient("urgent"), UrgencyLevel::Medium);
        assert_eq!(UrgencyLevel::parse_lenient(""), UrgencyLevel::Medium);
    }

    #[test]
    fn requests_accept_camel_case_bodies() {
        let body = r#"{
            "symptoms": "fever",
            "accumulatedSymptoms": ["cough"],
            "sessionId": "abc",
            "isFollowUp": true
        }"#;
        let request: RecommendContextRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.symptoms.as_deref(), Some("fever"));
        assert_eq!(request.accumulated_symptoms, vec!["cough"]);
        assert_eq!(request.session_id.as_deref(), Some("abc"));
        assert!(request.is_follow_up);
    }
}
