//! Locally computed replies for when every upstream model call fails:
//! top catalog matches, generic explanations, fixed medium urgency,
//! flagged `aiGenerated: false`.

use crate::catalog::DiagnosticTest;
use crate::types::{HealthReply, Recommendation, TriageReply, UrgencyLevel, MAX_RECOMMENDATIONS};

pub const GENERAL_ADVICE: &str = "These suggestions are based only on the symptoms you reported. \
    Please speak with the on-site health assistant before testing if you are unsure.";

/// Top matched tests with generic explanations, medium urgency
pub fn fallback_reply(matched: &[&'static DiagnosticTest]) -> TriageReply {
    let recommendations = matched
        .iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|test| {
            Recommendation::from_catalog(
                test,
                format!(
                    "{} is commonly advised for the symptoms you described.",
                    test.name
                ),
            )
        })
        .collect();

    TriageReply {
        recommendations,
        general_advice: GENERAL_ADVICE.to_string(),
        urgency_level: UrgencyLevel::Medium,
    }
}

/// Free-text fallback for the health route
pub fn fallback_health_reply(matched: &[&'static DiagnosticTest]) -> HealthReply {
    let names: Vec<&str> = matched
        .iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|test| test.name)
        .collect();

    let recommendations = if names.is_empty() {
        "No catalog tests matched your symptoms.".to_string()
    } else {
        format!(
            "Based on your symptoms, the following tests may help: {}.",
            names.join(", ")
        )
    };

    HealthReply {
        recommendations,
        next_steps: "Visit the front desk to book the suggested tests, or speak with the \
            on-site health assistant."
            .to_string(),
        urgency_level: UrgencyLevel::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::match_tests;

    #[test]
    fn fallback_is_capped_and_medium() {
        let everything: Vec<String> = crate::catalog::SYMPTOM_VOCABULARY
            .iter()
            .map(|s| s.to_string())
            .collect();
        let matched = match_tests(&everything);
        assert!(matched.len() > MAX_RECOMMENDATIONS);

        let reply = fallback_reply(&matched);
        assert_eq!(reply.recommendations.len(), MAX_RECOMMENDATIONS);
        assert_eq!(reply.urgency_level, UrgencyLevel::Medium);
        for rec in &reply.recommendations {
            // Everything comes straight from the catalog
            assert!(crate::catalog::find_by_name(&rec.test_name).is_some());
        }
    }

    #[test]
    fn empty_match_set_still_answers() {
        let reply = fallback_reply(&[]);
        assert!(reply.recommendations.is_empty());
        assert_eq!(reply.general_advice, GENERAL_ADVICE);

        let health = fallback_health_reply(&[]);
        assert!(health.recommendations.contains("No catalog tests"));
        assert_eq!(health.urgency_level, UrgencyLevel::Medium);
    }
}
