//! Catalog matching: pick the tests whose symptom tags overlap the
//! visitor's symptoms. No relevance ranking beyond catalog order.

use crate::catalog::{DiagnosticTest, CATALOG};

/// Cap applied by the stateless recommendation route; the session-aware
/// route keeps the full match set for enrichment.
pub const MATCH_CAP: usize = 10;

/// A test matches when any input symptom is a substring of (or contains)
/// any of its tags. Results are deduplicated by test id in catalog order.
pub fn match_tests(symptoms: &[String]) -> Vec<&'static DiagnosticTest> {
    let lowered: Vec<String> = symptoms.iter().map(|s| s.trim().to_lowercase()).collect();

    let mut matched: Vec<&'static DiagnosticTest> = Vec::new();
    for test in CATALOG {
        let hit = test.symptoms.iter().any(|tag| {
            lowered
                .iter()
                .any(|symptom| !symptom.is_empty() && (tag.contains(symptom.as_str()) || symptom.contains(tag)))
        });
        if hit && !matched.iter().any(|known| known.id == test.id) {
            matched.push(test);
        }
    }
    matched
}

/// Matched tests truncated to [`MATCH_CAP`]
pub fn match_tests_capped(symptoms: &[String]) -> Vec<&'static DiagnosticTest> {
    let mut matched = match_tests(symptoms);
    matched.truncate(MATCH_CAP);
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chest_pain_matches_the_ecg() {
        let matched = match_tests(&["chest pain".to_string()]);
        assert!(matched.iter().any(|t| t.name == "12-Lead ECG"));
    }

    #[test]
    fn no_symptoms_match_nothing() {
        assert!(match_tests(&[]).is_empty());
        assert!(match_tests(&["".to_string()]).is_empty());
    }

    #[test]
    fn results_are_unique_by_id() {
        // fever appears in several tags of the same test; it must show up once
        let matched = match_tests(&["fever".to_string(), "chills".to_string()]);
        let mut ids: Vec<&str> = matched.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), matched.len());
    }

    #[test]
    fn broad_symptom_lists_are_capped() {
        let everything: Vec<String> = crate::catalog::SYMPTOM_VOCABULARY
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(match_tests(&everything).len() > MATCH_CAP);
        assert_eq!(match_tests_capped(&everything).len(), MATCH_CAP);
    }

    #[test]
    fn partial_containment_matches_both_directions() {
        // "pain" is contained in the tags "chest pain", "abdominal pain", ...
        let matched = match_tests(&["pain".to_string()]);
        assert!(matched.iter().any(|t| t.id == "ecg-12-lead"));
        assert!(matched.iter().any(|t| t.id == "urine-routine"));

        // "high fever and chills" contains the tag "fever"
        let matched = match_tests(&["high fever and chills".to_string()]);
        assert!(matched.iter().any(|t| t.id == "body-temperature"));
    }
}
