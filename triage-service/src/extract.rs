//! Symptom extraction: fixed-vocabulary substring matching over free text.
//!
//! No stemming and no negation handling ("no chest pain" still matches
//! "chest pain"), a known false-positive source.

use crate::catalog::SYMPTOM_VOCABULARY;

/// Extract known symptom phrases from the visitor's free text.
///
/// A vocabulary phrase matches when it is contained in the input or the
/// whole input is contained in the phrase (so a bare "pain" surfaces every
/// pain-related phrase). Output follows vocabulary order, not input order.
pub fn extract_symptoms(input: &str) -> Vec<String> {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return Vec::new();
    }

    SYMPTOM_VOCABULARY
        .iter()
        .filter(|phrase| normalized.contains(**phrase) || phrase.contains(normalized.as_str()))
        .map(|phrase| phrase.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(extract_symptoms("").is_empty());
        assert!(extract_symptoms("   \t\n ").is_empty());
    }

    #[test]
    fn output_is_a_subset_of_the_vocabulary() {
        let found = extract_symptoms("I have had a fever, a bad cough and some chest pain");
        assert!(!found.is_empty());
        for symptom in &found {
            assert!(SYMPTOM_VOCABULARY.contains(&symptom.as_str()));
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        let found = extract_symptoms("CHEST PAIN and Dizziness");
        assert!(found.contains(&"chest pain".to_string()));
        assert!(found.contains(&"dizziness".to_string()));
    }

    #[test]
    fn short_input_matches_phrases_containing_it() {
        // "thirst" is contained in "excessive thirst"
        let found = extract_symptoms("thirst");
        assert_eq!(found, vec!["excessive thirst".to_string()]);
    }

    #[test]
    fn output_follows_vocabulary_order() {
        let found = extract_symptoms("dizziness after fever and cough");
        // fever and cough precede dizziness in the vocabulary
        assert_eq!(found, vec!["fever", "cough", "dizziness"]);
    }

    #[test]
    fn negation_is_not_handled() {
        // Known false-positive source, kept intentionally
        let found = extract_symptoms("no chest pain at all");
        assert!(found.contains(&"chest pain".to_string()));
    }
}
