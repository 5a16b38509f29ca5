//! Static diagnostic-test catalog for the kiosk station.
//!
//! Loaded once at startup, never mutated. Every symptom tag below is a member
//! of [`SYMPTOM_VOCABULARY`]; the extractor can only ever produce phrases from
//! that list, so tags and extracted symptoms live in the same namespace.

/// One diagnostic test the kiosk can offer or refer out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticTest {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    /// Symptom tags this test is associated with
    pub symptoms: &'static [&'static str],
    /// Parameters the test measures
    pub parameters: &'static [&'static str],
    /// Expected turnaround time, human readable
    pub turnaround: &'static str,
    /// Whether the kiosk's own devices can run this test
    pub on_device: bool,
}

/// Fixed vocabulary of symptom phrases the extractor recognizes.
///
/// Kept lowercase; matching is case-insensitive substring containment.
pub const SYMPTOM_VOCABULARY: &[&str] = &[
    "fever",
    "cough",
    "chest pain",
    "shortness of breath",
    "breathlessness",
    "palpitations",
    "dizziness",
    "headache",
    "fatigue",
    "weakness",
    "nausea",
    "vomiting",
    "diarrhea",
    "abdominal pain",
    "back pain",
    "joint pain",
    "body ache",
    "sore throat",
    "runny nose",
    "cold",
    "chills",
    "sweating",
    "weight loss",
    "excessive thirst",
    "frequent urination",
    "burning urination",
    "blurred vision",
    "swelling",
    "rash",
    "itching",
    "loss of appetite",
];

pub const CATALOG: &[DiagnosticTest] = &[
    DiagnosticTest {
        id: "ecg-12-lead",
        name: "12-Lead ECG",
        category: "cardiology",
        symptoms: &["chest pain", "palpitations", "shortness of breath", "dizziness"],
        parameters: &["Heart rate", "Rhythm", "PR/QRS/QT intervals", "ST segment"],
        turnaround: "10 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "blood-pressure",
        name: "Blood Pressure Check",
        category: "cardiology",
        symptoms: &["headache", "dizziness", "palpitations", "swelling"],
        parameters: &["Systolic pressure", "Diastolic pressure", "Pulse"],
        turnaround: "5 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "pulse-oximetry",
        name: "Pulse Oximetry (SpO2)",
        category: "respiratory",
        symptoms: &["shortness of breath", "breathlessness", "cough", "fatigue"],
        parameters: &["Oxygen saturation", "Pulse rate"],
        turnaround: "2 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "spirometry",
        name: "Spirometry",
        category: "respiratory",
        symptoms: &["shortness of breath", "breathlessness", "cough"],
        parameters: &["FEV1", "FVC", "FEV1/FVC ratio"],
        turnaround: "15 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "body-temperature",
        name: "Body Temperature",
        category: "general",
        symptoms: &["fever", "chills", "sweating", "body ache"],
        parameters: &["Core temperature"],
        turnaround: "2 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "bmi-composition",
        name: "BMI & Body Composition",
        category: "general",
        symptoms: &["fatigue", "weight loss", "swelling"],
        parameters: &["Height", "Weight", "BMI", "Body fat percentage"],
        turnaround: "5 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "glucose-random",
        name: "Random Blood Glucose",
        category: "metabolic",
        symptoms: &["excessive thirst", "frequent urination", "fatigue", "blurred vision"],
        parameters: &["Blood glucose"],
        turnaround: "5 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "hba1c",
        name: "HbA1c",
        category: "metabolic",
        symptoms: &["excessive thirst", "frequent urination", "weight loss", "fatigue"],
        parameters: &["Glycated hemoglobin"],
        turnaround: "15 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "lipid-profile",
        name: "Lipid Profile",
        category: "metabolic",
        symptoms: &["chest pain", "dizziness", "fatigue"],
        parameters: &["Total cholesterol", "HDL", "LDL", "Triglycerides"],
        turnaround: "20 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "cbc",
        name: "Complete Blood Count",
        category: "hematology",
        symptoms: &["fever", "fatigue", "weakness", "chills"],
        parameters: &["Hemoglobin", "WBC count", "Platelet count", "RBC indices"],
        turnaround: "30 minutes",
        on_device: false,
    },
    DiagnosticTest {
        id: "hemoglobin-poc",
        name: "Hemoglobin (Point-of-Care)",
        category: "hematology",
        symptoms: &["fatigue", "weakness", "dizziness"],
        parameters: &["Hemoglobin"],
        turnaround: "5 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "electrolyte-panel",
        name: "Electrolyte Panel",
        category: "metabolic",
        symptoms: &["diarrhea", "vomiting", "weakness", "dizziness"],
        parameters: &["Sodium", "Potassium", "Chloride"],
        turnaround: "30 minutes",
        on_device: false,
    },
    DiagnosticTest {
        id: "urine-routine",
        name: "Urine Routine Analysis",
        category: "nephrology",
        symptoms: &["burning urination", "frequent urination", "abdominal pain", "back pain"],
        parameters: &["Protein", "Glucose", "Leukocytes", "Nitrites", "pH"],
        turnaround: "20 minutes",
        on_device: false,
    },
    DiagnosticTest {
        id: "kidney-function",
        name: "Kidney Function Panel",
        category: "nephrology",
        symptoms: &["swelling", "frequent urination", "fatigue", "nausea"],
        parameters: &["Creatinine", "Urea", "eGFR"],
        turnaround: "45 minutes",
        on_device: false,
    },
    DiagnosticTest {
        id: "liver-function",
        name: "Liver Function Panel",
        category: "gastroenterology",
        symptoms: &["nausea", "vomiting", "abdominal pain", "loss of appetite", "itching"],
        parameters: &["ALT", "AST", "Bilirubin", "Albumin"],
        turnaround: "45 minutes",
        on_device: false,
    },
    DiagnosticTest {
        id: "thyroid-profile",
        name: "Thyroid Profile",
        category: "endocrinology",
        symptoms: &["fatigue", "weight loss", "palpitations", "sweating"],
        parameters: &["TSH", "T3", "T4"],
        turnaround: "1 hour",
        on_device: false,
    },
    DiagnosticTest {
        id: "crp",
        name: "C-Reactive Protein",
        category: "immunology",
        symptoms: &["fever", "joint pain", "body ache"],
        parameters: &["CRP"],
        turnaround: "30 minutes",
        on_device: false,
    },
    DiagnosticTest {
        id: "influenza-rapid",
        name: "Influenza Rapid Test",
        category: "infectious-disease",
        symptoms: &["fever", "cough", "runny nose", "cold", "sore throat", "body ache"],
        parameters: &["Influenza A antigen", "Influenza B antigen"],
        turnaround: "20 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "dengue-rapid",
        name: "Dengue Rapid Test",
        category: "infectious-disease",
        symptoms: &["fever", "headache", "body ache", "rash", "joint pain"],
        parameters: &["NS1 antigen", "IgM", "IgG"],
        turnaround: "20 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "malaria-rapid",
        name: "Malaria Rapid Test",
        category: "infectious-disease",
        symptoms: &["fever", "chills", "sweating", "headache"],
        parameters: &["Plasmodium antigen"],
        turnaround: "20 minutes",
        on_device: true,
    },
    DiagnosticTest {
        id: "strep-throat",
        name: "Strep Throat Swab",
        category: "infectious-disease",
        symptoms: &["sore throat", "fever"],
        parameters: &["Group A streptococcus antigen"],
        turnaround: "15 minutes",
        on_device: true,
    },
];

/// Case-insensitive exact-name lookup in the full catalog
pub fn find_by_name(name: &str) -> Option<&'static DiagnosticTest> {
    let wanted = name.trim();
    CATALOG
        .iter()
        .find(|test| test.name.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let mut seen = HashSet::new();
        for test in CATALOG {
            assert!(seen.insert(test.id), "duplicate catalog id: {}", test.id);
        }
    }

    #[test]
    fn every_tag_is_in_the_vocabulary() {
        for test in CATALOG {
            for tag in test.symptoms {
                assert!(
                    SYMPTOM_VOCABULARY.contains(tag),
                    "test {} uses tag {:?} not in the vocabulary",
                    test.id,
                    tag
                );
            }
        }
    }

    #[test]
    fn vocabulary_is_lowercase() {
        for phrase in SYMPTOM_VOCABULARY {
            assert_eq!(*phrase, phrase.to_lowercase());
        }
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        assert_eq!(find_by_name("12-lead ecg").unwrap().id, "ecg-12-lead");
        assert_eq!(find_by_name("  HbA1c ").unwrap().id, "hba1c");
        assert!(find_by_name("MRI Full Body").is_none());
    }
}
