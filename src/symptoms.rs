//! Symptom reference data and the packed column format used to store a
//! session's chosen symptom ids.

use serde::Serialize;

use crate::constants::{DEFAULT_SYMPTOM_CATEGORY, SYMPTOM_DELIMITER};

/// One entry of the symptom checklist.
///
/// Sessions only ever persist `id`; `label` and `category` are display data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SymptomOption {
    pub id: &'static str,
    pub label: &'static str,
    pub category: &'static str,
}

const fn option(id: &'static str, label: &'static str) -> SymptomOption {
    SymptomOption {
        id,
        label,
        category: DEFAULT_SYMPTOM_CATEGORY,
    }
}

/// Built-in checklist, in display order
pub const SYMPTOM_OPTIONS: &[SymptomOption] = &[
    option("fever", "Fever"),
    option("cough", "Cough"),
    option("shortness_breath", "Shortness of breath"),
    option("fatigue", "Fatigue"),
    option("headache", "Headache"),
    option("sore_throat", "Sore throat"),
    option("runny_nose", "Runny nose"),
    option("nausea", "Nausea"),
    option("diarrhea", "Diarrhea"),
    option("muscle_pain", "Muscle pain"),
    option("chills", "Chills"),
    option("loss_taste", "Loss of taste/smell"),
];

pub fn find_symptom(id: &str) -> Option<&'static SymptomOption> {
    SYMPTOM_OPTIONS.iter().find(|option| option.id == id)
}

/// Human readable list for a set of symptom ids, e.g. "Fever, Cough".
/// Ids missing from the catalog are shown as-is.
pub fn symptom_labels<S: AsRef<str>>(ids: &[S]) -> String {
    ids.iter()
        .map(|id| {
            let id = id.as_ref();
            find_symptom(id).map_or(id, |option| option.label)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pack a symptom list into its column value. An empty list is stored as NULL.
pub fn encode_symptoms<S: AsRef<str>>(symptoms: &[S]) -> Option<String> {
    if symptoms.is_empty() {
        return None;
    }
    let mut joined = String::new();
    for (idx, symptom) in symptoms.iter().enumerate() {
        if idx > 0 {
            joined.push(SYMPTOM_DELIMITER);
        }
        joined.push_str(symptom.as_ref());
    }
    Some(joined)
}

/// Unpack a column value. NULL, "" and stray delimiters never yield empty entries.
pub fn decode_symptoms(value: Option<&str>) -> Vec<String> {
    match value {
        Some(value) => value
            .split(SYMPTOM_DELIMITER)
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect(),
        None => Vec::new(),
    }
}
