//! Reference library
//!
//! Read-only health content shipped as JSON documents in the content
//! directory. A missing or malformed document is logged and treated as
//! empty, so lookups never fail.

use crate::models::seed::generic_care_plan;
use crate::models::*;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;

const SYMPTOMS_DOCUMENT: &str = "symptoms.json";
const DIET_DOCUMENT: &str = "diet_plan.json";
const EXERCISES_DOCUMENT: &str = "exercises.json";
const DOCTORS_DOCUMENT: &str = "doctors.json";

/// Table entry used when nothing else matches
const DEFAULT_PLAN_KEY: &str = "headache";

/// Phrases users type, mapped to care-plan table keys. Substring matching
/// walks this list in order, so earlier entries win.
const SYMPTOM_ALIASES: &[(&str, &str)] = &[
    ("headache", "headache"),
    ("head pain", "headache"),
    ("migraine", "headache"),
    ("tension headache", "headache"),
    ("cluster headache", "headache"),
    ("cough", "cough"),
    ("coughing", "cough"),
    ("dry cough", "cough"),
    ("wet cough", "cough"),
    ("persistent cough", "cough"),
    ("cold", "cold"),
    ("common cold", "cold"),
    ("nasal congestion", "cold"),
    ("runny nose", "cold"),
    ("stuffy nose", "cold"),
    ("flu", "flu"),
    ("influenza", "flu"),
    ("sore throat", "soreThroat"),
    ("acne", "acne"),
    ("pimple", "acne"),
    ("zit", "acne"),
    ("blackhead", "acne"),
    ("whitehead", "acne"),
    ("fever", "fever"),
    ("high temperature", "fever"),
    ("pyrexia", "fever"),
    ("fatigue", "fatigue"),
    ("tiredness", "fatigue"),
    ("exhaustion", "fatigue"),
    ("low energy", "fatigue"),
    ("dehydration", "dehydration"),
    ("dry mouth", "dehydration"),
    ("thirst", "dehydration"),
    ("stress", "stress"),
    ("anxiety", "stress"),
    ("nervousness", "stress"),
    ("insomnia", "insomnia"),
    ("sleeplessness", "insomnia"),
    ("trouble sleeping", "insomnia"),
];

/// Map free text to a care-plan table key: exact alias first, then the
/// first alias contained in the text
pub fn resolve_symptom_key(symptom: &str) -> Option<&'static str> {
    let normalized = symptom.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    SYMPTOM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .or_else(|| {
            SYMPTOM_ALIASES
                .iter()
                .find(|(alias, _)| normalized.contains(alias))
        })
        .map(|(_, key)| *key)
}

#[derive(Debug, Clone)]
pub struct ReferenceLibrary {
    content_dir: PathBuf,
}

impl ReferenceLibrary {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    async fn read_document<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.content_dir.join(name);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read reference document {:?}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!("Failed to parse reference document {:?}: {}", path, e);
                None
            }
        }
    }

    /// Static care plan for a symptom, used when the assistant is unavailable.
    ///
    /// Unknown symptoms get the headache entry; when the table itself is
    /// unavailable a generic rest-and-monitor plan is returned.
    pub async fn local_care_plan(&self, symptom: &str) -> CarePlanDraft {
        let Some(mut table) = self
            .read_document::<HashMap<String, CarePlanDraft>>(SYMPTOMS_DOCUMENT)
            .await
        else {
            return generic_care_plan();
        };

        let key = resolve_symptom_key(symptom).unwrap_or(DEFAULT_PLAN_KEY);
        tracing::debug!("Local care plan for '{}' resolved to '{}'", symptom, key);

        table
            .remove(key)
            .or_else(|| table.remove(DEFAULT_PLAN_KEY))
            .unwrap_or_else(|| {
                tracing::warn!("Care plan table has no '{}' entry", key);
                generic_care_plan()
            })
    }

    pub async fn diet_plans(&self) -> BTreeMap<AgeGroup, DietPlan> {
        self.read_document(DIET_DOCUMENT).await.unwrap_or_default()
    }

    pub async fn diet_plan(&self, age_group: AgeGroup) -> Option<DietPlan> {
        self.diet_plans().await.remove(&age_group)
    }

    pub async fn exercises(&self) -> Vec<Exercise> {
        self.read_document(EXERCISES_DOCUMENT)
            .await
            .unwrap_or_default()
    }

    /// Exercises in one category; `all` returns everything
    pub async fn exercises_in(&self, category: &str) -> Vec<Exercise> {
        let exercises = self.exercises().await;
        if category.eq_ignore_ascii_case("all") {
            return exercises;
        }
        exercises
            .into_iter()
            .filter(|e| e.category == category)
            .collect()
    }

    pub async fn doctors(&self) -> Vec<Doctor> {
        self.read_document(DOCTORS_DOCUMENT).await.unwrap_or_default()
    }

    pub async fn find_doctors(&self, filter: &DoctorFilter) -> Vec<Doctor> {
        self.doctors()
            .await
            .into_iter()
            .filter(|d| filter.matches(d))
            .collect()
    }

    /// Distinct doctor locations, sorted
    pub async fn doctor_locations(&self) -> Vec<String> {
        let locations: BTreeSet<String> =
            self.doctors().await.into_iter().map(|d| d.location).collect();
        locations.into_iter().collect()
    }

    /// Distinct specializations, sorted
    pub async fn specializations(&self) -> Vec<String> {
        let specializations: BTreeSet<String> = self
            .doctors()
            .await
            .into_iter()
            .map(|d| d.specialization)
            .collect();
        specializations.into_iter().collect()
    }
}

impl DoctorFilter {
    /// Location is a substring match, specialization is exact and the
    /// query searches name, specialization and hospital case-insensitively
    pub fn matches(&self, doctor: &Doctor) -> bool {
        let location = self.location.as_deref().filter(|l| !l.is_empty());
        if let Some(location) = location {
            if !doctor.location.contains(location) {
                return false;
            }
        }

        let specialization = self.specialization.as_deref().filter(|s| !s.is_empty());
        if let Some(specialization) = specialization {
            if doctor.specialization != specialization {
                return false;
            }
        }

        match self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => {
                let query = query.to_lowercase();
                doctor.name.to_lowercase().contains(&query)
                    || doctor.specialization.to_lowercase().contains(&query)
                    || doctor
                        .hospital
                        .as_deref()
                        .is_some_and(|h| h.to_lowercase().contains(&query))
            }
            None => true,
        }
    }
}
