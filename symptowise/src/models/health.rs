//! Health records owned by the health data store

use super::Record;
use crate::config::{CARE_PLANS_KEY, ROUTINE_TASKS_KEY, SKINCARE_ROUTINES_KEY, SYMPTOMS_KEY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symptom reported through the intake flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptom {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    /// Free text, e.g. "2 days"
    pub duration: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Symptom fields supplied by the caller; the store assigns the id
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSymptom {
    pub name: String,
    pub severity: Severity,
    pub duration: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewSymptom {
    pub fn into_record(self, id: String) -> Symptom {
        Symptom {
            id,
            name: self.name,
            severity: self.severity,
            duration: self.duration,
            date: self.date,
            notes: self.notes,
        }
    }
}

/// What the user typed into the symptom checker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomIntake {
    pub name: String,
    pub severity: Severity,
    pub duration: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SymptomIntake {
    pub fn new(name: impl Into<String>, severity: Severity, duration: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity,
            duration: duration.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Notes trimmed, with blank notes treated as absent
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn into_new_symptom(self, date: DateTime<Utc>) -> NewSymptom {
        let notes = self.notes().map(str::to_string);
        NewSymptom {
            name: self.name.trim().to_string(),
            severity: self.severity,
            duration: self.duration.trim().to_string(),
            date,
            notes,
        }
    }
}

impl Record for Symptom {
    const STORAGE_KEY: &'static str = SYMPTOMS_KEY;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Medication,
    Skincare,
    Diet,
    Exercise,
    Other,
}

/// A daily routine item with a completion flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTask {
    pub id: String,
    pub title: String,
    /// Time of day as "HH:MM"
    pub time: String,
    pub completed: bool,
    pub category: TaskCategory,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoutineTask {
    pub title: String,
    pub time: String,
    #[serde(default)]
    pub completed: bool,
    pub category: TaskCategory,
}

impl NewRoutineTask {
    /// A not-yet-completed task
    pub fn new(title: impl Into<String>, time: impl Into<String>, category: TaskCategory) -> Self {
        Self {
            title: title.into(),
            time: time.into(),
            completed: false,
            category,
        }
    }

    pub fn into_record(self, id: String) -> RoutineTask {
        RoutineTask {
            id,
            title: self.title,
            time: self.time,
            completed: self.completed,
            category: self.category,
        }
    }
}

impl Record for RoutineTask {
    const STORAGE_KEY: &'static str = ROUTINE_TASKS_KEY;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Check a "HH:MM" 24-hour time of day
pub fn is_valid_time_of_day(time: &str) -> bool {
    let Some((hours, minutes)) = time.split_once(':') else {
        return false;
    };
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return false;
    }
    matches!(
        (hours.parse::<u8>(), minutes.parse::<u8>()),
        (Ok(h), Ok(m)) if h < 24 && m < 60
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub timing: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosDonts {
    #[serde(default)]
    pub dos: Vec<String>,
    #[serde(default)]
    pub donts: Vec<String>,
}

/// Care recommendations not yet tied to a symptom, as produced by the
/// assistant or the reference table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarePlanDraft {
    #[serde(default)]
    pub diet_tips: Vec<String>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub home_remedies: Vec<String>,
    #[serde(default)]
    pub dos_donts: DosDonts,
}

/// A care plan attached to a reported symptom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarePlan {
    pub id: String,
    /// Not enforced; the symptom may have been removed since
    pub symptom_id: String,
    pub diet_tips: Vec<String>,
    pub medications: Vec<Medication>,
    pub home_remedies: Vec<String>,
    pub dos_donts: DosDonts,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCarePlan {
    pub symptom_id: String,
    pub diet_tips: Vec<String>,
    pub medications: Vec<Medication>,
    pub home_remedies: Vec<String>,
    pub dos_donts: DosDonts,
}

impl NewCarePlan {
    pub fn from_draft(symptom_id: impl Into<String>, draft: CarePlanDraft) -> Self {
        Self {
            symptom_id: symptom_id.into(),
            diet_tips: draft.diet_tips,
            medications: draft.medications,
            home_remedies: draft.home_remedies,
            dos_donts: draft.dos_donts,
        }
    }

    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> CarePlan {
        CarePlan {
            id,
            symptom_id: self.symptom_id,
            diet_tips: self.diet_tips,
            medications: self.medications,
            home_remedies: self.home_remedies,
            dos_donts: self.dos_donts,
            created_at,
        }
    }
}

impl Record for CarePlan {
    const STORAGE_KEY: &'static str = CARE_PLANS_KEY;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineStep {
    pub step: String,
    pub product: String,
}

impl RoutineStep {
    pub fn new(step: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            product: product.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkincareRoutine {
    pub id: String,
    pub condition: String,
    pub morning_routine: Vec<RoutineStep>,
    pub evening_routine: Vec<RoutineStep>,
    pub weekly_treatments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSkincareRoutine {
    pub condition: String,
    pub morning_routine: Vec<RoutineStep>,
    pub evening_routine: Vec<RoutineStep>,
    pub weekly_treatments: Vec<String>,
}

impl NewSkincareRoutine {
    pub fn into_record(self, id: String) -> SkincareRoutine {
        SkincareRoutine {
            id,
            condition: self.condition,
            morning_routine: self.morning_routine,
            evening_routine: self.evening_routine,
            weekly_treatments: self.weekly_treatments,
        }
    }
}

impl Record for SkincareRoutine {
    const STORAGE_KEY: &'static str = SKINCARE_ROUTINES_KEY;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_validation() {
        assert!(is_valid_time_of_day("08:00"));
        assert!(is_valid_time_of_day("23:59"));
        assert!(!is_valid_time_of_day("24:00"));
        assert!(!is_valid_time_of_day("8:00"));
        assert!(!is_valid_time_of_day("08:60"));
        assert!(!is_valid_time_of_day("0800"));
        assert!(!is_valid_time_of_day("ab:cd"));
    }

    #[test]
    fn test_symptom_reads_web_client_json() {
        let json = r#"{
            "id": "1",
            "name": "Headache",
            "severity": "moderate",
            "duration": "2 days",
            "date": "2024-03-01T10:15:30.000Z"
        }"#;

        let symptom: Symptom = serde_json::from_str(json).unwrap();

        assert_eq!(symptom.severity, Severity::Moderate);
        assert_eq!(symptom.notes, None);
        let back = serde_json::to_value(&symptom).unwrap();
        assert!(back.get("notes").is_none());
    }

    #[test]
    fn test_care_plan_uses_camel_case_keys() {
        let plan = NewCarePlan::from_draft("s1", CarePlanDraft::default())
            .into_record("p1".to_string(), Utc::now());

        let value = serde_json::to_value(&plan).unwrap();

        assert_eq!(value["symptomId"], "s1");
        assert!(value.get("dietTips").is_some());
        assert!(value.get("homeRemedies").is_some());
        assert!(value["dosDonts"].get("donts").is_some());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_intake_drops_blank_notes() {
        let now = Utc::now();
        let symptom = SymptomIntake::new(" Cough ", Severity::Mild, "3 days")
            .with_notes("   ")
            .into_new_symptom(now);

        assert_eq!(symptom.name, "Cough");
        assert_eq!(symptom.notes, None);
        assert_eq!(symptom.date, now);
    }

    #[test]
    fn test_care_plan_draft_tolerates_missing_sections() {
        let draft: CarePlanDraft = serde_json::from_str(r#"{"dietTips": ["Rest"]}"#).unwrap();

        assert_eq!(draft.diet_tips, vec!["Rest"]);
        assert!(draft.medications.is_empty());
        assert!(draft.dos_donts.dos.is_empty());
    }
}
