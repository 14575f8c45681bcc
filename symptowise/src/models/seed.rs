//! Built-in seed collections
//!
//! Used whenever a collection's key is missing or unreadable.

use super::health::*;
use chrono::Utc;

pub fn default_symptoms() -> Vec<Symptom> {
    vec![Symptom {
        id: "1".to_string(),
        name: "Headache".to_string(),
        severity: Severity::Moderate,
        duration: "2 days".to_string(),
        date: Utc::now(),
        notes: None,
    }]
}

pub fn default_routine_tasks() -> Vec<RoutineTask> {
    vec![
        RoutineTask {
            id: "1".to_string(),
            title: "Take Aspirin".to_string(),
            time: "08:00".to_string(),
            completed: false,
            category: TaskCategory::Medication,
        },
        RoutineTask {
            id: "2".to_string(),
            title: "Drink water".to_string(),
            time: "09:00".to_string(),
            completed: false,
            category: TaskCategory::Other,
        },
    ]
}

pub fn default_care_plans() -> Vec<CarePlan> {
    vec![CarePlan {
        id: "1".to_string(),
        symptom_id: "1".to_string(),
        diet_tips: strings(&["Avoid caffeine", "Stay hydrated", "Eat small, frequent meals"]),
        medications: vec![Medication {
            name: "Aspirin".to_string(),
            dosage: "500mg".to_string(),
            timing: "Every 6 hours as needed".to_string(),
        }],
        home_remedies: strings(&[
            "Apply cold compress to forehead",
            "Rest in a dark, quiet room",
            "Gentle head massage",
        ]),
        dos_donts: DosDonts {
            dos: strings(&["Get adequate sleep", "Practice stress reduction techniques"]),
            donts: strings(&["Avoid bright screens", "Avoid loud noises", "Skip meals"]),
        },
        created_at: Utc::now(),
    }]
}

pub fn default_skincare_routines() -> Vec<SkincareRoutine> {
    vec![SkincareRoutine {
        id: "1".to_string(),
        condition: "Acne-prone skin".to_string(),
        morning_routine: vec![
            RoutineStep::new("Cleanse", "Gentle foaming cleanser"),
            RoutineStep::new("Tone", "Alcohol-free toner"),
            RoutineStep::new("Treat", "Benzoyl peroxide spot treatment"),
            RoutineStep::new("Moisturize", "Oil-free moisturizer"),
            RoutineStep::new("Protect", "SPF 30+ sunscreen"),
        ],
        evening_routine: vec![
            RoutineStep::new("Remove makeup", "Micellar water"),
            RoutineStep::new("Cleanse", "Salicylic acid cleanser"),
            RoutineStep::new("Exfoliate", "Chemical exfoliant (2-3x per week)"),
            RoutineStep::new("Treat", "Retinol serum"),
            RoutineStep::new("Moisturize", "Lightweight gel moisturizer"),
        ],
        weekly_treatments: strings(&["Clay mask (once weekly)", "Hydrating mask (once weekly)"]),
    }]
}

/// Plan used when neither the assistant nor the reference table is available
pub fn generic_care_plan() -> CarePlanDraft {
    CarePlanDraft {
        diet_tips: strings(&["Stay hydrated and eat balanced meals"]),
        medications: Vec::new(),
        home_remedies: strings(&["Rest and monitor your symptoms"]),
        dos_donts: DosDonts {
            dos: strings(&["Get adequate rest", "Monitor your symptoms"]),
            donts: strings(&["Ignore worsening symptoms", "Overexert yourself"]),
        },
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
