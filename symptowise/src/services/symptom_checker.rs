//! Symptom checker
//!
//! Turns an intake into a recorded symptom plus a care plan. The assistant
//! is asked first; the reference library covers any failure.

use crate::config::{ASSISTANT_FALLBACK_MESSAGE, MAX_FREE_TEXT_LENGTH, MAX_SYMPTOM_NAME_LENGTH};
use crate::error::{AppError, Result};
use crate::models::{CarePlanDraft, DiseasePrediction, NewCarePlan, SymptomIntake};
use crate::services::assistant::CarePlanAssistant;
use crate::services::health::HealthDataStore;
use crate::services::reference::ReferenceLibrary;
use crate::services::toasts::ToastCenter;
use crate::storage::BackingStore;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Assistant,
    Reference,
}

/// Outcome of one symptom check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    pub symptom_id: String,
    pub care_plan_id: String,
    pub plan: CarePlanDraft,
    /// Absent when the assistant could not produce one
    pub prediction: Option<DiseasePrediction>,
    pub source: AnalysisSource,
}

pub struct SymptomChecker<S> {
    store: HealthDataStore<S>,
    assistant: CarePlanAssistant,
    library: ReferenceLibrary,
    toasts: ToastCenter,
}

impl<S: BackingStore> SymptomChecker<S> {
    pub fn new(
        store: HealthDataStore<S>,
        assistant: CarePlanAssistant,
        library: ReferenceLibrary,
        toasts: ToastCenter,
    ) -> Self {
        Self {
            store,
            assistant,
            library,
            toasts,
        }
    }

    pub async fn analyze(&self, intake: SymptomIntake) -> Result<SymptomAnalysis> {
        validate_intake(&intake)?;
        tracing::info!("Analyzing symptom '{}' ({})", intake.name.trim(), intake.severity);

        let (plan, prediction) = tokio::join!(
            self.assistant.generate_care_plan(&intake),
            self.assistant.predict_conditions(&intake)
        );

        let prediction = prediction
            .map_err(|e| tracing::warn!("Condition prediction unavailable: {}", e))
            .ok();

        let (plan, source) = match plan {
            Ok(plan) => (plan, AnalysisSource::Assistant),
            Err(e) => {
                tracing::warn!("AI care plan failed, using reference library: {}", e);
                self.toasts.info(ASSISTANT_FALLBACK_MESSAGE);
                let plan = self.library.local_care_plan(&intake.name).await;
                (plan, AnalysisSource::Reference)
            }
        };

        let symptom_id = self
            .store
            .add_symptom(intake.into_new_symptom(Utc::now()))
            .await?;
        let care_plan_id = self
            .store
            .add_care_plan(NewCarePlan::from_draft(symptom_id.clone(), plan.clone()))
            .await?;

        tracing::info!(
            "Recorded symptom {} with care plan {} from {:?}",
            symptom_id,
            care_plan_id,
            source
        );

        Ok(SymptomAnalysis {
            symptom_id,
            care_plan_id,
            plan,
            prediction,
            source,
        })
    }
}

fn validate_intake(intake: &SymptomIntake) -> Result<()> {
    let name = intake.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Symptom name is required".to_string()));
    }
    if intake.duration.trim().is_empty() {
        return Err(AppError::InvalidInput("Duration is required".to_string()));
    }
    if name.chars().count() > MAX_SYMPTOM_NAME_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Symptom name exceeds {} characters",
            MAX_SYMPTOM_NAME_LENGTH
        )));
    }
    let notes_len = intake.notes().map_or(0, |n| n.chars().count());
    if notes_len > MAX_FREE_TEXT_LENGTH || intake.duration.chars().count() > MAX_FREE_TEXT_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Text fields are limited to {} characters",
            MAX_FREE_TEXT_LENGTH
        )));
    }
    Ok(())
}
