//! Care-plan assistant
//!
//! Client for an OpenAI-compatible chat-completions endpoint. Every failure
//! surfaces as an error; callers decide whether to fall back to the
//! reference library.

use crate::config::API_KEY_ENV;
use crate::error::{AppError, Result};
use crate::models::{
    CarePlanDraft, DiseasePrediction, DosDonts, Medication, Severity, SymptomIntake,
};
use crate::services::settings::AssistantSettings;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const RECIPE_SYSTEM_PROMPT: &str = "You are a professional nutritionist. Provide detailed recipes \
with measurements, instructions, prep time, and nutritional info. Format with Markdown.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Care plan as the assistant must return it. Diet tips are mandatory, so
/// an error object or an unrelated JSON answer is rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssistantCarePlan {
    diet_tips: Vec<String>,
    #[serde(default)]
    medications: Option<MedicationList>,
    #[serde(default)]
    home_remedies: Vec<String>,
    #[serde(default)]
    dos_donts: DosDonts,
}

/// The prompt allows `"none"` in place of a medication list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MedicationList {
    Listed(Vec<Medication>),
    Text(String),
}

impl AssistantCarePlan {
    fn into_draft(self) -> Result<CarePlanDraft> {
        let medications = match self.medications {
            Some(MedicationList::Listed(list)) => list,
            Some(MedicationList::Text(_)) | None => Vec::new(),
        };
        if self.diet_tips.is_empty() && self.home_remedies.is_empty() && medications.is_empty() {
            return Err(AppError::Assistant(
                "Assistant returned an empty care plan".to_string(),
            ));
        }

        Ok(CarePlanDraft {
            diet_tips: self.diet_tips,
            medications,
            home_remedies: self.home_remedies,
            dos_donts: self.dos_donts,
        })
    }
}

/// Client for care plans, condition predictions and recipes
#[derive(Clone)]
pub struct CarePlanAssistant {
    client: reqwest::Client,
    settings: AssistantSettings,
    api_key: Option<String>,
}

impl CarePlanAssistant {
    pub fn new(settings: AssistantSettings, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("SymptoWise/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout())
            .build()?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("No assistant API key configured, AI recommendations are disabled");
        }

        Ok(Self {
            client,
            settings,
            api_key,
        })
    }

    /// Build a client taking the API key from the environment
    pub fn from_env(settings: AssistantSettings) -> Result<Self> {
        Self::new(settings, std::env::var(API_KEY_ENV).ok())
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled && self.api_key.is_some()
    }

    /// Ask for a structured care plan. A tip matching the severity is
    /// appended to the diet tips.
    pub async fn generate_care_plan(&self, intake: &SymptomIntake) -> Result<CarePlanDraft> {
        tracing::info!("Requesting care plan for '{}'", intake.name);

        let content = self
            .complete(vec![ChatMessage::user(care_plan_prompt(intake))], 0.7, 1000)
            .await?;
        let mut draft = parse_json_content::<AssistantCarePlan>(&content)?.into_draft()?;
        draft
            .diet_tips
            .push(severity_tip(intake.severity).to_string());

        Ok(draft)
    }

    pub async fn predict_conditions(&self, intake: &SymptomIntake) -> Result<DiseasePrediction> {
        tracing::info!("Requesting condition prediction for '{}'", intake.name);

        let content = self
            .complete(vec![ChatMessage::user(prediction_prompt(intake))], 0.5, 500)
            .await?;
        parse_json_content(&content)
    }

    /// Markdown recipe built around the given ingredients
    pub async fn generate_recipe(&self, ingredients: &str) -> Result<String> {
        let ingredients = ingredients.trim();
        if ingredients.is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter some ingredients".to_string(),
            ));
        }

        self.complete(
            vec![
                ChatMessage::system(RECIPE_SYSTEM_PROMPT),
                ChatMessage::user(format!("Create a recipe using: {}", ingredients)),
            ],
            0.7,
            1000,
        )
        .await
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        if !self.settings.enabled {
            return Err(AppError::Assistant("Assistant is disabled".to_string()));
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Assistant(format!("{} is not set", API_KEY_ENV)))?;

        let request = ChatRequest {
            model: &self.settings.model,
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Assistant request failed: {}", e);
                AppError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Assistant returned status: {}", status);
            return Err(AppError::Assistant(format!(
                "API request failed with status {}",
                status.as_u16()
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Assistant("No content in API response".to_string()))
    }
}

fn severity_tip(severity: Severity) -> &'static str {
    match severity {
        Severity::Severe => "⚠️ Consult a doctor immediately if symptoms worsen",
        Severity::Moderate => "💡 Monitor your symptoms and seek medical attention if they persist",
        Severity::Mild => "💡 These suggestions may help relieve mild symptoms",
    }
}

fn patient_report(intake: &SymptomIntake) -> String {
    format!(
        "The patient reports:\n\
         - Main symptom: {}\n\
         - Severity: {}\n\
         - Duration: {}\n\
         - Additional notes: {}",
        intake.name.trim(),
        intake.severity,
        intake.duration.trim(),
        intake.notes().unwrap_or("none"),
    )
}

fn care_plan_prompt(intake: &SymptomIntake) -> String {
    format!(
        r#"You are a medical assistant providing care recommendations for patients.
{}

Provide a structured care plan with:
1. 4 diet recommendations
2. 2-3 appropriate medications with dosage and timing (or "none" if not needed)
3. 4 home remedies
4. 4 dos and 4 dont's

Format the response as JSON exactly like this:
{{
  "dietTips": ["tip1", "tip2", ...],
  "medications": [{{"name": "med1", "dosage": "Xmg", "timing": "every X hours"}}, ...],
  "homeRemedies": ["remedy1", "remedy2", ...],
  "dosDonts": {{
    "dos": ["do1", "do2", ...],
    "donts": ["don't1", "don't2", ...]
  }}
}}

Important:
- Be concise but professional
- Only suggest OTC medications for mild/moderate cases
- Always recommend consulting a doctor for severe symptoms
- Tailor advice to the symptom severity and duration
- Consider any additional notes provided"#,
        patient_report(intake)
    )
}

fn prediction_prompt(intake: &SymptomIntake) -> String {
    format!(
        r#"You are a medical assistant analyzing symptoms to predict possible conditions.
{}

Provide a prediction with:
1. Top 3 possible conditions (ordered by likelihood)
2. Likelihood level (low, medium, high)
3. Clear guidance on when to see a doctor

Format the response as JSON exactly like this:
{{
  "possibleConditions": ["condition1", "condition2", "condition3"],
  "likelihood": "low|medium|high",
  "whenToSeeDoctor": "string with specific guidance"
}}

Important:
- Be conservative with predictions
- Always recommend seeing a doctor for severe symptoms
- Consider duration in your assessment
- For medium/high likelihood, be specific about urgency"#,
        patient_report(intake)
    )
}

/// Parse a JSON answer, tolerating a surrounding Markdown code fence
fn parse_json_content<T: DeserializeOwned>(content: &str) -> Result<T> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim())
        .map_err(|e| AppError::Assistant(format!("Malformed assistant response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Likelihood;
    use crate::services::test_support::{completion, serve};
    use serde_json::json;

    fn intake() -> SymptomIntake {
        SymptomIntake::new("Cough", Severity::Severe, "3 days").with_notes("worse at night")
    }

    fn assistant_for(endpoint: String) -> CarePlanAssistant {
        let settings = AssistantSettings {
            endpoint,
            timeout_secs: 5,
            ..AssistantSettings::default()
        };
        CarePlanAssistant::new(settings, Some("test-key".to_string())).unwrap()
    }

    #[test]
    fn test_prompts_include_intake() {
        let prompt = care_plan_prompt(&intake());
        assert!(prompt.contains("- Main symptom: Cough"));
        assert!(prompt.contains("- Severity: severe"));
        assert!(prompt.contains("- Additional notes: worse at night"));

        let bare = SymptomIntake::new("Cough", Severity::Mild, "1 day");
        assert!(prediction_prompt(&bare).contains("- Additional notes: none"));
    }

    #[test]
    fn test_parse_fenced_json() {
        let content = "```json\n{\"possibleConditions\": [\"Cold\"], \"likelihood\": \"low\", \"whenToSeeDoctor\": \"If fever\"}\n```";

        let prediction: DiseasePrediction = parse_json_content(content).unwrap();

        assert_eq!(prediction.possible_conditions, vec!["Cold"]);
        assert_eq!(prediction.likelihood, Likelihood::Low);
    }

    #[test]
    fn test_error_object_is_not_a_care_plan() {
        let parsed = parse_json_content::<AssistantCarePlan>(r#"{"error":"rate limited"}"#);
        assert!(matches!(parsed, Err(AppError::Assistant(_))));

        let empty = parse_json_content::<AssistantCarePlan>(r#"{"dietTips": []}"#)
            .unwrap()
            .into_draft();
        assert!(matches!(empty, Err(AppError::Assistant(_))));
    }

    #[test]
    fn test_medications_may_be_none() {
        let plan = parse_json_content::<AssistantCarePlan>(
            r#"{"dietTips": ["Soup"], "medications": "none", "homeRemedies": ["Rest"]}"#,
        )
        .unwrap()
        .into_draft()
        .unwrap();

        assert!(plan.medications.is_empty());
        assert_eq!(plan.home_remedies, vec!["Rest"]);
    }

    #[tokio::test]
    async fn test_error_payload_fails_care_plan() {
        let endpoint = serve(200, completion(r#"{"error":"rate limited"}"#)).await;

        let result = assistant_for(endpoint).generate_care_plan(&intake()).await;

        assert!(matches!(result, Err(AppError::Assistant(_))));
    }

    #[test]
    fn test_parse_rejects_prose() {
        let result: Result<CarePlanDraft> = parse_json_content("I cannot help with that.");
        assert!(matches!(result, Err(AppError::Assistant(_))));
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let assistant =
            CarePlanAssistant::new(AssistantSettings::default(), Some("  ".to_string())).unwrap();

        assert!(!assistant.is_enabled());
        let result = assistant.generate_care_plan(&intake()).await;
        assert!(matches!(result, Err(AppError::Assistant(_))));
    }

    #[tokio::test]
    async fn test_empty_ingredients_rejected() {
        let assistant = assistant_for("http://127.0.0.1:9/v1/chat/completions".to_string());

        let result = assistant.generate_recipe("   ").await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_care_plan_gets_severity_tip() {
        let plan = json!({
            "dietTips": ["Warm fluids"],
            "medications": [{"name": "Honey syrup", "dosage": "10ml", "timing": "every 6 hours"}],
            "homeRemedies": ["Steam inhalation"],
            "dosDonts": {"dos": ["Rest"], "donts": ["Smoke"]}
        })
        .to_string();
        let endpoint = serve(200, completion(&plan)).await;

        let draft = assistant_for(endpoint)
            .generate_care_plan(&intake())
            .await
            .unwrap();

        assert_eq!(draft.diet_tips.len(), 2);
        assert_eq!(draft.diet_tips[1], severity_tip(Severity::Severe));
        assert_eq!(draft.medications[0].name, "Honey syrup");
    }

    #[tokio::test]
    async fn test_prediction_round_trip() {
        let prediction = json!({
            "possibleConditions": ["Bronchitis", "Common cold", "Allergy"],
            "likelihood": "medium",
            "whenToSeeDoctor": "If it lasts over a week"
        })
        .to_string();
        let endpoint = serve(200, completion(&prediction)).await;

        let result = assistant_for(endpoint)
            .predict_conditions(&intake())
            .await
            .unwrap();

        assert_eq!(result.likelihood, Likelihood::Medium);
        assert_eq!(result.possible_conditions.len(), 3);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let endpoint = serve(500, "{}".to_string()).await;

        let result = assistant_for(endpoint).predict_conditions(&intake()).await;

        match result {
            Err(AppError::Assistant(message)) => assert!(message.contains("500")),
            other => panic!("expected assistant error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let endpoint = serve(200, json!({ "choices": [] }).to_string()).await;

        let result = assistant_for(endpoint).generate_recipe("eggs, spinach").await;

        assert!(matches!(result, Err(AppError::Assistant(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let assistant = assistant_for("http://127.0.0.1:9/v1/chat/completions".to_string());

        let result = assistant.generate_care_plan(&intake()).await;

        assert!(matches!(result, Err(AppError::Http(_))));
    }
}
