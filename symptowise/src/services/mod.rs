//! Services module
//!
//! Business logic services that coordinate between the models, the
//! backing store and whoever presents the results.

pub mod assistant;
pub mod health;
pub mod notifications;
pub mod reference;
pub mod session;
pub mod settings;
pub mod symptom_checker;
pub mod toasts;

#[cfg(test)]
pub(crate) mod test_support;

pub use assistant::CarePlanAssistant;
pub use health::{HealthDataStore, HealthSnapshot};
pub use notifications::NotificationCenter;
pub use reference::ReferenceLibrary;
pub use session::SessionGuard;
pub use settings::{AppSettings, AssistantSettings, SettingsService, ToastSettings};
pub use symptom_checker::{AnalysisSource, SymptomAnalysis, SymptomChecker};
pub use toasts::ToastCenter;
