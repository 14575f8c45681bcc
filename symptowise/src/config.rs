//! Application configuration constants
//!
//! Central location for storage keys, defaults and validation boundaries
//! used throughout the application.

// ===== Backing Store Keys =====

/// Key holding the JSON array of symptoms
pub const SYMPTOMS_KEY: &str = "symptoms";
/// Key holding the JSON array of routine tasks
pub const ROUTINE_TASKS_KEY: &str = "routineTasks";
/// Key holding the JSON array of care plans
pub const CARE_PLANS_KEY: &str = "carePlans";
/// Key holding the JSON array of skincare routines
pub const SKINCARE_ROUTINES_KEY: &str = "skincareRoutines";
/// Key whose presence marks an authenticated session
pub const SESSION_KEY: &str = "isLoggedIn";

// ===== Notifications =====

/// Published once when the notification center is constructed
pub const WELCOME_NOTIFICATION: &str = "Welcome to SymptoWise! Your intelligent health companion. We're here to help you understand and manage your symptoms better!";

// ===== Toasts =====

/// Default lifetime of a toast in milliseconds
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3000;

/// Minimum configurable toast lifetime (shorter toasts cannot be read)
pub const MIN_TOAST_DURATION_MS: u64 = 500;

/// Maximum configurable toast lifetime (1 minute)
pub const MAX_TOAST_DURATION_MS: u64 = 60_000;

/// Shown when the assistant fails and the reference table is used instead
pub const ASSISTANT_FALLBACK_MESSAGE: &str =
    "Failed to generate AI recommendations. Using local database instead.";

// ===== Assistant =====

/// Default OpenAI-compatible chat-completions endpoint
pub const DEFAULT_ASSISTANT_ENDPOINT: &str = "https://api.chatanywhere.com.cn/v1/chat/completions";

/// Default chat model
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-3.5-turbo";

/// Default request timeout in seconds
pub const DEFAULT_ASSISTANT_TIMEOUT_SECS: u64 = 30;

/// Minimum request timeout in seconds
pub const MIN_ASSISTANT_TIMEOUT_SECS: u64 = 1;

/// Maximum request timeout in seconds (2 minutes)
pub const MAX_ASSISTANT_TIMEOUT_SECS: u64 = 120;

/// Environment variable carrying the assistant API key
pub const API_KEY_ENV: &str = "SYMPTOWISE_API_KEY";

// ===== Data Directory =====

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "SYMPTOWISE_DATA_DIR";

/// Data directory used when the environment does not name one
pub const DEFAULT_DATA_DIR: &str = "symptowise-data";

/// SQLite file holding the backing store, relative to the data directory
pub const DATABASE_FILE: &str = "symptowise.db";

/// Directory of static reference documents, relative to the data directory
pub const CONTENT_DIR: &str = "content";

// ===== Input Limits =====

/// Maximum length of a symptom name
pub const MAX_SYMPTOM_NAME_LENGTH: usize = 200;

/// Maximum length of free-text fields (duration, notes, ingredients)
pub const MAX_FREE_TEXT_LENGTH: usize = 2000;
