//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::{CONTENT_DIR, DATABASE_FILE};
use crate::database;
use crate::error::Result;
use crate::services::*;
use crate::storage::SqliteStore;
use serde::Serialize;
use std::path::PathBuf;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub settings: SettingsService,
    pub health: HealthDataStore<SqliteStore>,
    pub session: SessionGuard<SqliteStore>,
    pub notifications: NotificationCenter,
    pub toasts: ToastCenter,
    pub library: ReferenceLibrary,
    pub assistant: CarePlanAssistant,
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub symptoms: usize,
    pub routine_tasks: usize,
    pub completion_percentage: u8,
    pub care_plans: usize,
    pub skincare_routines: usize,
    pub unread_notifications: usize,
    pub logged_in: bool,
    pub assistant_enabled: bool,
}

impl AppState {
    /// Open (or create) everything under `app_data_dir` - called once on startup
    pub async fn initialize(app_data_dir: PathBuf) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", app_data_dir);

        tokio::fs::create_dir_all(&app_data_dir).await?;
        tokio::fs::create_dir_all(app_data_dir.join(CONTENT_DIR)).await?;

        let settings = SettingsService::new(app_data_dir.clone());
        let loaded = settings.load().await?;

        let pool = database::create_pool(&app_data_dir.join(DATABASE_FILE)).await?;
        let backing = SqliteStore::new(pool);

        let health = HealthDataStore::load(backing.clone()).await;
        let session = SessionGuard::new(backing);
        let notifications = NotificationCenter::new();
        let toasts = ToastCenter::with_default_duration(loaded.toasts.default_duration());
        let library = ReferenceLibrary::new(app_data_dir.join(CONTENT_DIR));
        let assistant = CarePlanAssistant::from_env(loaded.assistant)?;

        tracing::info!("Application initialized successfully");

        Ok(Self {
            app_data_dir,
            settings,
            health,
            session,
            notifications,
            toasts,
            library,
            assistant,
        })
    }

    pub fn symptom_checker(&self) -> SymptomChecker<SqliteStore> {
        SymptomChecker::new(
            self.health.clone(),
            self.assistant.clone(),
            self.library.clone(),
            self.toasts.clone(),
        )
    }

    pub async fn summary(&self) -> Result<DashboardSummary> {
        let snapshot = self.health.snapshot().await;
        Ok(DashboardSummary {
            symptoms: snapshot.symptoms.len(),
            routine_tasks: snapshot.routine_tasks.len(),
            completion_percentage: snapshot.completion_percentage(),
            care_plans: snapshot.care_plans.len(),
            skincare_routines: snapshot.skincare_routines.len(),
            unread_notifications: self.notifications.unread_count(),
            logged_in: self.session.is_authenticated().await?,
            assistant_enabled: self.assistant.is_enabled(),
        })
    }
}
