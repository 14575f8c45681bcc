//! Health data store
//!
//! Owns the four health collections (symptoms, routine tasks, care plans,
//! skincare routines). Every mutation updates memory first, then writes the
//! whole affected collection to the backing store and notifies observers,
//! all before the call returns.

use crate::error::{AppError, Result};
use crate::events::{Observable, Subscription};
use crate::models::seed;
use crate::models::*;
use crate::storage::BackingStore;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Point-in-time copy of every collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub symptoms: Vec<Symptom>,
    pub routine_tasks: Vec<RoutineTask>,
    pub care_plans: Vec<CarePlan>,
    pub skincare_routines: Vec<SkincareRoutine>,
}

impl HealthSnapshot {
    /// Share of completed routine tasks, rounded to a whole percent.
    /// An empty routine counts as 0%.
    pub fn completion_percentage(&self) -> u8 {
        let total = self.routine_tasks.len();
        if total == 0 {
            return 0;
        }
        let completed = self.routine_tasks.iter().filter(|t| t.completed).count();
        (completed as f64 * 100.0 / total as f64).round() as u8
    }

    /// Routine tasks grouped by time slot, slots in ascending order and
    /// tasks in insertion order within a slot
    pub fn routine_by_time(&self) -> BTreeMap<String, Vec<RoutineTask>> {
        let mut slots: BTreeMap<String, Vec<RoutineTask>> = BTreeMap::new();
        for task in &self.routine_tasks {
            slots.entry(task.time.clone()).or_default().push(task.clone());
        }
        slots
    }

    pub fn care_plan_for_symptom(&self, symptom_id: &str) -> Option<&CarePlan> {
        self.care_plans.iter().find(|p| p.symptom_id == symptom_id)
    }
}

/// Maps a record type to its collection inside the snapshot
trait StoredCollection: Record {
    fn items(state: &HealthSnapshot) -> &Vec<Self>;
    fn items_mut(state: &mut HealthSnapshot) -> &mut Vec<Self>;
    fn defaults() -> Vec<Self>;
}

impl StoredCollection for Symptom {
    fn items(state: &HealthSnapshot) -> &Vec<Self> {
        &state.symptoms
    }
    fn items_mut(state: &mut HealthSnapshot) -> &mut Vec<Self> {
        &mut state.symptoms
    }
    fn defaults() -> Vec<Self> {
        seed::default_symptoms()
    }
}

impl StoredCollection for RoutineTask {
    fn items(state: &HealthSnapshot) -> &Vec<Self> {
        &state.routine_tasks
    }
    fn items_mut(state: &mut HealthSnapshot) -> &mut Vec<Self> {
        &mut state.routine_tasks
    }
    fn defaults() -> Vec<Self> {
        seed::default_routine_tasks()
    }
}

impl StoredCollection for CarePlan {
    fn items(state: &HealthSnapshot) -> &Vec<Self> {
        &state.care_plans
    }
    fn items_mut(state: &mut HealthSnapshot) -> &mut Vec<Self> {
        &mut state.care_plans
    }
    fn defaults() -> Vec<Self> {
        seed::default_care_plans()
    }
}

impl StoredCollection for SkincareRoutine {
    fn items(state: &HealthSnapshot) -> &Vec<Self> {
        &state.skincare_routines
    }
    fn items_mut(state: &mut HealthSnapshot) -> &mut Vec<Self> {
        &mut state.skincare_routines
    }
    fn defaults() -> Vec<Self> {
        seed::default_skincare_routines()
    }
}

struct Inner<S> {
    backing: S,
    state: Mutex<HealthSnapshot>,
    observers: Observable<HealthSnapshot>,
}

/// Cloneable handle to the health collections; clones share state
pub struct HealthDataStore<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for HealthDataStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: BackingStore> HealthDataStore<S> {
    /// Load every collection from the backing store. Missing or unreadable
    /// keys fall back to the built-in seed data without error.
    pub async fn load(backing: S) -> Self {
        tracing::info!("Loading health data");

        let state = HealthSnapshot {
            symptoms: load_collection(&backing).await,
            routine_tasks: load_collection(&backing).await,
            care_plans: load_collection(&backing).await,
            skincare_routines: load_collection(&backing).await,
        };

        tracing::info!(
            "Health data loaded: {} symptoms, {} routine tasks, {} care plans, {} skincare routines",
            state.symptoms.len(),
            state.routine_tasks.len(),
            state.care_plans.len(),
            state.skincare_routines.len()
        );

        Self {
            inner: Arc::new(Inner {
                backing,
                state: Mutex::new(state),
                observers: Observable::new(),
            }),
        }
    }

    /// Observe every mutation. The callback receives the full post-mutation
    /// snapshot before the mutating call returns.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&HealthSnapshot) + Send + Sync + 'static,
    {
        self.inner.observers.subscribe(callback)
    }

    pub async fn snapshot(&self) -> HealthSnapshot {
        self.inner.state.lock().await.clone()
    }

    pub async fn symptoms(&self) -> Vec<Symptom> {
        self.inner.state.lock().await.symptoms.clone()
    }

    pub async fn routine_tasks(&self) -> Vec<RoutineTask> {
        self.inner.state.lock().await.routine_tasks.clone()
    }

    pub async fn care_plans(&self) -> Vec<CarePlan> {
        self.inner.state.lock().await.care_plans.clone()
    }

    pub async fn skincare_routines(&self) -> Vec<SkincareRoutine> {
        self.inner.state.lock().await.skincare_routines.clone()
    }

    // ===== Symptoms =====

    pub async fn add_symptom(&self, symptom: NewSymptom) -> Result<String> {
        let id = new_id();
        let record = symptom.into_record(id.clone());
        tracing::info!("Adding symptom {} ({})", id, record.name);

        self.mutate(|items: &mut Vec<Symptom>| items.push(record))
            .await?;
        Ok(id)
    }

    /// Replace the symptom with the same id; unknown ids are ignored
    pub async fn update_symptom(&self, symptom: Symptom) -> Result<()> {
        let id = symptom.id.clone();
        let found = self
            .mutate(|items: &mut Vec<Symptom>| replace_by_id(items, symptom))
            .await?;
        if !found {
            tracing::debug!("Update ignored, no symptom with id {}", id);
        }
        Ok(())
    }

    pub async fn remove_symptom(&self, id: &str) -> Result<()> {
        let removed = self
            .mutate(|items: &mut Vec<Symptom>| remove_by_id(items, id))
            .await?;
        tracing::debug!("Remove symptom {}: {}", id, removed);
        Ok(())
    }

    // ===== Routine tasks =====

    pub async fn add_routine_task(&self, task: NewRoutineTask) -> Result<String> {
        validate_time(&task.time)?;

        let id = new_id();
        let record = task.into_record(id.clone());
        tracing::info!("Adding routine task {} ({} at {})", id, record.title, record.time);

        self.mutate(|items: &mut Vec<RoutineTask>| items.push(record))
            .await?;
        Ok(id)
    }

    /// Replace the task with the same id; unknown ids are ignored.
    ///
    /// The time is only validated when it changes, so records loaded with
    /// a legacy format such as `8:00` stay editable.
    pub async fn update_routine_task(&self, task: RoutineTask) -> Result<()> {
        let stored_time = self
            .inner
            .state
            .lock()
            .await
            .routine_tasks
            .iter()
            .find(|t| t.id == task.id)
            .map(|t| t.time.clone());
        if stored_time.as_deref() != Some(task.time.as_str()) {
            validate_time(&task.time)?;
        }

        let id = task.id.clone();
        let found = self
            .mutate(|items: &mut Vec<RoutineTask>| replace_by_id(items, task))
            .await?;
        if !found {
            tracing::debug!("Update ignored, no routine task with id {}", id);
        }
        Ok(())
    }

    /// Flip the completion flag of a task; unknown ids are ignored
    pub async fn toggle_task_completion(&self, id: &str) -> Result<()> {
        let toggled = self
            .mutate(|items: &mut Vec<RoutineTask>| {
                items.iter_mut().find(|t| t.id == id).map(|task| {
                    task.completed = !task.completed;
                    task.completed
                })
            })
            .await?;
        tracing::debug!("Toggle routine task {}: {:?}", id, toggled);
        Ok(())
    }

    pub async fn remove_routine_task(&self, id: &str) -> Result<()> {
        let removed = self
            .mutate(|items: &mut Vec<RoutineTask>| remove_by_id(items, id))
            .await?;
        tracing::debug!("Remove routine task {}: {}", id, removed);
        Ok(())
    }

    pub async fn completion_percentage(&self) -> u8 {
        self.inner.state.lock().await.completion_percentage()
    }

    // ===== Care plans =====

    pub async fn add_care_plan(&self, plan: NewCarePlan) -> Result<String> {
        let id = new_id();
        let record = plan.into_record(id.clone(), Utc::now());
        tracing::info!("Adding care plan {} for symptom {}", id, record.symptom_id);

        self.mutate(|items: &mut Vec<CarePlan>| items.push(record))
            .await?;
        Ok(id)
    }

    /// The earliest-inserted plan for a symptom, if any
    pub async fn care_plan_for_symptom(&self, symptom_id: &str) -> Option<CarePlan> {
        self.inner
            .state
            .lock()
            .await
            .care_plan_for_symptom(symptom_id)
            .cloned()
    }

    // ===== Skincare routines =====

    pub async fn add_skincare_routine(&self, routine: NewSkincareRoutine) -> Result<String> {
        let id = new_id();
        let record = routine.into_record(id.clone());
        tracing::info!("Adding skincare routine {} ({})", id, record.condition);

        self.mutate(|items: &mut Vec<SkincareRoutine>| items.push(record))
            .await?;
        Ok(id)
    }

    /// Apply `change` to one collection, mirror that collection to the
    /// backing store and notify observers, in that order, under the state
    /// lock. A failed write is returned after memory and observers have
    /// already moved on.
    async fn mutate<T, R, F>(&self, change: F) -> Result<R>
    where
        T: StoredCollection,
        F: FnOnce(&mut Vec<T>) -> R,
    {
        // Held across the write and the notify so observers see calls in order
        let mut state = self.inner.state.lock().await;
        let outcome = change(T::items_mut(&mut state));

        // Only the touched collection is written, never the whole snapshot
        let written = self.write_collection(T::items(&state)).await;

        // Notify even when the write failed: memory already holds the change
        if self.inner.observers.subscriber_count() > 0 {
            self.inner.observers.notify(&state);
        }

        written.map(|()| outcome)
    }

    async fn write_collection<T: Record>(&self, items: &[T]) -> Result<()> {
        let json = serde_json::to_string(items)?;

        self.inner
            .backing
            .set(T::STORAGE_KEY, &json)
            .await
            .map_err(|e| {
                tracing::error!("Failed to persist {}: {}", T::STORAGE_KEY, e);
                match e {
                    AppError::Storage(_) => e,
                    other => AppError::Storage(other.to_string()),
                }
            })
    }
}

async fn load_collection<S: BackingStore, T: StoredCollection>(backing: &S) -> Vec<T> {
    match backing.get(T::STORAGE_KEY).await {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Stored {} unreadable, using defaults: {}", T::STORAGE_KEY, e);
                T::defaults()
            }
        },
        Ok(None) => {
            tracing::debug!("No stored {}, using defaults", T::STORAGE_KEY);
            T::defaults()
        }
        Err(e) => {
            tracing::warn!("Failed to read {}, using defaults: {}", T::STORAGE_KEY, e);
            T::defaults()
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn replace_by_id<T: Record>(items: &mut [T], record: T) -> bool {
    match items.iter_mut().find(|item| item.id() == record.id()) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

fn remove_by_id<T: Record>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}

fn validate_time(time: &str) -> Result<()> {
    if is_valid_time_of_day(time) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "Routine time must be HH:MM, got {:?}",
            time
        )))
    }
}
