use std::fmt::Display;
use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::Utc;
use timekeeper_persist::{JsonFileStore, MeetingPatch, PersistError, PersistenceClient, StoreData};
use timekeeper_types::{
    AnalyticsLog, CompletionRecord, EngineConfig, Kpis, Meeting, MeetingStatus, PendingCompletion,
    Settings, Template, TimekeeperEvent, TimerSnapshot, ValidationError,
};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::analytics::{compute_kpis, record_completion};
use crate::catalog::TemplateCatalog;
use crate::error::{EngineError, Result};
use crate::scheduler::{self, ScheduleRequest};
use crate::timer::{Ticker, TimerEngine};

pub type EventSender = mpsc::Sender<TimekeeperEvent>;

/// Everything the controller owns in memory
#[derive(Debug)]
pub(crate) struct AppState {
    meetings: Vec<Meeting>,
    catalog: TemplateCatalog,
    timer: TimerEngine,
    analytics: AnalyticsLog,
    settings: Settings,
    degraded: bool,
}

impl AppState {
    pub(crate) fn new(config: &EngineConfig) -> Self {
        Self {
            meetings: Vec::new(),
            catalog: TemplateCatalog::new(),
            timer: TimerEngine::new(config.warning_thresholds.clone()),
            analytics: AnalyticsLog::default(),
            settings: Settings::default(),
            degraded: false,
        }
    }
}

/// Coordinates the catalog, scheduler, timer and analytics over one shared
/// application state, and keeps storage in step with it.
///
/// Cheap to clone; clones share state. Intents that create or remove catalog
/// or meeting records write to storage first and only touch memory when that
/// succeeds. Writes made on behalf of the running timer are best-effort and
/// report failures as [`TimekeeperEvent::PersistenceFailed`].
#[derive(Clone)]
pub struct Timekeeper {
    state: Arc<Mutex<AppState>>,
    client: Arc<dyn PersistenceClient>,
    local: Option<Arc<JsonFileStore>>,
    events: EventSender,
    config: Arc<EngineConfig>,
    ticker: Arc<Mutex<Ticker>>,
    background: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Timekeeper {
    pub(crate) fn new(
        client: Arc<dyn PersistenceClient>,
        local: Option<Arc<JsonFileStore>>,
        config: EngineConfig,
        events: EventSender,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::new(&config))),
            client,
            local,
            events,
            config: Arc::new(config),
            ticker: Arc::new(Mutex::new(Ticker::new())),
            background: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- loading ----

    /// Load meetings and templates from storage, falling back to the local
    /// snapshot when storage is unreachable. Returns whether the fallback was used.
    pub async fn load(&self) -> bool {
        let remote = futures::try_join!(self.client.list_meetings(), self.client.list_templates());

        let (meetings, templates, degraded) = match remote {
            Ok((meetings, templates)) => (meetings, templates, false),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Could not load data from storage, using local fallback"
                );
                let local = self.read_local().await;
                (local.meetings, local.templates, true)
            }
        };
        let local = self.read_local().await;

        let mut state = self.state.lock().await;
        state.meetings = meetings;
        state.catalog = TemplateCatalog::from_templates(templates);
        state.analytics = local.analytics;
        state.settings = local.settings;
        state.degraded = degraded;

        tracing::info!(
            meetings = state.meetings.len(),
            templates = state.catalog.len(),
            degraded,
            "Data loaded"
        );
        self.emit(TimekeeperEvent::DataLoaded {
            meetings: state.meetings.len(),
            templates: state.catalog.len(),
            degraded,
        });

        degraded
    }

    async fn read_local(&self) -> StoreData {
        let Some(local) = &self.local else {
            return StoreData::default();
        };
        match local.read().await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(
                    path = %local.path().display(),
                    error = %e,
                    "Failed to read local store"
                );
                StoreData::default()
            }
        }
    }

    // ---- meetings ----

    pub async fn schedule(&self, request: ScheduleRequest) -> Result<Meeting> {
        let meeting = {
            let state = self.state.lock().await;
            scheduler::schedule(&request, &state.catalog, Utc::now(), &self.config)
        }
        .map_err(|e| self.reject(e))?;

        let stored = self.client.create_meeting(meeting).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to schedule meeting");
            EngineError::from(e)
        })?;

        tracing::info!(meeting_id = %stored.id, date_time = %stored.date_time, "Meeting scheduled");
        self.state.lock().await.meetings.push(stored.clone());
        self.mirror_local().await;

        Ok(stored)
    }

    pub async fn delete_meeting(&self, meeting_id: &str) -> Result<()> {
        {
            let state = self.state.lock().await;
            if !state.meetings.iter().any(|m| m.id == meeting_id) {
                return Err(EngineError::MeetingNotFound(meeting_id.to_string()));
            }
            if state.timer.meeting().is_some_and(|m| m.id == meeting_id) {
                return Err(EngineError::InvalidTransition {
                    action: "delete meeting",
                    phase: state.timer.phase(),
                });
            }
        }

        self.client.delete_meeting(meeting_id).await.map_err(|e| {
            tracing::error!(meeting_id, error = %e, "Failed to delete meeting");
            EngineError::from(e)
        })?;

        self.state
            .lock()
            .await
            .meetings
            .retain(|m| m.id != meeting_id);
        tracing::info!(meeting_id, "Meeting deleted");
        self.mirror_local().await;

        Ok(())
    }

    /// Mark every scheduled meeting whose start time has arrived as alerted.
    /// Returns the ids that were alerted.
    pub async fn check_alerts(&self) -> Vec<String> {
        let now = Utc::now();
        let alerted: Vec<String> = {
            let mut state = self.state.lock().await;
            let mut ids = Vec::new();
            for meeting in state.meetings.iter_mut().filter(|m| m.is_due(now)) {
                meeting.status = MeetingStatus::Alerted;
                tracing::info!(meeting_id = %meeting.id, title = %meeting.title, "Meeting is due");
                self.emit(TimekeeperEvent::MeetingAlert {
                    meeting_id: meeting.id.clone(),
                    title: meeting.title.clone(),
                    date_time: meeting.date_time,
                });
                ids.push(meeting.id.clone());
            }
            ids
        };

        for id in &alerted {
            let patch = MeetingPatch::status(MeetingStatus::Alerted);
            self.patch_meeting(id, patch, "mark meeting alerted").await;
        }

        alerted
    }

    // ---- timer ----

    /// Start the countdown of a meeting from the collection
    pub async fn start(&self, meeting_id: &str) -> Result<()> {
        let now = Utc::now();
        {
            let mut state = self.state.lock().await;
            let meeting = state
                .meetings
                .iter()
                .find(|m| m.id == meeting_id)
                .cloned()
                .ok_or_else(|| EngineError::MeetingNotFound(meeting_id.to_string()))?;

            let event = state.timer.start(meeting, now)?;
            if let Some(meeting) = state.meetings.iter_mut().find(|m| m.id == meeting_id) {
                meeting.status = MeetingStatus::Active;
                meeting.actual_start_time = Some(now);
            }
            tracing::info!(meeting_id, "Meeting started");
            self.emit(event);
            self.start_ticker().await;
        }

        self.patch_meeting(meeting_id, MeetingPatch::started(now), "start meeting")
            .await;
        Ok(())
    }

    /// Start an ad-hoc meeting built from a template right away.
    ///
    /// The meeting lives only in the timer session; it is never stored.
    pub async fn use_template(&self, template_id: &str) -> Result<Meeting> {
        let now = Utc::now();
        let mut state = self.state.lock().await;
        let meeting = scheduler::use_template_meeting(&state.catalog, template_id, now)?;

        let event = state.timer.start(meeting, now)?;
        let meeting = state
            .timer
            .meeting()
            .cloned()
            .ok_or(EngineError::NoActiveSession)?;
        tracing::info!(meeting_id = %meeting.id, template_id, "Meeting started from template");
        self.emit(event);
        self.start_ticker().await;

        Ok(meeting)
    }

    pub async fn pause(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(event) = state.timer.pause()? {
            self.stop_ticker().await;
            self.emit(event);
        }
        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(event) = state.timer.resume()? {
            self.emit(event);
            self.start_ticker().await;
        }
        Ok(())
    }

    /// End the countdown early. The run is not recorded until [`finish`](Self::finish).
    pub async fn stop(&self) -> Result<PendingCompletion> {
        let mut state = self.state.lock().await;
        let event = state.timer.stop()?;
        self.stop_ticker().await;

        let pending = state.timer.pending().copied().ok_or(EngineError::NoActiveSession)?;
        tracing::info!(
            planned = pending.planned_duration,
            actual = pending.actual_duration,
            "Meeting stopped"
        );
        self.emit(event);
        Ok(pending)
    }

    /// Extend a completed or stopped session; `None` uses the configured snooze length
    pub async fn snooze(&self, extra_seconds: Option<u64>) -> Result<()> {
        let extra_seconds = extra_seconds.unwrap_or(self.config.snooze_seconds);
        let mut state = self.state.lock().await;
        let event = state.timer.snooze(extra_seconds)?;

        tracing::info!(extra_seconds, "Meeting snoozed");
        self.emit(event);
        self.start_ticker().await;
        Ok(())
    }

    /// Record the session in analytics, drop its meeting and return to Idle
    pub async fn finish(&self) -> Result<CompletionRecord> {
        let now = Utc::now();
        let (record, stored_id) = {
            let mut state = self.state.lock().await;
            let finished = state.timer.finish()?;
            self.stop_ticker().await;

            let record = record_completion(
                &mut state.analytics,
                &finished.meeting,
                finished.pending.actual_duration,
                now,
            );

            let before = state.meetings.len();
            state.meetings.retain(|m| m.id != finished.meeting.id);
            let stored = state.meetings.len() != before;

            self.emit(TimekeeperEvent::MeetingFinished {
                record: record.clone(),
            });
            (record, stored.then_some(finished.meeting.id))
        };

        if let Some(id) = stored_id {
            if let Err(e) = self.client.delete_meeting(&id).await {
                self.persistence_failed("delete finished meeting", e);
            }
        }
        self.mirror_local().await;

        Ok(record)
    }

    /// Advance the timer by one step by hand.
    ///
    /// Meant for callers that run with `auto_tick` off.
    pub async fn tick(&self) -> Option<TimekeeperEvent> {
        advance(&self.state, &self.events).await.0
    }

    async fn start_ticker(&self) {
        if !self.config.auto_tick {
            return;
        }

        let state = self.state.clone();
        let events = self.events.clone();
        self.ticker
            .lock()
            .await
            .start(self.config.tick_interval, move || {
                let state = state.clone();
                let events = events.clone();
                async move {
                    match advance(&state, &events).await {
                        (_, true) => ControlFlow::Continue(()),
                        (_, false) => ControlFlow::Break(()),
                    }
                }
            });
    }

    async fn stop_ticker(&self) {
        self.ticker.lock().await.stop();
    }

    // ---- templates ----

    pub async fn create_template(
        &self,
        name: &str,
        total_duration: u32,
        agenda_text: &str,
    ) -> Result<Template> {
        let template = TemplateCatalog::build(name, total_duration, agenda_text, Utc::now())
            .map_err(|e| self.reject(e))?;

        let stored = self.client.create_template(template).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create template");
            EngineError::from(e)
        })?;

        tracing::info!(template_id = %stored.id, name = %stored.name, "Template created");
        self.state.lock().await.catalog.insert(stored.clone());
        self.mirror_local().await;

        Ok(stored)
    }

    pub async fn update_template(
        &self,
        template_id: &str,
        name: &str,
        total_duration: u32,
        agenda_text: &str,
    ) -> Result<Template> {
        let prepared = {
            let state = self.state.lock().await;
            state
                .catalog
                .prepare_update(template_id, name, total_duration, agenda_text, Utc::now())
        };
        let template = prepared.map_err(|e| match e {
            EngineError::Validation(error) => self.reject(error),
            other => other,
        })?;

        let patch = serde_json::to_value(&template).map_err(PersistError::from)?;
        let stored = match self.client.update_template(template_id, patch).await {
            Ok(stored) => stored,
            Err(e) if e.is_not_found() => {
                // Built-in templates live only in memory until first edited
                tracing::info!(template_id, "Template not in storage yet, creating it");
                self.client.create_template(template).await?
            }
            Err(e) => {
                tracing::error!(template_id, error = %e, "Failed to update template");
                return Err(e.into());
            }
        };

        tracing::info!(template_id, "Template updated");
        self.state.lock().await.catalog.insert(stored.clone());
        self.mirror_local().await;

        Ok(stored)
    }

    /// Returns whether the template was in the catalog
    pub async fn delete_template(&self, template_id: &str) -> Result<bool> {
        self.client.delete_template(template_id).await.map_err(|e| {
            tracing::error!(template_id, error = %e, "Failed to delete template");
            EngineError::from(e)
        })?;

        let removed = self.state.lock().await.catalog.delete(template_id);
        if removed {
            tracing::info!(template_id, "Template deleted");
            self.mirror_local().await;
        }
        Ok(removed)
    }

    // ---- snapshots ----

    pub async fn meetings(&self) -> Vec<Meeting> {
        self.state.lock().await.meetings.clone()
    }

    pub async fn templates(&self) -> Vec<Template> {
        self.state.lock().await.catalog.list().to_vec()
    }

    pub async fn timer_snapshot(&self) -> TimerSnapshot {
        self.state.lock().await.timer.snapshot()
    }

    pub async fn kpis(&self) -> Kpis {
        compute_kpis(&self.state.lock().await.analytics.completed_meetings)
    }

    pub async fn analytics(&self) -> AnalyticsLog {
        self.state.lock().await.analytics.clone()
    }

    pub async fn settings(&self) -> Settings {
        self.state.lock().await.settings.clone()
    }

    pub async fn update_settings(&self, settings: Settings) {
        self.state.lock().await.settings = settings;
        self.mirror_local().await;
    }

    /// Whether the last load had to fall back to the local snapshot
    pub async fn is_degraded(&self) -> bool {
        self.state.lock().await.degraded
    }

    // ---- background work ----

    /// Spawn the due-meeting checker and, with a local store, the auto-save task.
    /// Calling it again while they run does nothing.
    pub async fn start_background_tasks(&self) {
        let mut handles = self.background.lock().await;
        if !handles.is_empty() {
            return;
        }

        let checker = self.clone();
        let period = self.config.alert_check_interval;
        handles.push(tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                checker.check_alerts().await;
            }
        }));

        if self.local.is_some() {
            let saver = self.clone();
            let period = self.config.autosave_interval;
            handles.push(tokio::spawn(async move {
                let mut interval = time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    if let Err(e) = saver.save_local().await {
                        tracing::warn!(error = %e, "Auto-save failed");
                    }
                }
            }));
        }

        tracing::debug!(tasks = handles.len(), "Background tasks started");
    }

    /// Write meetings, templates, analytics and settings to the local store
    pub async fn save_local(&self) -> Result<()> {
        let Some(local) = &self.local else {
            return Ok(());
        };

        let data = {
            let state = self.state.lock().await;
            StoreData {
                meetings: state.meetings.clone(),
                templates: state.catalog.list().to_vec(),
                analytics: state.analytics.clone(),
                settings: state.settings.clone(),
            }
        };
        local.save_all(data).await?;
        Ok(())
    }

    /// Cancel the tick source and background tasks, then save locally
    pub async fn shutdown(&self) {
        self.stop_ticker().await;
        for handle in self.background.lock().await.drain(..) {
            handle.abort();
        }
        self.mirror_local().await;
        tracing::info!("Timekeeper shut down");
    }

    // ---- helpers ----

    fn emit(&self, event: TimekeeperEvent) {
        emit(&self.events, event);
    }

    fn reject(&self, error: ValidationError) -> EngineError {
        tracing::warn!(error = %error, "Rejected invalid input");
        self.emit(TimekeeperEvent::ValidationError {
            error: error.clone(),
        });
        EngineError::Validation(error)
    }

    fn persistence_failed(&self, operation: &str, error: impl Display) {
        tracing::warn!(operation, error = %error, "Best-effort write failed");
        self.emit(TimekeeperEvent::PersistenceFailed {
            operation: operation.to_string(),
            message: error.to_string(),
        });
    }

    async fn patch_meeting(&self, meeting_id: &str, patch: MeetingPatch, operation: &str) {
        let result = match patch.to_value() {
            Ok(value) => self.client.update_meeting(meeting_id, value).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            self.persistence_failed(operation, e);
        }
    }

    async fn mirror_local(&self) {
        if let Err(e) = self.save_local().await {
            self.persistence_failed("save local snapshot", e);
        }
    }
}

/// One timer step under the state lock. Returns the raised event and whether
/// the timer is still running afterwards.
async fn advance(state: &Mutex<AppState>, events: &EventSender) -> (Option<TimekeeperEvent>, bool) {
    let (event, running) = {
        let mut state = state.lock().await;
        let event = state.timer.tick();
        (event, state.timer.is_running())
    };

    if let Some(event) = &event {
        emit(events, event.clone());
    }
    (event, running)
}

fn emit(events: &EventSender, event: TimekeeperEvent) {
    match events.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            tracing::warn!(?event, "Event channel full, dropping event");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!("Event receiver dropped");
        }
    }
}
