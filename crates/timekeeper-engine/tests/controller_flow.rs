use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use timekeeper_engine::{EngineError, ScheduleRequest, Timekeeper, TimekeeperBuilder};
use timekeeper_persist::{JsonFileStore, PersistError, PersistenceClient, StoreData};
use timekeeper_types::{
    AgendaItem, EngineConfig, Meeting, MeetingStatus, Template, TimekeeperEvent, TimerPhase,
    ValidationError,
};
use tokio::sync::mpsc;

/// Storage that is never reachable
struct OfflineClient;

#[async_trait]
impl PersistenceClient for OfflineClient {
    async fn list_meetings(&self) -> timekeeper_persist::Result<Vec<Meeting>> {
        Err(offline())
    }

    async fn create_meeting(&self, _meeting: Meeting) -> timekeeper_persist::Result<Meeting> {
        Err(offline())
    }

    async fn update_meeting(
        &self,
        _id: &str,
        _patch: Value,
    ) -> timekeeper_persist::Result<Meeting> {
        Err(offline())
    }

    async fn delete_meeting(&self, _id: &str) -> timekeeper_persist::Result<()> {
        Err(offline())
    }

    async fn list_templates(&self) -> timekeeper_persist::Result<Vec<Template>> {
        Err(offline())
    }

    async fn create_template(&self, _template: Template) -> timekeeper_persist::Result<Template> {
        Err(offline())
    }

    async fn update_template(
        &self,
        _id: &str,
        _patch: Value,
    ) -> timekeeper_persist::Result<Template> {
        Err(offline())
    }

    async fn delete_template(&self, _id: &str) -> timekeeper_persist::Result<()> {
        Err(offline())
    }
}

fn offline() -> PersistError {
    PersistError::Connection("connection refused".to_string())
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("timekeeper-engine-test-{}", uuid::Uuid::new_v4()))
        .join(name)
}

async fn temp_store(name: &str) -> Arc<JsonFileStore> {
    Arc::new(JsonFileStore::open(temp_path(name)).await.unwrap())
}

fn manual_config() -> EngineConfig {
    EngineConfig::default().with_auto_tick(false)
}

fn drain(rx: &mut mpsc::Receiver<TimekeeperEvent>) -> Vec<TimekeeperEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn in_one_hour() -> String {
    (Utc::now() + chrono::Duration::hours(1)).to_rfc3339()
}

fn stored_meeting(id: &str, date_time: chrono::DateTime<Utc>) -> Meeting {
    Meeting {
        id: id.to_string(),
        title: "Weekly sync".to_string(),
        date_time,
        template_id: None,
        status: MeetingStatus::Scheduled,
        agenda: vec![AgendaItem::new("Meeting discussion", 30)],
        total_duration: 30,
        created_at: Utc::now(),
        actual_start_time: None,
    }
}

async fn backed_by(
    store: Arc<JsonFileStore>,
    local: Arc<JsonFileStore>,
) -> (Timekeeper, mpsc::Receiver<TimekeeperEvent>) {
    TimekeeperBuilder::new()
        .client(store)
        .local_store(local)
        .config(manual_config())
        .build()
        .unwrap()
}

/// Controller over empty throwaway stores
async fn fresh() -> (Timekeeper, mpsc::Receiver<TimekeeperEvent>) {
    backed_by(temp_store("db.json").await, temp_store("local.json").await).await
}

#[tokio::test]
async fn test_load_seeds_default_templates() {
    let (timekeeper, mut rx) = fresh().await;

    let degraded = timekeeper.load().await;

    assert!(!degraded);
    assert!(!timekeeper.is_degraded().await);
    assert_eq!(timekeeper.templates().await.len(), 3);
    assert!(timekeeper.meetings().await.is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![TimekeeperEvent::DataLoaded {
            meetings: 0,
            templates: 3,
            degraded: false,
        }]
    );
}

#[tokio::test]
async fn test_offline_load_uses_local_snapshot() {
    let local = temp_store("local.json").await;
    local
        .save_all(StoreData {
            meetings: vec![stored_meeting(
                "meeting_local",
                Utc::now() + chrono::Duration::hours(2),
            )],
            ..StoreData::default()
        })
        .await
        .unwrap();

    let (timekeeper, mut rx) = TimekeeperBuilder::new()
        .client(Arc::new(OfflineClient))
        .local_store(local)
        .config(manual_config())
        .build()
        .unwrap();

    assert!(timekeeper.load().await);
    assert!(timekeeper.is_degraded().await);
    assert_eq!(timekeeper.meetings().await[0].id, "meeting_local");
    assert_eq!(timekeeper.templates().await.len(), 3);
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [TimekeeperEvent::DataLoaded { degraded: true, .. }]
    ));

    // Timer transitions go ahead even though the status write fails
    timekeeper.start("meeting_local").await.unwrap();
    assert_eq!(timekeeper.timer_snapshot().await.phase, TimerPhase::Running);

    let events = drain(&mut rx);
    assert!(matches!(events[0], TimekeeperEvent::TimerStarted { .. }));
    assert!(matches!(
        &events[1],
        TimekeeperEvent::PersistenceFailed { operation, .. } if operation == "start meeting"
    ));
}

#[tokio::test]
async fn test_storage_failures_leave_memory_untouched() {
    let (timekeeper, _rx) = TimekeeperBuilder::new()
        .client(Arc::new(OfflineClient))
        .config(manual_config())
        .build()
        .unwrap();
    timekeeper.load().await;

    let err = timekeeper
        .schedule(ScheduleRequest::new("Planning", in_one_hour()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Persistence(_)));
    assert!(timekeeper.meetings().await.is_empty());

    let err = timekeeper
        .create_template("Retro", 30, "Went well\nTo improve")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Persistence(_)));

    let err = timekeeper.delete_template("template_daily_standup").await.unwrap_err();
    assert!(matches!(err, EngineError::Persistence(_)));
    assert_eq!(timekeeper.templates().await.len(), 3);
}

#[tokio::test]
async fn test_templates_still_run_while_offline() {
    let (timekeeper, _rx) = TimekeeperBuilder::new()
        .client(Arc::new(OfflineClient))
        .config(manual_config())
        .build()
        .unwrap();
    assert!(timekeeper.load().await);

    let err = timekeeper
        .schedule(ScheduleRequest::new("Planning", in_one_hour()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Persistence(_)));

    let meeting = timekeeper.use_template("template_client_review").await.unwrap();
    assert_eq!(meeting.title, "Client Review");
    assert_eq!(meeting.total_duration, 45);
    assert_eq!(timekeeper.timer_snapshot().await.phase, TimerPhase::Running);

    timekeeper.stop().await.unwrap();
    let record = timekeeper.finish().await.unwrap();
    assert_eq!(record.planned_duration, 45);
    assert_eq!(timekeeper.timer_snapshot().await.phase, TimerPhase::Idle);
}

#[tokio::test]
async fn test_validation_errors_are_reported_and_emitted() {
    let (timekeeper, mut rx) = fresh().await;
    timekeeper.load().await;
    drain(&mut rx);

    let err = timekeeper
        .schedule(ScheduleRequest::new("  ", in_one_hour()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(ValidationError::EmptyTitle)));

    let past = (Utc::now() - chrono::Duration::minutes(5)).to_rfc3339();
    timekeeper
        .schedule(ScheduleRequest::new("Planning", past))
        .await
        .unwrap_err();

    timekeeper.create_template("Retro", 0, "A").await.unwrap_err();

    assert_eq!(
        drain(&mut rx),
        vec![
            TimekeeperEvent::ValidationError {
                error: ValidationError::EmptyTitle,
            },
            TimekeeperEvent::ValidationError {
                error: ValidationError::PastOrInvalidDate,
            },
            TimekeeperEvent::ValidationError {
                error: ValidationError::MissingRequiredField("duration".to_string()),
            },
        ]
    );
    assert!(timekeeper.meetings().await.is_empty());
}

#[tokio::test]
async fn test_schedule_run_snooze_and_finish() {
    let store = temp_store("db.json").await;
    let local = temp_store("local.json").await;
    let (timekeeper, mut rx) = backed_by(store.clone(), local.clone()).await;
    timekeeper.load().await;

    let meeting = timekeeper
        .schedule(ScheduleRequest::new("Demo day", in_one_hour()).with_agenda("Demo (1 min)"))
        .await
        .unwrap();
    assert_eq!(meeting.total_duration, 1);
    assert_eq!(store.list_meetings().await.unwrap(), vec![meeting.clone()]);
    drain(&mut rx);

    timekeeper.start(&meeting.id).await.unwrap();
    let stored = store.list_meetings().await.unwrap();
    assert_eq!(stored[0].status, MeetingStatus::Active);
    assert!(stored[0].actual_start_time.is_some());

    for _ in 0..30 {
        timekeeper.tick().await;
    }
    let snapshot = timekeeper.timer_snapshot().await;
    assert_eq!(snapshot.session.unwrap().remaining_seconds, 30);

    let pending = timekeeper.stop().await.unwrap();
    assert_eq!((pending.planned_duration, pending.actual_duration), (1, 1));
    // Ticks after stop change nothing
    assert_eq!(timekeeper.tick().await, None);

    timekeeper.snooze(Some(60)).await.unwrap();
    let session = timekeeper.timer_snapshot().await.session.unwrap();
    assert_eq!(session.total_duration_seconds, 120);
    assert_eq!(session.remaining_seconds, 90);

    let record = timekeeper.finish().await.unwrap();
    assert_eq!(record.meeting_id, meeting.id);
    assert_eq!(record.planned_duration, 2);
    assert_eq!(record.actual_duration, 1);
    assert_eq!(record.efficiency, 200);

    assert_eq!(timekeeper.timer_snapshot().await.phase, TimerPhase::Idle);
    assert!(timekeeper.meetings().await.is_empty());
    assert!(store.list_meetings().await.unwrap().is_empty());
    assert_eq!(local.load_analytics().await.unwrap().completed_meetings, vec![record.clone()]);

    let kpis = timekeeper.kpis().await;
    assert_eq!(kpis.total_meetings, 1);
    assert_eq!(kpis.avg_efficiency, 200);
    assert_eq!(kpis.time_saved_minutes, 1);
    assert_eq!(kpis.on_time_rate_percent, 100);

    let kinds: Vec<&'static str> = drain(&mut rx)
        .iter()
        .map(|event| match event {
            TimekeeperEvent::TimerStarted { .. } => "started",
            TimekeeperEvent::TimerWarning { .. } => "warning",
            TimekeeperEvent::TimerStopped { .. } => "stopped",
            TimekeeperEvent::TimerSnoozed { .. } => "snoozed",
            TimekeeperEvent::MeetingFinished { .. } => "finished",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["started", "warning", "stopped", "snoozed", "finished"]);
}

#[tokio::test]
async fn test_second_session_is_rejected() {
    let (timekeeper, _rx) = fresh().await;
    timekeeper.load().await;

    timekeeper.use_template("template_daily_standup").await.unwrap();
    let err = timekeeper.use_template("template_brainstorming").await.unwrap_err();

    assert!(matches!(err, EngineError::SessionAlreadyActive(_)));
    let snapshot = timekeeper.timer_snapshot().await;
    assert_eq!(snapshot.meeting.unwrap().title, "Daily Standup");
}

#[tokio::test]
async fn test_template_crud_through_storage() {
    let store = temp_store("db.json").await;
    let (timekeeper, _rx) = backed_by(store.clone(), temp_store("local.json").await).await;
    timekeeper.load().await;

    // Editing a built-in template creates it in storage
    let updated = timekeeper
        .update_template(
            "template_daily_standup",
            "Standup",
            10,
            "Round robin (8 min)\nParking lot",
        )
        .await
        .unwrap();
    assert_eq!(updated.id, "template_daily_standup");
    assert_eq!(store.list_templates().await.unwrap(), vec![updated.clone()]);

    let created = timekeeper
        .create_template("Retro", 30, "Went well\nTo improve")
        .await
        .unwrap();
    assert_eq!(timekeeper.templates().await.len(), 4);

    let renamed = timekeeper
        .update_template(&created.id, "Retrospective", 30, "Went well\nTo improve")
        .await
        .unwrap();
    assert_eq!(renamed.created_at, created.created_at);
    assert!(renamed.updated_at.is_some());

    assert!(timekeeper.delete_template(&created.id).await.unwrap());
    assert!(!timekeeper.delete_template(&created.id).await.unwrap());
    assert_eq!(store.list_templates().await.unwrap().len(), 1);

    let err = timekeeper
        .update_template("template_missing", "x", 10, "A")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_meeting() {
    let store = temp_store("db.json").await;
    let (timekeeper, _rx) = backed_by(store.clone(), temp_store("local.json").await).await;
    timekeeper.load().await;

    let meeting = timekeeper
        .schedule(ScheduleRequest::new("Planning", in_one_hour()))
        .await
        .unwrap();
    timekeeper.delete_meeting(&meeting.id).await.unwrap();

    assert!(timekeeper.meetings().await.is_empty());
    assert!(store.list_meetings().await.unwrap().is_empty());
    assert!(timekeeper.delete_meeting(&meeting.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_due_meetings_are_alerted_once() {
    let store = temp_store("db.json").await;
    let due = stored_meeting("meeting_due", Utc::now() - chrono::Duration::minutes(1));
    let later = stored_meeting("meeting_later", Utc::now() + chrono::Duration::hours(1));
    store.create_meeting(due).await.unwrap();
    store.create_meeting(later).await.unwrap();

    let (timekeeper, mut rx) = backed_by(store.clone(), temp_store("local.json").await).await;
    timekeeper.load().await;
    drain(&mut rx);

    assert_eq!(timekeeper.check_alerts().await, vec!["meeting_due".to_string()]);
    assert!(timekeeper.check_alerts().await.is_empty());

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        TimekeeperEvent::MeetingAlert { meeting_id, .. } if meeting_id == "meeting_due"
    ));

    let stored = store.list_meetings().await.unwrap();
    assert_eq!(stored[0].status, MeetingStatus::Alerted);
    assert_eq!(stored[1].status, MeetingStatus::Scheduled);
}

#[tokio::test]
async fn test_settings_are_saved_locally() {
    let local = temp_store("local.json").await;
    let (timekeeper, _rx) = backed_by(temp_store("db.json").await, local.clone()).await;
    timekeeper.load().await;

    let mut settings = timekeeper.settings().await;
    assert!(settings.sound_enabled);
    settings.sound_enabled = false;
    timekeeper.update_settings(settings.clone()).await;

    assert_eq!(local.load_settings().await.unwrap(), settings);
}

async fn remaining(timekeeper: &Timekeeper) -> u64 {
    timekeeper
        .timer_snapshot()
        .await
        .session
        .unwrap()
        .remaining_seconds
}

#[tokio::test(start_paused = true)]
async fn test_tick_source_follows_pause_and_resume() {
    let (timekeeper, mut rx) = TimekeeperBuilder::new()
        .local_store(temp_store("db.json").await)
        .build()
        .unwrap();
    timekeeper.load().await;

    timekeeper.use_template("template_daily_standup").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(remaining(&timekeeper).await, 890);

    timekeeper.pause().await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(remaining(&timekeeper).await, 890);

    timekeeper.resume().await.unwrap();
    tokio::time::sleep(Duration::from_secs(900)).await;
    let snapshot = timekeeper.timer_snapshot().await;
    assert_eq!(snapshot.phase, TimerPhase::Completed);
    assert_eq!(snapshot.session.unwrap().remaining_seconds, 0);

    let warnings: Vec<u64> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            TimekeeperEvent::TimerWarning {
                threshold_seconds, ..
            } => Some(threshold_seconds),
            _ => None,
        })
        .collect();
    assert_eq!(warnings, vec![300, 120, 60, 30]);

    let record = timekeeper.finish().await.unwrap();
    assert_eq!(record.efficiency, 100);
    assert_eq!(record.actual_duration, 15);
}

#[tokio::test(start_paused = true)]
async fn test_background_tasks_alert_autosave_and_stop_on_shutdown() {
    let store = temp_store("db.json").await;
    let local = temp_store("local.json").await;
    let due = stored_meeting("meeting_due", Utc::now() - chrono::Duration::minutes(1));
    store.create_meeting(due).await.unwrap();

    let config = manual_config()
        .with_alert_check_interval(Duration::from_secs(60))
        .with_autosave_interval(Duration::from_secs(30));
    let (timekeeper, mut rx) = TimekeeperBuilder::new()
        .client(store.clone())
        .local_store(local.clone())
        .config(config)
        .build()
        .unwrap();
    timekeeper.load().await;
    drain(&mut rx);

    timekeeper.start_background_tasks().await;
    // Already running, no second set of tasks
    timekeeper.start_background_tasks().await;

    // The checker runs right away, the first auto-save only after a full period
    tokio::time::sleep(Duration::from_secs(1)).await;
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        TimekeeperEvent::MeetingAlert { meeting_id, .. } if meeting_id == "meeting_due"
    ));
    assert!(local.read().await.unwrap().meetings.is_empty());

    tokio::time::sleep(Duration::from_secs(30)).await;
    let mirrored = local.read().await.unwrap();
    let statuses: Vec<MeetingStatus> = mirrored.meetings.iter().map(|m| m.status).collect();
    assert_eq!(statuses, vec![MeetingStatus::Alerted]);
    assert_eq!(mirrored.templates.len(), 3);

    timekeeper.shutdown().await;

    // A meeting that falls due after teardown is never picked up
    let next = stored_meeting("meeting_next", Utc::now() - chrono::Duration::minutes(1));
    store.create_meeting(next).await.unwrap();
    timekeeper.load().await;
    drain(&mut rx);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(drain(&mut rx).is_empty());
    let statuses: Vec<MeetingStatus> = timekeeper
        .meetings()
        .await
        .iter()
        .map(|m| m.status)
        .collect();
    assert_eq!(statuses, vec![MeetingStatus::Alerted, MeetingStatus::Scheduled]);
}
