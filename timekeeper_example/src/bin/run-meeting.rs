use anyhow::Result;
use chrono::{Duration as ChronoDuration, Local};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use timekeeper::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .compact()
        .init();

    println!("Timekeeper - Run a Meeting");
    println!("==========================\n");

    // 1. Wire storage
    println!("1. Connecting to storage...");
    let api_url = std::env::var("TIMEKEEPER_API_URL")
        .unwrap_or_else(|_| "http://localhost:3000/api".to_string());
    let data_dir = PathBuf::from(
        std::env::var("TIMEKEEPER_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
    );

    let client = HttpPersistenceClient::new(&api_url)?;
    let local = JsonFileStore::open(data_dir.join("timekeeper.json")).await?;

    // A short run: 100 ms per simulated second, 30 s snooze
    let config = EngineConfig::default()
        .with_tick_interval(Duration::from_millis(100))
        .with_snooze_seconds(30);

    let (timekeeper, mut events) = TimekeeperBuilder::new()
        .client(Arc::new(client))
        .local_store(Arc::new(local))
        .config(config)
        .build()?;

    let degraded = timekeeper.load().await;
    if degraded {
        println!("   ! API at {api_url} unreachable, using the local snapshot\n");
    } else {
        println!("   ✓ Connected to {api_url}\n");
    }

    // 2. Schedule a meeting, or run a template right away when storage is offline
    let meeting = if degraded {
        let templates = timekeeper.templates().await;
        let Some(template) = templates.first() else {
            println!("2. Storage offline and no templates to run, nothing to do");
            return Ok(());
        };
        println!("2. Storage offline, running the {} template directly...", template.name);
        let meeting = timekeeper.use_template(&template.id).await?;
        println!("   ✓ Meeting started: {}", meeting.id);
        meeting
    } else {
        println!("2. Scheduling a one-minute meeting...");
        let date_time = (Local::now() + ChronoDuration::minutes(5))
            .format("%Y-%m-%dT%H:%M")
            .to_string();
        let meeting = timekeeper
            .schedule(
                ScheduleRequest::new("Quick sync", date_time).with_agenda("Check-in (1 min)"),
            )
            .await?;
        println!("   ✓ Meeting scheduled: {}", meeting.id);
        timekeeper.start(&meeting.id).await?;
        meeting
    };
    println!("   Title: {}", meeting.title);
    println!("   Planned: {} min", meeting.total_duration);
    for item in &meeting.agenda {
        println!("   - {} ({} min)", item.title, item.duration);
    }
    println!();

    // 3. Run the countdown
    println!("3. Running the timer...");

    let mut snoozed = false;
    while let Some(event) = events.recv().await {
        match event {
            TimekeeperEvent::TimerWarning {
                threshold_seconds, ..
            } => {
                println!("   ⏰ {threshold_seconds} seconds left");
            }
            TimekeeperEvent::TimerCompleted { .. } if !snoozed => {
                println!("   ✓ Time is up, snoozing once\n");
                timekeeper.snooze(None).await?;
                snoozed = true;
            }
            TimekeeperEvent::TimerCompleted { .. } => {
                println!("   ✓ Snooze is over\n");
                break;
            }
            TimekeeperEvent::PersistenceFailed { operation, message } => {
                println!("   ! {operation} failed: {message}");
            }
            _ => {}
        }
    }

    // 4. Finish and record
    println!("4. Finishing the meeting...");
    let record = timekeeper.finish().await?;
    println!("   ✓ Recorded: {}", record.title);
    println!("   Planned: {} min", record.planned_duration);
    println!("   Actual: {} min", record.actual_duration);
    println!("   Efficiency: {}%\n", record.efficiency);

    // 5. KPIs
    println!("5. Overall KPIs...");
    let kpis = timekeeper.kpis().await;
    println!("   Meetings: {}", kpis.total_meetings);
    println!("   Average efficiency: {}%", kpis.avg_efficiency);
    println!("   Time saved: {} min", kpis.time_saved_minutes);
    println!("   On time: {}%\n", kpis.on_time_rate_percent);

    timekeeper.shutdown().await;

    println!("✅ Done!");

    Ok(())
}
