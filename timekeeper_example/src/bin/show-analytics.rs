use anyhow::Result;
use std::path::PathBuf;
use timekeeper::engine::compute_kpis;
use timekeeper::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let data_dir = PathBuf::from(
        std::env::var("TIMEKEEPER_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
    );
    let store = JsonFileStore::open(data_dir.join("timekeeper.json")).await?;

    println!("Timekeeper - Analytics");
    println!("======================\n");

    let analytics = store.load_analytics().await?;
    if analytics.completed_meetings.is_empty() {
        println!("No completed meetings yet.");
        return Ok(());
    }

    for record in &analytics.completed_meetings {
        println!(
            "{}  {:<30} planned {:>3} min  actual {:>3} min  {:>3}%",
            record.completed_at.format("%Y-%m-%d %H:%M"),
            record.title,
            record.planned_duration,
            record.actual_duration,
            record.efficiency,
        );
    }

    let kpis = compute_kpis(&analytics.completed_meetings);
    println!();
    println!("Meetings: {}", kpis.total_meetings);
    println!("Average efficiency: {}%", kpis.avg_efficiency);
    println!("Time saved: {} min", kpis.time_saved_minutes);
    println!("On time: {}%", kpis.on_time_rate_percent);
    println!("Total time: {} min", analytics.total_time);

    Ok(())
}
