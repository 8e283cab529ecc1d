use chrono::{DateTime, Utc};
use timekeeper_types::{AnalyticsLog, CompletionRecord, Kpis, Meeting};

/// `planned / actual` as a rounded percentage. Zero actual minutes count as 100.
pub fn efficiency(planned_minutes: u32, actual_minutes: u32) -> u32 {
    if actual_minutes == 0 {
        return 100;
    }
    (f64::from(planned_minutes) / f64::from(actual_minutes) * 100.0).round() as u32
}

/// Append the outcome of `meeting` to `log` and bump the total-time counter.
///
/// Removing the meeting from the active collection is the caller's job.
pub fn record_completion(
    log: &mut AnalyticsLog,
    meeting: &Meeting,
    actual_duration: u32,
    now: DateTime<Utc>,
) -> CompletionRecord {
    let planned_duration = meeting.total_duration;
    let record = CompletionRecord {
        meeting_id: meeting.id.clone(),
        title: meeting.title.clone(),
        planned_duration,
        actual_duration,
        efficiency: efficiency(planned_duration, actual_duration),
        completed_at: now,
        template_id: meeting.template_id.clone(),
    };

    log.completed_meetings.push(record.clone());
    log.total_time += u64::from(actual_duration);

    tracing::info!(
        meeting_id = %record.meeting_id,
        planned = planned_duration,
        actual = actual_duration,
        efficiency = record.efficiency,
        "Meeting completed"
    );

    record
}

/// Summary figures over the whole completion log
pub fn compute_kpis(records: &[CompletionRecord]) -> Kpis {
    if records.is_empty() {
        return Kpis::default();
    }

    let total_meetings = records.len();
    let efficiency_sum: u64 = records.iter().map(|r| u64::from(r.efficiency)).sum();
    let time_saved_minutes = records
        .iter()
        .map(|r| u64::from(r.planned_duration.saturating_sub(r.actual_duration)))
        .sum();
    let on_time = records.iter().filter(|r| r.on_time()).count();

    Kpis {
        total_meetings,
        avg_efficiency: (efficiency_sum as f64 / total_meetings as f64).round() as u32,
        time_saved_minutes,
        on_time_rate_percent: (on_time as f64 * 100.0 / total_meetings as f64).round() as u32,
    }
}
