use chrono::{DateTime, Utc};
use timekeeper_types::config::DEFAULT_WARNING_THRESHOLDS;
use timekeeper_types::{
    CompletionReason, Meeting, MeetingStatus, PendingCompletion, TimekeeperEvent, TimerPhase,
    TimerSession, TimerSnapshot,
};

use crate::error::{EngineError, Result};

/// Session handed back by [`TimerEngine::finish`], ready for analytics
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedSession {
    pub meeting: Meeting,
    pub pending: PendingCompletion,
}

/// Countdown state machine for the single active meeting.
///
/// `Idle -> Running <-> Paused -> Completed | Stopped -> Idle`, with snooze
/// taking Completed/Stopped back to Running. The engine does not own a clock;
/// something else calls [`tick`](Self::tick) once per second while it runs.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    phase: TimerPhase,
    session: Option<TimerSession>,
    meeting: Option<Meeting>,
    pending: Option<PendingCompletion>,
    snoozed: bool,
    warning_thresholds: Vec<u64>,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_WARNING_THRESHOLDS.to_vec())
    }
}

impl TimerEngine {
    pub fn new(warning_thresholds: Vec<u64>) -> Self {
        Self {
            phase: TimerPhase::Idle,
            session: None,
            meeting: None,
            pending: None,
            snoozed: false,
            warning_thresholds,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&TimerSession> {
        self.session.as_ref()
    }

    pub fn meeting(&self) -> Option<&Meeting> {
        self.meeting.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingCompletion> {
        self.pending.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            session: self.session.clone(),
            meeting: self.meeting.clone(),
            pending: self.pending,
        }
    }

    /// Open a session for `meeting` and start counting down.
    ///
    /// The meeting is marked active with `actual_start_time = now`.
    pub fn start(&mut self, mut meeting: Meeting, now: DateTime<Utc>) -> Result<TimekeeperEvent> {
        if self.phase != TimerPhase::Idle {
            let current = self
                .meeting
                .as_ref()
                .map(|m| m.id.clone())
                .unwrap_or_default();
            return Err(EngineError::SessionAlreadyActive(current));
        }

        let total_duration_seconds = u64::from(meeting.total_duration) * 60;
        meeting.status = MeetingStatus::Active;
        meeting.actual_start_time = Some(now);

        let event = TimekeeperEvent::TimerStarted {
            meeting_id: meeting.id.clone(),
            total_duration_seconds,
        };

        self.session = Some(TimerSession {
            meeting_id: meeting.id.clone(),
            total_duration_seconds,
            remaining_seconds: total_duration_seconds,
            running: true,
        });
        self.meeting = Some(meeting);
        self.pending = None;
        self.snoozed = false;
        self.phase = TimerPhase::Running;

        Ok(event)
    }

    /// Advance the countdown by one second.
    ///
    /// Does nothing unless Running. Returns the warning raised when remaining
    /// time lands exactly on a threshold, or the completion when it reaches zero.
    pub fn tick(&mut self) -> Option<TimekeeperEvent> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        let session = self.session.as_mut()?;

        session.remaining_seconds = session.remaining_seconds.saturating_sub(1);
        let remaining = session.remaining_seconds;

        if remaining == 0 {
            session.running = false;
            let planned = minutes_ceil(session.total_duration_seconds);
            let pending = PendingCompletion {
                reason: CompletionReason::Expired,
                planned_duration: planned,
                actual_duration: planned,
            };
            let meeting_id = session.meeting_id.clone();

            self.pending = Some(pending);
            self.phase = TimerPhase::Completed;
            tracing::info!(meeting_id = %meeting_id, "Meeting time is up");
            return Some(TimekeeperEvent::TimerCompleted {
                meeting_id,
                pending,
            });
        }

        if self.warning_thresholds.contains(&remaining) {
            return Some(TimekeeperEvent::TimerWarning {
                meeting_id: session.meeting_id.clone(),
                threshold_seconds: remaining,
            });
        }

        None
    }

    /// Running -> Paused. Pausing a paused timer is a no-op.
    pub fn pause(&mut self) -> Result<Option<TimekeeperEvent>> {
        match self.phase {
            TimerPhase::Paused => Ok(None),
            TimerPhase::Running => {
                let session = self.session_mut()?;
                session.running = false;
                let event = TimekeeperEvent::TimerPaused {
                    meeting_id: session.meeting_id.clone(),
                    remaining_seconds: session.remaining_seconds,
                };
                self.phase = TimerPhase::Paused;
                Ok(Some(event))
            }
            phase => Err(self.invalid("pause", phase)),
        }
    }

    /// Paused -> Running. Resuming a running timer is a no-op.
    pub fn resume(&mut self) -> Result<Option<TimekeeperEvent>> {
        match self.phase {
            TimerPhase::Running => Ok(None),
            TimerPhase::Paused => {
                let session = self.session_mut()?;
                session.running = true;
                let event = TimekeeperEvent::TimerResumed {
                    meeting_id: session.meeting_id.clone(),
                    remaining_seconds: session.remaining_seconds,
                };
                self.phase = TimerPhase::Running;
                Ok(Some(event))
            }
            phase => Err(self.invalid("resume", phase)),
        }
    }

    /// Running or Paused -> Stopped, computing the pending completion
    pub fn stop(&mut self) -> Result<TimekeeperEvent> {
        match self.phase {
            TimerPhase::Running | TimerPhase::Paused => {
                let pending = self.halt()?;
                let meeting_id = self.session_mut()?.meeting_id.clone();
                self.pending = Some(pending);
                self.phase = TimerPhase::Stopped;
                Ok(TimekeeperEvent::TimerStopped {
                    meeting_id,
                    pending,
                })
            }
            phase => Err(self.invalid("stop", phase)),
        }
    }

    /// Add `extra_seconds` to a session awaiting its completion decision and
    /// run it again. Grows the planned duration of the meeting too.
    pub fn snooze(&mut self, extra_seconds: u64) -> Result<TimekeeperEvent> {
        if !self.phase.awaiting_decision() {
            return Err(self.invalid("snooze", self.phase));
        }

        let session = self.session_mut()?;
        session.remaining_seconds += extra_seconds;
        session.total_duration_seconds += extra_seconds;
        session.running = true;

        let total_duration_seconds = session.total_duration_seconds;
        let event = TimekeeperEvent::TimerSnoozed {
            meeting_id: session.meeting_id.clone(),
            extra_seconds,
            total_duration_seconds,
        };

        if let Some(meeting) = self.meeting.as_mut() {
            meeting.total_duration = minutes_ceil(total_duration_seconds);
        }
        self.pending = None;
        self.snoozed = true;
        self.phase = TimerPhase::Running;

        Ok(event)
    }

    /// Close the session and hand back the meeting with its final durations.
    ///
    /// Accepted while a decision is pending, or while a snoozed session is
    /// still running (it is stopped first). Leaves the engine Idle.
    pub fn finish(&mut self) -> Result<FinishedSession> {
        let pending = match (self.phase, self.pending) {
            (phase, Some(pending)) if phase.awaiting_decision() => pending,
            (TimerPhase::Running | TimerPhase::Paused, _) if self.snoozed => self.halt()?,
            (phase, _) => return Err(self.invalid("finish", phase)),
        };

        let meeting = self.meeting.take().ok_or(EngineError::NoActiveSession)?;
        self.reset();

        Ok(FinishedSession { meeting, pending })
    }

    /// Drop any session without recording it
    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.session = None;
        self.meeting = None;
        self.pending = None;
        self.snoozed = false;
    }

    /// Stop the countdown and compute durations from elapsed time
    fn halt(&mut self) -> Result<PendingCompletion> {
        let session = self.session_mut()?;
        session.running = false;

        Ok(PendingCompletion {
            reason: CompletionReason::Stopped,
            planned_duration: minutes_ceil(session.total_duration_seconds),
            actual_duration: minutes_ceil(session.elapsed_seconds()),
        })
    }

    fn session_mut(&mut self) -> Result<&mut TimerSession> {
        self.session.as_mut().ok_or(EngineError::NoActiveSession)
    }

    fn invalid(&self, action: &'static str, phase: TimerPhase) -> EngineError {
        if phase == TimerPhase::Idle {
            EngineError::NoActiveSession
        } else {
            EngineError::InvalidTransition { action, phase }
        }
    }
}

fn minutes_ceil(seconds: u64) -> u32 {
    u32::try_from(seconds.div_ceil(60)).unwrap_or(u32::MAX)
}
