//! Wall-clock time accounting for sessions.
//!
//! Pure functions over a session's timestamps and pause intervals; no I/O
//! and no ticking timers. All quantities are whole seconds; negative
//! intermediates (clock skew between timestamps recorded on the same server
//! clock) clamp to zero instead of propagating.

use chrono::{DateTime, Utc};

use crate::domain::models::Session;

/// Total paused seconds: closed pauses plus any ongoing pause counted up to
/// `now`.
pub fn paused_seconds(session: &Session, now: DateTime<Utc>) -> i64 {
    let closed: i64 = session.pauses.iter().map(|p| p.duration_seconds()).sum();

    let ongoing = session
        .ongoing_pause()
        .map_or(0, |p| (now - p.paused_at).num_seconds().max(0));

    closed + ongoing
}

/// Focused seconds excluding pauses. Uses `ended_at` when set, `now`
/// otherwise.
pub fn elapsed_seconds(session: &Session, now: DateTime<Utc>) -> i64 {
    let end_time = session.ended_at.unwrap_or(now);
    let total = (end_time - session.started_at).num_seconds();
    (total - paused_seconds(session, now)).max(0)
}

/// Seconds left of the planned duration.
pub fn remaining_seconds(session: &Session, now: DateTime<Utc>) -> i64 {
    (session.total_duration_seconds() - elapsed_seconds(session, now)).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Pause;
    use chrono::Duration;
    use uuid::Uuid;

    fn focus_started_at(started_at: DateTime<Utc>, minutes: u32) -> Session {
        let mut session = Session::new_focus(Uuid::new_v4(), Uuid::new_v4(), minutes);
        session.started_at = started_at;
        session
    }

    #[test]
    fn test_elapsed_without_pauses() {
        let t0 = Utc::now();
        let session = focus_started_at(t0, 25);

        assert_eq!(elapsed_seconds(&session, t0), 0);
        assert_eq!(elapsed_seconds(&session, t0 + Duration::seconds(90)), 90);
        assert_eq!(remaining_seconds(&session, t0 + Duration::seconds(90)), 1410);
    }

    #[test]
    fn test_pause_resume_scenario() {
        // focus_minutes=25, start at T0, pause at T0+60, resume at T0+180,
        // complete at T0+300 -> paused=120, actual=180
        let t0 = Utc::now();
        let mut session = focus_started_at(t0, 25);

        let mut pause = Pause::new(session.id, t0 + Duration::seconds(60));
        pause.resumed_at = Some(t0 + Duration::seconds(180));
        session.pauses.push(pause);

        let t_complete = t0 + Duration::seconds(300);
        assert_eq!(paused_seconds(&session, t_complete), 120);
        assert_eq!(elapsed_seconds(&session, t_complete), 180);

        session.ended_at = Some(t_complete);
        assert_eq!(elapsed_seconds(&session, t_complete), 180);
        assert_eq!(remaining_seconds(&session, t_complete), 1500 - 180);
    }

    #[test]
    fn test_ongoing_pause_counts_up_to_now() {
        let t0 = Utc::now();
        let mut session = focus_started_at(t0, 25);
        session.pauses.push(Pause::new(session.id, t0 + Duration::seconds(100)));

        let now = t0 + Duration::seconds(160);
        assert_eq!(paused_seconds(&session, now), 60);
        assert_eq!(elapsed_seconds(&session, now), 100);
    }

    #[test]
    fn test_elapsed_is_monotonic_while_running() {
        let t0 = Utc::now();
        let mut session = focus_started_at(t0, 25);
        session.pauses.push(Pause::new(session.id, t0 + Duration::seconds(30)));

        let mut last = -1;
        for offset in 0..120 {
            let e = elapsed_seconds(&session, t0 + Duration::seconds(offset));
            assert!(e >= last);
            assert!(e >= 0);
            last = e;
        }
    }

    #[test]
    fn test_clock_skew_clamps_to_zero() {
        let t0 = Utc::now();
        let session = focus_started_at(t0 + Duration::seconds(10), 25);

        // now is before started_at
        assert_eq!(elapsed_seconds(&session, t0), 0);
        assert_eq!(remaining_seconds(&session, t0), 1500);
    }

    #[test]
    fn test_remaining_never_negative() {
        let t0 = Utc::now();
        let session = focus_started_at(t0, 1);
        assert_eq!(remaining_seconds(&session, t0 + Duration::seconds(3600)), 0);
    }
}
