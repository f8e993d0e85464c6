//! Escalating cooldown state machine.
//!
//! Levels index into a caller-supplied ladder of durations in days, where a
//! zero rung is a permanent ban. Every trigger moves a login one rung up,
//! pinned to the last rung, and appends to its history. Levels never decay.

use chrono::{DateTime, TimeDelta, Utc};

use super::models::{Cooldown, CooldownHistoryEntry};

/// Ordered cooldown durations in days. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationLadder(Vec<u32>);

impl EscalationLadder {
    /// Ladder used when a request supplies none.
    pub const DEFAULT_DAYS: [u32; 3] = [3, 7, 21];

    /// Builds a ladder; returns `None` for an empty sequence.
    #[must_use]
    pub fn new(days: Vec<u32>) -> Option<Self> {
        if days.is_empty() {
            None
        } else {
            Some(Self(days))
        }
    }

    /// Index of the harshest rung.
    #[must_use]
    pub const fn last_level(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Clamps `level` onto the ladder.
    #[must_use]
    pub fn clamp(&self, level: usize) -> usize {
        level.min(self.last_level())
    }

    /// Cooldown length for `level`, or `None` for a permanent rung.
    #[must_use]
    pub fn duration(&self, level: usize) -> Option<TimeDelta> {
        let days = self.0.get(self.clamp(level)).copied().unwrap_or(0);
        if days == 0 {
            None
        } else {
            Some(TimeDelta::days(i64::from(days)))
        }
    }

    /// Level the next trigger lands on given any previous record.
    #[must_use]
    pub fn next_level(&self, previous: Option<&Cooldown>) -> usize {
        previous.map_or(0, |cooldown| {
            self.clamp(cooldown.current_level.saturating_add(1))
        })
    }
}

impl Default for EscalationLadder {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS.to_vec())
    }
}

impl Cooldown {
    /// True when the cooldown is permanent or ends after `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.cooldown_until.is_none_or(|until| until > now)
    }
}

/// Applies one trigger to the login's cooldown record.
///
/// A missing record starts at level 0. An existing record, expired or not,
/// moves one rung up.
#[must_use]
pub fn escalate(
    previous: Option<Cooldown>,
    login: &str,
    reason: &str,
    ladder: &EscalationLadder,
    now: DateTime<Utc>,
) -> Cooldown {
    let level = ladder.next_level(previous.as_ref());
    let mut cooldown = previous.unwrap_or_else(|| Cooldown {
        login: login.to_owned(),
        current_level: 0,
        cooldown_until: None,
        last_triggered_at: None,
        history: Vec::new(),
    });

    cooldown.current_level = level;
    // Only a zero rung is permanent; an unrepresentable end saturates.
    cooldown.cooldown_until = ladder
        .duration(level)
        .map(|length| now.checked_add_signed(length).unwrap_or(DateTime::<Utc>::MAX_UTC));
    cooldown.last_triggered_at = Some(now);
    cooldown.history.push(CooldownHistoryEntry {
        triggered_at: now,
        reason: reason.to_owned(),
        level,
    });
    cooldown
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use rstest::rstest;

    use super::{EscalationLadder, escalate};
    use crate::cooldown::Cooldown;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 8, 0, 0)
            .single()
            .expect("fixed timestamp should be valid")
    }

    fn ladder(days: &[u32]) -> EscalationLadder {
        EscalationLadder::new(days.to_vec()).expect("ladder should not be empty")
    }

    fn trigger_times(ladder: &EscalationLadder, count: usize) -> Option<Cooldown> {
        (0..count).fold(None, |previous, _| {
            Some(escalate(previous, "octocat", "closed PRs", ladder, now()))
        })
    }

    #[test]
    fn empty_ladder_is_rejected() {
        assert_eq!(EscalationLadder::new(Vec::new()), None);
    }

    #[rstest]
    #[case::first_trigger(1, 0)]
    #[case::second_trigger(2, 1)]
    #[case::third_trigger(3, 2)]
    #[case::fourth_trigger(4, 3)]
    #[case::beyond_the_ladder(7, 3)]
    fn levels_climb_one_rung_per_trigger(#[case] triggers: usize, #[case] expected_level: usize) {
        let permanent_tail = ladder(&[3, 7, 21, 0]);

        let cooldown =
            trigger_times(&permanent_tail, triggers).expect("at least one trigger applied");

        assert_eq!(cooldown.current_level, expected_level);
        assert_eq!(cooldown.history.len(), triggers);
    }

    #[test]
    fn permanent_rung_clears_end_time() {
        let permanent_tail = ladder(&[3, 7, 21, 0]);

        let cooldown = trigger_times(&permanent_tail, 4).expect("trigger applied");

        assert_eq!(cooldown.cooldown_until, None);
        assert!(cooldown.is_active(now() + TimeDelta::days(10_000)));
    }

    #[rstest]
    #[case::largest_rung(u32::MAX)]
    #[case::past_chrono_range(200_000_000)]
    fn oversized_rung_saturates_instead_of_becoming_permanent(#[case] days: u32) {
        let cooldown = escalate(None, "octocat", "closed PRs", &ladder(&[days]), now());

        assert_eq!(cooldown.cooldown_until, Some(DateTime::<Utc>::MAX_UTC));
        assert_eq!(cooldown.current_level, 0);
    }

    #[test]
    fn exhausted_ladder_stays_pinned_to_last_rung() {
        let short = ladder(&[3, 7, 21]);
        let at_top = Cooldown {
            login: "octocat".to_owned(),
            current_level: 2,
            cooldown_until: Some(now() - TimeDelta::days(1)),
            last_triggered_at: Some(now() - TimeDelta::days(22)),
            history: Vec::new(),
        };

        let cooldown = escalate(Some(at_top), "octocat", "again", &short, now());

        assert_eq!(cooldown.current_level, 2);
        assert_eq!(cooldown.cooldown_until, Some(now() + TimeDelta::days(21)));
    }

    #[test]
    fn expired_cooldown_still_escalates_from_previous_level() {
        let expired = Cooldown {
            login: "octocat".to_owned(),
            current_level: 0,
            cooldown_until: Some(now() - TimeDelta::days(30)),
            last_triggered_at: Some(now() - TimeDelta::days(33)),
            history: Vec::new(),
        };

        let cooldown = escalate(Some(expired), "octocat", "again", &ladder(&[3, 7]), now());

        assert_eq!(cooldown.current_level, 1);
        assert_eq!(cooldown.cooldown_until, Some(now() + TimeDelta::days(7)));
    }

    #[test]
    fn first_trigger_records_history_and_trigger_time() {
        let cooldown = escalate(None, "octocat", "2 closed PRs", &ladder(&[3]), now());

        assert_eq!(cooldown.login, "octocat");
        assert_eq!(cooldown.last_triggered_at, Some(now()));
        assert_eq!(cooldown.cooldown_until, Some(now() + TimeDelta::days(3)));
        let entry = cooldown.history.first().expect("history entry recorded");
        assert_eq!(entry.reason, "2 closed PRs");
        assert_eq!(entry.level, 0);
        assert_eq!(entry.triggered_at, now());
    }

    #[test]
    fn shorter_ladder_clamps_stored_level() {
        let high = Cooldown {
            login: "octocat".to_owned(),
            current_level: 5,
            cooldown_until: Some(now() - TimeDelta::days(1)),
            last_triggered_at: None,
            history: Vec::new(),
        };

        let cooldown = escalate(Some(high), "octocat", "again", &ladder(&[1, 2]), now());

        assert_eq!(cooldown.current_level, 1);
    }

    #[rstest]
    #[case::ends_in_future(Some(TimeDelta::hours(1)), true)]
    #[case::ended_in_past(Some(TimeDelta::hours(-1)), false)]
    #[case::ends_exactly_now(Some(TimeDelta::zero()), false)]
    #[case::permanent(None, true)]
    fn activity_of_existing_cooldowns(#[case] offset: Option<TimeDelta>, #[case] active: bool) {
        let cooldown = Cooldown {
            login: "octocat".to_owned(),
            current_level: 0,
            cooldown_until: offset.map(|delta| now() + delta),
            last_triggered_at: None,
            history: Vec::new(),
        };

        assert_eq!(cooldown.is_active(now()), active);
    }
}
