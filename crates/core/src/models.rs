//! Shared data models for the jam tracker.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A game jam scraped from the itch.io calendar.
///
/// The scraped fields never change after parsing. The only mutable state is
/// the `selected` flag and the cached remaining-time pair, which are refreshed
/// from the clock when a fetch lands or when the jam becomes selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameJam {
    /// itch.io jam identifier.
    pub id: i64,
    /// Jam title as shown on the calendar.
    pub title: String,
    /// Absolute link to the jam page.
    pub url: String,
    /// Start of the submission window.
    pub start_date: DateTime<Utc>,
    /// End of the submission window.
    pub end_date: DateTime<Utc>,
    /// End of the voting period, for jams that have one.
    pub voting_end_date: Option<DateTime<Utc>>,
    /// Participant count at fetch time.
    pub joined_count: u32,
    /// Whether itch.io features the jam on the calendar.
    pub highlighted: bool,
    #[serde(skip)]
    pub(crate) selected: bool,
    #[serde(skip, default = "TimeDelta::zero")]
    pub(crate) cached_remaining: TimeDelta,
    #[serde(skip, default = "TimeDelta::zero")]
    pub(crate) cached_voting_remaining: TimeDelta,
}

impl GameJam {
    /// True while the submission window is open, boundaries included.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_date && now <= self.end_date
    }

    /// True between the end of submissions and the end of voting.
    pub fn is_voting_at(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date && self.voting_end_date.map(|end| now <= end).unwrap_or(false)
    }

    /// Classify the jam at `now`.
    ///
    /// Exactly one status applies for well-formed date windows; a jam whose
    /// start lies after its end is reported as `Ended` once `now` passes the
    /// end date.
    pub fn status_at(&self, now: DateTime<Utc>) -> JamStatus {
        if self.is_active_at(now) {
            JamStatus::Active
        } else if self.is_voting_at(now) {
            JamStatus::Voting
        } else if now < self.start_date {
            JamStatus::Upcoming
        } else {
            JamStatus::Ended
        }
    }

    /// Fraction of the submission window elapsed at `now`, clamped to [0, 1].
    ///
    /// A zero or negative window reports 1.0 once `now` reaches the start
    /// date, so the value is always finite.
    pub fn progress_at(&self, now: DateTime<Utc>) -> f64 {
        let total = (self.end_date - self.start_date).num_seconds();
        if total <= 0 {
            return if now >= self.start_date { 1.0 } else { 0.0 };
        }
        let elapsed = (now - self.start_date).num_seconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Whether this jam is the current selection.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Mark the jam selected and refresh its cached remaining times.
    pub fn mark_selected(&mut self, now: DateTime<Utc>) {
        self.selected = true;
        self.refresh_cached_times(now);
    }

    /// Clear the selected flag.
    pub fn clear_selected(&mut self) {
        self.selected = false;
    }

    /// Recompute the cached remaining-time pair against `now`.
    pub fn refresh_cached_times(&mut self, now: DateTime<Utc>) {
        self.cached_remaining = self.end_date - now;
        self.cached_voting_remaining = self
            .voting_end_date
            .map(|end| end - now)
            .unwrap_or_else(TimeDelta::zero);
    }

    /// Time left until the submission window closes.
    ///
    /// Selected jams answer live against `now`; unselected jams answer from
    /// the cache so a page full of rows does not recompute every frame.
    pub fn time_remaining_at(&self, now: DateTime<Utc>) -> TimeDelta {
        if self.selected {
            self.end_date - now
        } else {
            self.cached_remaining
        }
    }

    /// Time left until voting closes, zero when the jam has no voting period.
    pub fn voting_time_remaining_at(&self, now: DateTime<Utc>) -> TimeDelta {
        if self.selected {
            self.voting_end_date
                .map(|end| end - now)
                .unwrap_or_else(TimeDelta::zero)
        } else {
            self.cached_voting_remaining
        }
    }

    /// Time left until the submission window opens.
    pub fn time_until_start(&self, now: DateTime<Utc>) -> TimeDelta {
        self.start_date - now
    }
}

/// Lifecycle phase of a jam at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JamStatus {
    /// Submission window is open.
    Active,
    /// Submissions closed, voting still open.
    Voting,
    /// Submission window has not opened yet.
    Upcoming,
    /// Submissions and voting are over.
    Ended,
}

impl fmt::Display for JamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JamStatus::Active => "Active",
            JamStatus::Voting => "Voting",
            JamStatus::Upcoming => "Upcoming",
            JamStatus::Ended => "Ended",
        };
        f.write_str(name)
    }
}

/// Category filter applied to the jam list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JamCategory {
    /// No category restriction.
    #[default]
    All,
    /// Only jams whose submission window is open.
    Active,
    /// Only jams in their voting period.
    Voting,
    /// Only jams that have not started yet.
    Upcoming,
    /// Only jams that are completely over.
    Ended,
}

impl JamCategory {
    /// Every category, in the order the UI presents them.
    pub const VALUES: [JamCategory; 5] = [
        JamCategory::All,
        JamCategory::Active,
        JamCategory::Voting,
        JamCategory::Upcoming,
        JamCategory::Ended,
    ];

    /// Human-readable tab label.
    pub fn label(&self) -> &'static str {
        match self {
            JamCategory::All => "All",
            JamCategory::Active => "Active",
            JamCategory::Voting => "Voting",
            JamCategory::Upcoming => "Upcoming",
            JamCategory::Ended => "Ended",
        }
    }

    /// Whether `jam` belongs to this category at `now`.
    pub fn matches(&self, jam: &GameJam, now: DateTime<Utc>) -> bool {
        match self {
            JamCategory::All => true,
            JamCategory::Active => jam.is_active_at(now),
            JamCategory::Voting => jam.is_voting_at(now),
            JamCategory::Upcoming => now < jam.start_date,
            JamCategory::Ended => now > jam.end_date && !jam.is_voting_at(now),
        }
    }
}

/// Render a duration as a short human-readable countdown.
///
/// Negative durations render as `0m 0s`.
pub fn format_delta(delta: TimeDelta) -> String {
    let total_secs = delta.num_seconds().max(0);
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    if total_secs > 86_400 {
        let days = total_secs / 86_400;
        let hours = (total_secs % 86_400) / 3_600;
        format!("{days}d {hours}h {minutes}m")
    } else if total_secs > 3_600 {
        let hours = total_secs / 3_600;
        format!("{hours}h {minutes}m {seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn moment(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn jam_with_voting() -> GameJam {
        GameJam {
            id: 1,
            title: "Summer Jam".to_string(),
            url: "https://itch.io/jam/summer-jam".to_string(),
            start_date: moment(1, 0),
            end_date: moment(8, 0),
            voting_end_date: Some(moment(15, 0)),
            joined_count: 120,
            highlighted: false,
            selected: false,
            cached_remaining: TimeDelta::zero(),
            cached_voting_remaining: TimeDelta::zero(),
        }
    }

    #[test]
    fn status_follows_the_date_windows() {
        let jam = jam_with_voting();
        assert_eq!(jam.status_at(moment(1, 0) - TimeDelta::seconds(1)), JamStatus::Upcoming);
        assert_eq!(jam.status_at(moment(1, 0)), JamStatus::Active);
        assert_eq!(jam.status_at(moment(4, 12)), JamStatus::Active);
        assert_eq!(jam.status_at(moment(8, 0)), JamStatus::Active);
        assert_eq!(jam.status_at(moment(8, 0) + TimeDelta::seconds(1)), JamStatus::Voting);
        assert_eq!(jam.status_at(moment(12, 0)), JamStatus::Voting);
        assert_eq!(jam.status_at(moment(15, 0)), JamStatus::Voting);
        assert_eq!(jam.status_at(moment(15, 0) + TimeDelta::seconds(1)), JamStatus::Ended);
    }

    #[test]
    fn jam_without_voting_window_ends_immediately() {
        let mut jam = jam_with_voting();
        jam.voting_end_date = None;
        assert_eq!(jam.status_at(moment(8, 0)), JamStatus::Active);
        assert_eq!(jam.status_at(moment(8, 0) + TimeDelta::seconds(1)), JamStatus::Ended);
    }

    #[test]
    fn progress_is_clamped() {
        let jam = jam_with_voting();
        assert_eq!(jam.progress_at(moment(1, 0) - TimeDelta::days(1)), 0.0);
        let halfway = jam.progress_at(moment(4, 12));
        assert!((halfway - 0.5).abs() < 1e-9);
        assert_eq!(jam.progress_at(moment(20, 0)), 1.0);
    }

    #[test]
    fn degenerate_window_never_yields_nan() {
        let mut jam = jam_with_voting();
        jam.end_date = jam.start_date;
        assert_eq!(jam.progress_at(moment(1, 0) - TimeDelta::seconds(1)), 0.0);
        assert_eq!(jam.progress_at(moment(1, 0)), 1.0);
        assert_eq!(jam.progress_at(moment(2, 0)), 1.0);
    }

    #[test]
    fn unselected_jams_answer_from_the_cache() {
        let mut jam = jam_with_voting();
        let fetched_at = moment(2, 0);
        jam.refresh_cached_times(fetched_at);
        let later = moment(3, 0);
        assert_eq!(jam.time_remaining_at(later), jam.end_date - fetched_at);
        assert_eq!(jam.voting_time_remaining_at(later), moment(15, 0) - fetched_at);
    }

    #[test]
    fn selected_jams_answer_live() {
        let mut jam = jam_with_voting();
        jam.refresh_cached_times(moment(2, 0));
        jam.mark_selected(moment(3, 0));
        let now = moment(4, 0);
        assert_eq!(jam.time_remaining_at(now), jam.end_date - now);
        assert_eq!(jam.voting_time_remaining_at(now), moment(15, 0) - now);
        jam.clear_selected();
        assert_eq!(jam.time_remaining_at(now), jam.end_date - moment(3, 0));
    }

    #[test]
    fn selected_jam_without_voting_reports_zero() {
        let mut jam = jam_with_voting();
        jam.voting_end_date = None;
        jam.mark_selected(moment(2, 0));
        assert_eq!(jam.voting_time_remaining_at(moment(3, 0)), TimeDelta::zero());
    }

    #[test]
    fn category_matches_agree_with_status() {
        let jam = jam_with_voting();
        let now = moment(4, 0);
        assert!(JamCategory::All.matches(&jam, now));
        assert!(JamCategory::Active.matches(&jam, now));
        assert!(!JamCategory::Voting.matches(&jam, now));
        let voting_now = moment(10, 0);
        assert!(JamCategory::Voting.matches(&jam, voting_now));
        assert!(!JamCategory::Ended.matches(&jam, voting_now));
        let ended_now = moment(20, 0);
        assert!(JamCategory::Ended.matches(&jam, ended_now));
    }

    #[test]
    fn format_delta_picks_the_right_precision() {
        let long = TimeDelta::days(2) + TimeDelta::hours(3) + TimeDelta::minutes(4);
        assert_eq!(format_delta(long), "2d 3h 4m");
        let medium = TimeDelta::hours(5) + TimeDelta::minutes(6) + TimeDelta::seconds(7);
        assert_eq!(format_delta(medium), "5h 6m 7s");
        let short = TimeDelta::minutes(9) + TimeDelta::seconds(8);
        assert_eq!(format_delta(short), "9m 8s");
        assert_eq!(format_delta(TimeDelta::hours(24)), "24h 0m 0s");
        assert_eq!(format_delta(TimeDelta::seconds(-30)), "0m 0s");
    }
}
