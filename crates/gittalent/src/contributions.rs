//! Synthetic contribution calendar.
//!
//! This is *not* contribution history. GitHub's REST API does not expose the
//! contribution graph, so the calendar is generated from a pseudo-random
//! sequence seeded by the handle and nudged towards days near repository
//! activity. It exists for display only.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::github::GitHubRepo;

/// Number of days in a calendar.
pub const CALENDAR_DAYS: usize = 365;

/// Highest activity level.
pub const MAX_LEVEL: u8 = 4;

const BASE_PROBABILITY: f64 = 0.35;
const WEEKEND_FACTOR: f64 = 0.5;
const ACTIVITY_BOOST: f64 = 0.4;
const MAX_PROBABILITY: f64 = 0.95;

/// Days either side of a repository timestamp that count as "near activity".
pub const ACTIVITY_WINDOW_DAYS: i64 = 3;

/// Inclusive count ranges per level, lowest level first.
const LEVEL_RANGES: [(u32, u32); 4] = [(1, 3), (4, 6), (7, 9), (10, 15)];

/// Cumulative thresholds for picking a level once a day is active.
const LEVEL_THRESHOLDS: [f64; 3] = [0.4, 0.7, 0.9];

/// One day of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
    pub level: u8,
}

/// Linear congruential generator (`seed * 9301 + 49297 mod 233280`).
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    const MULTIPLIER: u64 = 9301;
    const INCREMENT: u64 = 49297;
    const MODULUS: u64 = 233_280;

    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % Self::MODULUS,
        }
    }

    /// Seed from the sum of the handle's character codes.
    pub fn for_handle(handle: &str) -> Self {
        Self::new(handle.chars().map(|c| u64::from(u32::from(c))).sum())
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * Self::MULTIPLIER + Self::INCREMENT) % Self::MODULUS;
        self.state as f64 / Self::MODULUS as f64
    }
}

/// Level for a count. Monotonic: a higher count never maps to a lower level.
#[must_use]
pub fn level_for_count(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=3 => 1,
        4..=6 => 2,
        7..=9 => 3,
        _ => MAX_LEVEL,
    }
}

/// Generate [`CALENDAR_DAYS`] entries ending on `today`, oldest first.
///
/// The same `handle`, repository timestamps and `today` always produce the
/// same calendar.
pub fn synthesize(handle: &str, repos: &[GitHubRepo], today: NaiveDate) -> Vec<ContributionDay> {
    let activity: Vec<NaiveDate> = repos
        .iter()
        .flat_map(GitHubRepo::activity_dates)
        .map(|ts: DateTime<Utc>| ts.date_naive())
        .collect();

    let mut rng = SeededRng::for_handle(handle);
    let start = today - Duration::days(CALENDAR_DAYS as i64 - 1);

    (0..CALENDAR_DAYS as i64)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let probability = day_probability(date, &activity);
            let count = draw_count(&mut rng, probability);
            ContributionDay {
                date,
                count,
                level: level_for_count(count),
            }
        })
        .collect()
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn near_activity(date: NaiveDate, activity: &[NaiveDate]) -> bool {
    activity
        .iter()
        .any(|active| (date - *active).num_days().abs() <= ACTIVITY_WINDOW_DAYS)
}

fn day_probability(date: NaiveDate, activity: &[NaiveDate]) -> f64 {
    let mut probability = BASE_PROBABILITY;
    if is_weekend(date) {
        probability *= WEEKEND_FACTOR;
    }
    if near_activity(date, activity) {
        probability += ACTIVITY_BOOST;
    }
    probability.min(MAX_PROBABILITY)
}

fn draw_count(rng: &mut SeededRng, probability: f64) -> u32 {
    if rng.next_f64() >= probability {
        return 0;
    }

    let bucket = rng.next_f64();
    let level_index = LEVEL_THRESHOLDS
        .iter()
        .position(|threshold| bucket < *threshold)
        .unwrap_or(LEVEL_THRESHOLDS.len());
    let (min, max) = LEVEL_RANGES[level_index];

    let span = f64::from(max - min + 1);
    let offset = (rng.next_f64() * span).floor() as u32;
    (min + offset).min(max)
}

/// Why a calendar failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarDefect {
    WrongLength(usize),
    LevelOutOfRange { date: NaiveDate, level: u8 },
    LevelCountMismatch { date: NaiveDate, count: u32, level: u8 },
    OutOfOrder { date: NaiveDate },
}

/// Check the length and level invariants of a calendar from elsewhere.
pub fn validate_calendar(days: &[ContributionDay]) -> Result<(), CalendarDefect> {
    if days.len() != CALENDAR_DAYS {
        return Err(CalendarDefect::WrongLength(days.len()));
    }
    for day in days {
        if day.level > MAX_LEVEL {
            return Err(CalendarDefect::LevelOutOfRange {
                date: day.date,
                level: day.level,
            });
        }
        if (day.count == 0) != (day.level == 0) {
            return Err(CalendarDefect::LevelCountMismatch {
                date: day.date,
                count: day.count,
                level: day.level,
            });
        }
    }
    if let Some(pair) = days.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(CalendarDefect::OutOfOrder { date: pair[1].date });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date")
    }

    fn repo_updated(on: NaiveDate) -> GitHubRepo {
        let ts = Utc.from_utc_datetime(&on.and_hms_opt(12, 0, 0).expect("valid time"));
        GitHubRepo {
            id: 1,
            name: "active".to_string(),
            full_name: "dev/active".to_string(),
            html_url: String::new(),
            description: None,
            stargazers_count: 0,
            language: None,
            fork: false,
            archived: false,
            private: false,
            created_at: None,
            updated_at: Some(ts),
            pushed_at: None,
        }
    }

    #[test]
    fn same_inputs_produce_identical_calendars() {
        let repos = vec![repo_updated(today() - Duration::days(30))];
        let first = synthesize("octocat", &repos, today());
        let second = synthesize("octocat", &repos, today());
        assert_eq!(first, second);
    }

    #[test]
    fn different_handles_produce_different_calendars() {
        let a = synthesize("octocat", &[], today());
        let b = synthesize("torvalds", &[], today());
        assert_ne!(a, b);
    }

    #[test]
    fn calendar_spans_trailing_year_ending_today() {
        let days = synthesize("octocat", &[], today());
        assert_eq!(days.len(), CALENDAR_DAYS);
        assert_eq!(days.last().map(|d| d.date), Some(today()));
        assert_eq!(
            days.first().map(|d| d.date),
            Some(today() - Duration::days(364))
        );
        assert_eq!(validate_calendar(&days), Ok(()));
    }

    #[test]
    fn levels_stay_in_range_and_track_counts() {
        for handle in ["a", "octocat", "someone-with-a-long-handle", "Ünïcødé"] {
            for day in synthesize(handle, &[], today()) {
                assert!(day.level <= MAX_LEVEL);
                assert_eq!(day.count == 0, day.level == 0, "{handle} {day:?}");
                assert_eq!(level_for_count(day.count), day.level);
            }
        }
    }

    #[test]
    fn level_for_count_is_monotonic() {
        let levels: Vec<u8> = (0..=20).map(level_for_count).collect();
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(level_for_count(0), 0);
        assert_eq!(level_for_count(3), 1);
        assert_eq!(level_for_count(4), 2);
        assert_eq!(level_for_count(10), 4);
    }

    #[test]
    fn weekends_are_dampened() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).expect("valid date");
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date");
        let weekday_p = day_probability(monday, &[]);
        let weekend_p = day_probability(saturday, &[]);
        assert!((weekday_p - BASE_PROBABILITY).abs() < f64::EPSILON);
        assert!((weekend_p - BASE_PROBABILITY * WEEKEND_FACTOR).abs() < f64::EPSILON);
    }

    #[test]
    fn repository_activity_boosts_nearby_days_only() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).expect("valid date");
        let activity = [monday + Duration::days(ACTIVITY_WINDOW_DAYS)];
        let boosted = day_probability(monday, &activity);
        assert!((boosted - (BASE_PROBABILITY + ACTIVITY_BOOST)).abs() < f64::EPSILON);

        let far = day_probability(monday - Duration::days(ACTIVITY_WINDOW_DAYS + 1), &activity);
        assert!(far < boosted);
    }

    #[test]
    fn activity_increases_active_days() {
        let quiet = synthesize("octocat", &[], today());
        let repos: Vec<_> = (0..52)
            .map(|week| repo_updated(today() - Duration::days(week * 7)))
            .collect();
        let busy = synthesize("octocat", &repos, today());

        let active = |days: &[ContributionDay]| days.iter().filter(|d| d.count > 0).count();
        assert!(active(&busy) > active(&quiet));
    }

    #[test]
    fn rng_matches_reference_sequence() {
        let mut rng = SeededRng::new(0);
        assert!((rng.next_f64() - 49_297.0 / 233_280.0).abs() < 1e-12);
        let mut a = SeededRng::for_handle("ab");
        let mut b = SeededRng::new(u64::from(b'a') + u64::from(b'b'));
        assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
    }

    #[test]
    fn validate_rejects_short_calendar() {
        let days = synthesize("octocat", &[], today());
        assert_eq!(
            validate_calendar(&days[..10]),
            Err(CalendarDefect::WrongLength(10))
        );
    }

    #[test]
    fn validate_rejects_level_count_mismatch() {
        let mut days = synthesize("octocat", &[], today());
        days[0].count = 0;
        days[0].level = 2;
        assert!(matches!(
            validate_calendar(&days),
            Err(CalendarDefect::LevelCountMismatch { .. })
        ));
    }
}
