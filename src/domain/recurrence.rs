/// Recurrence rules and their evaluation
///
/// This module defines the recurrence rule model (how often a habit repeats,
/// and when it stops) and the evaluator that decides whether a habit is
/// scheduled on a given calendar date. Evaluation is a pure function of the
/// rule, the habit's creation date and the completion history - it never
/// touches storage or the clock.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// When a recurrence stops generating active dates
///
/// `After` depends on the completion history, not the calendar: the habit
/// stops being scheduled once `count` completions have accumulated. The
/// cutoff is strictly-less-than, so the day the user logs the final
/// completion is still scheduled at the moment they log it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndRule {
    /// The recurrence never ends
    Never,
    /// Active through the given date (inclusive)
    On { date: NaiveDate },
    /// Stops once this many completions have been recorded
    After { count: u32 },
}

impl EndRule {
    /// Check whether the end rule still allows activity on `date`
    ///
    /// `history` holds the completion dates recorded for this habit and is
    /// only consulted by `After`. An empty history always passes: with no
    /// completions recorded the cutoff cannot have been reached, which is
    /// also the conservative answer when the caller has no history at hand.
    pub fn allows(&self, date: NaiveDate, history: &[NaiveDate]) -> bool {
        match self {
            EndRule::Never => true,
            EndRule::On { date: end } => date <= *end,
            EndRule::After { count } => {
                let completed = history.iter().filter(|d| **d <= date).count();
                (completed as u64) < (*count as u64)
            }
        }
    }
}

/// Monthly scheduling pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonthlyPattern {
    /// A fixed day of the month (1-31)
    ///
    /// Months without that day simply never match - day 31 is not clamped
    /// to Feb 28/29.
    #[serde(rename = "day")]
    DayOfMonth { day: u32 },
    /// The Nth occurrence of a weekday; occurrence -1 means the last one
    #[serde(rename = "weekday")]
    NthWeekday { weekday: Weekday, occurrence: i32 },
}

impl MonthlyPattern {
    /// Does `date` match this pattern within its own month?
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            MonthlyPattern::DayOfMonth { day } => date.day() == *day,
            MonthlyPattern::NthWeekday { weekday, occurrence } => {
                if date.weekday() != *weekday {
                    return false;
                }
                if *occurrence == -1 {
                    // Last occurrence: one more week lands in the next month
                    match date.checked_add_signed(Duration::days(7)) {
                        Some(next_week) => next_week.month() != date.month(),
                        None => false,
                    }
                } else {
                    ((date.day() + 6) / 7) as i32 == *occurrence
                }
            }
        }
    }
}

/// How often a habit repeats, measured from the habit's creation date
///
/// `Custom` is arithmetically the same as `Daily` with `interval = days`;
/// it is kept as a separate variant because the user expressed the schedule
/// as a raw day count and edits should round-trip that intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecurrenceRule {
    /// Every `interval` days
    Daily { interval: u32, ends: EndRule },
    /// On the listed weekdays, in weeks that are multiples of `interval`
    /// whole weeks from the creation date
    Weekly {
        interval: u32,
        days: Vec<Weekday>,
        ends: EndRule,
    },
    /// Once per matching month, per the pattern
    Monthly {
        interval: u32,
        pattern: MonthlyPattern,
        ends: EndRule,
    },
    /// Every `days` calendar days
    Custom { days: u32, ends: EndRule },
}

impl RecurrenceRule {
    /// The end condition attached to this rule
    pub fn ends(&self) -> &EndRule {
        match self {
            RecurrenceRule::Daily { ends, .. } => ends,
            RecurrenceRule::Weekly { ends, .. } => ends,
            RecurrenceRule::Monthly { ends, .. } => ends,
            RecurrenceRule::Custom { ends, .. } => ends,
        }
    }

    /// Validate that a rule's parameters are in range
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            RecurrenceRule::Daily { interval, ends } => {
                if *interval == 0 {
                    return Err(DomainError::InvalidRecurrence(
                        "Daily interval must be at least 1".to_string(),
                    ));
                }
                Self::validate_ends(ends)
            }
            RecurrenceRule::Weekly { interval, days, ends } => {
                if *interval == 0 {
                    return Err(DomainError::InvalidRecurrence(
                        "Weekly interval must be at least 1".to_string(),
                    ));
                }
                if days.is_empty() {
                    return Err(DomainError::InvalidRecurrence(
                        "Weekly recurrence must specify at least one day".to_string(),
                    ));
                }
                let mut seen = [false; 7];
                for day in days {
                    let idx = day.num_days_from_monday() as usize;
                    if seen[idx] {
                        return Err(DomainError::InvalidRecurrence(format!(
                            "Weekly recurrence lists {} twice",
                            day
                        )));
                    }
                    seen[idx] = true;
                }
                Self::validate_ends(ends)
            }
            RecurrenceRule::Monthly { interval, pattern, ends } => {
                if *interval == 0 {
                    return Err(DomainError::InvalidRecurrence(
                        "Monthly interval must be at least 1".to_string(),
                    ));
                }
                match pattern {
                    MonthlyPattern::DayOfMonth { day } => {
                        if *day == 0 || *day > 31 {
                            return Err(DomainError::InvalidRecurrence(format!(
                                "Day of month must be 1-31, got {}",
                                day
                            )));
                        }
                    }
                    MonthlyPattern::NthWeekday { occurrence, .. } => {
                        if !matches!(occurrence, 1..=4 | -1) {
                            return Err(DomainError::InvalidRecurrence(format!(
                                "Occurrence must be 1-4 or -1 (last), got {}",
                                occurrence
                            )));
                        }
                    }
                }
                Self::validate_ends(ends)
            }
            RecurrenceRule::Custom { days, ends } => {
                if *days == 0 {
                    return Err(DomainError::InvalidRecurrence(
                        "Custom interval must be at least 1 day".to_string(),
                    ));
                }
                Self::validate_ends(ends)
            }
        }
    }

    fn validate_ends(ends: &EndRule) -> Result<(), DomainError> {
        if let EndRule::After { count: 0 } = ends {
            return Err(DomainError::InvalidRecurrence(
                "An 'after N completions' end rule needs N of at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Decide whether the habit is scheduled on `date`
    ///
    /// `start` is the habit's creation date (the recurrence epoch - no date
    /// before it is ever active) and `history` the habit's completion dates,
    /// consulted only by `After` end rules. Checks run in strict order:
    /// epoch, then end rule (short-circuiting before any pattern math), then
    /// the recurrence pattern itself. Malformed parameters (a zero interval
    /// stored by a buggy writer) evaluate to "not active" rather than
    /// panicking, so one corrupt rule cannot take down unrelated habits.
    pub fn is_active_on(&self, start: NaiveDate, date: NaiveDate, history: &[NaiveDate]) -> bool {
        if date < start {
            return false;
        }

        if !self.ends().allows(date, history) {
            return false;
        }

        match self {
            RecurrenceRule::Daily { interval, .. } => day_interval_matches(start, date, *interval),
            RecurrenceRule::Weekly { interval, days, .. } => {
                if *interval == 0 || !days.contains(&date.weekday()) {
                    return false;
                }
                // Interval gating counts whole weeks from the creation date,
                // independent of which weekday within the week.
                let weeks = (date - start).num_days() / 7;
                weeks >= 0 && weeks % (*interval as i64) == 0
            }
            RecurrenceRule::Monthly { interval, pattern, .. } => {
                if *interval == 0 {
                    return false;
                }
                let months = (date.year() - start.year()) * 12
                    + (date.month() as i32 - start.month() as i32);
                if months < 0 || months % (*interval as i32) != 0 {
                    return false;
                }
                pattern.matches(date)
            }
            RecurrenceRule::Custom { days, .. } => day_interval_matches(start, date, *days),
        }
    }

    /// Render the rule as human-readable text
    ///
    /// "Daily", "Every 3 days", "Weekly on Mon, Wed", "Monthly on the last
    /// Friday", with an end suffix like ", until 2025-06-30" or ", 10 times".
    pub fn describe(&self) -> String {
        let base = match self {
            RecurrenceRule::Daily { interval: 1, .. } => "Daily".to_string(),
            RecurrenceRule::Daily { interval, .. } => format!("Every {} days", interval),
            RecurrenceRule::Weekly { interval, days, .. } => {
                let day_list = days
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                if *interval == 1 {
                    format!("Weekly on {}", day_list)
                } else {
                    format!("Every {} weeks on {}", interval, day_list)
                }
            }
            RecurrenceRule::Monthly { interval, pattern, .. } => {
                let pattern_text = match pattern {
                    MonthlyPattern::DayOfMonth { day } => format!("day {}", day),
                    MonthlyPattern::NthWeekday { weekday, occurrence } => {
                        format!("the {} {}", ordinal_name(*occurrence), weekday_name(*weekday))
                    }
                };
                if *interval == 1 {
                    format!("Monthly on {}", pattern_text)
                } else {
                    format!("Every {} months on {}", interval, pattern_text)
                }
            }
            RecurrenceRule::Custom { days, .. } => format!("Every {} days", days),
        };

        match self.ends() {
            EndRule::Never => base,
            EndRule::On { date } => format!("{}, until {}", base, date),
            EndRule::After { count } => format!("{}, {} times", base, count),
        }
    }
}

fn day_interval_matches(start: NaiveDate, date: NaiveDate, interval: u32) -> bool {
    if interval == 0 {
        return false;
    }
    let diff = (date - start).num_days();
    diff >= 0 && diff % (interval as i64) == 0
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn ordinal_name(occurrence: i32) -> String {
    match occurrence {
        -1 => "last".to_string(),
        1 => "first".to_string(),
        2 => "second".to_string(),
        3 => "third".to_string(),
        4 => "fourth".to_string(),
        other => format!("{}th", other),
    }
}
