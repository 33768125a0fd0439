use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Language, Localized};
use crate::traits::Clock;

/// Timezone the business keeps its hours in.
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

// ==================== Time Provider ====================

/// A point in the business week: day (0 = Sunday .. 6 = Saturday) and minute
/// of that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalSample {
    pub day_of_week: u8,
    pub minute_of_day: u16,
}

impl LocalSample {
    pub fn new(day_of_week: u8, minute_of_day: u16) -> Self {
        Self {
            day_of_week,
            minute_of_day,
        }
    }

    /// Decompose a wall-clock time that is already in the wanted timezone.
    pub fn from_datetime<T: TimeZone>(time: &DateTime<T>) -> Self {
        Self {
            day_of_week: time.weekday().num_days_from_sunday() as u8,
            minute_of_day: (time.hour() * 60 + time.minute()) as u16,
        }
    }
}

/// Reads the injected clock and converts it into the business timezone,
/// independent of the host's local timezone.
#[derive(Debug, Clone)]
pub struct BusinessClock<C: Clock> {
    clock: C,
    tz: Tz,
}

impl<C: Clock> BusinessClock<C> {
    /// Resolve `timezone` as an IANA name.
    ///
    /// An unresolvable name is a configuration error; there is no fallback
    /// to UTC or to the host timezone.
    pub fn new(clock: C, timezone: &str) -> Result<Self, ScheduleError> {
        let tz = Tz::from_str(timezone)
            .map_err(|_| ScheduleError::UnknownTimezone(timezone.to_string()))?;
        Ok(Self { clock, tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> LocalSample {
        let local = self.clock.now_utc().with_timezone(&self.tz);
        LocalSample::from_datetime(&local)
    }
}

// ==================== Schedule Rules ====================

/// Set of weekdays, bit `n` set for day `n` (0 = Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DaySet(u8);

impl DaySet {
    pub const EMPTY: DaySet = DaySet(0);
    pub const SUNDAY: DaySet = DaySet(0b000_0001);
    pub const WEEKDAYS: DaySet = DaySet(0b011_1110);
    pub const SATURDAY: DaySet = DaySet(0b100_0000);

    /// Build a set from day indices. Indices above 6 are ignored.
    pub fn from_days(days: &[u8]) -> Self {
        DaySet(
            days.iter()
                .filter(|&&d| d < 7)
                .fold(0, |bits, &d| bits | (1 << d)),
        )
    }

    pub fn contains(self, day: u8) -> bool {
        day < 7 && self.0 & (1 << day) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Hours of one schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleHours {
    Closed,
    /// Half-open interval `[start_minute, end_minute)` within a single day.
    Open { start_minute: u16, end_minute: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRule {
    pub days: DaySet,
    pub hours: RuleHours,
}

impl ScheduleRule {
    /// An open rule. Inverted, empty or out-of-day ranges become closed.
    /// `end_minute` may be [`MINUTES_PER_DAY`] for a range open until midnight.
    pub fn open(days: DaySet, start_minute: u16, end_minute: u16) -> Self {
        let hours = if start_minute < end_minute && end_minute <= MINUTES_PER_DAY {
            RuleHours::Open {
                start_minute,
                end_minute,
            }
        } else {
            RuleHours::Closed
        };
        Self { days, hours }
    }

    pub fn closed(days: DaySet) -> Self {
        Self {
            days,
            hours: RuleHours::Closed,
        }
    }

    pub fn applies_to(&self, day_of_week: u8) -> bool {
        self.days.contains(day_of_week)
    }

    /// True if this rule applies to the sample's day and its open interval
    /// contains the sample's minute.
    pub fn contains(&self, sample: LocalSample) -> bool {
        if !self.applies_to(sample.day_of_week) {
            return false;
        }
        match self.hours {
            RuleHours::Closed => false,
            RuleHours::Open {
                start_minute,
                end_minute,
            } => (start_minute..end_minute).contains(&sample.minute_of_day),
        }
    }
}

/// Check whether any applying, non-closed rule contains the sample.
///
/// A day with no applying rule is closed.
pub fn is_open(rules: &[ScheduleRule], sample: LocalSample) -> bool {
    rules.iter().any(|rule| rule.contains(sample))
}

// ==================== Parsing ====================

/// Parse `H:MM-H:MM` (hyphen or en-dash, whitespace ignored) into a
/// `(start_minute, end_minute)` pair. The end may be `24:00`.
pub fn parse_range(text: &str) -> Option<(u16, u16)> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.replacen('–', "-", 1);
    let (start, end) = compact.split_once('-')?;
    let end = if end == "24:00" {
        MINUTES_PER_DAY
    } else {
        parse_clock(end)?
    };
    Some((parse_clock(start)?, end))
}

fn parse_clock(text: &str) -> Option<u16> {
    let (hours, minutes) = text.split_once(':')?;
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !(1..=2).contains(&hours.len()) || minutes.len() != 2 {
        return None;
    }
    if !all_digits(hours) || !all_digits(minutes) {
        return None;
    }
    let (hours, minutes): (u16, u16) = (hours.parse().ok()?, minutes.parse().ok()?);
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

fn is_closed_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("cerrado") || lower.contains("closed")
}

/// Days a row applies to when it carries no explicit day list, read from its
/// label ("Lun–Vie", "Saturday", ...).
fn days_from_label(label: &Localized) -> DaySet {
    let text = if label.es.is_empty() {
        &label.en
    } else {
        &label.es
    };
    let text = text.to_lowercase();
    if text.contains("lun") || text.contains("mon") {
        DaySet::WEEKDAYS
    } else if text.contains("sáb") || text.contains("sab") || text.contains("sat") {
        DaySet::SATURDAY
    } else if text.contains("dom") || text.contains("sun") {
        DaySet::SUNDAY
    } else {
        DaySet::EMPTY
    }
}

/// One human-authored row of business hours, as shown on the location panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursRow {
    pub label: Localized,
    pub hours: String,
    #[serde(default)]
    pub days: Option<Vec<u8>>,
}

impl HoursRow {
    pub fn new(label: Localized, hours: &str, days: Option<Vec<u8>>) -> Self {
        Self {
            label,
            hours: hours.to_string(),
            days,
        }
    }

    pub fn label(&self, lang: Language) -> &str {
        self.label.get(lang)
    }

    /// Convert to a rule. Anything that does not parse is closed.
    pub fn to_rule(&self) -> ScheduleRule {
        let days = match &self.days {
            Some(days) => DaySet::from_days(days),
            None => days_from_label(&self.label),
        };
        if is_closed_text(&self.hours) {
            return ScheduleRule::closed(days);
        }
        match parse_range(&self.hours) {
            Some((start, end)) => ScheduleRule::open(days, start, end),
            None => {
                tracing::warn!("Unparseable hours {:?}, treating row as closed", self.hours);
                ScheduleRule::closed(days)
            }
        }
    }
}

/// The distributor's regular weekly hours.
pub fn default_hours() -> Vec<HoursRow> {
    vec![
        HoursRow::new(
            Localized::new("Lun–Vie", "Mon–Fri"),
            "05:00–16:00",
            Some(vec![1, 2, 3, 4, 5]),
        ),
        HoursRow::new(
            Localized::new("Sábado", "Saturday"),
            "06:00–13:00",
            Some(vec![6]),
        ),
        HoursRow::new(
            Localized::new("Domingo", "Sunday"),
            "Cerrado / Closed",
            Some(vec![0]),
        ),
    ]
}

// ==================== Business Hours ====================

/// Weekly hours plus the clock they are evaluated against.
#[derive(Debug, Clone)]
pub struct BusinessHours<C: Clock> {
    rows: Vec<HoursRow>,
    rules: Vec<ScheduleRule>,
    clock: BusinessClock<C>,
}

impl<C: Clock> BusinessHours<C> {
    pub fn new(rows: Vec<HoursRow>, clock: BusinessClock<C>) -> Self {
        let rules = rows.iter().map(HoursRow::to_rule).collect();
        Self { rows, rules, clock }
    }

    pub fn rows(&self) -> &[HoursRow] {
        &self.rows
    }

    pub fn rules(&self) -> &[ScheduleRule] {
        &self.rules
    }

    pub fn is_open_at(&self, sample: LocalSample) -> bool {
        is_open(&self.rules, sample)
    }

    /// Check if the business is currently open.
    pub fn is_open_now(&self) -> bool {
        let sample = self.clock.now();
        let open = self.is_open_at(sample);
        tracing::debug!(
            "Business is {} at day {} minute {} ({})",
            if open { "open" } else { "closed" },
            sample.day_of_week,
            sample.minute_of_day,
            self.clock.timezone()
        );
        open
    }
}
