//! Calendar decomposition for date rules.
//!
//! Date values and bounds are compared as instants, never as strings. A value
//! is split into year, month, day and an optional time according to the
//! rule's declared field order; the separator (`-`, `/` or `.`) is detected
//! from the string itself.

use chrono::{NaiveDate, NaiveDateTime};

/// Order of the date components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateOrder {
    /// `yyyy-mm-dd`
    Iso,
    /// `mm-dd-yyyy`
    Us,
    /// `dd-mm-yyyy`
    Euro,
}

/// Accepted number of year digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YearDigits {
    /// Two or four digits.
    Any,
    /// Four digits.
    Long,
    /// Two digits.
    Short,
}

/// The date style tag carried by date validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateFormat {
    pub order: DateOrder,
    pub year: YearDigits,
}

/// Two-digit years below this pivot land in the 2000s, the rest in the 1900s.
const SHORT_YEAR_PIVOT: i32 = 50;

const SEPARATORS: [char; 3] = ['-', '/', '.'];

const DAY: &str = r"(0?[1-9]|[12]\d|3[01])";
const MONTH: &str = r"(0?[1-9]|1[0-2])";
const SEP: &str = r"[-/.]";
const TIME: &str = r"([ T]([01]?\d|2[0-3]):[0-5]\d(:[0-5]\d)?)?";

/// Decomposed calendar components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl DateParts {
    /// Builds a comparable instant, or `None` for impossible dates such as
    /// February 30th.
    pub fn instant(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(self.hour, self.minute, self.second)
    }
}

impl DateFormat {
    /// ISO order, four-digit year.
    pub const ISO: Self = Self::new(DateOrder::Iso, YearDigits::Long);

    /// Every format the catalog knows, in rule-name order.
    pub const ALL: [Self; 7] = [
        Self::ISO,
        Self::new(DateOrder::Us, YearDigits::Any),
        Self::new(DateOrder::Us, YearDigits::Long),
        Self::new(DateOrder::Us, YearDigits::Short),
        Self::new(DateOrder::Euro, YearDigits::Any),
        Self::new(DateOrder::Euro, YearDigits::Long),
        Self::new(DateOrder::Euro, YearDigits::Short),
    ];

    /// Creates a new date format.
    pub const fn new(order: DateOrder, year: YearDigits) -> Self {
        Self { order, year }
    }

    /// The rule-name stem, e.g. `date_us_long`.
    pub fn rule_stem(&self) -> &'static str {
        match (self.order, self.year) {
            (DateOrder::Iso, _) => "date_iso",
            (DateOrder::Us, YearDigits::Any) => "date_us",
            (DateOrder::Us, YearDigits::Long) => "date_us_long",
            (DateOrder::Us, YearDigits::Short) => "date_us_short",
            (DateOrder::Euro, YearDigits::Any) => "date_euro",
            (DateOrder::Euro, YearDigits::Long) => "date_euro_long",
            (DateOrder::Euro, YearDigits::Short) => "date_euro_short",
        }
    }

    /// Human description used in messages, e.g. `dd/mm/yyyy`.
    pub fn description(&self) -> &'static str {
        match (self.order, self.year) {
            (DateOrder::Iso, _) => "yyyy-mm-dd",
            (DateOrder::Us, YearDigits::Any) => "mm/dd/yy or mm/dd/yyyy",
            (DateOrder::Us, YearDigits::Long) => "mm/dd/yyyy",
            (DateOrder::Us, YearDigits::Short) => "mm/dd/yy",
            (DateOrder::Euro, YearDigits::Any) => "dd/mm/yy or dd/mm/yyyy",
            (DateOrder::Euro, YearDigits::Long) => "dd/mm/yyyy",
            (DateOrder::Euro, YearDigits::Short) => "dd/mm/yy",
        }
    }

    /// The well-formedness pattern paired with this format.
    pub fn pattern(&self) -> String {
        let year = match (self.order, self.year) {
            (DateOrder::Iso, _) | (_, YearDigits::Long) => r"\d{4}",
            (_, YearDigits::Short) => r"\d{2}",
            (_, YearDigits::Any) => r"(\d{4}|\d{2})",
        };
        match self.order {
            DateOrder::Iso => format!("^{year}{SEP}{MONTH}{SEP}{DAY}{TIME}$"),
            DateOrder::Us => format!("^{MONTH}{SEP}{DAY}{SEP}{year}{TIME}$"),
            DateOrder::Euro => format!("^{DAY}{SEP}{MONTH}{SEP}{year}{TIME}$"),
        }
    }

    /// Splits `text` into calendar components.
    pub fn decompose(&self, text: &str) -> Option<DateParts> {
        let text = text.trim();
        let (date, time) = match text.split_once([' ', 'T', 't']) {
            Some((date, time)) => (date, Some(time.trim())),
            None => (text, None),
        };

        // Both separators must be the first one found.
        let separator = date.chars().find(|c| SEPARATORS.contains(c))?;
        let pieces: Vec<&str> = date.split(separator).collect();
        let [a, b, c] = pieces.as_slice() else {
            return None;
        };
        let (year, month, day) = match self.order {
            DateOrder::Iso => (*a, *b, *c),
            DateOrder::Us => (*c, *a, *b),
            DateOrder::Euro => (*c, *b, *a),
        };

        let (hour, minute, second) = match time {
            Some(time) => parse_time(time)?,
            None => (0, 0, 0),
        };

        Some(DateParts {
            year: self.parse_year(year)?,
            month: month.parse().ok()?,
            day: day.parse().ok()?,
            hour,
            minute,
            second,
        })
    }

    /// Decomposes `text` and builds its instant.
    pub fn instant(&self, text: &str) -> Option<NaiveDateTime> {
        self.decompose(text)?.instant()
    }

    fn parse_year(&self, raw: &str) -> Option<i32> {
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let value: i32 = raw.parse().ok()?;
        match (raw.len(), self.year) {
            (4, YearDigits::Long | YearDigits::Any) => Some(value),
            (2, YearDigits::Short | YearDigits::Any) if self.order != DateOrder::Iso => {
                Some(if value < SHORT_YEAR_PIVOT { 2000 + value } else { 1900 + value })
            }
            _ => None,
        }
    }
}

fn parse_time(time: &str) -> Option<(u32, u32, u32)> {
    let mut parts = time.split(':');
    let hour = parts.next()?.parse().ok()?;
    let minute = parts.next()?.parse().ok()?;
    let second = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((hour, minute, second))
}
