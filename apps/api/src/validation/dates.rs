//! Date tokens accepted by the renderer: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, and
//! `present` in end-date position only.

use chrono::{Datelike, NaiveDate};

pub const PRESENT: &str = "present";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialDate {
    Year(i32),
    YearMonth(i32, u32),
    Day(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndDate {
    On(PartialDate),
    Present,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateError {
    Malformed,
    PresentNotAllowed,
}

impl PartialDate {
    fn precision(&self) -> u8 {
        match self {
            PartialDate::Year(_) => 1,
            PartialDate::YearMonth(..) => 2,
            PartialDate::Day(_) => 3,
        }
    }

    fn key(&self, precision: u8) -> (i32, u32, u32) {
        let (y, m, d) = match *self {
            PartialDate::Year(y) => (y, 0, 0),
            PartialDate::YearMonth(y, m) => (y, m, 0),
            PartialDate::Day(date) => (date.year(), date.month(), date.day()),
        };
        match precision {
            1 => (y, 0, 0),
            2 => (y, m, 0),
            _ => (y, m, d),
        }
    }
}

/// Parses a start/point date. `present` is rejected here.
pub fn parse_date(raw: &str) -> Result<PartialDate, DateError> {
    if raw == PRESENT {
        return Err(DateError::PresentNotAllowed);
    }
    let parts: Vec<&str> = raw.split('-').collect();
    match parts.as_slice() {
        [y] => Ok(PartialDate::Year(year(y)?)),
        [y, m] => Ok(PartialDate::YearMonth(year(y)?, month(m)?)),
        [y, m, d] => {
            let day = digits(d, 2)?;
            NaiveDate::from_ymd_opt(year(y)?, month(m)?, day)
                .map(PartialDate::Day)
                .ok_or(DateError::Malformed)
        }
        _ => Err(DateError::Malformed),
    }
}

pub fn parse_end_date(raw: &str) -> Result<EndDate, DateError> {
    if raw == PRESENT {
        return Ok(EndDate::Present);
    }
    parse_date(raw).map(EndDate::On)
}

/// True when `start` falls after `end`, compared at the coarser of the two precisions.
pub fn starts_after(start: PartialDate, end: EndDate) -> bool {
    match end {
        EndDate::Present => false,
        EndDate::On(end) => {
            let precision = start.precision().min(end.precision());
            start.key(precision) > end.key(precision)
        }
    }
}

fn year(raw: &str) -> Result<i32, DateError> {
    digits(raw, 4).map(|y| y as i32)
}

fn month(raw: &str) -> Result<u32, DateError> {
    match digits(raw, 2)? {
        m @ 1..=12 => Ok(m),
        _ => Err(DateError::Malformed),
    }
}

fn digits(raw: &str, width: usize) -> Result<u32, DateError> {
    if raw.len() != width || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::Malformed);
    }
    raw.parse().map_err(|_| DateError::Malformed)
}
