//! Read-only views computed from a synced list
//!
//! Every function here is pure: the same list always gives the same result.
//! Dates are compared on calendar days, in the time zone the projection has been built with.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Utc};

use crate::config::Settings;
use crate::record::Record;

/// Which records a calendar or a list shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    /// Every record, dated or not
    All,
    /// Records dated within a given month. `month` goes from 1 to 12
    Month { year: i32, month: u32 },
}

/// The counters shown on top of the task list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewProjection {
    offset: FixedOffset,
    upcoming_limit: usize,
}

impl ViewProjection {
    pub fn new(offset: FixedOffset, upcoming_limit: usize) -> Self {
        Self { offset, upcoming_limit }
    }

    /// A projection that uses the current offset of the local time zone
    pub fn local(settings: &Settings) -> Self {
        Self::new(*Local::now().offset(), settings.upcoming_limit)
    }

    pub fn offset(&self) -> FixedOffset { self.offset }
    pub fn upcoming_limit(&self) -> usize { self.upcoming_limit }

    /// The calendar day of an instant
    pub fn day_of(&self, date: &DateTime<Utc>) -> NaiveDate {
        date.with_timezone(&self.offset).date_naive()
    }

    pub fn today(&self) -> NaiveDate {
        self.day_of(&Utc::now())
    }

    fn record_day<R: Record>(&self, record: &R) -> Option<NaiveDate> {
        record.date().map(|date| self.day_of(&date))
    }

    pub fn in_period<R: Record>(&self, records: &[R], period: Period) -> Vec<R> {
        match period {
            Period::All => records.to_vec(),
            Period::Month { year, month } => records.iter()
                .filter(|r| match self.record_day(*r) {
                    Some(day) => day.year() == year && day.month() == month,
                    None => false,
                })
                .cloned()
                .collect(),
        }
    }

    /// Records whose day of month is `day`. Meant to be used on a list that is already filtered by [`Period::Month`]
    pub fn on_day<R: Record>(&self, records: &[R], day: u32) -> Vec<R> {
        records.iter()
            .filter(|r| self.record_day(*r).map(|d| d.day()) == Some(day))
            .cloned()
            .collect()
    }

    /// The next dated records, starting from `today` (included), earliest first
    pub fn upcoming<R: Record>(&self, records: &[R], today: NaiveDate) -> Vec<R> {
        let mut upcoming: Vec<(DateTime<Utc>, &R)> = records.iter()
            .filter_map(|r| r.date().map(|date| (date, r)))
            .filter(|(date, _)| self.day_of(date) >= today)
            .collect();
        upcoming.sort_by_key(|(date, _)| *date);

        upcoming.into_iter()
            .take(self.upcoming_limit)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn counts<R: Record>(&self, records: &[R]) -> Counts {
        let total = records.len();
        let completed = records.iter().filter(|r| r.is_completed()).count();
        Counts { total, completed, pending: total - completed }
    }

    /// How many records fall on each day of a month, for the dots of a month grid
    pub fn month_markers<R: Record>(&self, records: &[R], year: i32, month: u32) -> BTreeMap<u32, usize> {
        let mut markers = BTreeMap::new();
        for day in records.iter().filter_map(|r| self.record_day(r)) {
            if day.year() == year && day.month() == month {
                *markers.entry(day.day()).or_insert(0) += 1;
            }
        }
        markers
    }

    /// Group records by any key, e.g. a category or a priority. Records keep their order within a group
    pub fn group_by<R, K, F>(&self, records: &[R], key: F) -> BTreeMap<K, Vec<R>>
    where
        R: Record,
        K: Ord,
        F: Fn(&R) -> K,
    {
        let mut groups: BTreeMap<K, Vec<R>> = BTreeMap::new();
        for record in records {
            groups.entry(key(record)).or_default().push(record.clone());
        }
        groups
    }
}

/// Move `delta` months away from a month (1 to 12), e.g. for the arrows of a calendar
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}
