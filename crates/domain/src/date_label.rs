// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Short display labels for requirement dates, with an explicit bounded cache.

use crate::date_value::parse_canonical_date;
use std::collections::{HashMap, VecDeque};
use time::{Date, Weekday};

/// Default number of labels kept by a `DateLabelCache`.
pub const DEFAULT_DATE_LABEL_CAPACITY: usize = 256;

/// Formats a date as a short label such as `10/19 (Mon)`.
#[must_use]
pub fn format_date_label(date: Date) -> String {
    format!(
        "{}/{} ({})",
        u8::from(date.month()),
        date.day(),
        weekday_abbreviation(date.weekday())
    )
}

const fn weekday_abbreviation(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

/// Memoizes date labels keyed by canonical date string.
///
/// Bounded; when full, the oldest inserted label is evicted first.
#[derive(Debug, Clone)]
pub struct DateLabelCache {
    capacity: usize,
    labels: HashMap<String, String>,
    order: VecDeque<String>,
}

impl DateLabelCache {
    /// Creates a cache holding at most `capacity` labels.
    ///
    /// A capacity of zero disables caching.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            labels: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns the label for a canonical `YYYY-MM-DD` date.
    ///
    /// Strings that are not canonical dates are returned unchanged and not cached.
    pub fn label(&mut self, date: &str) -> String {
        if let Some(label) = self.labels.get(date) {
            return label.clone();
        }

        let Ok(parsed) = parse_canonical_date(date) else {
            return date.to_string();
        };
        let label = format_date_label(parsed);

        if self.capacity > 0 {
            if self.order.len() >= self.capacity
                && let Some(oldest) = self.order.pop_front()
            {
                self.labels.remove(&oldest);
            }
            self.order.push_back(date.to_string());
            self.labels.insert(date.to_string(), label.clone());
        }

        label
    }

    /// Number of cached labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns whether a label for `date` is cached.
    #[must_use]
    pub fn contains(&self, date: &str) -> bool {
        self.labels.contains_key(date)
    }
}

impl Default for DateLabelCache {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_LABEL_CAPACITY)
    }
}
