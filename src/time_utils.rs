// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Calendar date of a timestamp, in UTC.
pub fn utc_date(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// A `YYYY-MM-DD` date interpreted as midnight UTC.
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
