//! Messages received per calendar day.

use std::io::Write;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{BounceError, Result};
use crate::mailbox::{format_search_date, Mailbox, SearchQuery};

/// Number of messages the mailbox holds for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    #[serde(serialize_with = "serialize_search_date")]
    pub date: NaiveDate,
    pub count: usize,
}

fn serialize_search_date<S: Serializer>(
    date: &NaiveDate,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_search_date(*date))
}

/// Every date from `since` to `until`, both inclusive.
pub fn date_range(since: NaiveDate, until: NaiveDate) -> Result<Vec<NaiveDate>> {
    if since > until {
        return Err(BounceError::EmptyDateRange {
            since: format_search_date(since),
            until: format_search_date(until),
        });
    }
    Ok(since.iter_days().take_while(|d| *d <= until).collect())
}

/// Run one `ON date` search per date, keeping the given order.
pub fn count_per_day(mailbox: &mut dyn Mailbox, dates: &[NaiveDate]) -> Result<Vec<DayCount>> {
    dates
        .iter()
        .map(|&date| {
            let count = mailbox.search(&SearchQuery::On(date))?.len();
            debug!(date = %date, count, "Counted messages");
            Ok(DayCount { date, count })
        })
        .collect()
}

/// Write `date,count` followed by one line per day.
pub fn write_counts(out: &mut impl Write, counts: &[DayCount]) -> Result<()> {
    writeln!(out, "date,count")?;
    for day in counts {
        writeln!(out, "{},{}", format_search_date(day.date), day.count)?;
    }
    out.flush()?;
    Ok(())
}
