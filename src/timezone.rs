//! Resolves the server's configured timezone into UTC offsets.

use std::fmt::Debug;

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz, timezones};

use crate::Error;

/// The timezone that calendar months are computed in, e.g. "Pacific/Auckland".
#[derive(Clone, Copy)]
pub struct LocalTimezone {
    tz: &'static Tz,
}

impl LocalTimezone {
    /// Look up a timezone by its canonical name.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTimezone] if `canonical_timezone` is not a
    /// known timezone name.
    pub fn new(canonical_timezone: &str) -> Result<Self, Error> {
        timezones::get_by_name(canonical_timezone)
            .map(|tz| Self { tz })
            .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
    }

    /// The canonical name of the timezone.
    pub fn name(&self) -> &str {
        self.tz.name()
    }

    /// The UTC offset of this timezone at `instant`.
    pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        self.tz.get_offset_utc(&instant).to_utc()
    }

    /// Midnight at the start of `date` in this timezone.
    ///
    /// The offset is resolved at that midnight, so dates on either side of a
    /// daylight saving change get their own offset.
    pub fn midnight(&self, date: Date) -> OffsetDateTime {
        let naive = date.midnight();
        let guess = naive.assume_offset(self.offset_at(naive.assume_utc()));

        naive.assume_offset(self.offset_at(guess))
    }
}

impl Debug for LocalTimezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LocalTimezone").field(&self.name()).finish()
    }
}
