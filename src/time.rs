// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Allocation-free timestamp rendering for encoded records.

use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::tz::Offset;
use jiff::tz::TimeZone;

/// Length of a local-time stamp: `YYYY-MM-DD HH:MM:SS.mmm`.
pub const LOCAL_LEN: usize = 23;

/// Length of a UTC ISO-8601 stamp: `YYYY-MM-DDTHH:MM:SS.uuuuuuZ`.
pub const UTC_ISO_LEN: usize = 27;

/// How the `time` field of a record is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `2024-08-10 17:12:52.123` in the system time zone.
    #[default]
    Local,
    /// `2024-08-10T09:12:52.123456Z` in UTC with microsecond precision.
    UtcIso,
}

impl TimeFormat {
    /// Render `ts` into a stack buffer.
    pub fn format(self, ts: Timestamp) -> FormattedTime {
        match self {
            TimeFormat::Local => format_local(ts, &TimeZone::system()),
            TimeFormat::UtcIso => format_utc_iso(ts),
        }
    }
}

/// A rendered timestamp living on the stack.
#[derive(Clone, Copy)]
pub struct FormattedTime {
    buf: [u8; UTC_ISO_LEN],
    len: usize,
}

impl FormattedTime {
    /// The rendered bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The rendered text; every byte is ASCII.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }
}

impl std::fmt::Debug for FormattedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FormattedTime").field(&self.as_str()).finish()
    }
}

/// Render `ts` as `YYYY-MM-DD HH:MM:SS.mmm` in the given time zone.
pub fn format_local(ts: Timestamp, tz: &TimeZone) -> FormattedTime {
    let dt = tz.to_datetime(ts);
    let mut buf = [0u8; UTC_ISO_LEN];
    put_date(&mut buf, &dt, b' ');
    buf[19] = b'.';
    let millis = (dt.subsec_nanosecond() / 1_000_000) as u32;
    put_digits(&mut buf[20..23], millis);
    FormattedTime {
        buf,
        len: LOCAL_LEN,
    }
}

/// Render `ts` as `YYYY-MM-DDTHH:MM:SS.uuuuuuZ` in UTC.
pub fn format_utc_iso(ts: Timestamp) -> FormattedTime {
    let dt = Offset::UTC.to_datetime(ts);
    let mut buf = [0u8; UTC_ISO_LEN];
    put_date(&mut buf, &dt, b'T');
    buf[19] = b'.';
    let micros = (dt.subsec_nanosecond() / 1_000) as u32;
    put_digits(&mut buf[20..26], micros);
    buf[26] = b'Z';
    FormattedTime {
        buf,
        len: UTC_ISO_LEN,
    }
}

// Writes the first 19 bytes: `YYYY-MM-DD?HH:MM:SS`.
fn put_date(buf: &mut [u8; UTC_ISO_LEN], dt: &DateTime, sep: u8) {
    put_digits(&mut buf[0..4], i32::from(dt.year()).rem_euclid(10_000) as u32);
    buf[4] = b'-';
    put_digits(&mut buf[5..7], dt.month() as u32);
    buf[7] = b'-';
    put_digits(&mut buf[8..10], dt.day() as u32);
    buf[10] = sep;
    put_digits(&mut buf[11..13], dt.hour() as u32);
    buf[13] = b':';
    put_digits(&mut buf[14..16], dt.minute() as u32);
    buf[16] = b':';
    put_digits(&mut buf[17..19], dt.second() as u32);
}

// Fills `out` with the low decimal digits of `v`, most significant first.
fn put_digits(out: &mut [u8], mut v: u32) {
    for slot in out.iter_mut().rev() {
        *slot = b'0' + (v % 10) as u8;
        v /= 10;
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rand::Rng;

    use super::*;

    #[test]
    fn test_format_utc_iso() {
        let ts = Timestamp::from_str("2024-08-10T17:12:52.123456789Z").unwrap();
        assert_eq!(format_utc_iso(ts).as_str(), "2024-08-10T17:12:52.123456Z");

        let ts = Timestamp::from_str("2001-02-03T04:05:06Z").unwrap();
        assert_eq!(format_utc_iso(ts).as_str(), "2001-02-03T04:05:06.000000Z");
    }

    #[test]
    fn test_format_local_in_fixed_zone() {
        let ts = Timestamp::from_str("2024-08-10T17:12:52.987654Z").unwrap();
        assert_eq!(
            format_local(ts, &TimeZone::UTC).as_str(),
            "2024-08-10 17:12:52.987"
        );

        let tz = TimeZone::fixed(jiff::tz::offset(8));
        assert_eq!(format_local(ts, &tz).as_str(), "2024-08-11 01:12:52.987");
    }

    #[test]
    fn test_fixed_length_and_separators() {
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let secs = rng.random_range(0..4_102_444_800i64);
            let nanos = rng.random_range(0..1_000_000_000i32);
            let ts = Timestamp::new(secs, nanos).unwrap();

            let local = format_local(ts, &TimeZone::UTC);
            assert_eq!(local.as_bytes().len(), LOCAL_LEN);
            check_layout(
                local.as_bytes(),
                &[(4, b'-'), (7, b'-'), (10, b' '), (13, b':'), (16, b':'), (19, b'.')],
            );

            let iso = format_utc_iso(ts);
            assert_eq!(iso.as_bytes().len(), UTC_ISO_LEN);
            check_layout(
                &iso.as_bytes()[..26],
                &[(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':'), (19, b'.')],
            );
            assert_eq!(iso.as_bytes()[26], b'Z');
        }
    }

    #[test]
    fn test_ordering_follows_wall_clock() {
        let earlier = Timestamp::from_str("2024-08-10T17:12:52.000001Z").unwrap();
        let later = Timestamp::from_str("2024-08-10T17:12:52.000002Z").unwrap();
        assert!(format_utc_iso(earlier).as_str() < format_utc_iso(later).as_str());
        assert_eq!(
            format_utc_iso(earlier).as_str(),
            format_utc_iso(earlier).as_str()
        );
    }

    fn check_layout(bytes: &[u8], separators: &[(usize, u8)]) {
        for (i, b) in bytes.iter().enumerate() {
            match separators.iter().find(|(pos, _)| *pos == i) {
                Some((_, sep)) => assert_eq!(*b, *sep, "position {i} in {bytes:?}"),
                None => assert!(b.is_ascii_digit(), "position {i} in {bytes:?}"),
            }
        }
    }
}
