//! Filesystem-safe capture stamps
//!
//! Version and trash files are named `<id>-<stamp>.json`, where the stamp is
//! an ISO-8601 UTC time with `:` and `.` replaced by `-`, e.g.
//! `2026-10-16T09-30-12-041337Z`. A `-<seq>` suffix is appended when two
//! captures would otherwise share a name.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";
/// Length of the `YYYY-MM-DDTHH-MM-SS` part
const DATE_TIME_LEN: usize = 19;

/// Capture moment of a snapshot or deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub seq: u32,
}

impl Stamp {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at, seq: 0 }
    }

    /// Current time at microsecond resolution
    pub fn now() -> Self {
        Self::new(truncate_micros(Utc::now()))
    }

    /// A stamp strictly later than `previous`, at microsecond resolution
    pub fn now_after(previous: Option<&Stamp>) -> Self {
        let now = Self::now();
        match previous {
            Some(prev) if now.at <= prev.at => Self::new(prev.at + Duration::microseconds(1)),
            _ => now,
        }
    }

    /// Same moment, next disambiguator
    pub fn bumped(self) -> Self {
        Self {
            seq: self.seq + 1,
            ..self
        }
    }

    /// File name for a payload of `prefix` captured at this stamp
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}-{}.json", prefix, self)
    }

    /// Parse an encoded stamp
    pub fn parse(s: &str) -> Option<Self> {
        let date_time = s.get(..DATE_TIME_LEN)?;
        let naive = NaiveDateTime::parse_from_str(date_time, DATE_TIME_FORMAT).ok()?;

        let rest = s[DATE_TIME_LEN..].strip_prefix('-')?;
        let z = rest.find('Z')?;
        let digits = &rest[..z];
        if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let nanos: i64 = format!("{:0<9}", digits).parse().ok()?;

        let seq = match &rest[z + 1..] {
            "" => 0,
            tail => tail.strip_prefix('-')?.parse().ok()?,
        };

        Some(Self {
            at: naive.and_utc() + Duration::nanoseconds(nanos),
            seq,
        })
    }

    /// Split a file stem `<prefix>-<stamp>` into its parts
    ///
    /// The prefix may itself contain dashes; the split is made at the
    /// leftmost position where the remainder parses as a stamp.
    pub fn split_suffix(stem: &str) -> Option<(&str, Self)> {
        stem.match_indices('-').find_map(|(pos, _)| {
            let candidate = &stem[pos + 1..];
            if candidate.as_bytes().get(10) != Some(&b'T') {
                return None;
            }
            Stamp::parse(candidate).map(|stamp| (&stem[..pos], stamp))
        })
    }

    /// Parse the stamp from a `<prefix>-<stamp>.json` file name with known prefix
    pub fn from_file_name(name: &str, prefix: &str) -> Option<Self> {
        name.strip_suffix(".json")?
            .strip_prefix(prefix)?
            .strip_prefix('-')
            .and_then(Stamp::parse)
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:06}Z",
            self.at.format(DATE_TIME_FORMAT),
            self.at.timestamp_subsec_micros()
        )?;
        if self.seq > 0 {
            write!(f, "-{}", self.seq)?;
        }
        Ok(())
    }
}

impl Ord for Stamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at).then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Stamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn truncate_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    let extra = at.timestamp_subsec_nanos() % 1_000;
    at - Duration::nanoseconds(extra as i64)
}
