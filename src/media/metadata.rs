use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, TimeZone};
use log::{debug, warn};
use serde_json::Value;

const STANDARD_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
/// EXIF dates carry a four-digit year.
const EXIF_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// The capture moment taken from a sidecar record, at second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTime {
    epoch: i64,
    local: NaiveDateTime,
}

impl CaptureTime {
    /// Zero is treated like a missing value; no real capture happened at the epoch.
    /// So is anything whose local time falls outside a four-digit year.
    pub fn from_epoch(epoch: i64) -> Option<Self> {
        if epoch == 0 {
            return None;
        }
        let utc = DateTime::from_timestamp(epoch, 0)?.naive_utc();
        let offset = Local.offset_from_utc_datetime(&utc).local_minus_utc();
        let local = utc.checked_add_signed(Duration::seconds(i64::from(offset)))?;
        if !EXIF_YEARS.contains(&local.year()) {
            return None;
        }
        Some(Self { epoch, local })
    }

    pub fn epoch(&self) -> i64 {
        self.epoch
    }

    /// `YYYY:MM:DD HH:MM:SS`, the form EXIF date tags expect.
    pub fn standard(&self) -> String {
        self.local.format(STANDARD_FORMAT).to_string()
    }

    /// Standard form with a literal `.000` for the SubSec* tag family.
    pub fn subsecond(&self) -> String {
        format!("{}.000", self.standard())
    }
}

pub struct MetadataReader;

impl MetadataReader {
    /// Reads `photoTakenTime.timestamp` from a sidecar record.
    ///
    /// Any problem with the record (unreadable, malformed, missing field,
    /// non-numeric or zero value) yields `None`; a bad record must never
    /// abort the batch.
    pub fn read(path: impl AsRef<Path>) -> Option<CaptureTime> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Cannot open JSON {}: {}", path.display(), e);
                return None;
            }
        };

        let data: Value = match serde_json::from_reader(BufReader::new(file)) {
            Ok(data) => data,
            Err(e) => {
                debug!("Malformed JSON {}: {}", path.display(), e);
                return None;
            }
        };

        Self::capture_time(&data)
    }

    pub fn capture_time(data: &Value) -> Option<CaptureTime> {
        let raw = data.get("photoTakenTime")?.get("timestamp")?;
        let epoch = match raw {
            Value::String(s) => s.trim().parse::<i64>().ok()?,
            Value::Number(n) => n.as_i64()?,
            _ => return None,
        };
        CaptureTime::from_epoch(epoch)
    }
}
