use std::path::Path;
use filetime::FileTime;
use crate::media::metadata::CaptureTime;
use crate::Result;

/// Sets a file's access and modify times to the capture moment.
pub fn apply_capture_time(path: impl AsRef<Path>, capture: &CaptureTime) -> Result<()> {
    let time = FileTime::from_unix_time(capture.epoch(), 0);
    filetime::set_file_times(path.as_ref(), time, time)?;
    Ok(())
}
