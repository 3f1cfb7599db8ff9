use std::path::Path;
use crate::Result;

pub mod exiftool;
pub mod process;

pub use exiftool::ExifTool;

/// One `-Tag=value` assignment for the external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAssignment {
    pub tag: String,
    pub value: String,
}

impl TagAssignment {
    pub fn to_arg(&self) -> String {
        format!("-{}={}", self.tag, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagWrite {
    Written,
    /// The tool ran but refused; carries its diagnostic output.
    Rejected(String),
}

/// The external program that reads and writes embedded media metadata.
pub trait Tagger: Send + Sync {
    /// Current primary capture tag, if the file has one.
    fn read_primary(&self, path: &Path) -> Result<Option<String>>;

    /// Writes every assignment in a single invocation.
    fn write(&self, path: &Path, assignments: &[TagAssignment]) -> Result<TagWrite>;
}
