//! Temporary staging for transfers between the drive and the format codecs.

use std::path::Path;

use tempfile::{Builder, TempPath};

use crate::error::Result;

/// A uniquely named local file that lives for one read or write operation.
///
/// The file bridges a network transfer and a format codec: downloads land
/// here before decoding, and encoders write here before upload. The backing
/// file is removed when the `Stage` is dropped, so release happens on every
/// exit path of the enclosing operation, including decode, encode, and
/// transfer failures.
pub(crate) struct Stage {
    path: TempPath,
}

impl Stage {
    /// Create a staging file with the given extension (no dot).
    pub fn with_extension(ext: &str) -> Result<Self> {
        let suffix = format!(".{ext}");
        let file = Builder::new().prefix("sp_drive-").suffix(&suffix).tempfile()?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
