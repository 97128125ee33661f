//! Per-render scratch space for staging downloaded images

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};

use crate::domain::export::ExportError;

/// Prefix of staged image files
pub const STAGED_FILE_PREFIX: &str = "pdfimg_";

/// Where render scratch directories are created
#[derive(Debug, Clone, Default)]
pub struct ScratchSpace {
    base_dir: Option<PathBuf>,
}

impl ScratchSpace {
    /// Scratch space under `base_dir`, or the system temp dir when `None`
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Open a private directory for one render; removed when dropped
    pub fn open(&self) -> Result<RenderScratch, ExportError> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("form-export-");
            builder
        };

        let dir = match &self.base_dir {
            Some(base) => builder.tempdir_in(base),
            None => builder.tempdir(),
        }
        .map_err(|e| ExportError::filesystem(format!("cannot create scratch directory: {}", e)))?;

        Ok(RenderScratch { dir })
    }
}

/// Scratch directory owned by a single render
#[derive(Debug)]
pub struct RenderScratch {
    dir: TempDir,
}

impl RenderScratch {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write bytes to a fresh `pdfimg_*.<extension>` file
    pub fn stage(&self, bytes: &[u8], extension: &str) -> Result<NamedTempFile, ExportError> {
        stage_in(self.dir.path(), bytes, extension)
    }
}

/// Write bytes to a fresh `pdfimg_*.<extension>` file inside `dir`
///
/// Blocking; async callers run it on the blocking pool.
pub fn stage_in(dir: &Path, bytes: &[u8], extension: &str) -> Result<NamedTempFile, ExportError> {
    let suffix = format!(".{}", extension);
    let mut file = tempfile::Builder::new()
        .prefix(STAGED_FILE_PREFIX)
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| ExportError::filesystem(format!("cannot create staging file: {}", e)))?;

    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| ExportError::filesystem(format!("cannot write staging file: {}", e)))?;

    Ok(file)
}
