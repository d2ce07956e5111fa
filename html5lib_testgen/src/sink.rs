//! Where rendered documents go.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{info, warn};

/// Receives each rendered document under its output file name.
pub trait DocumentSink {
    /// # Errors
    /// Any failure to store (or, for [`CheckSink`], to verify) the document.
    fn persist(&mut self, file_name: &str, contents: &str) -> Result<()>;
}

/// Writes documents into a directory, creating it if needed.
pub struct DirSink {
    out_dir: PathBuf,
}

impl DirSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl DocumentSink for DirSink {
    fn persist(&mut self, file_name: &str, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("unable to create output directory {}", self.out_dir.display()))?;
        let path = self.out_dir.join(file_name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {}", path.display());
        Ok(())
    }
}

/// Compares documents with what is already on disk instead of writing.
///
/// Every stale or missing file is recorded; call [`CheckSink::finish`] once
/// the run is over to turn them into an error.
pub struct CheckSink {
    out_dir: PathBuf,
    stale: Vec<PathBuf>,
}

impl CheckSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            stale: Vec::new(),
        }
    }

    pub fn stale(&self) -> &[PathBuf] {
        &self.stale
    }

    /// # Errors
    /// Fails if any checked file was missing or out of date.
    pub fn finish(self) -> Result<()> {
        if self.stale.is_empty() {
            return Ok(());
        }
        let list: Vec<String> = self.stale.iter().map(|p| p.display().to_string()).collect();
        bail!("generated files are out of date: {}", list.join(", "))
    }
}

impl DocumentSink for CheckSink {
    fn persist(&mut self, file_name: &str, contents: &str) -> Result<()> {
        let path = self.out_dir.join(file_name);
        let up_to_date = match fs::read_to_string(&path) {
            Ok(existing) => existing == contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        if up_to_date {
            info!("{} is up to date", path.display());
        } else {
            warn!("{} is out of date", path.display());
            self.stale.push(path);
        }
        Ok(())
    }
}
