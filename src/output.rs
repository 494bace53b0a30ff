use chrono::NaiveDateTime;
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where one run writes its charts and reports.
///
/// The directory name is fixed when the layout is built, from the symbol and
/// the run time passed in, so every file of a run lands in the same place.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    dir: PathBuf,
}

impl OutputLayout {
    pub fn new<P: AsRef<Path>>(root: P, symbol: &str, run_time: NaiveDateTime) -> Self {
        let name = format!(
            "{}_analysis_{}",
            symbol.to_lowercase(),
            run_time.format("%Y%m%d_%H%M%S")
        );
        Self {
            dir: root.as_ref().join(name),
        }
    }

    /// Create the directory (and parents); an existing directory is fine.
    pub fn create(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        info!("Output directory: {}", self.dir.display());
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}
