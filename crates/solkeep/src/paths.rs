use directories::ProjectDirs;
use eyre::ContextCompat as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SolkeepPaths {
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
}

impl SolkeepPaths {
    /// Resolves the data directory, preferring an explicit override (config
    /// or test harness) over the platform default.
    ///
    /// Default locations:
    /// macOS: ~/Library/Application Support/solkeep
    /// Linux: ~/.local/share/solkeep
    /// Windows: %APPDATA%\\solkeep
    pub fn discover(data_dir_override: Option<&Path>) -> eyre::Result<Self> {
        let data_dir = match data_dir_override {
            Some(dir) => dir.to_path_buf(),
            None => ProjectDirs::from("", "", "solkeep")
                .context("failed to resolve project dirs")?
                .data_dir()
                .to_path_buf(),
        };
        let log_file = data_dir.join("solkeep.log.jsonl");
        Ok(Self { data_dir, log_file })
    }

    pub fn ensure_private_dirs(&self) -> eyre::Result<()> {
        crate::fsutil::ensure_private_dir(&self.data_dir)
    }
}
