use clap::ValueEnum;
use std::time::Duration;

/// One resolved ntuple reference, ready for the output table.
#[derive(Debug, Clone)]
pub struct DatasetRow {
    /// Directory of the manifest, relative to the scan root.
    pub xmldir: String,
    /// Referenced data-file path, exactly as written in the manifest.
    pub ntuple: String,
    /// File size in MiB (bytes / 1_048_576).
    pub size_mb: f64,
    pub user: Option<String>,
    pub year: Option<String>,
}

/// What to do when a referenced ntuple does not exist on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingPolicy {
    /// Record the path in the missing list and continue.
    Skip,
    /// Abort the run on the first missing file.
    Strict,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub policy: MissingPolicy,
    /// Pause after every N references; 0 disables throttling.
    pub throttle_every: usize,
    pub throttle_pause: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            policy: MissingPolicy::Skip,
            throttle_every: 5000,
            throttle_pause: Duration::from_secs(5),
        }
    }
}
