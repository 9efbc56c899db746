use crate::attributes::{get_user_from_filename, get_year_from_dir};
use crate::errors::{AuditError, Result};
use crate::table::DatasetTable;
use crate::types::{DatasetRow, MissingPolicy, ScanConfig};
use crate::walker::walk_manifests;
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::thread;

/// Everything one run produces, owned by the caller.
#[derive(Debug)]
pub struct ScanOutcome {
    pub table: DatasetTable,
    /// Referenced paths that failed the existence check (skip policy).
    pub missing: Vec<String>,
    pub manifests: usize,
    pub references: usize,
}

/// Walk `top_directory`, resolve every manifest reference against the
/// filesystem and accumulate the result table.
///
/// The reference counter includes missing files; the throttle pause fires
/// after every `throttle_every`-th reference that produced a row.
pub fn scan_datasets(top_directory: &Path, config: &ScanConfig) -> Result<ScanOutcome> {
    if !top_directory.is_dir() {
        return Err(AuditError::TopDirMissing(top_directory.to_path_buf()));
    }

    let mut table = DatasetTable::new();
    let mut missing = Vec::new();
    let mut manifests = 0;
    let mut references = 0;

    for location in walk_manifests(top_directory) {
        manifests += 1;
        let xmldir = location
            .rel_path
            .parent()
            .map_or_else(String::new, |p| p.to_string_lossy().to_string());
        let year = get_year_from_dir(&location.rel_path.to_string_lossy());

        for reference in location.references {
            let ntuple = reference.map_err(|source| AuditError::Manifest {
                path: location.rel_path.clone(),
                source,
            })?;
            references += 1;

            let metadata = match config.policy {
                MissingPolicy::Skip => match fs::metadata(&ntuple) {
                    Ok(m) => m,
                    Err(_) => {
                        warn!("{ntuple} does not exist, skipping");
                        missing.push(ntuple);
                        continue;
                    }
                },
                MissingPolicy::Strict => {
                    fs::metadata(&ntuple).map_err(|source| AuditError::NtupleMissing {
                        path: ntuple.clone().into(),
                        source,
                    })?
                }
            };

            table.push(DatasetRow {
                xmldir: xmldir.clone(),
                user: get_user_from_filename(&ntuple),
                size_mb: metadata.len() as f64 / 1_048_576.0,
                year: year.clone(),
                ntuple,
            });

            // Back off every so often to keep filesystem load down.
            if config.throttle_every > 0 && references % config.throttle_every == 0 {
                info!(
                    "processed {references} references, pausing for {:?}",
                    config.throttle_pause
                );
                thread::sleep(config.throttle_pause);
            }
        }
    }

    Ok(ScanOutcome {
        table,
        missing,
        manifests,
        references,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    fn quiet_config(policy: MissingPolicy) -> ScanConfig {
        ScanConfig {
            policy,
            throttle_every: 0,
            throttle_pause: Duration::ZERO,
        }
    }

    /// 1 MiB ntuple under a `user/robin` branch, returning its path.
    fn make_ntuple(data_root: &TempDir) -> String {
        let dir = data_root.path().join("user/robin");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Ntuple_MC_TTbar.root");
        let mut file = File::create(&path).unwrap();
        file.write_all(&vec![0u8; 1_048_576]).unwrap();
        path.to_string_lossy().to_string()
    }

    fn make_manifest_tree(ntuple: &str) -> TempDir {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("2018v1")).unwrap();
        fs::write(
            root.path().join("2018v1/MC_TTbar.xml"),
            format!(
                "<In FileName=\"{ntuple}\" Lumi=\"0.0\"/>\n\
                 <In FileName=\"/no/such/Ntuple.root\" Lumi=\"0.0\"/>\n\
                 <!--\n\
                 <In FileName=\"/commented/out.root\" Lumi=\"0.0\"/>\n\
                 -->\n"
            ),
        )
        .unwrap();
        root
    }

    #[test]
    fn test_skip_policy_end_to_end() {
        let data_root = TempDir::new().unwrap();
        let ntuple = make_ntuple(&data_root);
        let root = make_manifest_tree(&ntuple);

        let outcome =
            scan_datasets(root.path(), &quiet_config(MissingPolicy::Skip)).unwrap();

        assert_eq!(outcome.manifests, 1);
        // The commented-out reference is never yielded.
        assert_eq!(outcome.references, 2);
        assert_eq!(outcome.missing, vec!["/no/such/Ntuple.root"]);
        assert_eq!(outcome.table.len(), 1);

        let csv = root.path().join("out.csv");
        outcome.table.write_csv(&csv).unwrap();
        let content = fs::read_to_string(&csv).unwrap();
        let fields: Vec<&str> = content.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(fields[1], "2018v1");
        assert_eq!(fields[2], ntuple);
        // Exactly 1_048_576 bytes is exactly one MB.
        assert_eq!(fields[3], "1");
        assert_eq!(fields[4], "robin");
        assert_eq!(fields[5], "2018v1");
    }

    #[test]
    fn test_strict_policy_aborts_on_missing() {
        let data_root = TempDir::new().unwrap();
        let ntuple = make_ntuple(&data_root);
        let root = make_manifest_tree(&ntuple);

        let err =
            scan_datasets(root.path(), &quiet_config(MissingPolicy::Strict)).unwrap_err();
        assert!(matches!(err, AuditError::NtupleMissing { .. }));
    }

    #[test]
    fn test_missing_top_directory_is_fatal() {
        let err = scan_datasets(
            Path::new("/no/such/top/dir"),
            &quiet_config(MissingPolicy::Skip),
        )
        .unwrap_err();
        assert!(matches!(err, AuditError::TopDirMissing(_)));
    }

    #[test]
    fn test_throttle_path_runs_with_zero_pause() {
        let data_root = TempDir::new().unwrap();
        let ntuple = make_ntuple(&data_root);
        let root = make_manifest_tree(&ntuple);

        let config = ScanConfig {
            policy: MissingPolicy::Skip,
            throttle_every: 1,
            throttle_pause: Duration::ZERO,
        };
        let outcome = scan_datasets(root.path(), &config).unwrap();
        assert_eq!(outcome.table.len(), 1);
    }

    #[test]
    fn test_manifest_directly_in_root_has_empty_xmldir() {
        let data_root = TempDir::new().unwrap();
        let ntuple = make_ntuple(&data_root);
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join("sample.xml"),
            format!("<In FileName=\"{ntuple}\" Lumi=\"0.0\"/>\n"),
        )
        .unwrap();

        let outcome =
            scan_datasets(root.path(), &quiet_config(MissingPolicy::Skip)).unwrap();
        assert_eq!(outcome.table.len(), 1);

        let csv = root.path().join("out.csv");
        outcome.table.write_csv(&csv).unwrap();
        let content = fs::read_to_string(&csv).unwrap();
        let fields: Vec<&str> = content.lines().nth(1).unwrap().split(',').collect();
        // dirname of a root-level manifest is empty; year falls back to the
        // first path segment, the manifest filename itself.
        assert_eq!(fields[1], "");
        assert_eq!(fields[5], "sample.xml");
    }
}
