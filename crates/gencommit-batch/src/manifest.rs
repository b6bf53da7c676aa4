use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

use crate::job::BatchJobRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchManifest {
    pub created_at: DateTime<Utc>,
    pub num_jobs: usize,
    pub success: usize,
    pub failure: usize,
    pub jobs: Vec<BatchJobRecord>,
}

pub fn write_batch_manifest(path: &Path, manifest: &BatchManifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating manifest directory '{}'", parent.display()))?;
    }
    let json =
        serde_json::to_string_pretty(manifest).context("serializing batch manifest to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("writing batch manifest '{}'", path.display()))?;
    Ok(())
}

pub fn load_batch_manifest(path: &Path) -> Result<BatchManifest> {
    let file = File::open(path)
        .with_context(|| format!("opening batch manifest '{}'", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("parsing batch manifest '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn manifest_writes_and_reads_back() {
        let record = BatchJobRecord {
            job_id: "uc:s1".into(),
            scenario_id: "s1".into(),
            status: "infeasible".into(),
            error: Some("no feasible commitment".into()),
            output: "out/s1/schedule.json".into(),
            total_cost: None,
            warnings: 2,
        };
        let manifest = BatchManifest {
            created_at: Utc::now(),
            num_jobs: 1,
            success: 0,
            failure: 1,
            jobs: vec![record.clone()],
        };
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("batch_manifest.json");
        write_batch_manifest(&path, &manifest).unwrap();

        let parsed = load_batch_manifest(&path).unwrap();
        assert_eq!(parsed.failure, 1);
        assert_eq!(parsed.jobs, vec![record]);
    }

    #[test]
    fn missing_manifest_reports_path() {
        let dir = tempdir().unwrap();
        let err = load_batch_manifest(&dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
