use crate::analysis::Analyzer;
use crate::config::Config;
use crate::display::render;
use anyhow::{Context, Result, bail};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    data_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.is_dir() {
            bail!("{data_dir:?} is not a directory");
        }

        let config_file = data_dir.join("config.toml");
        let cfg = if config_file.exists() {
            Config::from_file(&config_file).context("failed to construct cfg")?
        } else {
            log::info!("{config_file:?} not found, using defaults");
            Config::default()
        };
        log::info!("{cfg:#?}");

        Ok(Self { data_dir, cfg })
    }

    pub fn analyze_snapshots(&self) -> Result<()> {
        let analyzer = Analyzer::new(self.cfg.clone()).context("failed to construct analyzer")?;

        let snapshot_files = self
            .find_files("snapshot-*.json")
            .context("failed to find snapshot files")?;
        if snapshot_files.is_empty() {
            log::warn!("no snapshot files found in {:?}", self.data_dir);
        }

        for snapshot_file in snapshot_files {
            let report = analyzer
                .analyze_file(&snapshot_file)
                .context("failed to analyze snapshot")?;

            let report_file = self
                .report_file(&snapshot_file)
                .context("failed to name report file")?;
            analyzer
                .save_results(&report, &report_file)
                .context("failed to save results")?;
            log::info!("analyzed {snapshot_file:?} into {report_file:?}");
        }

        Ok(())
    }

    pub fn show_snapshot(&self, snapshot_idx: usize) -> Result<String> {
        let snapshot_file = self.snapshot_file(snapshot_idx);
        if !snapshot_file.exists() {
            bail!("{snapshot_file:?} does not exist");
        }

        let analyzer = Analyzer::new(self.cfg.clone()).context("failed to construct analyzer")?;
        let report = analyzer
            .analyze_file(&snapshot_file)
            .context("failed to analyze snapshot")?;
        Ok(render(&report))
    }

    pub fn clean_reports(&self) -> Result<()> {
        let report_files = self
            .find_files("report-*.json")
            .context("failed to find report files")?;
        for report_file in report_files {
            fs::remove_file(&report_file)
                .with_context(|| format!("failed to remove {report_file:?}"))?;
            log::info!("removed {report_file:?}");
        }
        Ok(())
    }

    fn find_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.data_dir.join(pattern);
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to glob files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        Ok(files)
    }

    fn snapshot_file(&self, snapshot_idx: usize) -> PathBuf {
        self.data_dir.join(format!("snapshot-{snapshot_idx:04}.json"))
    }

    /// `report-<name>.json` next to `snapshot-<name>.json`.
    fn report_file(&self, snapshot_file: &Path) -> Result<PathBuf> {
        let name = snapshot_file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.strip_prefix("snapshot-"))
            .with_context(|| format!("{snapshot_file:?} is not a snapshot file"))?;
        Ok(self.data_dir.join(format!("report-{name}.json")))
    }
}
