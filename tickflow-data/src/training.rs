//! Incremental-training bookkeeping.
//!
//! Each collector run drops one dataset file into the data directory; a
//! training cycle consumes only the files it has not seen before, tracked in
//! a persistent [`TrainedFilesLog`]. The log is an explicit injected value,
//! never process-wide state, and is committed atomically only after the
//! training pass succeeds: a crash mid-training leaves it unmodified so the
//! next run reprocesses the same files instead of silently skipping them.

use crate::{
    dataset::Dataset,
    error::DataError,
    window::{TrainingPair, training_pairs},
};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Persistent set of dataset file names already consumed by training.
///
/// Stored as one file name per line. [`commit`](Self::commit) writes the
/// whole set to a sibling temp file and renames it over the log, so the
/// on-disk state is always either the old set or the new one, never a torn
/// write.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TrainedFilesLog {
    path: PathBuf,
    files: BTreeSet<String>,
}

impl TrainedFilesLog {
    /// Read the log at `path`; a missing file is an empty set, not an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, DataError> {
        let path = path.into();
        let files = match std::fs::read_to_string(&path) {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(error) => return Err(error.into()),
        };

        Ok(Self { path, files })
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.contains(file_name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Add `new_files` to the set and persist it, all-or-nothing.
    pub fn commit<I>(&mut self, new_files: I) -> Result<(), DataError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.files.extend(new_files.into_iter().map(Into::into));

        let mut encoded = self
            .files
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        encoded.push('\n');

        let temp_path = self.path.with_extension("log.tmp");
        std::fs::write(&temp_path, encoded)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// Training-pass seam: consumes prepared pairs, succeeds or fails as a whole.
///
/// The model framework behind it is out of scope; the pipeline only needs to
/// know whether the pass completed so it can decide to commit the log.
pub trait Trainer {
    fn train(&mut self, pairs: &[TrainingPair]) -> Result<(), DataError>;
}

/// Outcome of one training cycle.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TrainingReport {
    /// Dataset files consumed this cycle, in the order they were read.
    pub files_consumed: Vec<String>,
    /// Training pairs handed to the trainer.
    pub pair_count: usize,
}

/// Scale `series` into `[0, 1]` by its own min and max, matching the
/// normalisation the model was trained with. A constant series maps to all
/// zeros rather than dividing by zero.
pub fn min_max_normalize(series: &[f64]) -> Vec<f64> {
    let Some(min) = series.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = series.iter().copied().fold(min, f64::max);
    let span = max - min;

    if span == 0.0 {
        return vec![0.0; series.len()];
    }

    series.iter().map(|value| (value - min) / span).collect()
}

/// Run one training cycle over the data directory.
///
/// Scans `data_dir` for `*.csv` files in sorted name order, skips the ones
/// already in `log`, concatenates the candle close series of the rest,
/// normalises it, windows it into pairs of `window_capacity`, and hands them
/// to `trainer`. The log is committed only after the trainer returns `Ok`.
/// A file that fails to parse degrades to an empty contribution with a
/// logged warning and is still marked consumed, mirroring how side channels
/// degrade during fetch.
pub fn run_training_cycle<T>(
    data_dir: &Path,
    log: &mut TrainedFilesLog,
    window_capacity: usize,
    trainer: &mut T,
) -> Result<TrainingReport, DataError>
where
    T: Trainer,
{
    let mut file_names: Vec<String> = std::fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|extension| extension == "csv"))
        .filter_map(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(String::from)
        })
        .collect();
    file_names.sort();

    let new_files: Vec<String> = file_names
        .into_iter()
        .filter(|name| !log.contains(name))
        .collect();

    if new_files.is_empty() {
        info!(data_dir = %data_dir.display(), "no new dataset files, skipping training");
        return Ok(TrainingReport::default());
    }

    let mut series = Vec::new();
    for file_name in &new_files {
        let path = data_dir.join(file_name);
        match Dataset::read_csv(&path) {
            Ok(dataset) => series.extend(dataset.close_series()),
            Err(error) => {
                warn!(file = file_name, %error, "skipping unreadable dataset file");
            }
        }
    }

    let normalized = min_max_normalize(&series);
    let pairs = training_pairs(&normalized, window_capacity);

    info!(
        files = new_files.len(),
        series_len = series.len(),
        pairs = pairs.len(),
        "prepared training pairs"
    );

    trainer.train(&pairs)?;
    log.commit(new_files.iter().cloned())?;

    Ok(TrainingReport {
        files_consumed: new_files,
        pair_count: pairs.len(),
    })
}
