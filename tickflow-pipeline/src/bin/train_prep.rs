//! Training preparation binary: incremental cycle over new dataset files.
//!
//! Scans the data directory for dataset files not yet in the trained-files
//! log, prepares normalised training pairs from their candle close prices and
//! exports the pairs as one delimited file for the external model framework.
//! The log is committed only after the export succeeds, so an interrupted run
//! reprocesses the same files next time.

use std::path::PathBuf;
use tickflow_data::{
    error::DataError,
    training::{run_training_cycle, TrainedFilesLog, Trainer},
    window::TrainingPair,
};
use tickflow_pipeline::{init_logging, PipelineConfig};
use tracing::{error, info};

/// [`Trainer`] that exports the prepared pairs as a CSV table, one row per
/// pair: the window values in order, then the target.
struct CsvPairExporter {
    path: PathBuf,
}

impl Trainer for CsvPairExporter {
    fn train(&mut self, pairs: &[TrainingPair]) -> Result<(), DataError> {
        let Some(first) = pairs.first() else {
            info!("no training pairs to export");
            return Ok(());
        };

        let mut writer = csv::Writer::from_path(&self.path)?;

        let mut header: Vec<String> = (0..first.window.len())
            .map(|index| format!("x{index}"))
            .collect();
        header.push("target".to_string());
        writer.write_record(&header)?;

        for pair in pairs {
            let mut row: Vec<String> = pair.window.iter().map(f64::to_string).collect();
            row.push(pair.target.to_string());
            writer.write_record(&row)?;
        }

        writer.flush()?;
        info!(pairs = pairs.len(), path = %self.path.display(), "training pairs exported");
        Ok(())
    }
}

fn main() {
    init_logging();

    let config = PipelineConfig::from_env();
    info!(
        data_dir = %config.data_dir.display(),
        window_capacity = config.window_capacity,
        "starting training preparation cycle"
    );

    if let Err(error) = run(&config) {
        error!(%error, "training preparation failed");
        std::process::exit(1);
    }
}

fn run(config: &PipelineConfig) -> Result<(), DataError> {
    let mut log = TrainedFilesLog::load(config.trained_files_log_path())?;
    let mut exporter = CsvPairExporter {
        path: config.data_dir.join("training_pairs.csv"),
    };

    let report = run_training_cycle(
        &config.data_dir,
        &mut log,
        config.window_capacity,
        &mut exporter,
    )?;

    info!(
        files_consumed = report.files_consumed.len(),
        pairs = report.pair_count,
        "training preparation cycle complete"
    );
    Ok(())
}
