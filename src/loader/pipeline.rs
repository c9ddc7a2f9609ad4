use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, info_span, instrument};
use uuid::Uuid;

use crate::loader::aggregator::ShipmentAggregator;
use crate::loader::config::LoaderConfig;
use crate::loader::error::Result;
use crate::loader::io::csv_read::{ProductRow, ShipmentRow, open_rows};
use crate::loader::io::store::ShipmentStore;
use crate::loader::model::{ShipmentIndex, Stage};
use crate::loader::registrar::{ProductRegistrar, Registration};

/// What happened while a stage consumed its input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub input: PathBuf,
    /// Data rows read, header excluded.
    pub rows_read: usize,
    /// Products added (stage 1) or shipment records written (stage 2).
    pub records_written: usize,
    /// Product rows whose name was already in the catalog.
    pub duplicates: usize,
    /// Product names that could not be resolved during aggregation.
    pub unresolved: usize,
    /// Catalog or shipment writes that failed and were skipped.
    pub failed: usize,
    /// Set when the stage stopped before the end of its input.
    pub error: Option<String>,
}

impl StageReport {
    fn new(stage: Stage, input: &Path) -> Self {
        Self {
            stage,
            input: input.to_path_buf(),
            rows_read: 0,
            records_written: 0,
            duplicates: 0,
            unresolved: 0,
            failed: 0,
            error: None,
        }
    }

    /// True when the stage read its whole input and skipped nothing.
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.unresolved == 0 && self.failed == 0
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {}: {} rows, {} written, {} duplicates, {} unresolved, {} failed",
            self.stage,
            self.input.display(),
            self.rows_read,
            self.records_written,
            self.duplicates,
            self.unresolved,
            self.failed
        )?;
        if let Some(error) = &self.error {
            write!(f, " (aborted: {error})")?;
        }
        Ok(())
    }
}

/// Result of a full clear + load run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    pub fn is_clean(&self) -> bool {
        self.stages.iter().all(StageReport::is_clean)
    }

    /// One line per stage that did not finish cleanly.
    pub fn problems(&self) -> Vec<String> {
        self.stages
            .iter()
            .filter(|report| !report.is_clean())
            .map(ToString::to_string)
            .collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {}", self.run_id)?;
        for stage in &self.stages {
            writeln!(f, "  {stage}")?;
        }
        Ok(())
    }
}

/// Removes every shipment record and product so a run starts from empty
/// tables.
pub fn clear<S: ShipmentStore>(store: &mut S) -> Result<()> {
    store.clear()?;
    info!("cleared product and shipment tables");
    Ok(())
}

/// Clears the store and runs both stages against the inputs named by
/// `config`. Stage failures end up in the report; only clearing the store or
/// an unusable configuration fails the run itself.
pub fn run<S: ShipmentStore>(store: &mut S, config: &LoaderConfig) -> Result<RunReport> {
    config.validate()?;
    let delimiter = config.delimiter_byte()?;
    let run_id = Uuid::new_v4();
    let span = info_span!("load_run", %run_id, data_dir = %config.data_dir.display());
    let _entered = span.enter();

    clear(store)?;
    let (index, products) =
        run_products_stage(store, &config.stage_path(Stage::Products), delimiter);
    info!(shipments = index.shipment_count(), "shipment index built");
    let shipments =
        run_shipments_stage(store, index, &config.stage_path(Stage::Shipments), delimiter);

    Ok(RunReport {
        run_id,
        stages: vec![products, shipments],
    })
}

/// Stage 1: registers every product row and returns the shipment index built
/// from them, even when the stage stops early.
#[instrument(
    level = "info",
    skip_all,
    fields(stage = %Stage::Products, input = %input.display())
)]
pub fn run_products_stage<S: ShipmentStore>(
    store: &mut S,
    input: &Path,
    delimiter: u8,
) -> (ShipmentIndex, StageReport) {
    let mut report = StageReport::new(Stage::Products, input);
    let mut registrar = ProductRegistrar::new(store);
    let result = register_rows(&mut registrar, input, delimiter, &mut report);
    finish_stage(&mut report, result);
    (registrar.into_index(), report)
}

/// Stage 2: aggregates the indexed products of every shipment row.
#[instrument(
    level = "info",
    skip_all,
    fields(stage = %Stage::Shipments, input = %input.display())
)]
pub fn run_shipments_stage<S: ShipmentStore>(
    store: &mut S,
    index: ShipmentIndex,
    input: &Path,
    delimiter: u8,
) -> StageReport {
    let mut report = StageReport::new(Stage::Shipments, input);
    let mut aggregator = ShipmentAggregator::new(store, index);
    let result = aggregate_rows(&mut aggregator, input, delimiter, &mut report);
    finish_stage(&mut report, result);
    report
}

fn register_rows<S: ShipmentStore>(
    registrar: &mut ProductRegistrar<'_, S>,
    input: &Path,
    delimiter: u8,
    report: &mut StageReport,
) -> Result<()> {
    let rows = open_rows::<ProductRow>(input, delimiter)?;
    announce_stage(Stage::Products, input);

    for row in rows {
        let row = row?;
        report.rows_read += 1;
        match registrar.register(&row.shipment_id, &row.product_name) {
            Registration::Added => report.records_written += 1,
            Registration::AlreadyKnown => report.duplicates += 1,
            Registration::CatalogFailed => report.failed += 1,
        }
    }
    Ok(())
}

fn aggregate_rows<S: ShipmentStore>(
    aggregator: &mut ShipmentAggregator<'_, S>,
    input: &Path,
    delimiter: u8,
    report: &mut StageReport,
) -> Result<()> {
    let rows = open_rows::<ShipmentRow>(input, delimiter)?;
    announce_stage(Stage::Shipments, input);

    for row in rows {
        let row = row?;
        report.rows_read += 1;
        let outcome = aggregator.aggregate(&row.shipment_id, &row.origin, &row.destination)?;
        report.records_written += outcome.written;
        report.unresolved += outcome.unresolved;
        report.failed += outcome.failed;
    }
    Ok(())
}

fn announce_stage(stage: Stage, input: &Path) {
    info!(
        handler = stage.handler_name(),
        "writing {} to the shipment database",
        input.display()
    );
}

fn finish_stage(report: &mut StageReport, result: Result<()>) {
    match result {
        Ok(()) => info!(
            rows = report.rows_read,
            written = report.records_written,
            unresolved = report.unresolved,
            failed = report.failed,
            "{} dump complete",
            report.input.display()
        ),
        Err(err) => {
            error!(error = %err, rows = report.rows_read, "stage aborted");
            report.error = Some(err.to_string());
        }
    }
}
