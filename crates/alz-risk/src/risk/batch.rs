use std::io::{Read, Write};

use serde::Serialize;
use tracing::warn;

use super::classifier::RiskClassifier;
use super::coercion::RawInputRecord;
use super::pipeline::RiskPipeline;

/// File-level failures; per-row pipeline errors are written to the output instead.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read or write batch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid batch CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("batch header lists column {column} more than once")]
    DuplicateColumn { column: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub scored: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
struct BatchRow<'a> {
    row: usize,
    probability: Option<f64>,
    tier: Option<&'static str>,
    error: Option<&'a str>,
}

/// Scores every record of a CSV whose header row names the input fields.
///
/// Output columns are `row,probability,tier,error`; rows are numbered from 1.
pub fn score_csv<C, R, W>(
    pipeline: &RiskPipeline<C>,
    reader: R,
    writer: W,
) -> Result<BatchSummary, BatchError>
where
    C: RiskClassifier,
    R: Read,
    W: Write,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut summary = BatchSummary::default();

    let headers = csv_reader.headers()?.clone();
    for (index, column) in headers.iter().enumerate() {
        if headers.iter().take(index).any(|earlier| earlier == column) {
            return Err(BatchError::DuplicateColumn {
                column: column.to_string(),
            });
        }
    }

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let raw: RawInputRecord = headers.iter().zip(record.iter()).collect();

        match pipeline.assess(&raw) {
            Ok(assessment) => {
                summary.scored += 1;
                csv_writer.serialize(BatchRow {
                    row,
                    probability: Some(assessment.probability),
                    tier: Some(assessment.tier.label()),
                    error: None,
                })?;
            }
            Err(err) => {
                summary.failed += 1;
                warn!(row, error = %err, "batch row rejected");
                let message = err.to_string();
                csv_writer.serialize(BatchRow {
                    row,
                    probability: None,
                    tier: None,
                    error: Some(&message),
                })?;
            }
        }
    }

    csv_writer.flush()?;
    Ok(summary)
}
