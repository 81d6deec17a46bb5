//! On-disk storage of indicator rows as CSV or Feather (Arrow IPC) files.

use std::{
    fmt,
    fs::{self, File},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    ipc::writer::FileWriter,
    record_batch::RecordBatch,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    render::ScoreRow,
};

pub const FILE_PREFIX: &str = "fair_eva_results";

pub const COLUMNS: [&str; 4] = ["fair_indicator", "fair_principle", "score", "message"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Feather,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Feather => "feather",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "feather" => Ok(OutputFormat::Feather),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
struct PersistedRow<'a> {
    fair_indicator: &'a str,
    fair_principle: &'a str,
    score: f64,
    message: &'a str,
}

/// Writes score rows to `fair_eva_results-<identifier>.<ext>` under a fixed directory.
#[derive(Debug, Clone)]
pub struct ResultPersister {
    output_dir: PathBuf,
}

impl ResultPersister {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn file_path(&self, identifier: &str, format: OutputFormat) -> PathBuf {
        let file_name = format!(
            "{}-{}.{}",
            FILE_PREFIX,
            sanitize(identifier),
            format.extension()
        );
        self.output_dir.join(file_name)
    }

    /// Parses `format` before touching the filesystem, then persists.
    pub fn persist(&self, identifier: &str, rows: &[ScoreRow], format: &str) -> Result<PathBuf> {
        let format = format.parse::<OutputFormat>()?;
        self.persist_as(identifier, rows, format)
    }

    pub fn persist_as(
        &self,
        identifier: &str,
        rows: &[ScoreRow],
        format: OutputFormat,
    ) -> Result<PathBuf> {
        let records = coerce_scores(rows)?;
        debug!("Requested {} output format for {} rows", format, records.len());

        fs::create_dir_all(&self.output_dir)?;
        let path = self.file_path(identifier, format);
        match format {
            OutputFormat::Csv => write_csv(&path, &records)?,
            OutputFormat::Feather => write_feather(&path, &records)?,
        }

        info!("Stored FAIR assessment results to: {}", path.display());
        Ok(path)
    }
}

fn coerce_scores(rows: &[ScoreRow]) -> Result<Vec<PersistedRow<'_>>> {
    rows.iter()
        .map(|row| {
            let score = row
                .score
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidScore {
                    indicator: row.indicator_id.clone(),
                    value: row.score.clone(),
                })?;
            Ok(PersistedRow {
                fair_indicator: &row.indicator_id,
                fair_principle: &row.description,
                score,
                message: &row.message,
            })
        })
        .collect()
}

fn write_csv(path: &Path, records: &[PersistedRow<'_>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_feather(path: &Path, records: &[PersistedRow<'_>]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(COLUMNS[0], DataType::Utf8, false),
        Field::new(COLUMNS[1], DataType::Utf8, false),
        Field::new(COLUMNS[2], DataType::Float64, false),
        Field::new(COLUMNS[3], DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            records.iter().map(|r| r.fair_indicator).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            records.iter().map(|r| r.fair_principle).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            records.iter().map(|r| r.score).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            records.iter().map(|r| r.message).collect::<Vec<_>>(),
        )),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = File::create(path)?;
    let mut writer = FileWriter::try_new(file, &schema)?;
    writer.write(&batch)?;
    writer.finish()?;
    Ok(())
}

/// Keeps identifiers such as handle URLs from escaping the output directory.
fn sanitize(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
