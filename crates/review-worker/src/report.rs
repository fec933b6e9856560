//! Review results: accumulation, summary and CSV/JSON export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use go_core::{Color, GameMetadata};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::ReviewError;
use crate::reviewer::PlyRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// One exported row. Field order is the column order of the CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlyRow {
    pub move_number: u32,
    pub color: Color,
    pub human_move: String,
    pub engine_move: String,
    pub human_win_rate: f64,
    pub engine_win_rate: f64,
    pub human_visit_share: f64,
    pub engine_visit_share: f64,
    pub human_lcb: f64,
    pub engine_lcb: f64,
    pub requery_escalated: bool,
}

impl From<&PlyRecord> for PlyRow {
    fn from(r: &PlyRecord) -> Self {
        Self {
            move_number: r.move_number,
            color: r.color,
            human_move: r.human_move.to_string(),
            engine_move: r.engine_move.to_string(),
            human_win_rate: r.human.win_rate,
            engine_win_rate: r.engine.win_rate,
            human_visit_share: r.human.visit_share,
            engine_visit_share: r.engine.visit_share,
            human_lcb: r.human.lcb,
            engine_lcb: r.engine.lcb,
            requery_escalated: r.requery_escalated,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub reviewed: usize,
    /// Plies where the engine's first choice was the human move.
    pub agreed: usize,
    pub escalated: usize,
}

/// Entropy (nats) of the human and engine win rates taken as one two-outcome
/// distribution, rounded to four decimals. Zero when both rates are zero.
pub fn win_rate_entropy(human: f64, engine: f64) -> f64 {
    let total = human + engine;
    if total <= 0.0 {
        return 0.0;
    }
    let h: f64 = [human, engine]
        .iter()
        .map(|&x| x / total)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.ln())
        .sum();
    (h * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Serialize)]
struct JsonMove {
    #[serde(flatten)]
    row: PlyRow,
    entropy: f64,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    metadata: &'a GameMetadata,
    summary: ReviewSummary,
    moves: Vec<JsonMove>,
}

/// Records of one game, in ply order.
#[derive(Debug, Clone)]
pub struct GameReview {
    pub metadata: GameMetadata,
    pub records: Vec<PlyRecord>,
}

impl GameReview {
    pub fn new(metadata: GameMetadata) -> Self {
        Self {
            metadata,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: PlyRecord) {
        self.records.push(record);
    }

    pub fn rows(&self) -> Vec<PlyRow> {
        self.records.iter().map(PlyRow::from).collect()
    }

    pub fn summary(&self) -> ReviewSummary {
        ReviewSummary {
            reviewed: self.records.len(),
            agreed: self
                .records
                .iter()
                .filter(|r| r.human_move == r.engine_move)
                .count(),
            escalated: self.records.iter().filter(|r| r.requery_escalated).count(),
        }
    }

    pub fn write_csv<W: Write>(&self, out: W) -> Result<(), ReviewError> {
        let mut writer = csv::Writer::from_writer(out);
        for row in self.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_json<W: Write>(&self, out: W) -> Result<(), ReviewError> {
        let report = JsonReport {
            metadata: &self.metadata,
            summary: self.summary(),
            moves: self
                .rows()
                .into_iter()
                .map(|row| JsonMove {
                    entropy: win_rate_entropy(row.human_win_rate, row.engine_win_rate),
                    row,
                })
                .collect(),
        };
        serde_json::to_writer_pretty(out, &report)?;
        Ok(())
    }

    pub fn save(&self, path: &Path, format: OutputFormat) -> Result<(), ReviewError> {
        let mut out = BufWriter::new(File::create(path)?);
        match format {
            OutputFormat::Csv => self.write_csv(&mut out)?,
            OutputFormat::Json => self.write_json(&mut out)?,
        }
        out.flush()?;
        Ok(())
    }

    /// Save whatever was reviewed, then return the review's own outcome.
    /// A pipeline error takes precedence over a save error; both are logged.
    pub fn finish(
        &self,
        outcome: Result<(), ReviewError>,
        path: &Path,
        format: OutputFormat,
    ) -> Result<(), ReviewError> {
        if let Err(e) = &outcome {
            error!(error = %e, reviewed = self.records.len(), "Review aborted");
        }

        match self.save(path, format) {
            Ok(()) => {
                let summary = self.summary();
                info!(
                    reviewed = summary.reviewed,
                    agreed = summary.agreed,
                    escalated = summary.escalated,
                    output = %path.display(),
                    "Review written"
                );
                outcome
            }
            Err(save) => {
                error!(error = %save, output = %path.display(), "Failed to write review");
                outcome.and(Err(save))
            }
        }
    }
}
