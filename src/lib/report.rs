//! Assembly of the distance matrix, collision list, and summary into a renderable result.
//!
//! The report is the boundary handed to whatever presents results to the user: the CLI
//! renders the text tables, and all three views are writable to CSV files.
#![forbid(unsafe_code)]

use std::path::Path;

use anyhow::{Context, Result};
use fgoxide::io::{DelimFile, Io};
use itertools::Itertools;

use crate::collision::{
    find_collisions, summarize, CollisionPair, CollisionSummary, RiskThresholds,
};
use crate::distance::{DistanceError, DistanceMatrix};
use crate::sequence::Sequence;

/// The file name for the collision pair report.
pub const COLLISIONS_FILE_NAME: &str = "collisions.csv";
/// The file name for the collision summary.
pub const SUMMARY_FILE_NAME: &str = "summary.csv";
/// The file name for the distance matrix.
pub const MATRIX_FILE_NAME: &str = "distance_matrix.csv";

/// The complete derived result for one sequence set.
///
/// Built once per submission and immutable thereafter; every view is recomputed from the
/// input sequences, never cached across submissions.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// The sequences the report was computed over.
    pub sequences: Vec<Sequence>,
    /// The all-pairs distance matrix.
    pub matrix: DistanceMatrix,
    /// The colliding pairs, ascending by distance.
    pub collisions: Vec<CollisionPair>,
    /// Aggregate counts over the collision list.
    pub summary: CollisionSummary,
    /// The collision threshold the report was built with.
    pub threshold: usize,
}

impl AnalysisReport {
    /// Run the full analysis over one sequence set.
    ///
    /// Fails only when the sequences are not all the same length, in which case nothing is
    /// derived.
    pub fn build(
        sequences: Vec<Sequence>,
        threshold: usize,
        thresholds: RiskThresholds,
    ) -> Result<Self, DistanceError> {
        let matrix = DistanceMatrix::build(&sequences)?;
        let collisions = find_collisions(&sequences, &matrix, threshold, thresholds);
        let summary = summarize(&collisions);
        Ok(Self { sequences, matrix, collisions, summary, threshold })
    }

    /// The display identifier of each sequence, in set order.
    pub fn labels(&self) -> Vec<String> {
        self.sequences.iter().map(Sequence::identifier).collect()
    }

    /// The distance matrix as an aligned text table.
    pub fn matrix_table(&self) -> String {
        let labels = self.labels();
        let width = labels.iter().map(String::len).max().unwrap_or(0).max(3);

        let mut lines = vec![];
        let header =
            labels.iter().map(|l| format!("{:>width$}", l, width = width)).join("  ");
        lines.push(format!("{:>width$}  {}", "", header, width = width));
        for (i, label) in labels.iter().enumerate() {
            let row = self
                .matrix
                .row(i)
                .iter()
                .map(|d| format!("{:>width$}", d, width = width))
                .join("  ");
            lines.push(format!("{:>width$}  {}", label, row, width = width));
        }
        lines.join("\n")
    }

    /// The collision list as an aligned text table, or `None` when there are no collisions.
    pub fn collision_table(&self) -> Option<String> {
        if self.collisions.is_empty() {
            return None;
        }

        let header = ["Sequence_1", "Bases_1", "Sequence_2", "Bases_2", "Distance", "Risk"];
        let rows: Vec<[String; 6]> = self
            .collisions
            .iter()
            .map(|pair| {
                [
                    pair.id_a.clone(),
                    pair.bases_a.clone(),
                    pair.id_b.clone(),
                    pair.bases_b.clone(),
                    pair.distance.to_string(),
                    pair.tier.to_string(),
                ]
            })
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|col| {
                rows.iter()
                    .map(|row| row[col].len())
                    .chain(std::iter::once(header[col].len()))
                    .max()
                    .unwrap()
            })
            .collect();

        let render = |cells: &[String]| {
            cells
                .iter()
                .zip(widths.iter())
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .join("  ")
                .trim_end()
                .to_string()
        };

        let header: Vec<String> = header.iter().map(ToString::to_string).collect();
        let mut lines = vec![render(&header)];
        lines.extend(rows.iter().map(|row| render(row)));
        Some(lines.join("\n"))
    }

    /// Headline counters for the report.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Collision pairs (distance <= {}): {}", self.threshold, self.summary.total_pairs),
            format!("Critical pairs: {}", self.summary.critical_pairs),
            format!("Warning pairs: {}", self.summary.warning_pairs),
            format!(
                "Sequences involved in collisions: {} of {}",
                self.summary.sequences_involved,
                self.sequences.len()
            ),
        ]
    }

    /// Write the collision list, summary, and distance matrix as CSVs into `dir`.
    pub fn write_csvs<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();

        let collisions_path = dir.join(COLLISIONS_FILE_NAME);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .from_path(&collisions_path)
            .with_context(|| format!("Could not create {}", collisions_path.display()))?;
        for pair in &self.collisions {
            writer.serialize(pair)?;
        }
        writer.flush()?;

        let delim = DelimFile::default();
        delim
            .write_csv(&dir.join(SUMMARY_FILE_NAME), std::iter::once(self.summary.clone()))
            .context("Could not write the collision summary")?;

        let labels = self.labels();
        let mut lines = vec![format!(",{}", labels.iter().join(","))];
        for (i, label) in labels.iter().enumerate() {
            lines.push(format!("{},{}", label, self.matrix.row(i).iter().join(",")));
        }
        let io = Io::default();
        io.write_lines(&dir.join(MATRIX_FILE_NAME), lines)
            .context("Could not write the distance matrix")?;

        Ok(())
    }
}
