//! The application flow: read input, parse, analyze, render, and optionally write CSVs.
#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::opts::Opts;
use crate::parse::{parse_with_format, InputFormat, ParsedInput};
use crate::report::AnalysisReport;

/// Run the collision check end to end.
///
/// Parse diagnostics are surfaced as warnings and do not abort the run; an input with no
/// valid sequences succeeds with nothing to analyze.  The one fatal analysis condition is
/// a sequence set with differing lengths, which aborts before any result is derived.
pub fn run(opts: Opts) -> Result<()> {
    let format = opts.format.unwrap_or_else(|| {
        let name =
            opts.input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        InputFormat::from_file_name(&name)
    });

    let parsed = read_and_parse(&opts.input, format)?;
    for diagnostic in &parsed.diagnostics {
        warn!("{}", diagnostic);
    }

    if parsed.sequences.is_empty() {
        info!("No valid sequences found in {}: nothing to analyze", opts.input.display());
        return Ok(());
    }
    info!(
        "Found {} valid sequence(s) in {} ({:?} format)",
        parsed.sequences.len(),
        opts.input.display(),
        format
    );

    let report =
        AnalysisReport::build(parsed.sequences, opts.max_collision_distance, opts.thresholds())
            .context("Could not analyze the sequence set")?;

    println!("Distance matrix:");
    println!("{}", report.matrix_table());
    println!();
    match report.collision_table() {
        Some(table) => {
            println!("Collisions:");
            println!("{}", table);
        }
        None => println!(
            "No collisions detected: all pairs are more than {} mismatches apart",
            report.threshold
        ),
    }
    println!();
    for line in report.summary_lines() {
        println!("{}", line);
    }

    if let Some(output_dir) = &opts.output_dir {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Could not create {}", output_dir.display()))?;
        report.write_csvs(output_dir)?;
        info!("Wrote reports to {}", output_dir.display());
    }

    Ok(())
}

/// Read the input fully buffered and parse it in the given format.
///
/// A file that cannot be decoded as UTF-8 text is reported and yields an empty parse, not
/// an error; a file that cannot be read at all is an error.
fn read_and_parse(path: &Path, format: InputFormat) -> Result<ParsedInput> {
    let bytes =
        fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(parse_with_format(&text, format)),
        Err(_) => {
            warn!("Input {} is not valid UTF-8 text; no sequences read", path.display());
            Ok(ParsedInput::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use fgoxide::io::{DelimFile, Io};
    use matches::assert_matches;
    use tempfile::tempdir;

    use super::*;
    use crate::collision::CollisionPair;
    use crate::report::COLLISIONS_FILE_NAME;

    #[test]
    fn test_run_freeform_end_to_end() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("barcodes.txt");
        let output = dir.path().join("report");
        let io = Io::default();
        io.write_lines(&input, vec!["Seq1: ATGCATGC", "ATGGATGC", "TTGCATGC"]).unwrap();

        let opts =
            Opts { input, output_dir: Some(output.clone()), ..Opts::default() };
        run(opts).unwrap();

        let delim = DelimFile::default();
        let collisions: Vec<CollisionPair> =
            delim.read_csv(&output.join(COLLISIONS_FILE_NAME)).unwrap();
        assert_eq!(collisions.len(), 3);
        assert_eq!(collisions[0].id_a, "Seq1");
        assert_eq!(collisions[0].distance, 1);
    }

    #[test]
    fn test_run_fasta_end_to_end() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("barcodes.fasta");
        let output = dir.path().join("report");
        fs::write(&input, ">s1\nATGC\n>s2\nAT\nGC\n").unwrap();

        let opts =
            Opts { input, output_dir: Some(output.clone()), ..Opts::default() };
        run(opts).unwrap();

        let delim = DelimFile::default();
        let collisions: Vec<CollisionPair> =
            delim.read_csv(&output.join(COLLISIONS_FILE_NAME)).unwrap();
        // The two records concatenate to identical ATGC sequences.
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].distance, 0);
    }

    #[test]
    fn test_run_empty_input_is_not_an_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        fs::write(&input, "").unwrap();

        let opts = Opts { input, ..Opts::default() };
        assert_matches!(run(opts), Ok(()));
    }

    #[test]
    fn test_run_non_utf8_input_is_reported_not_fatal() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("binary.txt");
        fs::write(&input, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let opts = Opts { input, ..Opts::default() };
        assert_matches!(run(opts), Ok(()));
    }

    #[test]
    fn test_run_missing_input_is_an_error() {
        let opts = Opts { input: "/no/such/file".into(), ..Opts::default() };
        assert!(run(opts).is_err());
    }

    #[test]
    fn test_run_length_mismatch_aborts_with_lengths() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("barcodes.txt");
        fs::write(&input, "ATGC\nATGCA\n").unwrap();

        let opts = Opts { input, ..Opts::default() };
        let err = run(opts).unwrap_err();
        assert!(format!("{:#}", err).contains("[4, 5]"));
    }

    #[test]
    fn test_run_format_override_beats_suffix() {
        let dir = tempdir().unwrap();
        // FASTA content in a .txt file; without the override the header line would be
        // dropped with a diagnostic and the bases kept per-line.
        let input = dir.path().join("barcodes.txt");
        let output = dir.path().join("report");
        fs::write(&input, ">s1\nATGC\n>s2\nGTGC\n").unwrap();

        let opts = Opts {
            input,
            format: Some(InputFormat::Fasta),
            output_dir: Some(output.clone()),
            ..Opts::default()
        };
        run(opts).unwrap();

        let delim = DelimFile::default();
        let collisions: Vec<CollisionPair> =
            delim.read_csv(&output.join(COLLISIONS_FILE_NAME)).unwrap();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].id_a, "s1");
        assert_eq!(collisions[0].id_b, "s2");
        assert_eq!(collisions[0].distance, 1);
    }
}
