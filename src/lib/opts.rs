#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;

use crate::collision::RiskThresholds;
use crate::parse::InputFormat;

pub static TOOL_NAME: &str = "bccheck";

static SHORT_USAGE: &str = "Checks a set of sample barcodes for Hamming-distance collisions.";

static LONG_USAGE: &str = "
Checks a set of sample barcodes for Hamming-distance collisions.

The input may be plain text with one sequence per line (an optional `label:` prefix is
stripped) or a FASTA file (`>header` lines followed by sequence lines; multi-line
sequences are concatenated).  Files ending in `.fasta` or `.fa` are treated as FASTA
unless --format is given.

All sequences must have the same length.  Every pair of sequences whose Hamming distance
falls at or below --max-collision-distance is reported as a collision, tiered as CRITICAL
(distance <= 1) or WARNING (distance <= 3) by default.

Example invocation:

bccheck --input barcodes.txt --output-dir report/
";

#[derive(Parser, Debug, Clone)]
#[clap(name = TOOL_NAME, version, about = SHORT_USAGE, long_about = LONG_USAGE, term_width = 0)]
pub struct Opts {
    /// Path to the input sequences (plain text or FASTA).
    #[clap(long, short = 'i', display_order = 1)]
    pub input: PathBuf,

    /// Override the input format inferred from the file name suffix.
    ///
    /// [default: None]
    #[clap(long, short = 'f', possible_values = InputFormat::possible_values(), display_order = 2)]
    pub format: Option<InputFormat>,

    /// Max Hamming distance at which a pair of sequences is reported as a collision.
    #[clap(long, short = 'd', default_value = "2", display_order = 11)]
    pub max_collision_distance: usize,

    /// Max distance classified as CRITICAL.
    #[clap(long, default_value = "1", display_order = 11)]
    pub critical_max: usize,

    /// Max distance classified as WARNING; greater distances are SAFE.
    #[clap(long, default_value = "3", display_order = 11)]
    pub warning_max: usize,

    /// The directory to write the collision report, summary, and distance matrix as CSVs.
    ///
    /// This tool will overwrite existing files.
    ///
    /// [default: None]
    #[clap(long, short = 'o', display_order = 21)]
    pub output_dir: Option<PathBuf>,
}

impl Opts {
    /// Extract the [`RiskThresholds`] from the CLI opts.
    pub fn thresholds(&self) -> RiskThresholds {
        RiskThresholds { critical_max: self.critical_max, warning_max: self.warning_max }
    }
}

/// Implement defaults that match the CLI options to allow for easier testing.
///
/// Note that these defaults exist only within test code.
#[cfg(test)]
impl Default for Opts {
    fn default() -> Self {
        use crate::collision::DEFAULT_COLLISION_THRESHOLD;

        let thresholds = RiskThresholds::default();
        Self {
            input: PathBuf::default(),
            format: None,
            max_collision_distance: DEFAULT_COLLISION_THRESHOLD,
            critical_max: thresholds.critical_max,
            warning_max: thresholds.warning_max,
            output_dir: None,
        }
    }
}

/// Parse args and set up logging.
pub fn setup() -> Opts {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    Opts::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_from_opts() {
        let opts = Opts { critical_max: 2, warning_max: 4, ..Opts::default() };
        assert_eq!(opts.thresholds(), RiskThresholds { critical_max: 2, warning_max: 4 });
    }

    #[test]
    fn test_defaults_match_documented_constants() {
        let opts = Opts::default();
        assert_eq!(opts.max_collision_distance, 2);
        assert_eq!(opts.thresholds(), RiskThresholds::default());
    }
}
