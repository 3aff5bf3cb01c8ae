//! Extraction of validated sequences from free-form text or FASTA content.
//!
//! Parsing follows a partial-success model: every line (or FASTA record) that fails
//! validation is dropped, with free-form lines producing a [`ParseDiagnostic`] so no input
//! is ever silently swallowed.  The one documented exception is the permissive FASTA
//! convention that an invalid record is dropped without comment.
#![forbid(unsafe_code)]

use std::fmt::Display;

use anyhow::anyhow;
use clap::{ArgEnum, PossibleValue};

use crate::sequence::{is_valid_sequence, Sequence};

/// The number of characters of a rejected line retained in its diagnostic.
const DIAGNOSTIC_SNIPPET_LEN: usize = 50;

/// A per-line record of input that was rejected during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// The 1-based line number of the rejected input.
    pub line_number: usize,
    /// The rejected content, truncated to its first 50 characters.
    pub snippet: String,
}

impl ParseDiagnostic {
    fn new(line_number: usize, content: &str) -> Self {
        Self { line_number, snippet: content.chars().take(DIAGNOSTIC_SNIPPET_LEN).collect() }
    }
}

impl Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid sequence at line {}: {}", self.line_number, self.snippet)
    }
}

/// The outcome of one parse operation: the ordered set of valid sequences plus the
/// diagnostics for everything that was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInput {
    pub sequences: Vec<Sequence>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// The supported input flavors.
#[derive(ArgEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `>header` lines followed by sequence lines; multi-line sequences are concatenated.
    Fasta,
    /// One sequence per line with an optional `label:` prefix.
    Freeform,
}

impl InputFormat {
    pub fn possible_values<'a>() -> impl Iterator<Item = PossibleValue<'a>> {
        InputFormat::value_variants().iter().filter_map(ArgEnum::to_possible_value)
    }

    /// Infer the format from a file name suffix: `.fasta`/`.fa` are FASTA, anything else
    /// is treated as free-form text.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".fasta") || name.ends_with(".fa") {
            Self::Fasta
        } else {
            Self::Freeform
        }
    }
}

impl std::str::FromStr for InputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for variant in Self::value_variants() {
            if variant.to_possible_value().unwrap().matches(s, false) {
                return Ok(*variant);
            }
        }
        Err(anyhow!("Invalid variant: {}", s))
    }
}

/// Parse text in the given format.
pub fn parse_with_format(text: &str, format: InputFormat) -> ParsedInput {
    match format {
        InputFormat::Fasta => parse_fasta(text),
        InputFormat::Freeform => parse_freeform(text),
    }
}

/// Parse free-form text, one sequence per line.
///
/// For each non-blank line:
///
/// 1. If the line contains a colon, everything up to and including the first colon is
///    treated as a label and stripped off.
/// 2. Otherwise, if the line contains whitespace and is not itself a valid sequence, the
///    longest whitespace-separated token that validates is kept (first by position on a
///    length tie).
/// 3. The remaining candidate is validated; valid candidates are appended upper-cased,
///    invalid ones are dropped with a [`ParseDiagnostic`] carrying the 1-based line number.
pub fn parse_freeform(text: &str) -> ParsedInput {
    let mut parsed = ParsedInput::default();

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let mut label: Option<String> = None;
        let mut candidate = line;
        if let Some((prefix, rest)) = line.split_once(':') {
            let prefix = prefix.trim();
            if !prefix.is_empty() {
                label = Some(prefix.to_string());
            }
            candidate = rest.trim();
        } else if line.contains(char::is_whitespace) && !is_valid_sequence(line) {
            if let Some(token) = longest_valid_token(line) {
                candidate = token;
            }
        }

        if is_valid_sequence(candidate) {
            let ordinal = parsed.sequences.len();
            parsed.sequences.push(Sequence::new(candidate, label, ordinal));
        } else {
            parsed.diagnostics.push(ParseDiagnostic::new(line_number, candidate));
        }
    }

    parsed
}

/// The longest whitespace-separated token that validates as a sequence, or `None` if no
/// token does.  Ties on length keep the first token in reading order.
fn longest_valid_token(line: &str) -> Option<&str> {
    let mut best: Option<&str> = None;
    for token in line.split_whitespace() {
        if is_valid_sequence(token) && best.map_or(true, |b| token.len() > b.len()) {
            best = Some(token);
        }
    }
    best
}

/// Parse FASTA content.
///
/// Lines beginning with `>` are record headers that terminate the previous record's
/// accumulated sequence and start a new one; the last record is finalized at end of input.
/// Each record is validated as a whole and invalid records are dropped without a
/// diagnostic.  The first word of a header is retained as the record's label.
pub fn parse_fasta(text: &str) -> ParsedInput {
    let mut parsed = ParsedInput::default();
    let mut label: Option<String> = None;
    let mut accumulated = String::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if let Some(header) = line.strip_prefix('>') {
            finalize_fasta_record(&mut parsed, label.take(), &accumulated);
            accumulated.clear();
            label = header.split_whitespace().next().map(String::from);
        } else {
            accumulated.push_str(line);
        }
    }
    finalize_fasta_record(&mut parsed, label, &accumulated);

    parsed
}

fn finalize_fasta_record(parsed: &mut ParsedInput, label: Option<String>, accumulated: &str) {
    if !accumulated.is_empty() && is_valid_sequence(accumulated) {
        let ordinal = parsed.sequences.len();
        parsed.sequences.push(Sequence::new(accumulated, label, ordinal));
    }
}

#[cfg(test)]
mod tests {
    use bstr::BString;
    use rstest::rstest;

    use super::*;

    fn bases(parsed: &ParsedInput) -> Vec<BString> {
        parsed.sequences.iter().map(|s| s.bases.clone()).collect()
    }

    #[test]
    fn test_freeform_plain_lines() {
        let parsed = parse_freeform("ATGC\nGGCC\n");
        assert_eq!(bases(&parsed), vec![BString::from("ATGC"), BString::from("GGCC")]);
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_freeform_blank_lines_skipped() {
        let parsed = parse_freeform("\nATGC\n\n\nGGCC\n");
        assert_eq!(bases(&parsed), vec![BString::from("ATGC"), BString::from("GGCC")]);
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_freeform_mixed_labels_and_garbage() {
        let parsed = parse_freeform("Seq1: ATGC\nSeq2 ATGC\ngarbage!!\n");
        assert_eq!(bases(&parsed), vec![BString::from("ATGC"), BString::from("ATGC")]);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].line_number, 3);
        assert_eq!(parsed.diagnostics[0].snippet, "garbage!!");
    }

    #[test]
    fn test_freeform_colon_label_is_kept() {
        let parsed = parse_freeform("control: atgc\n");
        assert_eq!(parsed.sequences.len(), 1);
        assert_eq!(parsed.sequences[0].label.as_deref(), Some("control"));
        assert_eq!(parsed.sequences[0].bases, BString::from("ATGC"));
        assert_eq!(parsed.sequences[0].identifier(), "control");
    }

    #[test]
    fn test_freeform_longest_valid_token_wins() {
        let parsed = parse_freeform("foo ATG ATGCATGC bar\n");
        assert_eq!(bases(&parsed), vec![BString::from("ATGCATGC")]);
    }

    #[test]
    fn test_freeform_token_tie_keeps_first_by_position() {
        let parsed = parse_freeform("AAAA TTTT\n");
        assert_eq!(bases(&parsed), vec![BString::from("AAAA")]);
    }

    #[test]
    fn test_freeform_lowercase_is_normalized() {
        let parsed = parse_freeform("atgc\n");
        assert_eq!(bases(&parsed), vec![BString::from("ATGC")]);
    }

    #[test]
    fn test_freeform_diagnostic_snippet_truncated() {
        let long_line = "X".repeat(80);
        let parsed = parse_freeform(&long_line);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].snippet.len(), 50);
    }

    #[test]
    fn test_freeform_line_numbers_count_blank_lines() {
        let parsed = parse_freeform("ATGC\n\nnope!\n");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].line_number, 3);
    }

    #[test]
    fn test_fasta_multiline_records_concatenated() {
        let parsed = parse_fasta(">s1\nATGC\n>s2\nAT\nGC\n");
        assert_eq!(bases(&parsed), vec![BString::from("ATGC"), BString::from("ATGC")]);
        assert_eq!(parsed.sequences[0].label.as_deref(), Some("s1"));
        assert_eq!(parsed.sequences[1].label.as_deref(), Some("s2"));
    }

    #[test]
    fn test_fasta_invalid_record_dropped_silently() {
        let parsed = parse_fasta(">good\nATGC\n>bad\nATXX\n");
        assert_eq!(bases(&parsed), vec![BString::from("ATGC")]);
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_fasta_empty_input() {
        let parsed = parse_fasta("");
        assert!(parsed.sequences.is_empty());
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_fasta_header_without_bases_dropped() {
        let parsed = parse_fasta(">only-a-header\n");
        assert!(parsed.sequences.is_empty());
    }

    #[rstest]
    #[case("barcodes.fasta", InputFormat::Fasta)]
    #[case("barcodes.fa", InputFormat::Fasta)]
    #[case("barcodes.txt", InputFormat::Freeform)]
    #[case("barcodes", InputFormat::Freeform)]
    fn test_format_from_file_name(#[case] name: &str, #[case] expected: InputFormat) {
        assert_eq!(InputFormat::from_file_name(name), expected);
    }

    #[test]
    fn test_ordinals_follow_accepted_order() {
        let parsed = parse_freeform("ATGC\nnope!\nGGCC\n");
        assert_eq!(parsed.sequences[0].ordinal, 0);
        assert_eq!(parsed.sequences[1].ordinal, 1);
        assert_eq!(parsed.sequences[1].identifier(), "Seq_2");
    }
}
