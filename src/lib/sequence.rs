#![forbid(unsafe_code)]

use bstr::BString;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches a non-empty run of the four allowed bases and nothing else.
    static ref SEQUENCE_REGEX: Regex = Regex::new(r"^[ATGC]+$").unwrap();
}

/// Returns true iff the token, once trimmed and upper-cased, is a non-empty string over
/// the `{A, C, G, T}` alphabet.
///
/// Pure check with no side effects; anything else (empty, whitespace-only, other symbols)
/// yields `false`.
pub fn is_valid_sequence(token: &str) -> bool {
    SEQUENCE_REGEX.is_match(&token.trim().to_ascii_uppercase())
}

/// Trim and upper-case a raw token into the stored base representation.
pub fn normalize(token: &str) -> BString {
    BString::from(token.trim().to_ascii_uppercase())
}

/// A validated barcode sequence.
///
/// Bases are always stored trimmed and upper-cased.  A sequence is identified within a batch
/// by its 1-based position (`Seq_<i>`) unless the input supplied a label for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    /// The normalized bases.
    pub bases: BString,

    /// The user-supplied label, if the input carried one (e.g. `label:` prefix or FASTA header).
    pub label: Option<String>,

    /// The position of the sequence in the batch, starting at 0.
    pub ordinal: usize,
}

impl Sequence {
    /// Create a new [`Sequence`] from an already validated token.
    pub fn new(token: &str, label: Option<String>, ordinal: usize) -> Self {
        Self { bases: normalize(token), label, ordinal }
    }

    /// The identifier used in reports: the label when present, `Seq_<i>` (1-based) otherwise.
    pub fn identifier(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("Seq_{}", self.ordinal + 1),
        }
    }

    /// The number of bases.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sequences() {
        assert!(is_valid_sequence("ATGC"));
        assert!(is_valid_sequence("atgc"));
        assert!(is_valid_sequence("  ATGC  "));
        assert!(is_valid_sequence("A"));
        assert!(is_valid_sequence("TTTTTTTT"));
    }

    #[test]
    fn test_invalid_sequences() {
        assert!(!is_valid_sequence(""));
        assert!(!is_valid_sequence("   "));
        assert!(!is_valid_sequence("ATGN"));
        assert!(!is_valid_sequence("AT GC"));
        assert!(!is_valid_sequence("garbage!!"));
        assert!(!is_valid_sequence("1234"));
    }

    #[test]
    fn test_normalize_trims_and_uppercases() {
        assert_eq!(normalize(" atGc\t"), BString::from("ATGC"));
    }

    #[test]
    fn test_identifier_is_one_based_when_unlabeled() {
        let seq = Sequence::new("ATGC", None, 0);
        assert_eq!(seq.identifier(), "Seq_1");
        let seq = Sequence::new("ATGC", None, 9);
        assert_eq!(seq.identifier(), "Seq_10");
    }

    #[test]
    fn test_identifier_prefers_label() {
        let seq = Sequence::new("ATGC", Some(String::from("control")), 0);
        assert_eq!(seq.identifier(), "control");
    }
}
