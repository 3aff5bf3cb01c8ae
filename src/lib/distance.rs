//! Pairwise Hamming distance and the all-pairs distance matrix.
#![forbid(unsafe_code)]

use itertools::Itertools;
use thiserror::Error;

use crate::sequence::Sequence;

/// The error produced when sequences of differing lengths are presented to the engine.
///
/// This is fatal to the current computation: no partial matrix is ever produced.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DistanceError {
    #[error("sequences have differing lengths {lengths:?}; Hamming distance requires equal lengths")]
    LengthMismatch {
        /// The distinct offending lengths, ascending.
        lengths: Vec<usize>,
    },
}

/// Hamming distance between two equal-length byte sequences.
///
/// Bases are compared case-insensitively; stored sequences are already normalized but the
/// comparison does not rely on it.
pub fn hamming_distance(alpha: &[u8], beta: &[u8]) -> Result<usize, DistanceError> {
    if alpha.len() != beta.len() {
        return Err(DistanceError::LengthMismatch {
            lengths: [alpha.len(), beta.len()].into_iter().sorted().dedup().collect(),
        });
    }
    Ok(alpha.iter().zip(beta.iter()).filter(|(a, b)| !a.eq_ignore_ascii_case(b)).count())
}

/// The symmetric n×n table of Hamming distances over a sequence set, with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    distances: Vec<Vec<usize>>,
}

impl DistanceMatrix {
    /// Build the full distance matrix for the given sequences.
    ///
    /// All sequences must be the same length; otherwise the build fails as a whole with
    /// [`DistanceError::LengthMismatch`] carrying the distinct offending lengths.  The cost
    /// is O(n²·L), which is exact and fast enough for the expected tens to low hundreds of
    /// barcodes.
    pub fn build(sequences: &[Sequence]) -> Result<Self, DistanceError> {
        let lengths: Vec<usize> =
            sequences.iter().map(Sequence::len).sorted().dedup().collect();
        if lengths.len() > 1 {
            return Err(DistanceError::LengthMismatch { lengths });
        }

        let n = sequences.len();
        let mut distances = vec![vec![0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let distance = hamming_distance(&sequences[i].bases, &sequences[j].bases)?;
                distances[i][j] = distance;
                distances[j][i] = distance;
            }
        }
        Ok(Self { distances })
    }

    /// The number of sequences the matrix was built over.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// The distance between sequences `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> usize {
        self.distances[i][j]
    }

    /// The row of distances from sequence `i` to every sequence in the set.
    pub fn row(&self, i: usize) -> &[usize] {
        &self.distances[i]
    }
}
