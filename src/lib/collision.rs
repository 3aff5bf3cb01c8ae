//! Classification of pairwise distances into risk tiers and derivation of the collision
//! report over a sequence set.
//!
//! Collision pairs are derived views: they are recomputed from the distance matrix on each
//! request rather than stored, so the classifier holds no state of its own.
#![forbid(unsafe_code)]

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::distance::DistanceMatrix;
use crate::sequence::Sequence;

/// The default maximum distance at which a pair is reported as a collision.
pub const DEFAULT_COLLISION_THRESHOLD: usize = 2;

/// How risky a pair of barcodes is, as a pure function of their distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RiskTier {
    /// The barcodes are nearly identical and cannot be reliably distinguished.
    Critical,
    /// The barcodes are similar enough that errors may confuse them.
    Warning,
    /// The barcodes are sufficiently different.
    Safe,
}

/// The distance cutoffs separating the risk tiers.
///
/// Distances at or below `critical_max` are [`RiskTier::Critical`], at or below
/// `warning_max` are [`RiskTier::Warning`], and anything greater is [`RiskTier::Safe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskThresholds {
    pub critical_max: usize,
    pub warning_max: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { critical_max: 1, warning_max: 3 }
    }
}

/// Map a distance to its [`RiskTier`] under the given thresholds.
pub fn classify(distance: usize, thresholds: RiskThresholds) -> RiskTier {
    if distance <= thresholds.critical_max {
        RiskTier::Critical
    } else if distance <= thresholds.warning_max {
        RiskTier::Warning
    } else {
        RiskTier::Safe
    }
}

/// A pair of sequences whose distance falls at or below the collision threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionPair {
    /// The identifier of the first sequence of the pair (lower index).
    #[serde(rename = "Sequence_1")]
    pub id_a: String,

    /// The bases of the first sequence.
    #[serde(rename = "Sequence_1_Bases")]
    pub bases_a: String,

    /// The identifier of the second sequence of the pair (higher index).
    #[serde(rename = "Sequence_2")]
    pub id_b: String,

    /// The bases of the second sequence.
    #[serde(rename = "Sequence_2_Bases")]
    pub bases_b: String,

    /// The Hamming distance between the two.
    #[serde(rename = "Distance")]
    pub distance: usize,

    /// The risk tier assigned to the pair.
    #[serde(rename = "Risk_Tier")]
    pub tier: RiskTier,
}

/// Aggregate statistics over a collision list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionSummary {
    /// The total number of colliding pairs.
    #[serde(rename = "Total_Pairs")]
    pub total_pairs: usize,

    /// The number of pairs in the CRITICAL tier.
    #[serde(rename = "Critical_Pairs")]
    pub critical_pairs: usize,

    /// The number of pairs in the WARNING tier.
    #[serde(rename = "Warning_Pairs")]
    pub warning_pairs: usize,

    /// The number of distinct sequences appearing in at least one colliding pair.
    #[serde(rename = "Sequences_Involved")]
    pub sequences_involved: usize,
}

/// Find every unordered pair `i < j` whose distance is at or below `threshold`.
///
/// Pairs are generated in ascending `(i, j)` order and then stable-sorted by ascending
/// distance, so ties preserve the generation order.  A pair with distance greater than
/// `threshold` is never returned.
pub fn find_collisions(
    sequences: &[Sequence],
    matrix: &DistanceMatrix,
    threshold: usize,
    thresholds: RiskThresholds,
) -> Vec<CollisionPair> {
    let mut pairs = vec![];
    for i in 0..matrix.len() {
        for j in (i + 1)..matrix.len() {
            let distance = matrix.get(i, j);
            if distance <= threshold {
                pairs.push(CollisionPair {
                    id_a: sequences[i].identifier(),
                    bases_a: sequences[i].bases.to_string(),
                    id_b: sequences[j].identifier(),
                    bases_b: sequences[j].bases.to_string(),
                    distance,
                    tier: classify(distance, thresholds),
                });
            }
        }
    }
    pairs.sort_by_key(|pair| pair.distance);
    pairs
}

/// Aggregate a collision list into its [`CollisionSummary`].
pub fn summarize(collisions: &[CollisionPair]) -> CollisionSummary {
    let mut involved: AHashSet<&str> = AHashSet::new();
    for pair in collisions {
        involved.insert(&pair.id_a);
        involved.insert(&pair.id_b);
    }
    CollisionSummary {
        total_pairs: collisions.len(),
        critical_pairs: collisions.iter().filter(|p| p.tier == RiskTier::Critical).count(),
        warning_pairs: collisions.iter().filter(|p| p.tier == RiskTier::Warning).count(),
        sequences_involved: involved.len(),
    }
}
