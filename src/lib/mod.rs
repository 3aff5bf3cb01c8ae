//! A library for detecting collisions between sample barcode sequences.
//!
//! # Overview
//!
//! The flow of data is as follows:
//!
//! - [`parse`] extracts validated [`sequence::Sequence`]s from free-form text or FASTA content,
//!   collecting a [`parse::ParseDiagnostic`] for every line that is dropped.
//! - [`distance`] computes the all-pairs Hamming [`distance::DistanceMatrix`] over the parsed
//!   sequences, failing up front if the sequences are not all the same length.
//! - [`collision`] classifies each pair into a [`collision::RiskTier`] and derives the list of
//!   [`collision::CollisionPair`]s plus an aggregate [`collision::CollisionSummary`].
//! - [`report`] assembles the matrix, collisions, and summary into an
//!   [`report::AnalysisReport`] that can be rendered as text tables or written as CSVs.
#![deny(unsafe_code)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]
pub mod collision;
pub mod distance;
pub mod opts;
pub mod parse;
pub mod report;
pub mod run;
pub mod sequence;
