//! Local interaction scoring between two chains of a predicted complex.
//!
//! The PAE matrix is mapped to a bounded confidence matrix, averaged over
//! the block of the requested chain pair, and combined with a spatial
//! contact map derived from the predicted structure. See
//! <https://www.biorxiv.org/content/10.1101/2024.02.19.580970v1> for the
//! definition of the scores.

use crate::confidences::{chain_partition, Confidences};
use crate::error::{Error, Result};
use crate::structure::{representative_points, ResiduePoint};
use nalgebra::DMatrix;
use std::path::Path;
use tracing::debug;

/// Default PAE cutoff for the confidence transform.
pub const DEFAULT_PAE_CUTOFF: f64 = 12.0;
/// Default distance threshold for the contact map, in Ångström.
pub const DEFAULT_DISTANCE_CUTOFF: f64 = 8.0;

/// Distance correction applied when either residue is phosphorus-bearing,
/// compensating for the larger radius class of that atom.
const PHOSPHORUS_ADJUSTMENT: f64 = 4.0;

/// The three outputs of the local interaction score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LisScore {
    /// Geometric mean of the plain and contact-filtered block means.
    pub ilis: f64,
    /// Mean confidence over the chain-pair block.
    pub lis: f64,
    /// Count of confident residue pairs in the chain-pair block.
    pub lia: f64,
}

/// A capability that scores the interaction of two chains in one sample.
pub trait InteractionScorer: Sync {
    /// Score the chain pair `(chain_a, chain_b)` of the structure described
    /// by `confidence_file` and `structure_file`.
    fn score(
        &self,
        confidence_file: &Path,
        structure_file: &Path,
        chain_a: usize,
        chain_b: usize,
    ) -> Result<LisScore>;
}

/// File-backed scorer with configurable cutoffs.
#[derive(Debug, Clone, Copy)]
pub struct LisEngine {
    /// PAE cutoff for the confidence transform.
    pub pae_cutoff: f64,
    /// Distance threshold for the contact map.
    pub distance_cutoff: f64,
}

impl Default for LisEngine {
    fn default() -> Self {
        LisEngine {
            pae_cutoff: DEFAULT_PAE_CUTOFF,
            distance_cutoff: DEFAULT_DISTANCE_CUTOFF,
        }
    }
}

impl InteractionScorer for LisEngine {
    fn score(
        &self,
        confidence_file: &Path,
        structure_file: &Path,
        chain_a: usize,
        chain_b: usize,
    ) -> Result<LisScore> {
        local_interaction_score(
            confidence_file,
            structure_file,
            self.pae_cutoff,
            self.distance_cutoff,
            chain_a,
            chain_b,
        )
    }
}

/// Map a PAE matrix to confidence scores in [0, 1].
///
/// A zero error maps to 1, errors decay linearly to 0 at the cutoff and
/// anything at or beyond the cutoff maps to exactly 0. Non-finite entries
/// map to 0.
pub fn transform_pae(pae: &DMatrix<f64>, cutoff: f64) -> DMatrix<f64> {
    pae.map(|e| {
        if e.is_finite() && e < cutoff {
            1.0 - e / cutoff
        } else {
            0.0
        }
    })
}

/// Binary contact map over representative residue points.
///
/// Distances between pairs with a phosphorus-bearing side are reduced by
/// 4 Å before thresholding.
pub fn contact_map(points: &[ResiduePoint], distance_cutoff: f64) -> DMatrix<f64> {
    let n = points.len();
    DMatrix::from_fn(n, n, |i, j| {
        let mut distance = (points[i].pos - points[j].pos).norm();
        if points[i].phosphorus || points[j].phosphorus {
            distance -= PHOSPHORUS_ADJUSTMENT;
        }
        if distance < distance_cutoff {
            1.0
        } else {
            0.0
        }
    })
}

/// Mean of the strictly-positive entries of every chain-pair block.
///
/// Blocks are taken from the chain partition in order. A block without any
/// positive entry yields 0.
pub fn block_means(matrix: &DMatrix<f64>, partition: &[usize]) -> DMatrix<f64> {
    let starts = block_starts(partition);

    DMatrix::from_fn(partition.len(), partition.len(), |i, j| {
        let block = matrix.view((starts[i], starts[j]), (partition[i], partition[j]));
        let mut sum = 0.0;
        let mut count = 0usize;
        for value in block.iter() {
            if *value > 0.0 {
                sum += *value;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    })
}

/// Start index of each chain's block within the token index space.
fn block_starts(partition: &[usize]) -> Vec<usize> {
    partition
        .iter()
        .scan(0, |acc, len| {
            let start = *acc;
            *acc += len;
            Some(start)
        })
        .collect()
}

/// Score the interaction between two chains of one predicted structure.
///
/// Loads the PAE matrix and chain labels from `confidence_file` and the
/// coordinates from `structure_file`, then returns the combined score, the
/// mean confidence and the confident-pair count for the requested chain
/// pair. The chain-index pair is canonicalized, so swapping `chain_a` and
/// `chain_b` returns identical results.
pub fn local_interaction_score(
    confidence_file: &Path,
    structure_file: &Path,
    pae_cutoff: f64,
    distance_cutoff: f64,
    chain_a: usize,
    chain_b: usize,
) -> Result<LisScore> {
    let confidences = Confidences::load(confidence_file)?;
    let partition = chain_partition(&confidences.token_chain_ids);
    let (a, b) = (chain_a.min(chain_b), chain_a.max(chain_b));
    if b >= partition.len() {
        return Err(Error::Data(format!(
            "chain index {b} out of range for {} chains in '{}'",
            partition.len(),
            confidence_file.display()
        )));
    }

    let pae = confidences.pae_matrix()?;
    let transformed = transform_pae(&pae, pae_cutoff);
    let mean_lis = block_means(&transformed, &partition);

    let points = representative_points(structure_file)?;
    if points.len() != pae.nrows() {
        return Err(Error::Data(format!(
            "'{}' has {} residues but '{}' has {} tokens",
            structure_file.display(),
            points.len(),
            confidence_file.display(),
            pae.nrows()
        )));
    }
    let contacts = contact_map(&points, distance_cutoff);

    let filtered = DMatrix::from_fn(pae.nrows(), pae.ncols(), |i, j| {
        if transformed[(i, j)] > 0.0 && contacts[(i, j)] == 1.0 {
            transformed[(i, j)]
        } else {
            0.0
        }
    });
    let mean_clis = block_means(&filtered, &partition);

    let lis = mean_lis[(a, b)];
    let clis = mean_clis[(a, b)];
    let ilis = (lis * clis).sqrt();

    let starts = block_starts(&partition);
    let lia = transformed
        .view((starts[a], starts[b]), (partition[a], partition[b]))
        .iter()
        .filter(|value| **value > 0.0)
        .count();

    debug!(
        "scored '{}': ilis={ilis:.6} lis={lis:.6} lia={lia}",
        confidence_file.display()
    );
    Ok(LisScore {
        ilis,
        lis,
        lia: lia as f64,
    })
}
