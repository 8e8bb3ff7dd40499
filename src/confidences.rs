//! Models for the JSON files written per prediction run.
//!
//! A run directory holds `<run>_summary_confidences.json` with the global
//! scores, `<run>_confidences.json` with the per-token chain labels and the
//! PAE matrix, and `<run>_data.json` with the job request that produced the
//! run. Per-sample subdirectories hold the same files without the name
//! prefix.

use crate::error::{Error, Result};
use nalgebra::DMatrix;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Global confidence scores reported once per run.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfidences {
    /// Interface predicted TM-score.
    #[serde(default)]
    pub iptm: Option<f64>,
    /// Predicted TM-score of the whole fold.
    #[serde(default)]
    pub ptm: Option<f64>,
    /// Overall ranking score used to pick the best sample.
    #[serde(default)]
    pub ranking_score: Option<f64>,
}

impl SummaryConfidences {
    /// Parse a `summary_confidences.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }
}

/// Per-token chain labels and the pairwise error matrix of one structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Confidences {
    /// Chain label of each token, concatenated over all chains.
    pub token_chain_ids: Vec<String>,
    /// Pairwise predicted error, one row and column per token. `null`
    /// entries are kept as `None` until the matrix is built.
    pub pae: Vec<Vec<Option<f64>>>,
}

impl Confidences {
    /// Parse a `confidences.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Build the PAE matrix. `null` and non-finite entries become 0.
    ///
    /// Fails if the matrix is not square or its dimension does not match
    /// the number of token chain labels.
    pub fn pae_matrix(&self) -> Result<DMatrix<f64>> {
        let n = self.token_chain_ids.len();
        if self.pae.len() != n || self.pae.iter().any(|row| row.len() != n) {
            return Err(Error::Data(format!(
                "PAE matrix does not match the {n} token chain labels"
            )));
        }
        Ok(DMatrix::from_fn(n, n, |i, j| {
            let e = self.pae[i][j].unwrap_or(0.0);
            if e.is_finite() { e } else { 0.0 }
        }))
    }
}

/// Chain labels only, for callers that do not need the PAE.
#[derive(Debug, Deserialize)]
pub struct TokenChains {
    /// Chain label of each token.
    pub token_chain_ids: Vec<String>,
}

impl TokenChains {
    /// Parse the chain labels of a `confidences.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }
}

/// The job request that produced a run, as echoed back in `<run>_data.json`.
#[derive(Debug, Deserialize)]
pub struct JobData {
    /// Sequence entities in the order they were declared.
    pub sequences: Vec<HashMap<String, SequenceEntity>>,
}

/// One declared entity (protein, RNA, DNA or ligand).
#[derive(Debug, Deserialize)]
pub struct SequenceEntity {
    /// Chain identifier, or several for copies of the same entity.
    pub id: ChainIds,
}

/// A chain identifier field that is either a single id or a list of ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChainIds {
    /// A single chain.
    One(String),
    /// Several copies, in declaration order.
    Many(Vec<String>),
}

impl JobData {
    /// Parse a `data.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Chain identifiers in declared order, copies flattened.
    pub fn declared_chain_ids(&self) -> Vec<String> {
        self.sequences
            .iter()
            .flat_map(|entry| entry.values())
            .flat_map(|entity| match &entity.id {
                ChainIds::One(id) => vec![id.clone()],
                ChainIds::Many(ids) => ids.clone(),
            })
            .collect()
    }
}

/// Count tokens per chain, chains kept in first-seen order.
pub fn chain_partition(token_chain_ids: &[String]) -> Vec<usize> {
    let mut lengths: Vec<(&str, usize)> = Vec::new();
    for id in token_chain_ids {
        match lengths.iter_mut().find(|(chain, _)| *chain == id.as_str()) {
            Some((_, count)) => *count += 1,
            None => lengths.push((id.as_str(), 1)),
        }
    }
    lengths.into_iter().map(|(_, count)| count).collect()
}

/// Unique chain identifiers in first-seen order.
pub fn chain_order(token_chain_ids: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for id in token_chain_ids {
        if !order.iter().any(|chain| chain == id) {
            order.push(id.clone());
        }
    }
    order
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::json(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partition_counts_chains_in_first_seen_order() {
        let ids = strings(&["B", "B", "B", "A", "A", "C"]);
        assert_eq!(chain_partition(&ids), vec![3, 2, 1]);
        assert_eq!(chain_order(&ids), strings(&["B", "A", "C"]));
    }

    #[test]
    fn pae_matrix_normalizes_null_entries() {
        let conf = Confidences {
            token_chain_ids: strings(&["A", "B"]),
            pae: vec![vec![Some(0.5), None], vec![Some(f64::NAN), Some(2.0)]],
        };
        let pae = conf.pae_matrix().unwrap();
        assert_eq!(pae[(0, 0)], 0.5);
        assert_eq!(pae[(0, 1)], 0.0);
        assert_eq!(pae[(1, 0)], 0.0);
        assert_eq!(pae[(1, 1)], 2.0);
    }

    #[test]
    fn pae_matrix_rejects_mismatched_dimensions() {
        let conf = Confidences {
            token_chain_ids: strings(&["A", "B"]),
            pae: vec![vec![Some(0.0)]],
        };
        assert!(matches!(conf.pae_matrix(), Err(Error::Data(_))));
    }

    #[test]
    fn job_data_flattens_copy_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"{{"sequences": [
                 {{"protein": {{"id": ["A", "B"]}}}},
                 {{"ligand": {{"id": "L"}}}}
               ]}}"#
        )
        .unwrap();
        let data = JobData::load(&path).unwrap();
        assert_eq!(data.declared_chain_ids(), strings(&["A", "B", "L"]));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Confidences::load(Path::new("no_such_confidences.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
