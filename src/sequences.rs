//! Reconciliation of declared chain positions with the chain order the
//! prediction engine actually used.
//!
//! The job request declares sequences in one order, but the engine may
//! reorder chains internally. The declared order is read from the run's
//! `data.json` and cross-referenced against the per-token chain labels of
//! its `confidences.json`.

use crate::confidences::{chain_order, JobData, TokenChains};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::trace;

const SUMMARY_SUFFIX: &str = "_summary_confidences.json";

/// Split a summary-confidence path into its run directory and run name.
pub(crate) fn run_location(summary_file: &Path) -> Result<(PathBuf, String)> {
    let name = summary_file
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(SUMMARY_SUFFIX))
        .ok_or_else(|| {
            Error::Data(format!(
                "'{}' is not a summary-confidence file",
                summary_file.display()
            ))
        })?;
    let dir = summary_file.parent().unwrap_or_else(|| Path::new(""));
    Ok((dir.to_path_buf(), name.to_string()))
}

/// Resolve the internal chain indices of the declared bait and target.
///
/// `sequence_one` and `sequence_two` are zero-based positions into the
/// declared sequence order. Returns the corresponding indices into the
/// chain order of the confidence output. Resolve once per run and reuse
/// the result for every metric extraction on that run.
pub fn sequence_index(
    summary_file: &Path,
    sequence_one: usize,
    sequence_two: usize,
) -> Result<(usize, usize)> {
    let (dir, run) = run_location(summary_file)?;
    let declared = JobData::load(&dir.join(format!("{run}_data.json")))?.declared_chain_ids();
    let internal = chain_order(
        &TokenChains::load(&dir.join(format!("{run}_confidences.json")))?.token_chain_ids,
    );

    let resolve = |position: usize| -> Result<usize> {
        let id = declared.get(position).ok_or_else(|| {
            Error::Data(format!(
                "sequence position {position} exceeds the {} declared sequences of run '{run}'",
                declared.len()
            ))
        })?;
        internal.iter().position(|chain| chain == id).ok_or_else(|| {
            Error::Data(format!(
                "declared chain '{id}' is missing from the confidence output of run '{run}'"
            ))
        })
    };

    let indices = (resolve(sequence_one)?, resolve(sequence_two)?);
    trace!(
        "run '{run}': positions ({sequence_one}, {sequence_two}) resolved to chains {indices:?}"
    );
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_run(dir: &Path, run: &str, declared: &[&str], tokens: &[&str]) -> PathBuf {
        let sequences: Vec<String> = declared
            .iter()
            .map(|id| format!(r#"{{"protein": {{"id": "{id}"}}}}"#))
            .collect();
        std::fs::write(
            dir.join(format!("{run}_data.json")),
            format!(r#"{{"sequences": [{}]}}"#, sequences.join(", ")),
        )
        .unwrap();
        let labels: Vec<String> = tokens.iter().map(|id| format!(r#""{id}""#)).collect();
        std::fs::write(
            dir.join(format!("{run}_confidences.json")),
            format!(r#"{{"token_chain_ids": [{}], "pae": []}}"#, labels.join(", ")),
        )
        .unwrap();
        let summary = dir.join(format!("{run}_summary_confidences.json"));
        std::fs::write(&summary, "{}").unwrap();
        summary
    }

    #[test]
    fn resolves_reordered_chains() {
        let dir = tempfile::tempdir().unwrap();
        // Declared H then B, predicted with B first.
        let summary = write_run(dir.path(), "ha__bmp2", &["H", "B"], &["B", "B", "H"]);
        assert_eq!(sequence_index(&summary, 0, 1).unwrap(), (1, 0));
        assert_eq!(sequence_index(&summary, 1, 0).unwrap(), (0, 1));
    }

    #[test]
    fn identity_order_resolves_to_itself() {
        let dir = tempfile::tempdir().unwrap();
        let summary = write_run(dir.path(), "a__b", &["A", "B"], &["A", "B", "B"]);
        assert_eq!(sequence_index(&summary, 0, 1).unwrap(), (0, 1));
    }

    #[test]
    fn out_of_range_position_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let summary = write_run(dir.path(), "a__b", &["A", "B"], &["A", "B"]);
        assert!(matches!(
            sequence_index(&summary, 0, 3),
            Err(Error::Data(_))
        ));
    }

    #[test]
    fn chain_missing_from_confidences_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let summary = write_run(dir.path(), "a__b", &["A", "Z"], &["A", "B"]);
        assert!(matches!(
            sequence_index(&summary, 0, 1),
            Err(Error::Data(_))
        ));
    }

    #[test]
    fn non_summary_path_is_rejected() {
        assert!(matches!(
            sequence_index(Path::new("whatever.json"), 0, 1),
            Err(Error::Data(_))
        ));
    }
}
