//! Metric selection and extraction for one prediction run.

use crate::confidences::SummaryConfidences;
use crate::error::{Error, Result};
use crate::lis::{InteractionScorer, LisEngine, LisScore};
use crate::sequences::run_location;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// A metric reported per prediction run.
///
/// Direct metrics are read from the run's summary file; the local
/// interaction metrics are computed from confidence and structure files
/// and contribute three values each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Metric {
    /// Interface predicted TM-score.
    #[value(name = "iptm")]
    Iptm,
    /// Predicted TM-score of the whole fold.
    #[value(name = "ptm")]
    Ptm,
    /// Overall ranking score.
    #[value(name = "ranking_score")]
    RankingScore,
    /// Local interaction score, averaged over every sample of the run.
    #[value(name = "lis")]
    Lis,
    /// Local interaction score of the best-ranked structure only.
    #[value(name = "best_lis")]
    BestLis,
}

impl Metric {
    /// Table column labels, one per emitted value.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Metric::Iptm => &["ipTM"],
            Metric::Ptm => &["pTM"],
            Metric::RankingScore => &["Ranking score"],
            Metric::Lis => &["iLIS", "LIS", "LIA"],
            Metric::BestLis => &["Best iLIS", "Best LIS", "Best LIA"],
        }
    }

    /// Name used on the command line and in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Iptm => "iptm",
            Metric::Ptm => "ptm",
            Metric::RankingScore => "ranking_score",
            Metric::Lis => "lis",
            Metric::BestLis => "best_lis",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "iptm" => Ok(Metric::Iptm),
            "ptm" => Ok(Metric::Ptm),
            "ranking_score" => Ok(Metric::RankingScore),
            "lis" => Ok(Metric::Lis),
            "best_lis" => Ok(Metric::BestLis),
            _ => Err(Error::UnknownMetric(name.to_string())),
        }
    }
}

/// Extracts metric values from a run directory, delegating the local
/// interaction metrics to an [`InteractionScorer`].
#[derive(Debug, Default)]
pub struct Extractor<S = LisEngine> {
    scorer: S,
}

impl<S: InteractionScorer> Extractor<S> {
    /// Build an extractor around the given scorer.
    pub fn new(scorer: S) -> Self {
        Extractor { scorer }
    }

    /// Extract the requested metrics, in request order, for the run the
    /// summary file belongs to. `chain_a` and `chain_b` are the resolved
    /// internal chain indices of the bait and target.
    pub fn confidence_scores(
        &self,
        summary_file: &Path,
        metrics: &[Metric],
        chain_a: usize,
        chain_b: usize,
    ) -> Result<Vec<f64>> {
        let summary = SummaryConfidences::load(summary_file)?;
        let mut values = Vec::new();
        for metric in metrics {
            match metric {
                Metric::Iptm | Metric::Ptm | Metric::RankingScore => {
                    values.push(direct_value(&summary, *metric, summary_file)?);
                }
                Metric::Lis => {
                    let score = self.averaged_lis(summary_file, chain_a, chain_b)?;
                    values.extend([score.ilis, score.lis, score.lia]);
                }
                Metric::BestLis => {
                    let (dir, run) = run_location(summary_file)?;
                    let score = self.scorer.score(
                        &dir.join(format!("{run}_confidences.json")),
                        &dir.join(format!("{run}_model.cif")),
                        chain_a,
                        chain_b,
                    )?;
                    values.extend([score.ilis, score.lis, score.lia]);
                }
            }
        }
        Ok(values)
    }

    /// Score every sample of the run and average each output component.
    fn averaged_lis(&self, summary_file: &Path, chain_a: usize, chain_b: usize) -> Result<LisScore> {
        let samples = sample_dirs(summary_file)?;
        debug!(
            "averaging local interaction scores over {} samples",
            samples.len()
        );
        let mut total = LisScore {
            ilis: 0.0,
            lis: 0.0,
            lia: 0.0,
        };
        for sample in &samples {
            let score = self.scorer.score(
                &sample.join("confidences.json"),
                &sample.join("model.cif"),
                chain_a,
                chain_b,
            )?;
            total.ilis += score.ilis;
            total.lis += score.lis;
            total.lia += score.lia;
        }
        let n = samples.len() as f64;
        Ok(LisScore {
            ilis: total.ilis / n,
            lis: total.lis / n,
            lia: total.lia / n,
        })
    }
}

fn direct_value(summary: &SummaryConfidences, metric: Metric, path: &Path) -> Result<f64> {
    let value = match metric {
        Metric::Iptm => summary.iptm,
        Metric::Ptm => summary.ptm,
        Metric::RankingScore => summary.ranking_score,
        _ => None,
    };
    value.ok_or_else(|| {
        Error::Data(format!(
            "'{}' has no value for metric '{metric}'",
            path.display()
        ))
    })
}

/// Per-sample subdirectories of a run, sorted by name.
fn sample_dirs(summary_file: &Path) -> Result<Vec<PathBuf>> {
    let (dir, run) = run_location(summary_file)?;
    let entries = std::fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))?;
    let mut samples: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with("seed-") && name.contains("_sample-")
        })
        .map(|entry| entry.path())
        .collect();
    if samples.is_empty() {
        return Err(Error::Data(format!(
            "run '{run}' has no sample directories under '{}'",
            dir.display()
        )));
    }
    samples.sort();
    Ok(samples)
}
