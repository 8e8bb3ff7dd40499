//! Batch aggregation of prediction runs into a single score table.

use crate::error::{Error, Result};
use crate::lis::LisEngine;
use crate::mapping::{display_name, parse_mapping, Mapping};
use crate::metrics::{Extractor, Metric};
use crate::sequences;
use crate::utils::{run_with_threads, write_table};
use indicatif::ProgressBar;
use polars::prelude::*;
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Identifier-mapping configuration of an aggregation.
#[derive(Debug, Clone)]
pub struct MappingOptions {
    /// Mapping file, `-` for standard input.
    pub file: PathBuf,
    /// Zero-based column holding the raw identifier.
    pub source_column: usize,
    /// Zero-based column holding the display name.
    pub converted_column: usize,
}

/// Configuration of one aggregation over a directory of prediction runs.
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    /// Root directory searched recursively for summary-confidence files.
    pub input_dir: PathBuf,
    /// Output file; `None` writes to standard output.
    pub output: Option<PathBuf>,
    /// Pattern matched against summary filenames. Its two capture groups
    /// yield the bait and target identifiers.
    pub name: String,
    /// Metrics to report, in column order.
    pub metrics: Vec<Metric>,
    /// Zero-based declared position of the bait sequence.
    pub sequence_one: usize,
    /// Zero-based declared position of the target sequence.
    pub sequence_two: usize,
    /// Show a progress bar while runs are scored.
    pub progress: bool,
    /// Optional identifier mapping applied to bait and target names.
    pub mapping: Option<MappingOptions>,
    /// Worker-pool size; 1 runs sequentially, 0 uses all cores.
    pub threads: usize,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        ScoreOptions {
            input_dir: PathBuf::from("."),
            output: None,
            name: r"([\w-]+)__([\w-]+)_summary_confidences".to_string(),
            metrics: vec![Metric::Iptm],
            sequence_one: 0,
            sequence_two: 1,
            progress: false,
            mapping: None,
            threads: 1,
        }
    }
}

/// The per-run capabilities the driver fans out over the worker pool:
/// chain-index resolution and metric extraction.
///
/// The file-backed [`Af3Source`] is the production implementation; tests
/// substitute their own.
pub trait MetricSource: Sync {
    /// Resolve the internal chain indices of the declared bait and target
    /// positions for the run owning `summary_file`.
    fn sequence_index(
        &self,
        summary_file: &Path,
        sequence_one: usize,
        sequence_two: usize,
    ) -> Result<(usize, usize)>;

    /// Extract the requested metric values for the run owning
    /// `summary_file`, using resolved chain indices.
    fn confidence_scores(
        &self,
        summary_file: &Path,
        metrics: &[Metric],
        chain_a: usize,
        chain_b: usize,
    ) -> Result<Vec<f64>>;
}

/// Metric source backed by the files of each run directory.
#[derive(Debug, Default)]
pub struct Af3Source {
    extractor: Extractor<LisEngine>,
}

impl MetricSource for Af3Source {
    fn sequence_index(
        &self,
        summary_file: &Path,
        sequence_one: usize,
        sequence_two: usize,
    ) -> Result<(usize, usize)> {
        sequences::sequence_index(summary_file, sequence_one, sequence_two)
    }

    fn confidence_scores(
        &self,
        summary_file: &Path,
        metrics: &[Metric],
        chain_a: usize,
        chain_b: usize,
    ) -> Result<Vec<f64>> {
        self.extractor
            .confidence_scores(summary_file, metrics, chain_a, chain_b)
    }
}

/// Aggregate every matching run under the input root into a score table.
///
/// Equivalent to [`af3_score_with`] using the file-backed [`Af3Source`].
pub fn af3_score(options: &ScoreOptions) -> Result<()> {
    af3_score_with(options, &Af3Source::default())
}

/// Aggregate every matching run under the input root into a score table,
/// pulling per-run values from the given source.
///
/// Summary files are discovered recursively, sorted by path and scored on
/// a fixed-size worker pool; rows keep the sorted discovery order no
/// matter which task finishes first. The first failing run aborts the
/// aggregation and nothing is written.
pub fn af3_score_with<S: MetricSource>(options: &ScoreOptions, source: &S) -> Result<()> {
    if options.metrics.is_empty() {
        return Err(Error::Config("no metrics requested".to_string()));
    }
    let pattern = Regex::new(&options.name)
        .map_err(|e| Error::Config(format!("invalid name pattern: {e}")))?;
    if pattern.captures_len() != 3 {
        return Err(Error::Config(format!(
            "name pattern '{}' must have exactly two capture groups",
            options.name
        )));
    }
    if !options.input_dir.is_dir() {
        return Err(Error::Config(format!(
            "input directory '{}' does not exist",
            options.input_dir.display()
        )));
    }

    let mapping: Option<Mapping> = match &options.mapping {
        Some(opts) => Some(parse_mapping(
            &opts.file,
            opts.source_column,
            opts.converted_column,
        )?),
        None => None,
    };

    let files = discover(&options.input_dir, &pattern);
    info!(
        "found {} summary files under '{}'",
        files.len(),
        options.input_dir.display()
    );

    let bar = if options.progress {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    let scores: Vec<Vec<f64>> = run_with_threads(options.threads, || {
        files
            .par_iter()
            .map(|file| {
                debug!("scoring '{}'", file.display());
                let (chain_a, chain_b) =
                    source.sequence_index(file, options.sequence_one, options.sequence_two)?;
                let values =
                    source.confidence_scores(file, &options.metrics, chain_a, chain_b)?;
                bar.inc(1);
                Ok(values)
            })
            .collect()
    })?;
    bar.finish_and_clear();

    let mut df = build_table(&files, &pattern, &options.metrics, &scores, mapping.as_ref())?;
    write_table(&mut df, options.output.as_deref())
}

/// Recursively collect summary files matching the pattern, sorted by path.
fn discover(input_dir: &Path, pattern: &Regex) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| pattern.is_match(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn build_table(
    files: &[PathBuf],
    pattern: &Regex,
    metrics: &[Metric],
    scores: &[Vec<f64>],
    mapping: Option<&Mapping>,
) -> Result<DataFrame> {
    let labels: Vec<&str> = metrics
        .iter()
        .flat_map(|metric| metric.labels().iter().copied())
        .collect();

    let mut baits = Vec::with_capacity(files.len());
    let mut targets = Vec::with_capacity(files.len());
    for (file, values) in files.iter().zip(scores) {
        if values.len() != labels.len() {
            return Err(Error::Data(format!(
                "run '{}' produced {} values for {} columns",
                file.display(),
                values.len(),
                labels.len()
            )));
        }
        let name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let captures = pattern.captures(&name).ok_or_else(|| {
            Error::Data(format!("filename '{name}' no longer matches the pattern"))
        })?;
        baits.push(display_name(mapping, &captures[1]));
        targets.push(display_name(mapping, &captures[2]));
    }

    let mut columns = vec![
        Column::new("Bait".into(), baits),
        Column::new("Target".into(), targets),
    ];
    for (index, label) in labels.iter().enumerate() {
        let values: Vec<f64> = scores.iter().map(|row| row[index]).collect();
        columns.push(Column::new((*label).into(), values));
    }
    Ok(DataFrame::new(columns)?)
}
