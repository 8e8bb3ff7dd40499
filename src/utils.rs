use crate::error::{Error, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run an operation on a dedicated rayon thread pool.
///
/// `num_threads` of 0 uses all available cores; any other value sets the
/// pool size exactly.
pub fn run_with_threads<T, F>(num_threads: usize, op: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send,
    T: Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()?;
    pool.install(op)
}

/// Write a DataFrame as a tab-separated table.
///
/// A destination of `None` writes to standard output.
pub fn write_table(df: &mut DataFrame, destination: Option<&Path>) -> Result<()> {
    let mut writer: Box<dyn Write> = match destination {
        Some(path) => Box::new(File::create(path).map_err(|e| Error::io(path, e))?),
        None => Box::new(std::io::stdout()),
    };
    CsvWriter::new(&mut writer)
        .include_header(true)
        .with_separator(b'\t')
        .finish(df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_tab_separated_with_a_header() {
        let mut df = df!(
            "Bait" => ["POLR2A"],
            "Target" => ["POLR2B"],
            "ipTM" => [0.7772],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.txt");
        write_table(&mut df, Some(&path)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Bait\tTarget\tipTM\nPOLR2A\tPOLR2B\t0.7772\n");
    }

    #[test]
    fn thread_pool_runs_the_operation() {
        let doubled = run_with_threads(2, || Ok(21 * 2)).unwrap();
        assert_eq!(doubled, 42);
    }
}
