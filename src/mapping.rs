//! Identifier-mapping files for display names in the output table.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Case-insensitive identifier mapping. Keys are stored lower-cased; look
/// identifiers up with [`display_name`].
pub type Mapping = HashMap<String, String>;

/// Parse a two-column, tab-separated mapping file.
///
/// `source_column` and `converted_column` are zero-based. Lines missing
/// either column are skipped, and a line with an empty converted column
/// removes that identifier from the mapping instead of mapping it to an
/// empty string. A path of `-` reads from standard input.
pub fn parse_mapping(
    path: &Path,
    source_column: usize,
    converted_column: usize,
) -> Result<Mapping> {
    let reader: Box<dyn Read> = if path == Path::new("-") {
        Box::new(std::io::stdin())
    } else {
        Box::new(File::open(path).map_err(|e| Error::io(path, e))?)
    };

    let mut mapping = Mapping::new();
    for line in BufReader::new(reader).lines() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let columns: Vec<&str> = line.split('\t').collect();
        let (Some(source), Some(converted)) =
            (columns.get(source_column), columns.get(converted_column))
        else {
            continue;
        };
        if converted.is_empty() {
            continue;
        }
        mapping.insert(source.to_lowercase(), converted.to_string());
    }
    debug!("parsed {} identifier mappings", mapping.len());
    Ok(mapping)
}

/// Resolve the display name of an identifier.
///
/// Unmapped identifiers pass through unchanged.
pub fn display_name(mapping: Option<&Mapping>, raw: &str) -> String {
    mapping
        .and_then(|m| m.get(&raw.to_lowercase()))
        .cloned()
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_mapping(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.txt");
        let mut file = File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        (dir, path)
    }

    #[test]
    fn keys_are_lower_cased_and_blanks_dropped() {
        let (_dir, path) =
            write_mapping("RPB1_HUMAN\tPOLR2A\nNOGENE_HUMAN\t\nRPB2_HUMAN\tPOLR2B\n");
        let mapping = parse_mapping(&path, 0, 1).unwrap();
        assert_eq!(mapping.get("rpb1_human"), Some(&"POLR2A".to_string()));
        assert_eq!(mapping.get("rpb2_human"), Some(&"POLR2B".to_string()));
        assert!(!mapping.contains_key("nogene_human"));
        assert!(!mapping.contains_key("RPB1_HUMAN"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let (_dir, path) = write_mapping("RPB1_HUMAN\tPOLR2A\n");
        let mapping = parse_mapping(&path, 0, 1).unwrap();
        for query in ["rpb1_human", "RPB1_HUMAN", "Rpb1_Human"] {
            assert_eq!(display_name(Some(&mapping), query), "POLR2A");
        }
        assert_eq!(display_name(Some(&mapping), "OTHER"), "OTHER");
        assert_eq!(display_name(None, "OTHER"), "OTHER");
    }

    #[test]
    fn columns_are_configurable() {
        let (_dir, path) = write_mapping("x\tRPB1_HUMAN\tPOLR2A\nshort\n");
        let mapping = parse_mapping(&path, 1, 2).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("rpb1_human"), Some(&"POLR2A".to_string()));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = parse_mapping(Path::new("no_such_mapping.txt"), 0, 1).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
