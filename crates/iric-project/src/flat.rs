//! Exported flat-table series (`Result_<N>.csv`).

use crate::error::Result;
use crate::has_extension;
use crate::tree::collect_files;
use std::path::{Path, PathBuf};

const RESULT_PREFIX: &str = "result_";

/// One exported step table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTableFile {
    /// Parsed number, or the 1-based position in the sorted list.
    pub step: i64,
    pub path: PathBuf,
}

fn is_result_table(name: &str) -> bool {
    name.len() > RESULT_PREFIX.len()
        && name
            .get(..RESULT_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(RESULT_PREFIX))
        && has_extension(name, "csv")
}

/// Parse `N` from a `Result_<N>...` file stem (case-insensitive).
pub fn parse_result_step(path: &Path) -> Option<i64> {
    let stem = path.file_stem()?.to_str()?;
    let lower = stem.to_ascii_lowercase();
    let start = lower.find(RESULT_PREFIX)? + RESULT_PREFIX.len();
    let digits: String = stem[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Whether any `Result_*.csv` exists under `dir`.
pub fn has_flat_tables(dir: &Path) -> Result<bool> {
    Ok(!collect_files(dir, is_result_table)?.is_empty())
}

/// Every `Result_*.csv` under `dir`, numbered files first (by number),
/// then unnumbered ones by file name.
pub fn list_flat_tables(dir: &Path) -> Result<Vec<FlatTableFile>> {
    let files = collect_files(dir, is_result_table)?;

    let mut numbered: Vec<(i64, PathBuf)> = Vec::new();
    let mut unnumbered: Vec<PathBuf> = Vec::new();
    for path in files {
        match parse_result_step(&path) {
            Some(n) => numbered.push((n, path)),
            None => unnumbered.push(path),
        }
    }
    numbered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    unnumbered.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(numbered
        .into_iter()
        .map(|(n, path)| (Some(n), path))
        .chain(unnumbered.into_iter().map(|path| (None, path)))
        .enumerate()
        .map(|(idx, (n, path))| FlatTableFile {
            step: n.unwrap_or(idx as i64 + 1),
            path,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result_step() {
        assert_eq!(parse_result_step(Path::new("out/Result_12.csv")), Some(12));
        assert_eq!(parse_result_step(Path::new("result_3_copy.csv")), Some(3));
        assert_eq!(parse_result_step(Path::new("Result_final.csv")), None);
        assert_eq!(parse_result_step(Path::new("Summary.csv")), None);
    }

    #[test]
    fn test_is_result_table() {
        assert!(is_result_table("Result_1.csv"));
        assert!(is_result_table("RESULT_x.CSV"));
        assert!(!is_result_table("Result_.txt"));
        assert!(!is_result_table("Results.csv"));
    }
}
