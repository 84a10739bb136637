pub mod extract;
pub mod lines;
pub mod merge;
pub mod sections;

use crate::db::FileExtract;

/// Full pipeline for one dump: locate sections, parse their fields, merge
/// per-IP rows, and collect everything into one store-ready extract.
pub fn process_file(text: &str) -> FileExtract {
    extract::extract_all(text)
}
