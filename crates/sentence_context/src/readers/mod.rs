pub mod tsv;

pub use tsv::{TsvRecord, TsvSource, TSV_COLUMNS};
