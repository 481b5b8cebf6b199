//! Serialization and display of significance results.

pub mod delimited;
pub mod json;
pub mod terminal;

pub use delimited::{to_tsv, write_delimited, write_tsv};
pub use json::{to_json, to_json_pretty, write_json};
pub use terminal::format_result;
