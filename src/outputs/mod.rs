//! Derived outputs built from the archive of record.
//!
//! - [`json`]: the static-site data file, a sorted and display-ready view of
//!   every archived article
//!
//! ```text
//! data/
//! └── news_archive.jsonl        # archive of record, append-only
//! docs/data/
//! └── news_archive.json         # derived export, rewritten each time
//! ```

pub mod json;
