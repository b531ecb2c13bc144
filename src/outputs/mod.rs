//! Output generation for harvested announcement runs.
//!
//! One format is produced: newline-delimited JSON, one file per run, with
//! a run-metadata object on the first line. See [`jsonl`].

pub mod jsonl;
