//! Upload Ledger: file uploads with a Markdown ledger of every upload
//!
//! Uploaded files go to a GitHub repository through the Contents API. Each
//! batch is then merged into a Markdown ledger document (front matter, a pipe
//! table with one row per file, newest first) that is written back with an
//! optimistic read-merge-write cycle.

pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod publish;
pub mod report;
pub mod store;
pub mod upload;
