//! Integration tests for the upload ledger

mod cli_binary;
mod config_integration;
mod ledger_report;
mod publish_cycle;
mod test_utils;
