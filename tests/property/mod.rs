//! Property-based tests for ledger merge guarantees

mod merge_invariants;
