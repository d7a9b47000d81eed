//! Property-based tests for the combination engine.
