//! # rie-tests
//!
//! Integration tests for the constellation PoW consensus rules.
//!
//! This crate provides:
//! - Scenario tests for proof-of-work validation on every PoW version
//! - Retarget tests that drive the engine over synthetic chains
//! - Property-based tests for the primality oracle, codecs and transition bounds

pub mod generators;
pub mod harness;




pub use generators::*;
pub use harness::*;
