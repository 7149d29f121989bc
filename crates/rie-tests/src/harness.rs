//! Test harness helpers.

use rie_consensus::ConsensusParams;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test writer. Safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Mainnet parameters with a prime quadruplet `{0, 2, 6, 8}` accepted by both
/// PoW versions, so solutions can be found or hard-coded cheaply.
pub fn quadruplet_params() -> ConsensusParams {
    ConsensusParams {
        patterns_legacy: vec![vec![0, 2, 4, 2]],
        patterns: vec![vec![0, 2, 4, 2]],
        ..ConsensusParams::mainnet()
    }
}

/// Mainnet parameters accepting twin primes on both PoW versions.
pub fn twin_params() -> ConsensusParams {
    ConsensusParams {
        patterns_legacy: vec![vec![0, 2]],
        patterns: vec![vec![0, 2]],
        ..ConsensusParams::mainnet()
    }
}
