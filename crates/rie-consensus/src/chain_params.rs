//! Consensus parameters per network.
//!
//! `ConsensusParams` is built once from a [`Network`] (or a configuration file that
//! names one) and passed by reference into every consensus call. It is never
//! mutated afterwards, so one instance can be shared freely between threads.
//!
//! - `ConsensusParams::mainnet()` / `testnet()` / `regtest()` for the built-in networks
//! - `ConsensusParams::from_config()` for a TOML file naming a base network plus overrides

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::bignum::Uint256;
use crate::compact::encode_compact;
use crate::params::{
    MIN_SIGNIFICANT_BITS, SUPERBLOCK_CYCLE, SUPERBLOCK_HEIGHT_OFFSET, SUPERBLOCK_INTERVAL_POSITION,
};
use crate::target::PowVersion;

/// Mainnet PoW digest of the genesis header.
pub const MAINNET_GENESIS_POW_HASH: &str =
    "26d0466d5a0eab0ebf171eacb98146b26143d143463514f26b28d3cded81c1bb";
/// Testnet PoW digest of the genesis header.
pub const TESTNET_GENESIS_POW_HASH: &str =
    "d38d558bf81079c5c1662f6645dfa9856bcda0f54c93c5ca3788a59c7cfcc734";
/// Regtest PoW digest of the genesis header.
pub const REGTEST_GENESIS_POW_HASH: &str =
    "e450cfcfbf053cbba2c70088cbe95a5bb4133665126028dd916a553dbf49d94a";

/// `fork1_height` of networks that never schedule superblocks.
pub const SUPERBLOCKS_DISABLED: u32 = u32::MAX;

/// Network selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Main,
    Test,
    Regtest,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Main => "main",
            Network::Test => "test",
            Network::Regtest => "regtest",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = ChainParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Main),
            "test" | "testnet" => Ok(Network::Test),
            "regtest" => Ok(Network::Regtest),
            other => Err(ChainParamsError::new(
                "network",
                format!("unknown network '{}'", other),
            )),
        }
    }
}

/// Error when constructing ConsensusParams from configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ConsensusParams error for '{field}': {message}")]
pub struct ChainParamsError {
    /// The field that is missing or invalid.
    pub field: &'static str,
    /// Description of the error.
    pub message: String,
}

impl ChainParamsError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Immutable consensus parameters of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusParams {
    pub network: Network,
    /// Digest of the genesis header, exempt from the proof-of-work check.
    pub genesis_pow_hash: Uint256,
    /// First height of the superblock schedule, or [`SUPERBLOCKS_DISABLED`].
    pub fork1_height: u32,
    /// First height of the linear encoding and per-block retarget. Ends superblocks.
    pub fork2_height: u32,
    /// Accepted constellations before fork2, as cumulative gaps starting at 0.
    pub patterns_legacy: Vec<Vec<u32>>,
    /// Accepted constellations from fork2 on.
    pub patterns: Vec<Vec<u32>>,
    /// Minimum legacy difficulty (bit length of the target).
    pub pow_limit_legacy: u32,
    /// Maximum legacy difficulty a header may claim.
    pub legacy_difficulty_max: u32,
    /// Minimum linear bits (`256 * difficulty`).
    pub n_bits_min: u32,
    /// Maximum linear bits a header may claim. Bounds the target width, and with
    /// it the cost of rejecting a header.
    pub n_bits_max: u32,
    /// Seconds per block.
    pub target_spacing: i64,
    /// Seconds per legacy retarget interval.
    pub target_timespan: i64,
    pub allow_min_difficulty_blocks: bool,
    pub no_retargeting: bool,
    /// How far ahead of the adjusted time a header timestamp may be.
    pub max_future_block_time: i64,
}

impl ConsensusParams {
    /// Mainnet parameters.
    pub fn mainnet() -> Self {
        Self {
            network: Network::Main,
            genesis_pow_hash: genesis_hash(MAINNET_GENESIS_POW_HASH),
            fork1_height: 157_248,
            fork2_height: 1_482_768,
            patterns_legacy: vec![vec![0, 4, 2, 4, 2, 4]],
            patterns: vec![vec![0, 2, 4, 2, 4, 6, 2], vec![0, 2, 6, 4, 2, 4, 2]],
            pow_limit_legacy: 304,
            legacy_difficulty_max: 65_535,
            n_bits_min: 600 * 256,
            n_bits_max: 4096 * 256,
            target_spacing: 150,
            target_timespan: 12 * 3600,
            allow_min_difficulty_blocks: false,
            no_retargeting: false,
            max_future_block_time: 7200,
        }
    }

    /// Testnet parameters. Superblocks never activate.
    pub fn testnet() -> Self {
        Self {
            network: Network::Test,
            genesis_pow_hash: genesis_hash(TESTNET_GENESIS_POW_HASH),
            fork1_height: SUPERBLOCKS_DISABLED,
            fork2_height: 0,
            patterns_legacy: vec![vec![0, 2, 4, 2]],
            patterns: vec![vec![0, 4, 2, 4, 2], vec![0, 2, 4, 2, 4]],
            pow_limit_legacy: 600,
            legacy_difficulty_max: 65_535,
            n_bits_min: 512 * 256,
            n_bits_max: 4096 * 256,
            target_spacing: 300,
            target_timespan: 12 * 3600,
            allow_min_difficulty_blocks: true,
            no_retargeting: false,
            max_future_block_time: 7200,
        }
    }

    /// Regression-test parameters: single primes, no retargeting.
    pub fn regtest() -> Self {
        Self {
            network: Network::Regtest,
            genesis_pow_hash: genesis_hash(REGTEST_GENESIS_POW_HASH),
            fork1_height: SUPERBLOCKS_DISABLED,
            fork2_height: 0,
            patterns_legacy: vec![vec![0]],
            patterns: vec![vec![0]],
            pow_limit_legacy: 304,
            legacy_difficulty_max: 65_535,
            n_bits_min: 288 * 256,
            n_bits_max: 4096 * 256,
            target_spacing: 150,
            target_timespan: 12 * 3600,
            allow_min_difficulty_blocks: true,
            no_retargeting: true,
            max_future_block_time: 7200,
        }
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Main => Self::mainnet(),
            Network::Test => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    /// Build parameters from configuration: the named base network plus overrides.
    ///
    /// Mainnet accepts no overrides. Activation heights may only be moved on regtest.
    pub fn from_config(config: &ConsensusParamsConfig) -> Result<Self, ChainParamsError> {
        let network: Network = config
            .network
            .as_deref()
            .ok_or_else(|| ChainParamsError::new("network", "missing required field"))?
            .parse()?;

        if network == Network::Main {
            if let Some(&field) = config.overridden_fields().first() {
                return Err(ChainParamsError::new(
                    field,
                    "overrides are not permitted on main",
                ));
            }
        }

        let mut params = Self::for_network(network)
            .with_activation_heights(config.fork1_height, config.fork2_height)?;

        if let Some(hash) = &config.genesis_pow_hash {
            params.genesis_pow_hash = Uint256::from_hex(hash).map_err(|e| {
                ChainParamsError::new("genesis_pow_hash", format!("invalid hex: {}", e))
            })?;
        }
        if let Some(patterns) = &config.patterns {
            params.patterns = patterns.clone();
        }
        if let Some(patterns) = &config.patterns_legacy {
            params.patterns_legacy = patterns.clone();
        }
        if let Some(v) = config.pow_limit_legacy {
            params.pow_limit_legacy = v;
        }
        if let Some(v) = config.legacy_difficulty_max {
            params.legacy_difficulty_max = v;
        }
        if let Some(v) = config.n_bits_min {
            params.n_bits_min = v;
        }
        if let Some(v) = config.n_bits_max {
            params.n_bits_max = v;
        }
        if let Some(v) = config.target_spacing {
            params.target_spacing = v;
        }
        if let Some(v) = config.target_timespan {
            params.target_timespan = v;
        }
        if let Some(v) = config.allow_min_difficulty_blocks {
            params.allow_min_difficulty_blocks = v;
        }
        if let Some(v) = config.no_retargeting {
            params.no_retargeting = v;
        }
        if let Some(v) = config.max_future_block_time {
            params.max_future_block_time = v;
        }

        params.validate()?;
        Ok(params)
    }

    /// Parse a TOML document and build parameters from it.
    pub fn from_toml(toml_str: &str) -> Result<Self, ChainParamsError> {
        Self::from_config(&ConsensusParamsConfig::from_toml_str(toml_str)?)
    }

    /// Move the fork activation heights. Regtest only.
    pub fn with_activation_heights(
        mut self,
        fork1_height: Option<u32>,
        fork2_height: Option<u32>,
    ) -> Result<Self, ChainParamsError> {
        if fork1_height.is_none() && fork2_height.is_none() {
            return Ok(self);
        }
        if self.network != Network::Regtest {
            let field = if fork1_height.is_some() {
                "fork1_height"
            } else {
                "fork2_height"
            };
            return Err(ChainParamsError::new(
                field,
                format!(
                    "activation heights can only be overridden on regtest, not {}",
                    self.network
                ),
            ));
        }
        if let Some(h) = fork1_height {
            self.fork1_height = h;
        }
        if let Some(h) = fork2_height {
            self.fork2_height = h;
        }
        Ok(self)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ChainParamsError> {
        validate_patterns("patterns", &self.patterns)?;
        validate_patterns("patterns_legacy", &self.patterns_legacy)?;

        if self.target_spacing <= 0 {
            return Err(ChainParamsError::new("target_spacing", "must be positive"));
        }
        if self.target_timespan <= 0 || self.target_timespan % self.target_spacing != 0 {
            return Err(ChainParamsError::new(
                "target_timespan",
                "must be a positive multiple of target_spacing",
            ));
        }
        if self.fork1_height != SUPERBLOCKS_DISABLED && self.fork1_height > self.fork2_height {
            return Err(ChainParamsError::new(
                "fork1_height",
                "must not exceed fork2_height",
            ));
        }

        let interval = self.target_timespan / self.target_spacing;
        if interval > i64::from(u32::MAX) {
            return Err(ChainParamsError::new(
                "target_timespan",
                "retarget interval does not fit in a block height",
            ));
        }
        if self.fork1_height < self.fork2_height
            && interval <= i64::from(SUPERBLOCK_HEIGHT_OFFSET)
        {
            return Err(ChainParamsError::new(
                "target_timespan",
                format!(
                    "superblocks need a retarget interval above {} blocks",
                    SUPERBLOCK_HEIGHT_OFFSET
                ),
            ));
        }
        if self.pow_limit_legacy < MIN_SIGNIFICANT_BITS {
            return Err(ChainParamsError::new(
                "pow_limit_legacy",
                format!("must be at least {}", MIN_SIGNIFICANT_BITS),
            ));
        }
        if self.legacy_difficulty_max < self.pow_limit_legacy {
            return Err(ChainParamsError::new(
                "legacy_difficulty_max",
                "must not be below pow_limit_legacy",
            ));
        }
        if self.n_bits_min < MIN_SIGNIFICANT_BITS << 8 {
            return Err(ChainParamsError::new(
                "n_bits_min",
                format!("must be at least {} * 256", MIN_SIGNIFICANT_BITS),
            ));
        }
        if self.n_bits_max < self.n_bits_min {
            return Err(ChainParamsError::new(
                "n_bits_max",
                "must not be below n_bits_min",
            ));
        }
        if self.max_future_block_time < 0 {
            return Err(ChainParamsError::new(
                "max_future_block_time",
                "must not be negative",
            ));
        }
        Ok(())
    }

    /// Number of blocks between legacy retargets.
    pub fn difficulty_adjustment_interval(&self) -> u32 {
        (self.target_timespan / self.target_spacing) as u32
    }

    /// Whether the superblock schedule applies at `height` (`fork1 <= height < fork2`).
    pub fn superblocks_active(&self, height: u32) -> bool {
        height >= self.fork1_height && height < self.fork2_height
    }

    /// Whether `height` is at or beyond the second fork.
    pub fn is_fork2_active(&self, height: u32) -> bool {
        height >= self.fork2_height
    }

    /// Whether `height` lies in the retarget interval that contains a superblock
    /// (one interval out of every fourteen).
    pub fn is_in_superblock_interval(&self, height: u32) -> bool {
        (height / self.difficulty_adjustment_interval()) % SUPERBLOCK_CYCLE
            == SUPERBLOCK_INTERVAL_POSITION
    }

    /// Whether `height` is the superblock of its interval.
    pub fn is_superblock(&self, height: u32) -> bool {
        height % self.difficulty_adjustment_interval() == SUPERBLOCK_HEIGHT_OFFSET
            && self.is_in_superblock_interval(height)
    }

    /// Accepted constellations for a PoW version.
    pub fn patterns_for(&self, version: PowVersion) -> &[Vec<u32>] {
        match version {
            PowVersion::Legacy => &self.patterns_legacy,
            PowVersion::Linear => &self.patterns,
        }
    }

    /// Tuple length of the first legacy pattern.
    pub fn legacy_tuple_length(&self) -> u32 {
        self.patterns_legacy.first().map_or(0, |p| p.len() as u32)
    }

    /// Tuple length of the first post-fork2 pattern.
    pub fn tuple_length(&self) -> u32 {
        self.patterns.first().map_or(0, |p| p.len() as u32)
    }

    /// Legacy compact bits of the minimum difficulty.
    pub fn pow_limit_legacy_bits(&self) -> u32 {
        encode_compact(&BigUint::from(self.pow_limit_legacy))
    }
}

fn genesis_hash(hex: &str) -> Uint256 {
    Uint256::from_hex(hex).unwrap_or_default()
}

fn validate_patterns(field: &'static str, patterns: &[Vec<u32>]) -> Result<(), ChainParamsError> {
    let first = patterns
        .first()
        .ok_or_else(|| ChainParamsError::new(field, "at least one pattern is required"))?;
    for pattern in patterns {
        if pattern.first() != Some(&0) {
            return Err(ChainParamsError::new(field, "every pattern must start at 0"));
        }
        if pattern.len() != first.len() {
            return Err(ChainParamsError::new(
                field,
                "all patterns must have the same tuple length",
            ));
        }
        if pattern.iter().skip(1).any(|&gap| gap == 0) {
            return Err(ChainParamsError::new(field, "gaps after the first must be positive"));
        }
    }
    Ok(())
}

/// Configuration for loading ConsensusParams from TOML.
///
/// All fields are optional so partial configs can be validated with clear errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsensusParamsConfig {
    /// Base network: "main", "test" or "regtest".
    pub network: Option<String>,
    /// Regtest only.
    pub fork1_height: Option<u32>,
    /// Regtest only.
    pub fork2_height: Option<u32>,
    /// Display-order hex.
    pub genesis_pow_hash: Option<String>,
    pub patterns: Option<Vec<Vec<u32>>>,
    pub patterns_legacy: Option<Vec<Vec<u32>>>,
    pub pow_limit_legacy: Option<u32>,
    pub legacy_difficulty_max: Option<u32>,
    pub n_bits_min: Option<u32>,
    pub n_bits_max: Option<u32>,
    pub target_spacing: Option<i64>,
    pub target_timespan: Option<i64>,
    pub allow_min_difficulty_blocks: Option<bool>,
    pub no_retargeting: Option<bool>,
    pub max_future_block_time: Option<i64>,
}

impl ConsensusParamsConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ChainParamsError> {
        toml::from_str(toml_str)
            .map_err(|e| ChainParamsError::new("toml", e.to_string()))
    }

    /// Names of the fields that override the base network.
    pub fn overridden_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut mark = |set: bool, name: &'static str| {
            if set {
                fields.push(name);
            }
        };
        mark(self.fork1_height.is_some(), "fork1_height");
        mark(self.fork2_height.is_some(), "fork2_height");
        mark(self.genesis_pow_hash.is_some(), "genesis_pow_hash");
        mark(self.patterns.is_some(), "patterns");
        mark(self.patterns_legacy.is_some(), "patterns_legacy");
        mark(self.pow_limit_legacy.is_some(), "pow_limit_legacy");
        mark(self.legacy_difficulty_max.is_some(), "legacy_difficulty_max");
        mark(self.n_bits_min.is_some(), "n_bits_min");
        mark(self.n_bits_max.is_some(), "n_bits_max");
        mark(self.target_spacing.is_some(), "target_spacing");
        mark(self.target_timespan.is_some(), "target_timespan");
        mark(
            self.allow_min_difficulty_blocks.is_some(),
            "allow_min_difficulty_blocks",
        );
        mark(self.no_retargeting.is_some(), "no_retargeting");
        mark(self.max_future_block_time.is_some(), "max_future_block_time");
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ Built-in networks ============

    #[test]
    fn test_mainnet_params() {
        let params = ConsensusParams::mainnet();
        assert_eq!(params.difficulty_adjustment_interval(), 288);
        assert_eq!(params.legacy_tuple_length(), 6);
        assert_eq!(params.tuple_length(), 7);
        assert_eq!(params.pow_limit_legacy_bits(), 0x0201_3000);
        assert_eq!(params.genesis_pow_hash.to_hex(), MAINNET_GENESIS_POW_HASH);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_builtin_networks_validate() {
        for network in [Network::Main, Network::Test, Network::Regtest] {
            let params = ConsensusParams::for_network(network);
            assert_eq!(params.network, network);
            assert!(params.validate().is_ok(), "{}", network);
            assert!(!params.genesis_pow_hash.is_zero());
        }
    }

    #[test]
    fn test_params_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConsensusParams>();
    }

    #[test]
    fn test_network_parsing() {
        assert_eq!("main".parse::<Network>().unwrap(), Network::Main);
        assert_eq!("Testnet".parse::<Network>().unwrap(), Network::Test);
        assert_eq!("regtest".parse::<Network>().unwrap(), Network::Regtest);
        assert_eq!("signet".parse::<Network>().unwrap_err().field, "network");
        assert_eq!(Network::Test.to_string(), "test");
    }

    // ============ Superblock schedule ============

    #[test]
    fn test_superblock_schedule() {
        let params = ConsensusParams::mainnet();
        // interval 558 is the twelfth of its fourteen-interval cycle
        assert!(params.is_in_superblock_interval(160_704));
        assert!(params.is_in_superblock_interval(160_991));
        assert!(!params.is_in_superblock_interval(160_992));
        assert!(!params.is_in_superblock_interval(160_703));
        assert!(params.is_superblock(160_848));
        assert!(!params.is_superblock(160_849));
        assert!(!params.is_superblock(160_848 + 288));
    }

    #[test]
    fn test_superblocks_active_window() {
        let params = ConsensusParams::mainnet();
        assert!(!params.superblocks_active(157_247));
        assert!(params.superblocks_active(157_248));
        assert!(params.superblocks_active(1_482_767));
        assert!(!params.superblocks_active(1_482_768));
        assert!(!ConsensusParams::testnet().superblocks_active(1_000_000));
    }

    #[test]
    fn test_patterns_for_version() {
        let params = ConsensusParams::mainnet();
        assert_eq!(params.patterns_for(PowVersion::Legacy).len(), 1);
        assert_eq!(params.patterns_for(PowVersion::Linear).len(), 2);
    }

    // ============ Configuration ============

    #[test]
    fn test_from_config_missing_network_returns_error() {
        let err = ConsensusParams::from_config(&ConsensusParamsConfig::default()).unwrap_err();
        assert_eq!(err.field, "network");
    }

    #[test]
    fn test_from_config_mainnet_rejects_overrides() {
        let config = ConsensusParamsConfig {
            network: Some("main".into()),
            target_spacing: Some(60),
            ..Default::default()
        };
        let err = ConsensusParams::from_config(&config).unwrap_err();
        assert_eq!(err.field, "target_spacing");
    }

    #[test]
    fn test_from_config_plain_network() {
        let config = ConsensusParamsConfig {
            network: Some("main".into()),
            ..Default::default()
        };
        assert_eq!(
            ConsensusParams::from_config(&config).unwrap(),
            ConsensusParams::mainnet()
        );
    }

    #[test]
    fn test_regtest_activation_overrides() {
        let params = ConsensusParams::from_toml(
            r#"
            network = "regtest"
            fork1_height = 0
            fork2_height = 5000
            "#,
        )
        .unwrap();
        assert_eq!(params.fork1_height, 0);
        assert_eq!(params.fork2_height, 5000);
        assert!(params.superblocks_active(4999));
        assert!(params.no_retargeting);
    }

    #[test]
    fn test_fork1_after_fork2_rejected() {
        let err = ConsensusParams::from_toml(
            r#"
            network = "regtest"
            fork1_height = 100
            fork2_height = 50
            "#,
        )
        .unwrap_err();
        assert_eq!(err.field, "fork1_height");
        assert_eq!(err.message, "must not exceed fork2_height");

        // An empty window and the disabled marker are both allowed.
        let params =
            ConsensusParams::from_toml("network = \"regtest\"\nfork1_height = 50\nfork2_height = 50\n")
                .unwrap();
        assert!(!params.superblocks_active(50));
        let params = ConsensusParams::from_toml("network = \"regtest\"\nfork2_height = 50\n").unwrap();
        assert_eq!(params.fork1_height, SUPERBLOCKS_DISABLED);
        assert!(!params.superblocks_active(10));
    }

    #[test]
    fn test_activation_overrides_rejected_off_regtest() {
        let err = ConsensusParams::from_toml("network = \"test\"\nfork2_height = 10\n").unwrap_err();
        assert_eq!(err.field, "fork2_height");

        let err = ConsensusParams::mainnet()
            .with_activation_heights(Some(1), None)
            .unwrap_err();
        assert_eq!(err.field, "fork1_height");
    }

    #[test]
    fn test_testnet_tuning_overrides() {
        let params = ConsensusParams::from_toml(
            r#"
            network = "test"
            patterns = [[0, 2]]
            pow_limit_legacy = 304
            "#,
        )
        .unwrap();
        assert_eq!(params.patterns, vec![vec![0, 2]]);
        assert_eq!(params.pow_limit_legacy, 304);
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        let err = ConsensusParams::from_toml("network = \"test\"\npatterns = [[2, 4]]\n").unwrap_err();
        assert_eq!(err.field, "patterns");

        let err =
            ConsensusParams::from_toml("network = \"test\"\npatterns_legacy = []\n").unwrap_err();
        assert_eq!(err.field, "patterns_legacy");

        let err = ConsensusParams::from_toml("network = \"test\"\npatterns = [[0, 2], [0, 2, 4]]\n")
            .unwrap_err();
        assert_eq!(err.field, "patterns");
    }

    #[test]
    fn test_invalid_genesis_hash_rejected() {
        let err = ConsensusParams::from_toml("network = \"regtest\"\ngenesis_pow_hash = \"xyz\"\n")
            .unwrap_err();
        assert_eq!(err.field, "genesis_pow_hash");
    }

    #[test]
    fn test_invalid_timing_rejected() {
        let err =
            ConsensusParams::from_toml("network = \"test\"\ntarget_spacing = 0\n").unwrap_err();
        assert_eq!(err.field, "target_spacing");

        let err = ConsensusParams::from_toml("network = \"test\"\ntarget_timespan = 1000\n")
            .unwrap_err();
        assert_eq!(err.field, "target_timespan");
    }

    #[test]
    fn test_linear_bits_ceiling() {
        let params =
            ConsensusParams::from_toml("network = \"test\"\nn_bits_max = 1200000\n").unwrap();
        assert_eq!(params.n_bits_max, 1_200_000);

        let err = ConsensusParams::from_toml("network = \"test\"\nn_bits_max = 131071\n")
            .unwrap_err();
        assert_eq!(err.field, "n_bits_max");

        let err = ConsensusParams::from_toml("network = \"main\"\nn_bits_max = 200000\n")
            .unwrap_err();
        assert_eq!(err.field, "n_bits_max");
    }

    #[test]
    fn test_unknown_toml_field_rejected() {
        let err = ConsensusParams::from_toml("network = \"test\"\nblock_reward = 50\n").unwrap_err();
        assert_eq!(err.field, "toml");
    }
}
