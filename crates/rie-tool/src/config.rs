//! Parameter and chain file loading.

use anyhow::{Context, Result};
use rie_consensus::{BlockEntry, ChainIndex, ConsensusParams, ConsensusParamsConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Load consensus parameters for `network`, applying overrides from `config_path`
/// when given. A `network` key in the file takes precedence over the flag.
pub fn load_params(network: &str, config_path: Option<&Path>) -> Result<ConsensusParams> {
    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            ConsensusParamsConfig::from_toml_str(&content).context("Failed to parse config file")?
        }
        None => ConsensusParamsConfig::default(),
    };
    if config.network.is_none() {
        config.network = Some(network.to_string());
    }
    ConsensusParams::from_config(&config).context("Invalid consensus parameters")
}

/// A run of consecutive blocks read from TOML:
///
/// ```toml
/// base_height = 287712
///
/// [[block]]
/// time = 1435639430
/// bits = 0x0205d900
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainFile {
    /// Height of the first block listed.
    #[serde(default)]
    pub base_height: u32,
    #[serde(rename = "block", default)]
    pub blocks: Vec<BlockEntry>,
}

impl ChainFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chain file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse chain file")
    }

    pub fn into_index(self) -> ChainIndex {
        ChainIndex::from_entries(self.base_height, self.blocks)
    }
}

/// Parse a `u32` written in decimal or as `0x`-prefixed hex.
pub fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).with_context(|| format!("Invalid hex '{}'", s)),
        None => s
            .parse()
            .with_context(|| format!("Invalid number '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rie_consensus::{BlockIndex, Network};
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_params_without_file() {
        let params = load_params("main", None).unwrap();
        assert_eq!(params, ConsensusParams::mainnet());
        assert!(load_params("nonet", None).is_err());
    }

    #[test]
    fn test_load_params_file_overrides_network_flag() {
        let file = write_temp("network = \"regtest\"\nfork2_height = 100\n");
        let params = load_params("main", Some(file.path())).unwrap();
        assert_eq!(params.network, Network::Regtest);
        assert_eq!(params.fork2_height, 100);
    }

    #[test]
    fn test_load_params_rejects_bad_override() {
        let file = write_temp("fork2_height = 100\n");
        assert!(load_params("test", Some(file.path())).is_err());
    }

    #[test]
    fn test_chain_file() {
        let file = write_temp(
            r#"
            base_height = 287998

            [[block]]
            time = 1435676311
            bits = 0x0205d900

            [[block]]
            time = 1435676461
            bits = 0x0205d900
            "#,
        );
        let chain = ChainFile::load(file.path()).unwrap().into_index();
        let tip = chain.tip().unwrap();
        assert_eq!(tip.height(), 287_999);
        assert_eq!(tip.bits(), 0x0205_d900);
    }

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("0x0205f200").unwrap(), 0x0205_f200);
        assert_eq!(parse_u32("77824").unwrap(), 77_824);
        assert!(parse_u32("0xzz").is_err());
        assert!(parse_u32("-1").is_err());
    }
}
