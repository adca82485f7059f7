// src/registry/dex.rs
use std::env;

/// A known VeChain DEX. Router and factory deployments move over time
/// and differ per network, so addresses are environment-supplied
/// (`VESWAP_ROUTER_TESTNET`, `VESWAP_FACTORY_TESTNET`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexEntry {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub website: &'static str,
    pub version: &'static str,
    /// Swap fee in basis points (30 = 0.30%).
    pub fee_bps: u32,
    pub active: bool,
    env_prefix: &'static str,
}

pub const VECHAIN_DEXES: &[DexEntry] = &[
    DexEntry {
        name: "veswap",
        display_name: "VeSwap",
        description: "Native VeChain decentralized exchange",
        website: "https://veswap.io",
        version: "v2",
        fee_bps: 30,
        active: true,
        env_prefix: "VESWAP",
    },
    DexEntry {
        name: "betterswap",
        display_name: "BetterSwap",
        description: "Sustainability-focused DEX powered by VeBetter",
        website: "https://betterswap.io",
        version: "v2",
        fee_bps: 30,
        active: true,
        env_prefix: "BETTERSWAP",
    },
    DexEntry {
        name: "vexchange-v2",
        display_name: "Vexchange V2",
        description: "Vexchange, the longest-running VeChain DEX",
        website: "https://vexchange.io",
        version: "v2",
        fee_bps: 30,
        active: true,
        env_prefix: "VEXCHANGE_V2",
    },
    DexEntry {
        name: "dthor-swap",
        display_name: "DThor Swap",
        description: "Cross-chain DEX on VeChain",
        website: "https://dthor.io",
        version: "v2",
        fee_bps: 25,
        active: true,
        env_prefix: "DTHOR",
    },
    DexEntry {
        name: "vexchange-v1",
        display_name: "Vexchange V1",
        description: "Original Vexchange deployment (legacy)",
        website: "https://vexchange.io",
        version: "v1",
        fee_bps: 30,
        active: false,
        env_prefix: "VEXCHANGE_V1",
    },
];

/// A DEX entry with its addresses resolved for one network.
#[derive(Debug, Clone)]
pub struct ResolvedDex {
    pub entry: &'static DexEntry,
    pub router: Option<String>,
    pub factory: Option<String>,
}

impl DexEntry {
    pub fn router_env(&self, network: &str) -> String {
        format!("{}_ROUTER_{}", self.env_prefix, network.to_uppercase())
    }

    pub fn factory_env(&self, network: &str) -> String {
        format!("{}_FACTORY_{}", self.env_prefix, network.to_uppercase())
    }

    pub fn resolve(&'static self, network: &str) -> ResolvedDex {
        ResolvedDex {
            entry: self,
            router: env::var(self.router_env(network)).ok().filter(|v| !v.is_empty()),
            factory: env::var(self.factory_env(network)).ok().filter(|v| !v.is_empty()),
        }
    }
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect()
}

/// Looks a DEX up by user-supplied name, ignoring case and separators
/// ("Vexchange V2" and "vexchange-v2" both match).
pub fn find_dex(name: &str, network: &str) -> Option<ResolvedDex> {
    let wanted = normalize(name);
    VECHAIN_DEXES
        .iter()
        .find(|dex| normalize(dex.name) == wanted || normalize(dex.display_name) == wanted)
        .map(|dex| dex.resolve(network))
}

pub fn active_dexes(network: &str) -> Vec<ResolvedDex> {
    VECHAIN_DEXES
        .iter()
        .filter(|dex| dex.active)
        .map(|dex| dex.resolve(network))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_lookup_ignores_case_and_separators() {
        assert!(find_dex("VeSwap", "testnet").is_some());
        assert!(find_dex("vexchange_v2", "testnet").is_some());
        assert!(find_dex("Vexchange V2", "testnet").is_some());
        assert!(find_dex("unknown-dex", "testnet").is_none());
    }

    #[test]
    fn inactive_dexes_are_not_listed() {
        let names: Vec<&str> = active_dexes("testnet")
            .iter()
            .map(|dex| dex.entry.name)
            .collect();
        assert!(names.contains(&"veswap"));
        assert!(!names.contains(&"vexchange-v1"));
    }

    #[test]
    fn env_variable_names() {
        let veswap = &VECHAIN_DEXES[0];
        assert_eq!(veswap.router_env("testnet"), "VESWAP_ROUTER_TESTNET");
        assert_eq!(veswap.factory_env("mainnet"), "VESWAP_FACTORY_MAINNET");
    }
}
