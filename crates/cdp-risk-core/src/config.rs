//! Static per-branch constants (MCR / CCR) and their registry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::Ratio;
use crate::{CdpRiskError, CdpRiskResult};

/// Constants for one collateral branch of the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchConfig {
    pub id: u32,
    pub name: String,
    pub collateral_symbol: String,
    /// Minimum collateralization ratio for a single position (1.1 = 110%).
    pub mcr: Ratio,
    /// Critical collateralization ratio for the whole branch.
    pub ccr: Ratio,
}

impl BranchConfig {
    pub fn validate(&self) -> CdpRiskResult<()> {
        if self.mcr <= Decimal::ONE {
            return Err(CdpRiskError::InvalidInput {
                field: format!("branches.{}.mcr", self.name),
                reason: "MCR must be greater than 1.".into(),
            });
        }
        if self.ccr < self.mcr {
            return Err(CdpRiskError::InvalidInput {
                field: format!("branches.{}.ccr", self.name),
                reason: "CCR cannot be below MCR.".into(),
            });
        }
        Ok(())
    }
}

/// On-disk shape of a branch configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchFile {
    pub branches: Vec<BranchConfig>,
}

/// Validated, immutable set of branch constants.
#[derive(Debug, Clone, Default)]
pub struct BranchRegistry {
    branches: Vec<BranchConfig>,
}

impl BranchRegistry {
    pub fn new(branches: Vec<BranchConfig>) -> CdpRiskResult<Self> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for branch in &branches {
            branch.validate()?;
            if !ids.insert(branch.id) {
                return Err(CdpRiskError::InvalidInput {
                    field: "branches.id".into(),
                    reason: format!("Duplicate branch id {}", branch.id),
                });
            }
            if !names.insert(branch.name.to_ascii_lowercase()) {
                return Err(CdpRiskError::InvalidInput {
                    field: "branches.name".into(),
                    reason: format!("Duplicate branch name '{}'", branch.name),
                });
            }
        }
        Ok(Self { branches })
    }

    pub fn from_file(file: BranchFile) -> CdpRiskResult<Self> {
        Self::new(file.branches)
    }

    pub fn by_id(&self, id: u32) -> Option<&BranchConfig> {
        self.branches.iter().find(|b| b.id == id)
    }

    /// Case-insensitive lookup by branch name or collateral symbol.
    pub fn by_name(&self, name: &str) -> Option<&BranchConfig> {
        self.branches.iter().find(|b| {
            b.name.eq_ignore_ascii_case(name) || b.collateral_symbol.eq_ignore_ascii_case(name)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchConfig> {
        self.branches.iter()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn branch(id: u32, name: &str, mcr: Decimal, ccr: Decimal) -> BranchConfig {
        BranchConfig {
            id,
            name: name.into(),
            collateral_symbol: name.to_ascii_uppercase(),
            mcr,
            ccr,
        }
    }

    #[test]
    fn test_registry_lookup() {
        let reg = BranchRegistry::new(vec![
            branch(0, "weth", dec!(1.1), dec!(1.5)),
            branch(1, "wsteth", dec!(1.2), dec!(1.6)),
        ])
        .unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.by_id(1).unwrap().ccr, dec!(1.6));
        assert_eq!(reg.by_name("WETH").unwrap().mcr, dec!(1.1));
        assert!(reg.by_name("reth").is_none());
    }

    #[test]
    fn test_registry_from_json_file() {
        let json = r#"{"branches":[{"id":0,"name":"btc","collateral_symbol":"WBTC","mcr":"1.1","ccr":"1.5"}]}"#;
        let file: BranchFile = serde_json::from_str(json).unwrap();
        let reg = BranchRegistry::from_file(file).unwrap();
        assert_eq!(reg.by_name("wbtc").unwrap().id, 0);
    }

    #[test]
    fn test_ccr_below_mcr_rejected() {
        let err = BranchRegistry::new(vec![branch(0, "weth", dec!(1.5), dec!(1.1))]).unwrap_err();
        match err {
            CdpRiskError::InvalidInput { field, .. } => assert_eq!(field, "branches.weth.ccr"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_mcr_at_or_below_one_rejected() {
        assert!(BranchRegistry::new(vec![branch(0, "weth", dec!(1), dec!(1.5))]).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = BranchRegistry::new(vec![
            branch(0, "weth", dec!(1.1), dec!(1.5)),
            branch(0, "reth", dec!(1.2), dec!(1.6)),
        ])
        .unwrap_err();
        assert!(matches!(err, CdpRiskError::InvalidInput { .. }));
    }
}
