pub mod incentives;
pub mod position;
pub mod redemption;
pub mod system;

use clap::Args;

use cdp_risk_core::config::{BranchConfig, BranchFile, BranchRegistry};

use crate::input;

/// Branch constants sourced from a configuration file
#[derive(Args)]
pub struct BranchArgs {
    /// Path to a YAML or JSON file listing branch constants
    #[arg(long)]
    pub branches: Option<String>,

    /// Branch name or collateral symbol to look up in --branches
    #[arg(long)]
    pub branch: Option<String>,
}

impl BranchArgs {
    pub fn resolve(&self) -> Result<Option<BranchConfig>, Box<dyn std::error::Error>> {
        let name = match self.branch {
            Some(ref name) => name,
            None => return Ok(None),
        };
        let path = self
            .branches
            .as_deref()
            .ok_or("--branches <file> is required when --branch is given")?;
        let file: BranchFile = input::file::read_config(path)?;
        let registry = BranchRegistry::from_file(file)?;
        let branch = registry
            .by_name(name)
            .ok_or_else(|| format!("Branch '{}' not found in {}", name, path))?;
        Ok(Some(branch.clone()))
    }
}
