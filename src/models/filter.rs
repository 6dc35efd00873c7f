use serde::{Deserialize, Serialize};

use crate::models::token::Pool;

/// Per-subscriber alert criteria. Every subscriber owns exactly one of
/// these; edits go through the registry so readers never see a
/// half-applied config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Inclusive price bounds in SOL. `min_cost <= max_cost` always holds.
    pub min_cost: f64,
    pub max_cost: f64,
    pub require_mint_revoked: bool,
    pub require_freeze_revoked: bool,
    pub require_links: bool,
    /// Pools the subscriber wants events from.
    pub pools: Vec<Pool>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_cost: 0.0000000023,
            max_cost: 0.006,
            require_mint_revoked: true,
            require_freeze_revoked: true,
            require_links: true,
            pools: vec![Pool::Pumpfun],
        }
    }
}

/// The editable fields of a [`FilterConfig`], used by the settings UI and
/// the registry's edit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    MinCost,
    MaxCost,
    MintRevoked,
    FreezeRevoked,
    Links,
}

impl FilterField {
    pub fn name(&self) -> &'static str {
        match self {
            FilterField::MinCost => "min cost",
            FilterField::MaxCost => "max cost",
            FilterField::MintRevoked => "mint revoked",
            FilterField::FreezeRevoked => "freeze revoked",
            FilterField::Links => "links required",
        }
    }

    /// Fields edited by sending a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FilterField::MinCost | FilterField::MaxCost)
    }
}
