use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of the bonding curve a token trades on. Pump.fun only runs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BondingCurveKind {
    Linear,
}

impl fmt::Display for BondingCurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondingCurveKind::Linear => write!(f, "linear"),
        }
    }
}

/// The pool a token event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    Pumpfun,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::Pumpfun => write!(f, "pumpfun"),
        }
    }
}

/// A fully enriched token creation event, ready for filter evaluation.
/// Immutable once built; discarded after fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEvent {
    /// Token mint address
    pub mint: String,
    /// Token name ("Unknown" when metadata omits it)
    pub name: String,
    /// Token symbol ("UNK" when metadata omits it)
    pub symbol: String,
    /// Display-formatted liquidity, e.g. "12.3 SOL"
    pub liquidity: String,
    /// Display-formatted market cap, e.g. "$4.2K"
    pub market_cap: String,
    /// Price in SOL, never negative
    pub cost: f64,
    /// Top holder share, e.g. "12%"
    pub dev_holding: String,
    /// True iff the mint authority field is absent on-chain
    pub mint_authority_revoked: bool,
    /// True iff the freeze authority field is absent on-chain
    pub freeze_authority_revoked: bool,
    /// Social / reference URLs, may be empty
    pub links: Vec<String>,
    pub bonding_curve_kind: BondingCurveKind,
    /// Which pool produced this event
    pub pool: Pool,
    /// Derived chart link
    pub chart_url: String,
}

impl TokenEvent {
    /// Chart URL for a mint, derived deterministically.
    pub fn chart_url_for(mint: &str) -> String {
        format!("https://dexscreener.com/solana/{}", mint)
    }
}
