//! Filter evaluation: does an enriched event match a subscriber's criteria?

use crate::models::{FilterConfig, TokenEvent};

/// Evaluate an event against one subscriber's filter. Pure and total;
/// checks short-circuit in a fixed order.
pub fn matches(event: &TokenEvent, filter: &FilterConfig) -> bool {
    // Inclusive price bounds.
    if event.cost < filter.min_cost || event.cost > filter.max_cost {
        return false;
    }
    if filter.require_mint_revoked && !event.mint_authority_revoked {
        return false;
    }
    if filter.require_freeze_revoked && !event.freeze_authority_revoked {
        return false;
    }
    if filter.require_links && event.links.is_empty() {
        return false;
    }
    if !filter.pools.contains(&event.pool) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BondingCurveKind, Pool};

    fn event() -> TokenEvent {
        TokenEvent {
            mint: "Mint111".to_string(),
            name: "Test".to_string(),
            symbol: "TEST".to_string(),
            liquidity: "10 SOL".to_string(),
            market_cap: "$5K".to_string(),
            cost: 0.001,
            dev_holding: "5%".to_string(),
            mint_authority_revoked: true,
            freeze_authority_revoked: true,
            links: vec!["https://t.me/test".to_string()],
            bonding_curve_kind: BondingCurveKind::Linear,
            pool: Pool::Pumpfun,
            chart_url: TokenEvent::chart_url_for("Mint111"),
        }
    }

    fn filter() -> FilterConfig {
        FilterConfig {
            min_cost: 0.0005,
            max_cost: 0.002,
            ..FilterConfig::default()
        }
    }

    #[test]
    fn test_matching_event_passes() {
        assert!(matches(&event(), &filter()));
    }

    #[test]
    fn test_cost_bounds_are_inclusive() {
        let f = filter();

        let mut at_min = event();
        at_min.cost = f.min_cost;
        assert!(matches(&at_min, &f));

        let mut at_max = event();
        at_max.cost = f.max_cost;
        assert!(matches(&at_max, &f));

        let mut below = event();
        below.cost = f.min_cost / 2.0;
        assert!(!matches(&below, &f));

        let mut above = event();
        above.cost = f.max_cost * 2.0;
        assert!(!matches(&above, &f));
    }

    #[test]
    fn test_widening_bounds_never_turns_pass_into_fail() {
        let passing = event();
        let f = filter();
        assert!(matches(&passing, &f));

        let mut wider = f.clone();
        wider.min_cost = 0.0;
        assert!(matches(&passing, &wider));

        wider.max_cost = f.max_cost * 1000.0;
        assert!(matches(&passing, &wider));
    }

    #[test]
    fn test_empty_links_always_fail_when_required() {
        // Regardless of every other field, no links + require_links = no match.
        for (mint_revoked, freeze_revoked, cost) in
            [(true, true, 0.001), (false, false, 0.001), (true, false, 0.0006)]
        {
            let mut e = event();
            e.links.clear();
            e.mint_authority_revoked = mint_revoked;
            e.freeze_authority_revoked = freeze_revoked;
            e.cost = cost;

            let mut f = filter();
            f.require_links = true;
            f.require_mint_revoked = false;
            f.require_freeze_revoked = false;
            assert!(!matches(&e, &f));
        }
    }

    #[test]
    fn test_mint_revoked_requirement() {
        let mut e = event();
        e.mint_authority_revoked = false;

        let mut strict = filter();
        strict.require_mint_revoked = true;
        assert!(!matches(&e, &strict));

        let mut lax = filter();
        lax.require_mint_revoked = false;
        assert!(matches(&e, &lax));
    }

    #[test]
    fn test_freeze_revoked_requirement() {
        let mut e = event();
        e.freeze_authority_revoked = false;

        let mut strict = filter();
        strict.require_freeze_revoked = true;
        assert!(!matches(&e, &strict));

        let mut lax = filter();
        lax.require_freeze_revoked = false;
        assert!(matches(&e, &lax));
    }

    #[test]
    fn test_pool_membership_enforced() {
        let mut f = filter();
        f.pools.clear();
        assert!(!matches(&event(), &f));

        f.pools.push(Pool::Pumpfun);
        assert!(matches(&event(), &f));
    }
}
