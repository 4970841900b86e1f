//! Static TLD price table.
//!
//! Prices are rough first-year registration estimates in [`crate::CURRENCY`].
//! The table is built once on first use and never mutated.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Price applied to any TLD missing from the table.
pub const DEFAULT_PRICE: f64 = 15.0;

lazy_static! {
    static ref TLD_PRICES: HashMap<&'static str, f64> = {
        let mut m = HashMap::new();
        m.insert(".com", 12.0);
        m.insert(".net", 11.0);
        m.insert(".org", 10.0);
        m.insert(".io", 35.0);
        m.insert(".co", 25.0);
        m.insert(".ai", 45.0);
        m.insert(".trade", 8.0);
        m.insert(".finance", 30.0);
        m.insert(".capital", 28.0);
        m.insert(".fr", 9.0);
        m.insert(".de", 8.0);
        m.insert(".es", 9.0);
        m.insert(".it", 10.0);
        m.insert(".nl", 8.0);
        m.insert(".eu", 7.0);
        m.insert(".uk", 9.0);
        m
    };
}

/// Pricing suffix of a domain: everything from the last `.` onwards,
/// dot included. A string without a dot is returned whole.
pub fn pricing_tld(domain: &str) -> &str {
    match domain.rfind('.') {
        Some(idx) => &domain[idx..],
        None => domain,
    }
}

/// Estimated registration price for `domain`.
///
/// Never fails; unknown TLDs get [`DEFAULT_PRICE`].
pub fn estimate_price(domain: &str) -> f64 {
    let tld = pricing_tld(domain.trim()).to_ascii_lowercase();
    TLD_PRICES.get(tld.as_str()).copied().unwrap_or(DEFAULT_PRICE)
}

/// All priced TLDs, sorted, with their prices.
pub fn known_prices() -> Vec<(&'static str, f64)> {
    let mut prices: Vec<_> = TLD_PRICES.iter().map(|(tld, price)| (*tld, *price)).collect();
    prices.sort_by(|a, b| a.0.cmp(b.0));
    prices
}
