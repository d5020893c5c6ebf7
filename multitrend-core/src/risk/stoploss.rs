//! Strength-scaled stop-loss.
//!
//! A stronger confluence earns a wider stop. Values are negative fractions of
//! the entry price.

/// Stop for an entry at `strength`. None when the strength is too low for an
/// entry to exist at all.
pub fn stoploss_for_entry(strength: u32) -> Option<f64> {
    match strength {
        0 | 1 => None,
        2 => Some(-0.03),
        3 => Some(-0.04),
        _ => Some(-0.05),
    }
}

/// Stop for a trade that is already open. When the trend weakens below two
/// confirmations the stop tightens to the narrowest rung instead of vanishing.
pub fn stoploss_for_open_trade(strength: u32) -> f64 {
    stoploss_for_entry(strength).unwrap_or(-0.03)
}
