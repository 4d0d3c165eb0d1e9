use crate::models::{split_sign, OddsValue, Price};
use tracing::debug;

/// Largest magnitude we ever publish, for either sign
pub const MAX_MAGNITUDE: u32 = 20_000;

/// Apply the discount-and-coarsen policy to a scraped odds string.
///
/// "+650" becomes "+485": take 75% of the magnitude (truncating), round down
/// onto the 5-grid, cap at 20000 and put the sign back. Negative odds go
/// through the same formula. Anything that is not `[+-]<digits>` comes back
/// as `Price::Unparsed` with the text untouched, and an empty string is
/// `Price::Empty`.
pub fn transform_odds(odds_text: &str) -> Price {
    let text = odds_text.trim();
    if text.is_empty() {
        return Price::Empty;
    }

    let Some((sign, digits)) = split_sign(text) else {
        debug!("Odds '{}' has no sign, leaving as is", odds_text);
        return Price::Unparsed(odds_text.to_string());
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        debug!("Odds '{}' is not numeric, leaving as is", odds_text);
        return Price::Unparsed(odds_text.to_string());
    }
    let Ok(magnitude) = digits.parse::<u64>() else {
        debug!("Odds '{}' is out of range, leaving as is", odds_text);
        return Price::Unparsed(odds_text.to_string());
    };

    Price::Adjusted(OddsValue {
        sign,
        magnitude: adjust_magnitude(magnitude),
    })
}

/// 75% with truncation, snapped down to a multiple of 5, capped.
pub fn adjust_magnitude(magnitude: u64) -> u32 {
    // floor(m * 3 / 4) without overflowing on huge inputs
    let reduced = magnitude / 4 * 3 + (magnitude % 4) * 3 / 4;

    let rounded = match reduced % 10 {
        d @ 1..=4 => reduced - d,
        d @ 6..=9 => reduced - (d - 5),
        _ => reduced,
    };

    rounded.min(MAX_MAGNITUDE as u64) as u32
}
