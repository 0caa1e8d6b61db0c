//! Lamport/SOL conversions without floats.
//!
//! Balances travel through the crate as integer lamports; these helpers only
//! exist at the presentation edge.

use eyre::Context as _;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

const SOL_DECIMALS: u32 = 9;

/// Formats lamports as a trimmed decimal SOL string.
///
/// Examples:
/// - 1_500_000_000 => "1.5"
/// - 1 => "0.000000001"
pub fn lamports_to_sol_string(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return whole.to_string();
    }
    let mut frac_s = format!("{frac:0width$}", width = SOL_DECIMALS as usize);
    while frac_s.ends_with('0') {
        frac_s.pop();
    }
    format!("{whole}.{frac_s}")
}

/// Formats lamports as SOL with exactly four decimal places, rounding half
/// up, the convention for user-facing balance displays.
pub fn lamports_to_sol_display(lamports: u64) -> String {
    // Round to 4 dp in integer space: one display unit is 100_000 lamports.
    let rounded = (u128::from(lamports) + 50_000) / 100_000;
    let whole = rounded / 10_000;
    let frac = rounded % 10_000;
    format!("{whole}.{frac:04}")
}

/// Parses a decimal SOL string into lamports. Rejects negatives and more
/// than nine fractional digits.
pub fn parse_sol_to_lamports(s: &str) -> eyre::Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        eyre::bail!("empty amount");
    }

    let (whole, frac) = match s.split_once('.') {
        Some((a, b)) => (a, b),
        None => (s, ""),
    };

    if whole.starts_with('-') {
        eyre::bail!("amount must be non-negative");
    }

    let whole_v: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().context("parse whole")?
    };

    if frac.len() > SOL_DECIMALS as usize {
        eyre::bail!("too many decimal places for SOL (decimals={SOL_DECIMALS})");
    }

    let mut frac_s = frac.to_owned();
    while frac_s.len() < SOL_DECIMALS as usize {
        frac_s.push('0');
    }
    let frac_v: u64 = if frac_s.is_empty() {
        0
    } else {
        frac_s.parse().context("parse fractional")?
    };

    whole_v
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|x| x.checked_add(frac_v))
        .ok_or_else(|| eyre::eyre!("amount overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_formatting() {
        assert_eq!(lamports_to_sol_string(0), "0");
        assert_eq!(lamports_to_sol_string(1_500_000_000), "1.5");
        assert_eq!(lamports_to_sol_string(1), "0.000000001");
        assert_eq!(lamports_to_sol_string(10 * LAMPORTS_PER_SOL), "10");
    }

    #[test]
    fn fixed_display_rounds_half_up() {
        assert_eq!(lamports_to_sol_display(0), "0.0000");
        assert_eq!(lamports_to_sol_display(1_500_000_000), "1.5000");
        assert_eq!(lamports_to_sol_display(123_456_789), "0.1235");
        assert_eq!(lamports_to_sol_display(49_999), "0.0000");
        assert_eq!(lamports_to_sol_display(50_000), "0.0001");
    }

    #[test]
    fn parse_basic() {
        assert_eq!(parse_sol_to_lamports("1").ok(), Some(LAMPORTS_PER_SOL));
        assert_eq!(parse_sol_to_lamports("1.5").ok(), Some(1_500_000_000));
        assert_eq!(parse_sol_to_lamports("0.000000001").ok(), Some(1));
        assert_eq!(parse_sol_to_lamports(".5").ok(), Some(500_000_000));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(parse_sol_to_lamports("").is_err());
        assert!(parse_sol_to_lamports("-1").is_err());
        assert!(parse_sol_to_lamports("1.0000000001").is_err());
        assert!(parse_sol_to_lamports("abc").is_err());
    }

    #[test]
    fn parse_and_format_agree() -> eyre::Result<()> {
        for s in ["1.5", "0.25", "42"] {
            let lamports = parse_sol_to_lamports(s)?;
            assert_eq!(lamports_to_sol_string(lamports), s);
        }
        Ok(())
    }
}
