//! Currency, quantity and percentage formatting for table cells and the
//! summary block.

use crate::model::CurrencyCode;

impl CurrencyCode {
    /// The symbol printed before an amount.
    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Aud => "A$",
            CurrencyCode::Usd => "$",
            CurrencyCode::Eur => "\u{20AC}",
            CurrencyCode::Gbp => "\u{00A3}",
            CurrencyCode::Nzd => "NZ$",
            CurrencyCode::Cad => "CA$",
            CurrencyCode::Sgd => "SGD ",
        }
    }

    /// The ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Aud => "AUD",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Nzd => "NZD",
            CurrencyCode::Cad => "CAD",
            CurrencyCode::Sgd => "SGD",
        }
    }
}

/// Format an amount with currency symbol, thousands separators and exactly
/// two decimals. Non-finite amounts print as zero.
pub fn format_money(amount: f64, currency: CurrencyCode) -> String {
    let safe = if amount.is_finite() { amount } else { 0.0 };
    let cents = (safe.abs() * 100.0).round() as u64;
    let sign = if safe < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{}{}.{:02}",
        sign,
        currency.symbol(),
        group_thousands(cents / 100),
        cents % 100
    )
}

/// Format a quantity: integers without decimals, fractions with up to two.
pub fn format_quantity(quantity: f64) -> String {
    let q = crate::totals::clamp_non_negative(quantity);
    let fixed = format!("{:.2}", q);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a percentage rate with two decimals.
pub fn format_percent(rate: f64) -> String {
    format!("{:.2}%", crate::totals::clamp_non_negative(rate))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
