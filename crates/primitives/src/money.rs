use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A monetary amount as reported by the commerce API.
///
/// The amount is kept as the decimal string the API returned so that no
/// precision is lost between reading a cart and rendering it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

impl Money {
    #[must_use]
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    #[must_use]
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new("0.0", currency_code)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&format_price(self))
    }
}

/// Lowest and highest variant price of a product.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_variant_price: Money,
    pub max_variant_price: Money,
}

impl PriceRange {
    /// Whether the range collapses to a single price.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.min_variant_price.amount == self.max_variant_price.amount
    }
}

const fn currency_symbol(code: &str) -> Option<(&'static str, usize)> {
    // (symbol, fraction digits)
    match code.as_bytes() {
        b"USD" => Some(("$", 2)),
        b"EUR" => Some(("€", 2)),
        b"GBP" => Some(("£", 2)),
        b"JPY" => Some(("¥", 0)),
        b"CAD" => Some(("CA$", 2)),
        b"AUD" => Some(("A$", 2)),
        b"INR" => Some(("₹", 2)),
        _ => None,
    }
}

/// Formats an amount the way an en-US currency formatter does: symbol prefix,
/// thousands separators and the currency's fraction digits. Unknown currency
/// codes are rendered as a `CODE 1,234.50` prefix instead.
#[must_use]
pub fn format_price(money: &Money) -> String {
    let Ok(value) = money.amount.trim().parse::<f64>() else {
        return format!("{} {}", money.currency_code, money.amount);
    };

    let (prefix, digits) = match currency_symbol(&money.currency_code) {
        Some((symbol, digits)) => (symbol.to_owned(), digits),
        None => (format!("{}\u{a0}", money.currency_code), 2),
    };

    let sign = if value.is_sign_negative() && value != 0.0 {
        "-"
    } else {
        ""
    };

    let fixed = format!("{:.*}", digits, value.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{sign}{prefix}{grouped}.{fraction}"),
        None => format!("{sign}{prefix}{grouped}"),
    }
}
