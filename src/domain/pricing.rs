use {super::money::MoneyAmount, serde_json::Value};

/// Tier table: units → subtotal in colones.
const TIERS: [(i64, MoneyAmount); 5] = [
    (1, MoneyAmount::new(15_900)),
    (2, MoneyAmount::new(28_900)),
    (3, MoneyAmount::new(39_900)),
    (4, MoneyAmount::new(49_900)),
    (5, MoneyAmount::new(58_900)),
];

pub const SHIPPING_COST: MoneyAmount = MoneyAmount::ZERO;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub quantity: u32,
    pub subtotal: MoneyAmount,
}

impl Pricing {
    pub fn total(&self) -> MoneyAmount {
        self.subtotal.saturating_add(SHIPPING_COST)
    }
}

/// Quantities outside the table fall back to the single-unit tier; the
/// returned quantity always matches the tier that was priced.
pub fn resolve(quantity: i64) -> Pricing {
    TIERS
        .iter()
        .find(|(units, _)| *units == quantity)
        .map(|&(units, subtotal)| Pricing {
            quantity: units as u32,
            subtotal,
        })
        .unwrap_or(Pricing {
            quantity: 1,
            subtotal: TIERS[0].1,
        })
}

/// Price a raw form value (`3`, `"3"`, `"3 unidades"`, `"abc"`...).
pub fn resolve_raw(raw: &Value) -> Pricing {
    resolve(coerce_quantity(raw).unwrap_or(1))
}

/// Lenient integer coercion: numbers are truncated, strings are read as an
/// optional sign followed by leading digits. Anything else is `None`.
pub fn coerce_quantity(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}
