use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Whole colones. The storefront never deals in fractional amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoneyAmount(u64);

impl MoneyAmount {
    pub const ZERO: MoneyAmount = MoneyAmount(0);

    pub const fn new(colones: u64) -> Self {
        Self(colones)
    }

    pub fn colones(&self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, other: MoneyAmount) -> MoneyAmount {
        MoneyAmount(self.0.saturating_add(other.0))
    }

    /// es-CR grouping as used in emails and the CRM, e.g. `₡39.900`.
    pub fn display_crc(&self) -> String {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        format!("₡{grouped}")
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
