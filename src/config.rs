use crate::domain::money::Currency;

/// Settings the engine needs at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Currency given to carts created without one.
    pub default_currency: Currency,
}

impl EngineConfig {
    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = currency;
        self
    }
}
