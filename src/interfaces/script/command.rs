use crate::application::orders::OrderLineRequest;
use crate::domain::money::Currency;
use crate::error::{CommerceError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::BufRead;

/// One line of a command script.
///
/// Carts and orders created by the script can be given an `alias`; later
/// commands may then refer to them by alias instead of by generated id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    CreateCart {
        #[serde(default)]
        alias: Option<String>,
        #[serde(default)]
        currency: Option<Currency>,
    },
    GetCart {
        cart: String,
    },
    AddItem {
        cart: String,
        sku: String,
        quantity: u32,
    },
    UpdateQty {
        cart: String,
        sku: String,
        quantity: u32,
    },
    RemoveItem {
        cart: String,
        sku: String,
    },
    ClearCart {
        cart: String,
    },
    Checkout {
        cart: String,
        customer: String,
        #[serde(default)]
        alias: Option<String>,
    },
    CreateOrder {
        customer: String,
        items: Vec<OrderLineRequest>,
        #[serde(default)]
        currency: Option<Currency>,
        #[serde(default)]
        alias: Option<String>,
    },
    GetOrder {
        order: String,
    },
    Pay {
        order: String,
        #[serde(default)]
        amount: Option<Decimal>,
        #[serde(default)]
        currency: Option<Currency>,
        #[serde(default)]
        provider: Option<String>,
        #[serde(default)]
        transaction_reference: Option<String>,
    },
    Cancel {
        order: String,
    },
}

/// Reads commands from a JSON-lines source.
///
/// Blank lines and lines starting with `#` are skipped.
pub struct CommandReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> CommandReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Lazily parses one command per line. A malformed line yields an error
    /// tagged with its line number; reading continues after it.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.source
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| match line {
                Err(e) => Some(Err(CommerceError::from(e))),
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        return None;
                    }
                    Some(serde_json::from_str(line).map_err(|e| {
                        CommerceError::invalid_argument(format!("line {}: {e}", idx + 1))
                    }))
                }
            })
    }
}
