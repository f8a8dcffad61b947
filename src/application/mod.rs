//! Application layer orchestrating the domain.
//!
//! Each engine is a thin async service over the shared store: it loads
//! aggregates through the ports, applies domain rules in memory, and writes
//! everything it touched back in a single `UnitOfWork::commit`. `Storefront`
//! bundles them for callers that want the whole core.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod engine;
pub mod orders;
pub mod payments;
