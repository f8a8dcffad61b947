//! Domain layer: value objects, aggregates and the storage ports the
//! application layer depends on.

pub mod cart;
pub mod changes;
pub mod customer;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod product;
