//! JSON-lines command scripts driving the storefront.

pub mod command;
pub mod runner;
