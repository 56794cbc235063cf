//! Storage and business rules for the storefront.
//! - `store`: the statement contract and its SQLite and in-memory backends.
//! - `shop_service` / `product_service`: validation and the 404/409 policy.

pub mod errors;
pub mod product_service;
pub mod shop_service;
pub mod store;
#[cfg(test)]
pub mod test_support;
#[cfg(test)]
mod conformance;
