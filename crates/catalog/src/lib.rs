//! Product catalog records (read-only from the storefront's point of view).
//!
//! Orders snapshot fields from these records; reviews reference them and are
//! enriched with a small projection for display.

pub mod product;

pub use product::{NewProduct, Product, ProductSummary};
