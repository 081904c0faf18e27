//! Infrastructure layer: stores, catalog access, payment client, and the
//! application services that compose them.

pub mod catalog;
pub mod payment;
pub mod services;
pub mod store;

mod integration_tests;
