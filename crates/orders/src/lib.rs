//! Orders domain module.
//!
//! Business rules for turning a cart into a priced order and for the order's
//! payment lifecycle, implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod order;
pub mod pricing;

pub use order::{Order, OrderItem, OrderParts, OrderStatus};
pub use pricing::{CartItem, CreateOrder, MAX_ORDER_TOTAL, OrderDraft, ValidatedCart};
