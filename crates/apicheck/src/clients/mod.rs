//! Domain clients.
//!
//! Each client borrows the [`RequestExecutor`](apicheck_harness::RequestExecutor)
//! of the running test, so every call it makes is logged under that test's
//! title. Clients hold no state of their own.

mod brands;
mod products;
mod users;

pub use brands::BrandsClient;
pub use products::ProductsClient;
pub use users::UserClient;
