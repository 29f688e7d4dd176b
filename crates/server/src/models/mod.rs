//! Domain models for the pickup point service.
//!
//! These are validated domain objects. Store implementations map their own
//! row representations onto them; HTTP handlers serialize them directly.

pub mod identity;
pub mod pickup_point;
pub mod product;
pub mod reception;
pub mod user;

pub use identity::Identity;
pub use pickup_point::{DateRange, PickupPoint, PickupPointSummary, ReceptionSummary};
pub use product::Product;
pub use reception::Reception;
pub use user::{NewUser, User};
