//! Data models for High Seas records.
//!
//! - `Person`: profile and balances from the `people` table
//! - `Ship`: a single submission from the `ships` table
//! - `Order`, `ShopItem`: shop orders and the catalog entries they reference
//!
//! Each model has a `from_record` constructor; those are the only consumers
//! of the untyped helpers in `fields`.

pub mod fields;
pub mod order;
pub mod person;
pub mod ship;

pub use order::{Order, ShopItem, DEFAULT_DOLLAR_COST, SHOP_ORDERS_TABLE};
pub use person::Person;
pub use ship::{Ship, ShipStatus, ShipType, SHIPS_TABLE};

pub const PEOPLE_TABLE: &str = "people";
