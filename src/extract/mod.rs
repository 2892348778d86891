//! Card location and field extraction
//!
//! Both halves are pure functions over a [`DomTree`](crate::dom::DomTree)
//! snapshot:
//! - [`locator`]: which elements are load cards
//! - [`fields`]: what one card says (route, price, vehicle, identifier)
//! - [`record`]: the `LoadRecord` wire shape

pub mod fields;
pub mod locator;
pub mod record;

pub use fields::{extract, identifier, parse_price, parse_route, parse_vehicle};
pub use locator::{Card, CardLocator, locate, locate_new};
pub use record::{LoadRecord, RoutePoint, SOURCE_TAG, Vehicle};
