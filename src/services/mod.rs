pub mod api; // Vendor backend REST client
pub mod delivery; // Delivery staff session and location pings
pub mod images;
pub mod upload;

pub use api::VendorApi;
pub use delivery::{DeliveryClient, DeliverySession, FixedLocation, SessionStore};
pub use images::ImageResolver;
