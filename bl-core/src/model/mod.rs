//! Data model for delivery-note lines and shipment metadata.

mod line;
mod shipment;

pub use line::{LineStatus, RawLine, TransformedLine};
pub use shipment::ShipmentHeader;
