//! Delivery-note line transformation.

mod line;

pub use line::{transform_line, transform_lines};
