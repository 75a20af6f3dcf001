//! Lowest level crate of `ember`. Includes hashable floats and some memory helpers

mod decimal;
pub use decimal::DecimalF32;

pub mod memory;
