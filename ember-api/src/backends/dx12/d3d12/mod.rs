//! The Direct3D 12 objects the dx12 backend drives.
//!
//! Work is described with the plain values in `types`, which carry the numeric values of the
//! D3D12 and DXGI enums they are named after. Builds for Windows drive the driver through the
//! `windows` crate. Tests run against a device that executes on the CPU and tracks resource state
//! the way the debug layer does.
#![allow(non_snake_case, non_camel_case_types, clippy::upper_case_acronyms)]

mod types;
pub use types::*;

#[cfg(all(not(test), not(windows)))]
compile_error!("The dx12 backend requires windows");

#[cfg(not(test))]
mod native;
#[cfg(not(test))]
pub use native::*;

#[cfg(test)]
pub use software::*;
