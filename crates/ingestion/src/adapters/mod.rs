//! Stream adapters
//!
//! One adapter per stream kind, each wrapping a `FrameSource`.

pub mod common;
mod color;
mod depth;

pub use color::ColorStreamAdapter;
pub use depth::DepthStreamAdapter;
