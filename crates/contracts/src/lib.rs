//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Timestamps are transport capture times (seconds, f64)
//! - `frame_id` is optional, used for ordering/diagnostics
//!
//! ## Camera Model
//! Both cameras are treated as ideal pinholes sharing one optical center.
//! There is no rotation or translation between them, which only holds for
//! rigidly co-located, near-coaxial sensor pairs.

mod annotation;
mod blueprint;
mod color;
mod depth;
mod detection;
mod error;
mod frame_source;
mod intrinsics;
mod sink;

pub use annotation::*;
pub use blueprint::*;
pub use color::*;
pub use depth::*;
pub use detection::*;
pub use error::*;
pub use frame_source::{ColorCallback, DepthCallback, FrameCallback, FrameSource};
pub use intrinsics::*;
pub use sink::*;

pub use validator::{Validate, ValidationErrors};
