//! # Projection
//!
//! Color pixel to depth pixel reprojection.
//!
//! Both cameras are modelled as ideal pinholes sharing one optical center:
//! a color pixel is back-projected to a 3-D point at the sampled depth and
//! re-projected through the depth camera intrinsics. There is no extrinsic
//! rotation or translation, so results are only accurate for co-located,
//! near-coaxial sensor pairs.
//!
//! ```
//! use contracts::{DepthLookup, IntrinsicsTable};
//! use projection::ProjectionEngine;
//!
//! let engine = ProjectionEngine::new(IntrinsicsTable::kinova_reference(), DepthLookup::DepthPixel);
//! assert!(!engine.project(640, 360, None).is_located());
//! ```

mod engine;
mod pinhole;

pub use contracts::{DepthLookup, ProjectionResult};
pub use engine::ProjectionEngine;
pub use pinhole::PinholeCamera;
