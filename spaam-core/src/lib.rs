//! # SPAAM Core
//!
//! Common types shared by the crates that calibrate an optical see-through
//! head-mounted display with the Single Point Active Alignment Method (SPAAM).
//!
//! SPAAM asks the user to line up an on-screen target with a tracked 3d
//! reference point (usually the center of a printed marker) while moving their
//! head. Every confirmed alignment produces one [`CorrespondencePair`]: the tracked
//! [`WorldPoint`] in the head-relative frame and the [`ScreenPoint`] of the target
//! that was displayed. Once enough pairs exist, a direct linear transform recovers
//! the [`Projection3x4`] that maps tracked points to display pixels, which is then
//! expanded into a [`ClipProjection`] the renderer can consume.
//!
//! ```text
//!        display (per eye)
//!   +-----------------------+
//!   |  +    +    +    +    +|        tracked marker
//!   |  +    +    +    +    +|             [#]  <- WorldPoint (meters)
//!   |  +    +   (+)   +    +|  <--------/
//!   |  +    +    +    +    +|   eye looks through (+) at the marker
//!   |  +    +    +    +    +|
//!   +-----------------------+
//!            ^ ScreenPoint (pixels, origin bottom-left)
//! ```
//!
//! Each eye of the display is calibrated independently, so most per-eye state is
//! stored in a [`PerEye`] keyed by [`Eye`].

mod correspondence;
mod eye;
mod point;
mod projection;
mod tracker;

pub use correspondence::*;
pub use eye::*;
pub use nalgebra;
pub use point::*;
pub use projection::*;
pub use sample_consensus;
pub use tracker::*;
