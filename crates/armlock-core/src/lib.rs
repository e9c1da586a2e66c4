//! Core gesture logic for the armband door-lock bridge.
//!
//! Everything here is pure state: orientation discretization and the
//! fist-and-twist gesture latch. I/O lives in the hub and serial crates,
//! so the whole gesture path can be driven tick by tick in tests.

pub mod discretizer;
pub mod events;
pub mod latch;

pub use discretizer::{DiscretizedOrientation, OrientationDiscretizer, ANGLE_BUCKETS};
pub use events::{Arm, ArmbandEvent, Pose};
pub use latch::{GestureLatch, LockCommand};
