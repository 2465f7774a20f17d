//! Core domain types.

pub mod clock;
pub mod journey;

pub use clock::{Clock, ManualClock, SystemClock};
pub use journey::{IntermediateStop, JourneyLeg, JourneyResult};
