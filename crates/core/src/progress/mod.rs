//! Progress event bus for a single download request.
//!
//! Every stage writes into one bounded channel through a [`ProgressReporter`];
//! the transport drains the matching receiver. The reporter owns the two
//! stream invariants:
//!
//! - reported percentages never decrease and stay inside the band reserved
//!   for the current [`Stage`];
//! - exactly one terminal event (`complete` or `error`) is sent, after which
//!   the reporter is consumed and nothing more can be written.

mod reporter;
mod types;

pub use reporter::{progress_channel, ProgressReporter};
pub use types::{band_position, ProgressEvent, Stage};
