//! `cadence-scheduler` — reconfigurable periodic scheduler with a managed
//! lifecycle.
//!
//! # Overview
//!
//! [`SchedulerEngine`] drives a single [`WorkUnit`] on a timer, waiting on
//! three event sources at once: the tick, an interval-change notification
//! from the [`IntervalSource`], and the cancellation signal. [`Program`]
//! owns the start/stop semantics expected by a host service manager, along
//! with the cancellation signal's lifetime.
//!
//! # Event handling
//!
//! | Event        | Behaviour                                               |
//! |--------------|---------------------------------------------------------|
//! | Tick         | Run the work unit inline; at most one in flight         |
//! | Change       | Re-read the interval and rearm the timer from scratch   |
//! | Cancellation | Stop the timer and exit; no further work runs           |

pub mod engine;
pub mod error;
pub mod program;
pub mod sink;
pub mod source;
pub mod work;

pub use engine::SchedulerEngine;
pub use error::{Result, SchedulerError};
pub use program::{Program, RunState};
pub use sink::{spawn_drain, ErrorSink, ERROR_QUEUE_DEPTH};
pub use source::IntervalSource;
pub use work::WorkUnit;
