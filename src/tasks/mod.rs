//! Background Tasks Module
//!
//! Contains the periodic expiry sweeper that runs alongside every store.

mod sweeper;

pub use sweeper::{spawn_sweeper, Sweep};
