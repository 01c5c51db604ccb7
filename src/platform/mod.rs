//! Platform abstraction layer
//!
//! Timer scheduling shared by the browser host, the headless runner and
//! tests. Storage lives with the types it persists (`highscores`,
//! `settings`); drawing lives in `render`.

pub mod scheduler;

pub use scheduler::{EventQueue, Scheduler, TimerEvent, TimerHandle};
