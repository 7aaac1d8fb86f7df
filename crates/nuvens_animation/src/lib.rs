//! Nuvens Animation System
//!
//! Time-driven animation primitives. Nothing here owns a timer: every
//! operation takes `now` and callers drive progress from a single tick source.
//!
//! # Features
//!
//! - **Easing**: quadratic, cubic, sine and elastic curves
//! - **Tweens**: scalar interpolation over wall-clock time
//! - **Transition scheduler**: fixed-step color transitions per CSS property,
//!   with last-writer-wins cancellation, a concurrency cap and a failsafe deadline

pub mod easing;
pub mod scheduler;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{
    PropertySink, SchedulerStats, TransitionConfig, TransitionHandle, TransitionOutcome,
    TransitionScheduler, TransitionState,
};
pub use tween::Tween;
