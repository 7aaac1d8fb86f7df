//! Nuvens Core
//!
//! Foundational primitives shared by the theme and cloud engines:
//!
//! - **Color model**: HSL parsing, formatting, and circular hue interpolation
//! - **Observables**: two-phase change propagation (derived values first, effects after)
//! - **Event bus**: fire-and-forget broadcast for consumers outside the observable graph
//!
//! # Example
//!
//! ```rust
//! use nuvens_core::color::{interpolate, parse_color};
//!
//! let from = parse_color("hsl(350, 100%, 50%)").unwrap();
//! let to = parse_color("hsl(10, 100%, 50%)").unwrap();
//!
//! // Hue travels through 0°, not through 180°
//! let mid = interpolate(&from, &to, 0.5);
//! assert!(mid.h < 1.0 || mid.h > 359.0);
//! ```

pub mod color;
pub mod events;
pub mod reactive;

pub use color::{format_color, interpolate, parse_color, ColorError, Hsl};
pub use events::{EventBus, HandlerId};
pub use reactive::{Derived, Observable, SubscriptionId};
