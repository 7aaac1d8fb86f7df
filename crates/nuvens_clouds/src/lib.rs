//! Nuvens Cloud Motion
//!
//! Background clouds drifting along randomized closed loops inside a safe
//! zone of the viewport, with a slow rotation/scale "breathing" layered on top.
//!
//! ```rust
//! use nuvens_clouds::{CloudElement, CloudMotionStore, CloudTransform, MotionConfig};
//! use std::sync::{Arc, Mutex};
//! use std::time::{Duration, Instant};
//!
//! struct Sprite(Option<CloudTransform>);
//!
//! impl CloudElement for Sprite {
//!     fn rendered_height(&self) -> f32 {
//!         64.0
//!     }
//!     fn apply_transform(&mut self, transform: &CloudTransform) {
//!         self.0 = Some(*transform);
//!     }
//! }
//!
//! let mut store = CloudMotionStore::new(MotionConfig { seed: Some(1), ..Default::default() });
//! let sprite = Arc::new(Mutex::new(Sprite(None)));
//! let t0 = Instant::now();
//! store.register_cloud("cloud-1", &sprite, None, t0).unwrap();
//! store.tick(t0 + Duration::from_millis(16));
//! assert!(sprite.lock().unwrap().0.is_some());
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod path;
pub mod store;

pub use config::{MotionConfig, MotionStyle, SafeZone, StyleParams, StyleTable, Viewport};
pub use element::{CloudElement, CloudTransform};
pub use error::CloudError;
pub use path::Position;
pub use store::{CloudMotionStore, CloudState, MotionSnapshot};
