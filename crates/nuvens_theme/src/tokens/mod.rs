//! Design tokens for theming
//!
//! Only color roles are themed; every other visual property is static CSS.

mod color;

pub use color::*;
