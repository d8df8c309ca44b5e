//! Strongly-typed building blocks shared by every module.
//!
//! - [`Direction`]: spacetime axis (time or one of the three spatial axes)
//! - [`Location`]: where inside a cell a quantity lives (center or a face)
//! - [`vars`]: indices of the primitive variables
//! - [`AccessCounts`]: read/write accounting reported by every operation
//!
//! # Example
//!
//! ```
//! use grmhd_rs::types::{AccessCounts, Direction, Location};
//!
//! let dir = Direction::X2;
//! assert_eq!(dir.index(), 2);
//! assert_eq!(Location::face(dir), Location::Bottom);
//!
//! let mut counts = AccessCounts::new(3, 1);
//! counts += AccessCounts::new(2, 2);
//! assert_eq!(counts.reads, 5);
//! ```

mod counts;
mod indices;

pub use counts::AccessCounts;
pub use indices::{Direction, Location, NDIM, vars};
