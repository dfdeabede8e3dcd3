//! # Analysis Module
//!
//! Read-only passes over a finished map.
//!
//! - [`GraphValidator`] enumerates every structural violation
//! - [`QualityAnalyzer`] scores the layout and suggests improvements
//!
//! Both take `&Map` and share no state, so they may run concurrently on the
//! same map or on many maps at once.

pub mod quality;
pub mod validation;

pub use quality::*;
pub use validation::*;
