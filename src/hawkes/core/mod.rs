//! Coefficient-independent building blocks: event data, kernel, options,
//! parameter layout, worker pool, and the cached kernel weights.
pub mod data;
pub mod executor;
pub mod kernel;
pub mod options;
pub mod params;
pub mod recursion;
pub mod weights;
