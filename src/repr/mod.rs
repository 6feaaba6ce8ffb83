//! Native model representations.
//!
//! Foreign model formats (see [`crate::compat`]) are converted into these
//! types once at load time; inference only ever touches the native layout.

pub mod gbdt;
