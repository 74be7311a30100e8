//! Ember engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the demo
//! binaries: window/event loop, GPU context, shader bundle loading and
//! program building, static vertex/index buffers, and frame timing.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod anim;
pub mod logging;
pub mod render;
pub mod shader;
