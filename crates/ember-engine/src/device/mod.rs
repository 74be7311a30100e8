//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and providing encoders/views for rendering
//! - the per-call driver error check used by resource creation sites

mod check;
mod gpu;

pub use check::{DriverError, checked};
pub use gpu::{Gpu, GpuFrame, SurfaceErrorAction};
