//! GPU-facing render types shared by demo renderers.
//!
//! Convention:
//! - geometry is uploaded once at creation and never rewritten
//! - buffers and programs are bound explicitly onto a render pass, so the
//!   order of binding calls is visible at the call site

mod buffer;
mod ctx;
mod vertex;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use ctx::RenderCtx;
pub use vertex::Vertex2;
