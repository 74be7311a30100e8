//! Shader bundle loading and program building.
//!
//! A bundle is one text file holding both stage sources, separated by
//! `#shader vertex` / `#shader fragment` directive lines. The loader splits
//! it, the builder compiles each stage, links them into a render pipeline,
//! and resolves uniform names to binding locations once at build time.

mod bundle;
mod error;
mod program;

pub use bundle::ShaderBundle;
pub use error::ShaderError;
pub use program::{CompiledStage, ShaderProgram, ShaderStage, UniformSlot};
