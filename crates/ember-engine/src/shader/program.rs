use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::bundle::ShaderBundle;
use super::error::ShaderError;
use crate::device::checked;

/// One compiled unit of shader source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Entry point function the stage's source must define.
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    fn visibility(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A uniform variable reflected from one or both stages.
///
/// `binding` is the integer location callers use to address the uniform;
/// once a program is linked these are stable for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub size: u64,
    pub visibility: wgpu::ShaderStages,
}

/// A parsed and validated shader stage.
///
/// Transient: stages exist only between compilation and program linking,
/// after which they are dropped.
pub struct CompiledStage {
    stage: ShaderStage,
    module: naga::Module,
}

impl CompiledStage {
    /// Parses and validates the source for one stage.
    ///
    /// On failure the full diagnostic (with source context) is logged and
    /// returned inside the error; there is no null-handle path, so a failed
    /// stage can never reach program linking.
    pub fn compile(stage: ShaderStage, source: &str) -> Result<Self, ShaderError> {
        let module = match naga::front::wgsl::parse_str(source) {
            Ok(module) => module,
            Err(err) => {
                let log = err.emit_to_string(source);
                log::error!("{stage} stage failed to parse:\n{log}");
                return Err(ShaderError::Compile { stage, log });
            }
        };

        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        if let Err(err) = validator.validate(&module) {
            let log = err.emit_to_string(source);
            log::error!("{stage} stage failed to validate:\n{log}");
            return Err(ShaderError::Compile { stage, log });
        }

        let wanted = stage.entry_point();
        let has_entry = module
            .entry_points
            .iter()
            .any(|ep| ep.name == wanted && ep.stage == stage.naga_stage());
        if !has_entry {
            let log = format!("missing entry point: expected fn {wanted}() for the {stage} stage");
            log::error!("{stage} stage failed to compile: {log}");
            return Err(ShaderError::Compile { stage, log });
        }

        Ok(Self { stage, module })
    }

    /// Uniform variables declared by this stage, with their byte sizes.
    pub fn uniforms(&self) -> Vec<UniformSlot> {
        let mut slots = Vec::new();
        for (_, var) in self.module.global_variables.iter() {
            if var.space != naga::AddressSpace::Uniform {
                continue;
            }
            let Some(name) = var.name.clone() else { continue };
            let Some(rb) = var.binding.clone() else { continue };

            let size = self.module.types[var.ty]
                .inner
                .size(self.module.to_ctx());

            slots.push(UniformSlot {
                name,
                group: rb.group,
                binding: rb.binding,
                size: u64::from(size),
                visibility: self.stage.visibility(),
            });
        }
        slots
    }
}

/// Merges the uniform declarations of both stages into one layout.
///
/// This is the link step: a binding declared by both stages must agree on
/// name and size (its visibility becomes the union), a name may not appear
/// at two different bindings, and everything must live in bind group 0,
/// which is the only group the pipeline layout carries.
fn link_uniforms(
    vertex: &CompiledStage,
    fragment: &CompiledStage,
) -> Result<Vec<UniformSlot>, ShaderError> {
    let mut merged: Vec<UniformSlot> = Vec::new();

    for slot in vertex.uniforms().into_iter().chain(fragment.uniforms()) {
        if slot.group != 0 {
            return Err(ShaderError::Link {
                reason: format!(
                    "uniform {:?} uses bind group {}, only group 0 is supported",
                    slot.name, slot.group
                ),
            });
        }

        if let Some(clash) = merged
            .iter()
            .find(|m| m.name == slot.name && m.binding != slot.binding)
        {
            return Err(ShaderError::Link {
                reason: format!(
                    "uniform {:?} declared at bindings {} and {}",
                    slot.name, clash.binding, slot.binding
                ),
            });
        }

        match merged.iter_mut().find(|m| m.binding == slot.binding) {
            None => merged.push(slot),
            Some(existing) => {
                if existing.name != slot.name || existing.size != slot.size {
                    return Err(ShaderError::Link {
                        reason: format!(
                            "binding {} declared as {:?} ({} bytes) and as {:?} ({} bytes)",
                            slot.binding, existing.name, existing.size, slot.name, slot.size
                        ),
                    });
                }
                existing.visibility |= slot.visibility;
            }
        }
    }

    merged.sort_by_key(|s| s.binding);
    Ok(merged)
}

struct UniformBinding {
    location: u32,
    size: u64,
    buffer: wgpu::Buffer,
}

/// A linked, executable combination of stages.
///
/// Owns the render pipeline, one uniform buffer per reflected uniform, and
/// the name-to-location map resolved once at build time.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniforms: HashMap<String, UniformBinding>,
}

impl ShaderProgram {
    /// Compiles both stages of `bundle`, links them, and validates the
    /// resulting pipeline against `target_format` and `vertex_layouts`.
    ///
    /// The build is a strictly linear one-shot pipeline: compile, link,
    /// validate. Any failure aborts the whole build; there is no
    /// partial-success mode and no recompilation path.
    pub fn build(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        bundle: &ShaderBundle,
        vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
    ) -> Result<Self, ShaderError> {
        let vertex = CompiledStage::compile(ShaderStage::Vertex, &bundle.vertex_source)?;
        let fragment = CompiledStage::compile(ShaderStage::Fragment, &bundle.fragment_source)?;

        let slots = link_uniforms(&vertex, &fragment)?;

        let vs_module = checked(device, "create_shader_module(vertex)", file!(), line!(), || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("ember vertex stage"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&bundle.vertex_source)),
            })
        })?;

        let fs_module = checked(device, "create_shader_module(fragment)", file!(), line!(), || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("ember fragment stage"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&bundle.fragment_source)),
            })
        })?;

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = slots
            .iter()
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: slot.visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(slot.size),
                },
                count: None,
            })
            .collect();

        let bind_group_layout = checked(device, "create_bind_group_layout", file!(), line!(), || {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("ember program bgl"),
                entries: &layout_entries,
            })
        })?;

        let pipeline_layout = checked(device, "create_pipeline_layout", file!(), line!(), || {
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("ember program layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            })
        })?;

        let pipeline = checked(device, "create_render_pipeline", file!(), line!(), || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("ember program pipeline"),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some(ShaderStage::Vertex.entry_point()),
                    compilation_options: Default::default(),
                    buffers: vertex_layouts,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fs_module,
                    entry_point: Some(ShaderStage::Fragment.entry_point()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: target_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        })?;

        // Stage objects have no independent lifetime past link time.
        drop(vs_module);
        drop(fs_module);

        let mut buffers = Vec::with_capacity(slots.len());
        for slot in &slots {
            let label = format!("ember uniform {}", slot.name);
            let buffer = checked(device, "create_buffer(uniform)", file!(), line!(), || {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label.as_str()),
                    size: slot.size,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })?;
            buffers.push(buffer);
        }

        let group_entries: Vec<wgpu::BindGroupEntry> = slots
            .iter()
            .zip(&buffers)
            .map(|(slot, buffer)| wgpu::BindGroupEntry {
                binding: slot.binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        let bind_group = checked(device, "create_bind_group", file!(), line!(), || {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("ember program bind group"),
                layout: &bind_group_layout,
                entries: &group_entries,
            })
        })?;

        let mut uniforms = HashMap::with_capacity(slots.len());
        for (slot, buffer) in slots.into_iter().zip(buffers) {
            uniforms.insert(
                slot.name,
                UniformBinding {
                    location: slot.binding,
                    size: slot.size,
                    buffer,
                },
            );
        }

        log::debug!("shader program linked, {} uniform binding(s)", uniforms.len());

        Ok(Self {
            pipeline,
            bind_group,
            uniforms,
        })
    }

    /// Resolves a uniform name to its binding location.
    pub fn uniform_location(&self, name: &str) -> Option<u32> {
        self.uniforms.get(name).map(|u| u.location)
    }

    /// Writes a 4-component float value into the named uniform.
    pub fn set_uniform_vec4(
        &self,
        queue: &wgpu::Queue,
        name: &str,
        value: [f32; 4],
    ) -> Result<(), ShaderError> {
        let binding = self
            .uniforms
            .get(name)
            .ok_or_else(|| ShaderError::MissingUniform {
                name: name.to_string(),
            })?;

        let bytes = bytemuck::bytes_of(&value);
        if binding.size != bytes.len() as u64 {
            return Err(ShaderError::UniformMismatch {
                name: name.to_string(),
                size: binding.size,
                expected: bytes.len() as u64,
            });
        }

        queue.write_buffer(&binding.buffer, 0, bytes);
        Ok(())
    }

    /// Re-activates this program for subsequent draws on `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_VS: &str = r#"
@vertex
fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 0.0, 1.0);
}
"#;

    const VALID_FS: &str = r#"
@group(0) @binding(0) var<uniform> u_Color: vec4<f32>;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return u_Color;
}
"#;

    // ── stage compilation ─────────────────────────────────────────────────

    #[test]
    fn compiles_valid_vertex_stage() {
        CompiledStage::compile(ShaderStage::Vertex, VALID_VS).unwrap();
    }

    #[test]
    fn compiles_valid_fragment_stage() {
        CompiledStage::compile(ShaderStage::Fragment, VALID_FS).unwrap();
    }

    #[test]
    fn invalid_source_is_a_compile_error_not_a_crash() {
        let err = CompiledStage::compile(ShaderStage::Vertex, "this is not shader code").unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected Compile error, got {other}"),
        }
    }

    #[test]
    fn wrong_entry_point_is_a_compile_error() {
        // Valid fragment source compiled as the vertex stage: no vs_main.
        let err = CompiledStage::compile(ShaderStage::Vertex, VALID_FS).unwrap_err();
        match err {
            ShaderError::Compile { log, .. } => assert!(log.contains("vs_main")),
            other => panic!("expected Compile error, got {other}"),
        }
    }

    #[test]
    fn empty_source_is_a_compile_error() {
        let err = CompiledStage::compile(ShaderStage::Fragment, "").unwrap_err();
        assert!(matches!(err, ShaderError::Compile { .. }));
    }

    // ── reflection ────────────────────────────────────────────────────────

    #[test]
    fn fragment_uniform_is_reflected() {
        let fs = CompiledStage::compile(ShaderStage::Fragment, VALID_FS).unwrap();
        let slots = fs.uniforms();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].name, "u_Color");
        assert_eq!(slots[0].group, 0);
        assert_eq!(slots[0].binding, 0);
        assert_eq!(slots[0].size, 16);
        assert_eq!(slots[0].visibility, wgpu::ShaderStages::FRAGMENT);
    }

    #[test]
    fn stage_without_uniforms_reflects_empty() {
        let vs = CompiledStage::compile(ShaderStage::Vertex, VALID_VS).unwrap();
        assert!(vs.uniforms().is_empty());
    }

    // ── linking ───────────────────────────────────────────────────────────

    #[test]
    fn link_resolves_declared_uniform_to_its_location() {
        let vs = CompiledStage::compile(ShaderStage::Vertex, VALID_VS).unwrap();
        let fs = CompiledStage::compile(ShaderStage::Fragment, VALID_FS).unwrap();
        let slots = link_uniforms(&vs, &fs).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].name, "u_Color");
        assert_eq!(slots[0].binding, 0);
    }

    #[test]
    fn link_merges_visibility_of_shared_uniform() {
        let shared_vs = r#"
@group(0) @binding(0) var<uniform> u_Color: vec4<f32>;

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 0.0, 1.0) + u_Color * 0.0;
}
"#;
        let vs = CompiledStage::compile(ShaderStage::Vertex, shared_vs).unwrap();
        let fs = CompiledStage::compile(ShaderStage::Fragment, VALID_FS).unwrap();
        let slots = link_uniforms(&vs, &fs).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(
            slots[0].visibility,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT
        );
    }

    #[test]
    fn link_rejects_conflicting_declarations_at_one_binding() {
        let clashing_vs = r#"
@group(0) @binding(0) var<uniform> u_Model: mat4x4<f32>;

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return u_Model * vec4<f32>(position, 0.0, 1.0);
}
"#;
        let vs = CompiledStage::compile(ShaderStage::Vertex, clashing_vs).unwrap();
        let fs = CompiledStage::compile(ShaderStage::Fragment, VALID_FS).unwrap();
        let err = link_uniforms(&vs, &fs).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn link_rejects_uniform_outside_group_zero() {
        let grouped_fs = r#"
@group(1) @binding(0) var<uniform> u_Color: vec4<f32>;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return u_Color;
}
"#;
        let vs = CompiledStage::compile(ShaderStage::Vertex, VALID_VS).unwrap();
        let fs = CompiledStage::compile(ShaderStage::Fragment, grouped_fs).unwrap();
        let err = link_uniforms(&vs, &fs).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn link_rejects_one_name_at_two_bindings() {
        let offset_vs = r#"
@group(0) @binding(1) var<uniform> u_Color: vec4<f32>;

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 0.0, 1.0) + u_Color * 0.0;
}
"#;
        let vs = CompiledStage::compile(ShaderStage::Vertex, offset_vs).unwrap();
        let fs = CompiledStage::compile(ShaderStage::Fragment, VALID_FS).unwrap();
        let err = link_uniforms(&vs, &fs).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }
}
