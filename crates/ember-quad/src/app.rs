use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ember_engine::anim::Oscillator;
use ember_engine::core::{App, AppControl, FrameCtx};
use ember_engine::render::{IndexBuffer, Vertex2, VertexBuffer};
use ember_engine::shader::{ShaderBundle, ShaderProgram};

use crate::geometry::{QUAD_INDICES, QUAD_VERTICES};

/// Step applied to the animated color channel each frame.
const COLOR_STEP: f32 = 0.05;

/// The 4-component color uniform the bundle must declare.
const UNIFORM_COLOR: &str = "u_Color";

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// The animated-quad demo application.
///
/// GPU resources are built lazily on the first frame, once a device and
/// surface format exist; any build failure is fatal for the run.
pub struct QuadApp {
    bundle_path: PathBuf,
    scene: Option<QuadScene>,
    oscillator: Oscillator,

    fps_accum: f32,
    fps_frames: u32,
}

impl QuadApp {
    pub fn new(bundle_path: PathBuf) -> Self {
        Self {
            bundle_path,
            scene: None,
            oscillator: Oscillator::new(COLOR_STEP),
            fps_accum: 0.0,
            fps_frames: 0,
        }
    }
}

impl App for QuadApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if self.scene.is_none() {
            match QuadScene::build(
                ctx.gpu.device(),
                ctx.gpu.queue(),
                ctx.gpu.surface_format(),
                &self.bundle_path,
            ) {
                Ok(scene) => self.scene = Some(scene),
                Err(err) => {
                    log::error!("failed to build quad scene: {err:#}");
                    return AppControl::Exit;
                }
            }
        }

        let Some(scene) = self.scene.as_ref() else {
            return AppControl::Exit;
        };

        self.fps_accum += ctx.time.dt;
        self.fps_frames += 1;
        if self.fps_accum >= 1.0 {
            log::debug!("{:.1} fps", self.fps_frames as f32 / self.fps_accum);
            self.fps_accum = 0.0;
            self.fps_frames = 0;
        }

        // Animate the red channel; the other components stay fixed.
        let r = self.oscillator.tick();
        if let Err(err) =
            scene
                .program
                .set_uniform_vec4(ctx.gpu.queue(), UNIFORM_COLOR, [r, 0.03, 0.8, 1.0])
        {
            log::error!("uniform update failed: {err}");
            return AppControl::Exit;
        }

        ctx.render(CLEAR_COLOR, |_rctx, pass| {
            scene.program.bind(pass);
            scene.vertices.bind(pass, 0);
            scene.indices.bind(pass);
            pass.draw_indexed(0..scene.indices.count(), 0, 0..1);
        })
    }
}

/// The demo's GPU-side state: one program, one quad.
struct QuadScene {
    program: ShaderProgram,
    vertices: VertexBuffer,
    indices: IndexBuffer,
}

impl QuadScene {
    fn build(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        bundle_path: &Path,
    ) -> Result<Self> {
        let bundle = ShaderBundle::load(bundle_path)
            .with_context(|| format!("loading shader bundle {}", bundle_path.display()))?;

        let program =
            ShaderProgram::build(device, surface_format, &bundle, &[Vertex2::layout()])
                .context("building shader program")?;

        anyhow::ensure!(
            program.uniform_location(UNIFORM_COLOR).is_some(),
            "shader bundle does not declare the {UNIFORM_COLOR} uniform"
        );

        program.set_uniform_vec4(queue, UNIFORM_COLOR, [0.8, 0.3, 0.8, 1.0])?;

        let vertices = VertexBuffer::new(
            device,
            "quad vertices",
            bytemuck::cast_slice(&QUAD_VERTICES),
        )?;
        let indices = IndexBuffer::new(device, "quad indices", &QUAD_INDICES)?;

        log::info!(
            "quad scene ready: {} vertices, {} indices",
            QUAD_VERTICES.len(),
            indices.count()
        );

        Ok(Self {
            program,
            vertices,
            indices,
        })
    }
}
