use winit::window::Window;

use super::app::AppControl;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::RenderCtx;
use crate::time::FrameTime;

/// Per-frame context passed to [`App::on_frame`].
///
/// [`App::on_frame`]: super::app::App::on_frame
pub struct FrameCtx<'a> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu,
    pub time: FrameTime,
}

impl FrameCtx<'_> {
    /// Clears the surface with `clear`, calls `draw` with a ready
    /// [`RenderCtx`] and the live render pass, then presents the frame.
    ///
    /// Surface loss is handled here: transient errors skip the frame,
    /// reconfigurable ones retry next frame, and out-of-memory exits.
    pub fn render<F>(&mut self, clear: wgpu::Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut wgpu::RenderPass<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("surface frame unavailable: {err}");
                if self.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        // Pass is dropped before the encoder is moved into submit().
        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ember frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let rctx = RenderCtx {
                device: self.gpu.device(),
                queue: self.gpu.queue(),
                surface_format: self.gpu.surface_format(),
            };

            draw(&rctx, &mut pass);
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
