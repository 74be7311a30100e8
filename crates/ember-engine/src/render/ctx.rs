/// What a renderer needs to create and feed GPU resources: the device,
/// the queue, and the format its color target must match.
///
/// Borrowed from the frame context for the duration of one draw callback.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
}
