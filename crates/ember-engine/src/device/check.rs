use thiserror::Error;

/// Driver-reported failure captured around a single graphics call.
///
/// Carries the textual form of the call plus the call site, so the log line
/// points at the offending statement rather than somewhere inside wgpu.
#[derive(Debug, Clone, Error)]
#[error("[gpu error] {call} at {file}:{line}: {message}")]
pub struct DriverError {
    pub call: &'static str,
    pub file: &'static str,
    pub line: u32,
    pub message: String,
}

/// Runs `f` with driver error checking around it.
///
/// Two phases: a fresh validation scope is opened before the call, so stale
/// errors from earlier calls cannot be attributed to this one; after the
/// call the scope is popped and inspected once. On error the failing call,
/// file, and line are logged and a [`DriverError`] is returned; callers
/// treat it as fatal.
///
/// This is a debug-only aid. Without debug assertions the call runs bare,
/// with no scopes pushed and behavior identical to the unwrapped call.
///
/// Intended for device-level creation calls (buffers, modules, pipelines).
/// Callers pass `file!()` and `line!()` so the report names their site:
///
/// ```ignore
/// let buffer = checked(device, "create_buffer_init", file!(), line!(), || {
///     device.create_buffer_init(&descriptor)
/// })?;
/// ```
pub fn checked<T>(
    device: &wgpu::Device,
    call: &'static str,
    file: &'static str,
    line: u32,
    f: impl FnOnce() -> T,
) -> Result<T, DriverError> {
    if !cfg!(debug_assertions) {
        return Ok(f());
    }

    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = f();

    // Pop in reverse push order. Scopes resolve synchronously on native.
    let validation = pollster::block_on(device.pop_error_scope());
    let oom = pollster::block_on(device.pop_error_scope());

    if let Some(err) = validation.or(oom) {
        log::error!("[gpu error] {call} at {file}:{line}: {err}");
        return Err(DriverError {
            call,
            file,
            line,
            message: err.to_string(),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_error_names_the_call_site() {
        let err = DriverError {
            call: "create_render_pipeline",
            file: "src/shader/program.rs",
            line: 42,
            message: "binding 0 missing".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("create_render_pipeline"));
        assert!(text.contains("src/shader/program.rs:42"));
        assert!(text.contains("binding 0 missing"));
    }
}
