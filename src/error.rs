pub type BackdropResult<T> = Result<T, BackdropError>;

/// Failures that can stop the engine from acquiring a drawing surface.
///
/// Missing probes (no battery, no network class, no GPU) are never errors;
/// they degrade to safe defaults inside the probe.
#[derive(thiserror::Error, Debug)]
pub enum BackdropError {
    #[error("no GPU adapter is compatible with the surface")]
    NoAdapter,

    #[error("surface creation failed: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the adapter")]
    SurfaceUnsupported,

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("unknown performance tier: {0:?}")]
    UnknownTier(String),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert!(BackdropError::NoAdapter.to_string().contains("adapter"));
        assert!(BackdropError::SurfaceUnsupported
            .to_string()
            .contains("not supported"));
    }
}
