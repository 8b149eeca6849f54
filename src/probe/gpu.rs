use wgpu::{Backends, DeviceType, Instance};

use crate::config::FALLBACK_MAX_TEXTURE_SIZE;

/// Result of probing for hardware-accelerated rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuSupport {
    /// Any accelerated backend is available (newer or GL)
    pub supports_gpu_accel: bool,
    /// A newer-generation backend (Vulkan, Metal, DX12) is available
    pub supports_gpu_accel_v2: bool,
    pub max_texture_size: u32,
}

impl Default for GpuSupport {
    fn default() -> Self {
        Self {
            supports_gpu_accel: false,
            supports_gpu_accel_v2: false,
            max_texture_size: FALLBACK_MAX_TEXTURE_SIZE,
        }
    }
}

/// Probe the newer backends first, then fall back to GL.
///
/// Software rasterizers are not counted as acceleration. Nothing here
/// fails: no adapter at all yields `GpuSupport::default()`.
pub async fn probe_gpu() -> GpuSupport {
    if let Some(max_texture_size) = probe_backends(Backends::PRIMARY).await {
        return GpuSupport {
            supports_gpu_accel: true,
            supports_gpu_accel_v2: true,
            max_texture_size,
        };
    }

    if let Some(max_texture_size) = probe_backends(Backends::GL).await {
        return GpuSupport {
            supports_gpu_accel: true,
            supports_gpu_accel_v2: false,
            max_texture_size,
        };
    }

    log::warn!("No accelerated GPU adapter found, assuming software rendering");
    GpuSupport::default()
}

async fn probe_backends(backends: Backends) -> Option<u32> {
    let instance = Instance::new(&wgpu::InstanceDescriptor {
        backends,
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await?;

    let info = adapter.get_info();
    if info.device_type == DeviceType::Cpu {
        log::info!("Ignoring software adapter {} ({:?})", info.name, info.backend);
        return None;
    }

    let max_texture_size = adapter.limits().max_texture_dimension_2d;
    log::info!(
        "GPU probe: {} via {:?}, max texture {}",
        info.name,
        info.backend,
        max_texture_size
    );
    Some(max_texture_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unaccelerated() {
        let support = GpuSupport::default();
        assert!(!support.supports_gpu_accel);
        assert!(!support.supports_gpu_accel_v2);
        assert_eq!(support.max_texture_size, FALLBACK_MAX_TEXTURE_SIZE);
    }
}
