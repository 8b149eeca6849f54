mod buffers;
mod context;
mod render;

pub use buffers::{FieldTexture, VertexStream, ViewportUniform};
pub use context::GpuContext;
pub use render::{Compositor, FieldPipeline, PrimitivePipeline};
