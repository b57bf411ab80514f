/// Frame renderer and frame buffers.
pub mod frame;
pub(crate) mod paint;
/// Caption font loading and text layout.
pub mod text;
