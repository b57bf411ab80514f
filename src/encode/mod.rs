/// Frame-sequence to MP4 assembly and render state.
pub mod assembler;
/// Encoder runtimes with a private scratch filesystem.
pub mod runtime;
