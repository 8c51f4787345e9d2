pub mod audio_buffer;
pub mod constants;
pub mod math;
