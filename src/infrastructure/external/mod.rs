//! External process/service adapters: ffprobe/ffmpeg, whisper.cpp, ollama.

pub mod ffmpeg;
pub mod whisper;
pub mod ollama;

pub use ffmpeg::*;
pub use whisper::*;
pub use ollama::*;
