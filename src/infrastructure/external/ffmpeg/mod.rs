//! FFprobe adapter for subtitle/audio stream discovery.

pub mod ffprobe_adapter;

pub use ffprobe_adapter::FFprobeAdapter;
