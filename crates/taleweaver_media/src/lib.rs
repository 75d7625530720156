//! Media stages of the Taleweaver pipeline.
//!
//! Narration is synthesized paragraph by paragraph and joined with short
//! silences; the slideshow and thumbnail are rendered by FFmpeg, with the
//! `image` crate covering resizing and `fontdue` drawing thumbnail text when
//! FFmpeg cannot.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audio;
mod ffmpeg;
mod speech;
mod thumbnail;
mod video;
mod wav;

pub use audio::{AUDIO_DIR, Narrator, STORY_AUDIO_FILE, combine_segments, segment_path};
pub use ffmpeg::{FfmpegRunner, ProbeInfo, parse_duration_output, parse_probe_output};
pub use speech::CommandSpeech;
pub use thumbnail::{
    THUMBNAIL_FILE, ThumbnailGenerator, build_thumbnail_filter, draw_caption, escape_filter_value, load_font,
    render_in_process,
};
pub use video::{
    FILTER_SCRIPT_FILE, RESIZED_DIR, VIDEO_FILE, VideoAssembler, build_filter_script,
    fade_secs, fallback_args, per_image_secs, primary_args, resize_to_jpeg,
};
pub use wav::{mono_spec, read_wav, wav_duration_secs, write_wav};
