//! Thumbnail rendering.

use crate::ffmpeg::FfmpegRunner;
use fontdue::layout::{
    CoordinateSystem, HorizontalAlign, Layout, LayoutSettings, TextStyle, VerticalAlign, WrapStyle,
};
use fontdue::{Font, FontSettings};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::RgbImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use taleweaver_config::ThumbnailConfig;
use taleweaver_core::ImageSet;
use taleweaver_error::{MediaError, MediaErrorKind, TaleweaverResult};
use tracing::{info, instrument, warn};

/// Thumbnail file name, written next to the images.
pub const THUMBNAIL_FILE: &str = "thumbnail.jpg";
const TITLE_TEXT_FILE: &str = "thumbnail_title.txt";
const BANNER_TEXT_FILE: &str = "thumbnail_banner.txt";

/// Brightness kept under the title band.
const TITLE_BAND_KEEP: f32 = 0.3;
/// Brightness kept under the banner band.
const BANNER_BAND_KEEP: f32 = 0.4;

/// Escape a value for use inside an FFmpeg filter option.
///
/// # Examples
///
/// ```
/// use taleweaver_media::escape_filter_value;
///
/// assert_eq!(escape_filter_value("C:\\Fonts\\a,b.ttf"), "C\\:/Fonts/a\\,b.ttf");
/// ```
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.replace('\\', "/").chars() {
        if matches!(ch, ':' | '\'' | ',' | ';' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Filter drawing both bands and their text.
///
/// Text comes from files so titles need no escaping.
pub fn build_thumbnail_filter(
    config: &ThumbnailConfig,
    font: &Path,
    title_file: &Path,
    banner_file: &Path,
) -> String {
    let font = escape_filter_value(&font.to_string_lossy());
    let title_file = escape_filter_value(&title_file.to_string_lossy());
    let banner_file = escape_filter_value(&banner_file.to_string_lossy());
    let (w, h) = (config.width, config.height);
    let (tb, bb) = (config.title_band, config.banner_band);
    format!(
        "scale={w}:{h},\
         drawbox=x=0:y=ih-{tb}:w=iw:h={tb}:color=black@0.7:t=fill,\
         drawtext=fontfile={font}:textfile={title_file}:expansion=none:fontcolor=white:\
         fontsize={ts}:x=(w-text_w)/2:y=h-{tb}/2-text_h/2,\
         drawbox=x=0:y=0:w=iw:h={bb}:color=black@0.6:t=fill,\
         drawtext=fontfile={font}:textfile={banner_file}:expansion=none:fontcolor=white:\
         fontsize={bs}:x=(w-text_w)/2:y=({bb}-text_h)/2",
        ts = config.title_font_size,
        bs = config.banner_font_size,
    )
}

/// Load a TrueType or OpenType font for in-process captions.
pub fn load_font(path: &Path) -> TaleweaverResult<Font> {
    let bytes = std::fs::read(path).map_err(|e| MediaError::io(path, e))?;
    let font = Font::from_bytes(bytes, FontSettings::default())
        .map_err(|e| MediaError::new(MediaErrorKind::Font(format!("{}: {}", path.display(), e))))?;
    Ok(font)
}

/// Draw `text` in white, centred within rows `top..top + band`.
pub fn draw_caption(image: &mut RgbImage, font: &Font, text: &str, size: f32, top: u32, band: u32) {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings {
        x: 0.0,
        y: top as f32,
        max_width: Some(image.width() as f32),
        max_height: Some(band as f32),
        horizontal_align: HorizontalAlign::Center,
        vertical_align: VerticalAlign::Middle,
        wrap_style: WrapStyle::Word,
        ..LayoutSettings::default()
    });
    layout.append(&[font], &TextStyle::new(text, size, 0));

    let (width, height) = (i64::from(image.width()), i64::from(image.height()));
    for glyph in layout.glyphs() {
        if glyph.width == 0 || glyph.height == 0 {
            continue;
        }
        let (_, coverage) = font.rasterize_config(glyph.key);
        let (left, top) = (glyph.x.round() as i64, glyph.y.round() as i64);
        for (i, &alpha) in coverage.iter().enumerate() {
            let x = left + (i % glyph.width) as i64;
            let y = top + (i / glyph.width) as i64;
            if alpha == 0 || x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }
            let pixel = image.get_pixel_mut(x as u32, y as u32);
            let a = f32::from(alpha) / 255.0;
            pixel.0 = pixel.0.map(|c| (f32::from(c) * (1.0 - a) + 255.0 * a).round() as u8);
        }
    }
}

/// Scale `frame`, darken the band rows and, when `font` is given, draw
/// `title` and the banner into them.
pub fn render_in_process(
    frame: &Path,
    output: &Path,
    config: &ThumbnailConfig,
    font: Option<&Font>,
    title: &str,
) -> TaleweaverResult<()> {
    let image = image::open(frame)
        .map_err(|e| MediaError::new(MediaErrorKind::Image(format!("{}: {}", frame.display(), e))))?;
    let mut rgb = image
        .resize_exact(config.width, config.height, FilterType::Lanczos3)
        .to_rgb8();
    let title_top = config.height.saturating_sub(config.title_band);
    let banner_band = config.banner_band.min(config.height);
    darken_rows(&mut rgb, title_top, config.height, TITLE_BAND_KEEP);
    darken_rows(&mut rgb, 0, banner_band, BANNER_BAND_KEEP);

    if let Some(font) = font {
        let title_band = config.height - title_top;
        draw_caption(&mut rgb, font, title, config.title_font_size as f32, title_top, title_band);
        draw_caption(&mut rgb, font, &config.banner, config.banner_font_size as f32, 0, banner_band);
    }

    let file = File::create(output).map_err(|e| MediaError::io(output, e))?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), 95);
    encoder
        .encode_image(&rgb)
        .map_err(|e| MediaError::new(MediaErrorKind::Image(format!("{}: {}", output.display(), e))))?;
    Ok(())
}

fn darken_rows(image: &mut RgbImage, from: u32, to: u32, keep: f32) {
    for y in from..to.min(image.height()) {
        for x in 0..image.width() {
            let pixel = image.get_pixel_mut(x, y);
            pixel.0 = pixel.0.map(|c| (f32::from(c) * keep) as u8);
        }
    }
}

/// Renders the publishing thumbnail.
pub struct ThumbnailGenerator {
    runner: FfmpegRunner,
    config: ThumbnailConfig,
}

impl ThumbnailGenerator {
    /// Generator using `runner` and the `[thumbnail]` settings.
    pub fn new(runner: FfmpegRunner, config: ThumbnailConfig) -> Self {
        Self { runner, config }
    }

    /// First configured font that exists.
    pub fn find_font(&self) -> Option<&Path> {
        self.config
            .fonts
            .iter()
            .map(PathBuf::as_path)
            .find(|font| font.is_file())
    }

    async fn render_with_text(
        &self,
        frame: &Path,
        output: &Path,
        font: &Path,
        title: &str,
    ) -> TaleweaverResult<()> {
        let dir = output.parent().unwrap_or(Path::new("."));
        let title_file = dir.join(TITLE_TEXT_FILE);
        let banner_file = dir.join(BANNER_TEXT_FILE);
        tokio::fs::write(&title_file, title)
            .await
            .map_err(|e| MediaError::io(&title_file, e))?;
        tokio::fs::write(&banner_file, &self.config.banner)
            .await
            .map_err(|e| MediaError::io(&banner_file, e))?;

        let filter = build_thumbnail_filter(&self.config, font, &title_file, &banner_file);
        let input = frame.to_string_lossy().into_owned();
        let output = output.to_string_lossy().into_owned();
        let args = [
            "-y", "-i", &input, "-vf", &filter, "-frames:v", "1", "-q:v", "2", &output,
        ]
        .map(str::to_string);
        self.runner.run_ffmpeg(&args).await
    }

    /// Render `thumbnail.jpg` beside the images from the second image (or
    /// the only one), with `title` in the bottom band.
    ///
    /// FFmpeg draws the text first. If it fails, the text is drawn
    /// in-process with the same font; without a usable font the bands are
    /// left empty.
    #[instrument(skip_all, fields(images = images.len()))]
    pub async fn generate(&self, images: &ImageSet, title: &str) -> TaleweaverResult<PathBuf> {
        let frame = images.thumbnail_source().ok_or_else(|| {
            MediaError::new(MediaErrorKind::NoInput("no images for the thumbnail".into()))
        })?;
        let output = frame
            .parent()
            .unwrap_or(Path::new("."))
            .join(THUMBNAIL_FILE);

        let Some(font_path) = self.find_font() else {
            warn!("No configured font found; writing thumbnail without text");
            render_in_process(frame, &output, &self.config, None, title)?;
            info!(path = %output.display(), "Rendered plain thumbnail");
            return Ok(output);
        };

        match self.render_with_text(frame, &output, font_path, title).await {
            Ok(()) => {
                info!(path = %output.display(), font = %font_path.display(), "Rendered thumbnail");
                return Ok(output);
            }
            Err(e) => warn!(error = %e, "FFmpeg thumbnail failed; drawing text in-process"),
        }

        let font = match load_font(font_path) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!(error = %e, "Font unusable; writing thumbnail without text");
                None
            }
        };
        render_in_process(frame, &output, &self.config, font.as_ref(), title)?;
        info!(path = %output.display(), captioned = font.is_some(), "Rendered thumbnail in-process");
        Ok(output)
    }
}
