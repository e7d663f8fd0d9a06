//! Chart snapshots supplied by the rendering layer.
//!
//! The report never draws charts itself. It asks a [`SnapshotProvider`] for a
//! rasterized image of each chart surface and lays out whatever comes back.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use png::{ColorType, Decoder, Transformations};

use crate::error_handling::RenderingUnavailable;

/// Chart surfaces the report can embed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum ChartId {
    Overview,
    Security,
    Performance,
    Network,
}

/// An 8-bit RGB raster, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSnapshot {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl ChartSnapshot {
    /// Wraps raw RGB pixels.
    ///
    /// Returns `None` when either dimension is zero or `rgb` is not exactly
    /// `width * height * 3` bytes.
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(3)?;
        if width == 0 || height == 0 || rgb.len() != expected {
            return None;
        }
        Some(Self { width, height, rgb })
    }

    /// Decodes a PNG of any color type.
    ///
    /// Palette and low bit-depth images are expanded, 16-bit samples are
    /// reduced to 8 bits, and transparency is composited onto white.
    pub fn from_png(bytes: &[u8]) -> Result<Self, String> {
        let mut decoder = Decoder::new(bytes);
        decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
        let mut reader = decoder.read_info().map_err(|e| e.to_string())?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf).map_err(|e| e.to_string())?;

        let channels = match frame.color_type {
            ColorType::Grayscale => 1,
            ColorType::GrayscaleAlpha => 2,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
            ColorType::Indexed => return Err("palette was not expanded".to_string()),
        };

        let (width, height) = (frame.width as usize, frame.height as usize);
        let mut rgb = Vec::with_capacity(width * height * 3);
        for row in buf.chunks(frame.line_size).take(height) {
            for px in row[..width * channels].chunks_exact(channels) {
                let (r, g, b, a) = match channels {
                    1 => (px[0], px[0], px[0], 255),
                    2 => (px[0], px[0], px[0], px[1]),
                    3 => (px[0], px[1], px[2], 255),
                    _ => (px[0], px[1], px[2], px[3]),
                };
                rgb.extend_from_slice(&[over_white(r, a), over_white(g, a), over_white(b, a)]);
            }
        }

        Self::from_rgb(frame.width, frame.height, rgb)
            .ok_or_else(|| format!("unexpected {}x{} image", frame.width, frame.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    /// Height when drawn `width` points wide, keeping the aspect ratio.
    pub fn height_at(&self, width: f32) -> f32 {
        width * self.height as f32 / self.width as f32
    }
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (u32::from(channel), u32::from(alpha));
    // c*a + 255*(255-a), rounded, over 255
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Source of chart snapshots at report-build time.
///
/// `Ok(None)` means the chart is not rendered; `Err` means capturing it
/// failed. Either way the report section is laid out without a chart.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn capture(&self, chart: ChartId) -> Result<Option<ChartSnapshot>, RenderingUnavailable>;
}

/// Provider for reports without charts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnapshots;

#[async_trait]
impl SnapshotProvider for NoSnapshots {
    async fn capture(&self, _chart: ChartId) -> Result<Option<ChartSnapshot>, RenderingUnavailable> {
        Ok(None)
    }
}

/// Reads pre-rendered charts from `<dir>/<chart>-chart.png`.
#[derive(Debug, Clone)]
pub struct DirectorySnapshots {
    dir: PathBuf,
}

impl DirectorySnapshots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, chart: ChartId) -> PathBuf {
        self.dir.join(format!("{chart}-chart.png"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SnapshotProvider for DirectorySnapshots {
    async fn capture(&self, chart: ChartId) -> Result<Option<ChartSnapshot>, RenderingUnavailable> {
        let path = self.path_for(chart);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No {} chart at {}", chart, path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(RenderingUnavailable::new(
                    chart,
                    format!("{}: {e}", path.display()),
                ))
            }
        };
        ChartSnapshot::from_png(&bytes)
            .map(Some)
            .map_err(|e| RenderingUnavailable::new(chart, format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32, color: ColorType, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, width, height);
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    encoder
        .write_header()
        .expect("png header")
        .write_image_data(data)
        .expect("png data");
    out
}
