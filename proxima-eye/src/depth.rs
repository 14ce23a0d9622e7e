//! Depth maps and central region reduction

use crate::error::VisionError;
use bytes::{BufMut, Bytes, BytesMut};
use half::f16;
use image::GrayImage;
use std::io::Cursor;

/// Sample layout of a depth map buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthEncoding {
    /// One little-endian IEEE half float per sample. The only layout the
    /// reducer accepts.
    Float16,
    /// One little-endian f32 per sample
    Float32,
    /// Anything else a model backend might hand back
    Other(u32),
}

impl DepthEncoding {
    pub fn bytes_per_sample(&self) -> Option<usize> {
        match self {
            DepthEncoding::Float16 => Some(2),
            DepthEncoding::Float32 => Some(4),
            DepthEncoding::Other(_) => None,
        }
    }
}

/// Per-pixel depth estimate produced by one inference call
#[derive(Debug, Clone)]
pub struct DepthMap {
    width: usize,
    height: usize,
    bytes_per_row: usize,
    encoding: DepthEncoding,
    data: Bytes,
}

impl DepthMap {
    pub fn new(
        width: usize,
        height: usize,
        bytes_per_row: usize,
        encoding: DepthEncoding,
        data: Bytes,
    ) -> Self {
        Self {
            width,
            height,
            bytes_per_row,
            encoding,
            data,
        }
    }

    /// Pack `samples` (row-major, tightly strided) as half floats
    pub fn from_samples(width: usize, height: usize, samples: &[f32]) -> Result<Self, VisionError> {
        let expected = width
            .checked_mul(height)
            .ok_or_else(|| VisionError::DepthMap("Depth map dimensions overflow".to_string()))?;
        if samples.len() != expected {
            return Err(VisionError::DepthMap(format!(
                "Expected {} samples for {}x{}, got {}",
                expected,
                width,
                height,
                samples.len()
            )));
        }

        let mut buf = BytesMut::with_capacity(expected * 2);
        for &sample in samples {
            buf.put_u16_le(f16::from_f32(sample).to_bits());
        }

        Ok(Self::new(width, height, width * 2, DepthEncoding::Float16, buf.freeze()))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn encoding(&self) -> DepthEncoding {
        self.encoding
    }

    /// Whether the buffer is a half-float map large enough for its
    /// declared geometry
    pub fn is_well_formed(&self) -> bool {
        if self.encoding != DepthEncoding::Float16 {
            return false;
        }
        let row_bytes = match self.width.checked_mul(2) {
            Some(bytes) => bytes,
            None => return false,
        };
        if self.bytes_per_row < row_bytes {
            return false;
        }
        if self.height == 0 {
            return true;
        }
        self.bytes_per_row
            .checked_mul(self.height - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .map_or(false, |needed| self.data.len() >= needed)
    }

    /// Sample at `(x, y)` as f32. Callers must have checked `is_well_formed`.
    fn sample_unchecked(&self, x: usize, y: usize) -> f32 {
        let offset = y * self.bytes_per_row + x * 2;
        let bits = u16::from_le_bytes([self.data[offset], self.data[offset + 1]]);
        f16::from_bits(bits).to_f32()
    }

    /// Sample at `(x, y)`, or `None` if out of bounds or not a half-float map
    pub fn sample(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height || !self.is_well_formed() {
            return None;
        }
        Some(self.sample_unchecked(x, y))
    }

    /// Grayscale rendering normalised to the map's finite min/max, for
    /// debug inspection
    pub fn render_preview(&self) -> Option<GrayImage> {
        if !self.is_well_formed() || self.width == 0 || self.height == 0 {
            return None;
        }
        let width = u32::try_from(self.width).ok()?;
        let height = u32::try_from(self.height).ok()?;

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for y in 0..self.height {
            for x in 0..self.width {
                let value = self.sample_unchecked(x, y);
                if value.is_finite() {
                    min = min.min(value);
                    max = max.max(value);
                }
            }
        }
        let span = if max > min { max - min } else { 0.0 };

        Some(GrayImage::from_fn(width, height, |x, y| {
            let value = self.sample_unchecked(x as usize, y as usize);
            let shade = if span > 0.0 && value.is_finite() {
                ((value - min) / span * 255.0).round() as u8
            } else {
                0
            };
            image::Luma([shade])
        }))
    }

    /// PNG-encoded preview
    pub fn preview_png(&self) -> Result<Vec<u8>, VisionError> {
        let preview = self
            .render_preview()
            .ok_or_else(|| VisionError::DepthMap("Depth map cannot be rendered".to_string()))?;
        let mut buf = Vec::new();
        preview.write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)?;
        Ok(buf)
    }
}

/// Mean depth over the central square of a map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralReading {
    pub value: f32,
    /// Samples that contributed to `value`
    pub samples: usize,
}

/// Reduces a depth map to the mean of a fixed-size square at its centre.
#[derive(Debug, Clone, Copy)]
pub struct DepthReducer {
    region_size: usize,
}

impl Default for DepthReducer {
    fn default() -> Self {
        Self { region_size: 80 }
    }
}

impl DepthReducer {
    pub fn new(region_size: usize) -> Self {
        Self { region_size }
    }

    pub fn region_size(&self) -> usize {
        self.region_size
    }

    /// Half-open `(x0..x1, y0..y1)` bounds of the region, clipped to the map
    pub fn region_bounds(&self, map: &DepthMap) -> ((usize, usize), (usize, usize)) {
        let half = self.region_size / 2;
        let sx = (map.width / 2).saturating_sub(half);
        let sy = (map.height / 2).saturating_sub(half);
        let ex = map.width.min(sx.saturating_add(self.region_size));
        let ey = map.height.min(sy.saturating_add(self.region_size));
        ((sx, ex), (sy, ey))
    }

    /// Mean of the finite samples in the central region.
    ///
    /// Returns `None` for anything but a well-formed half-float map, and when
    /// the clipped region holds no finite sample. The divisor is the number
    /// of samples actually summed, never the nominal region area.
    pub fn central_depth(&self, map: &DepthMap) -> Option<CentralReading> {
        if !map.is_well_formed() {
            return None;
        }

        let ((sx, ex), (sy, ey)) = self.region_bounds(map);
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for y in sy..ey {
            for x in sx..ex {
                let value = map.sample_unchecked(x, y);
                if value.is_finite() {
                    sum += f64::from(value);
                    count += 1;
                }
            }
        }

        (count > 0).then(|| CentralReading {
            value: (sum / count as f64) as f32,
            samples: count,
        })
    }
}
