//! Image rendering: supersampled pixels, bucket scheduling and the output
//! buffer.

use std::path::Path;
use std::time::Instant;

use crate::bucket::{generate_buckets, render_bucket, BucketContext, BucketResult};
use crate::camera::RayComputer;
use crate::tracer::Tracer;
use radiant_core::RenderSettings;
use radiant_math::Color;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

/// Convert a linear color to 8-bit RGBA. Channels are clamped to [0, 1];
/// no gamma is applied.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let quantize = |c: f32| (255.0 * c.clamp(0.0, 1.0)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z), 255]
}

/// Average of an `samples x samples` grid of rays through pixel `(x, y)`.
/// Row 0 is the top of the image.
pub fn render_pixel(
    tracer: &mut dyn Tracer,
    camera: &dyn RayComputer,
    x: u32,
    y: u32,
    (width, height): (u32, u32),
    samples: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let n = samples.max(1);
    let row = (height - 1 - y) as f32;
    let mut pixel_color = Color::ZERO;

    for j in 0..n {
        for i in 0..n {
            let sx = (x as f32 + (i as f32 + 0.5) / n as f32) / width as f32;
            let sy = (row + (j as f32 + 0.5) / n as f32) / height as f32;
            let ray = camera.compute_ray(sx, sy, rng);
            pixel_color += tracer.trace(&ray);
        }
    }

    pixel_color / (n * n) as f32
}

/// Linear color image, row 0 at the top.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a finished bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let i = i as u32;
            self.set(bucket.x + i % bucket.width, bucket.y + i / bucket.width, *color);
        }
    }

    /// Convert to RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| image::Rgba(color_to_rgba(self.get(x, y))))
    }

    /// Write the image; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_image().save(path)
    }
}

/// Render the whole image.
///
/// `make_tracer` is called once for a serial render and once per rayon
/// worker when `settings.parallel` is set, so every thread owns its tracer
/// and traversal stack. Each bucket seeds its own rng from its index, which
/// keeps lens sampling identical between serial and parallel runs.
pub fn render<T, F>(settings: &RenderSettings, camera: &dyn RayComputer, make_tracer: F) -> ImageBuffer
where
    T: Tracer,
    F: Fn() -> T + Sync + Send,
{
    let start = Instant::now();
    let (width, height) = (settings.width, settings.height);
    let mut image = ImageBuffer::new(width, height);
    if width == 0 || height == 0 {
        return image;
    }

    let buckets = generate_buckets(width, height, settings.bucket_size);
    let context = BucketContext {
        camera,
        width,
        height,
        samples: settings.samples,
    };
    let bucket_rng = |index: usize| StdRng::seed_from_u64(index as u64);

    let results: Vec<BucketResult> = if settings.parallel {
        buckets
            .par_iter()
            .map_init(&make_tracer, |tracer, bucket| {
                render_bucket(bucket, &context, tracer, &mut bucket_rng(bucket.index))
            })
            .collect()
    } else {
        let mut tracer = make_tracer();
        buckets
            .iter()
            .map(|bucket| render_bucket(bucket, &context, &mut tracer, &mut bucket_rng(bucket.index)))
            .collect()
    };

    for result in &results {
        image.write_bucket(result);
    }

    log::info!(
        "Rendered {}x{} ({} buckets, {}x{} samples, {}) in {:.2?}",
        width,
        height,
        results.len(),
        settings.samples.max(1),
        settings.samples.max(1),
        if settings.parallel { "parallel" } else { "serial" },
        start.elapsed()
    );

    image
}
