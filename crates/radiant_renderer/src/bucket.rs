//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently,
//! either one after another or on the rayon pool.

use crate::camera::RayComputer;
use crate::renderer::render_pixel;
use crate::tracer::Tracer;
use radiant_math::Color;
use rand::RngCore;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets closest to the center come first so a partial render already
/// shows the middle of the frame.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = if bucket_size == 0 { DEFAULT_BUCKET_SIZE } else { bucket_size };
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let distance = |b: &Bucket| {
        let x = b.x as f32 + b.width as f32 / 2.0;
        let y = b.y as f32 + b.height as f32 / 2.0;
        (x - center_x).powi(2) + (y - center_y).powi(2)
    };

    // Stable, so equidistant buckets keep scanline order.
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Image-wide parameters shared by every bucket of one render.
#[derive(Clone, Copy)]
pub struct BucketContext<'a> {
    pub camera: &'a dyn RayComputer,
    pub width: u32,
    pub height: u32,
    /// Sub-samples per pixel axis.
    pub samples: u32,
}

/// Render a single bucket. Pixels come back in row-major order within the
/// bucket.
pub fn render_bucket(
    bucket: &Bucket,
    context: &BucketContext<'_>,
    tracer: &mut dyn Tracer,
    rng: &mut dyn RngCore,
) -> BucketResult {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = render_pixel(
                tracer,
                context.camera,
                bucket.x + local_x,
                bucket.y + local_y,
                (context.width, context.height),
                context.samples,
                rng,
            );
            pixels.push(color);
        }
    }

    BucketResult::new(*bucket, pixels)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PinholeCamera;
    use radiant_core::CameraDesc;
    use radiant_math::Ray;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Colors each ray by its direction.
    struct DirectionTracer;

    impl Tracer for DirectionTracer {
        fn trace(&mut self, ray: &Ray) -> Color {
            ray.direction.abs()
        }
    }

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!(first.x, 64);
        assert_eq!(first.y, 64);
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_zero_bucket_size_uses_default() {
        let buckets = generate_buckets(100, 10, 0);
        assert_eq!(buckets.len(), 2);
        assert!(buckets.iter().all(|b| b.width <= DEFAULT_BUCKET_SIZE));
    }

    #[test]
    fn test_render_bucket_row_major() {
        let camera = PinholeCamera::new(&CameraDesc::default(), 1.0);
        let context = BucketContext {
            camera: &camera,
            width: 8,
            height: 8,
            samples: 1,
        };
        let bucket = Bucket::new(2, 4, 3, 2, 0);
        let mut rng = StdRng::seed_from_u64(3);

        let result = render_bucket(&bucket, &context, &mut DirectionTracer, &mut rng);
        assert_eq!(result.pixels.len(), 6);

        // Same pixel rendered on its own.
        let expected = render_pixel(&mut DirectionTracer, &camera, 4, 5, (8, 8), 1, &mut rng);
        assert_eq!(result.pixels[5], expected);
    }
}
