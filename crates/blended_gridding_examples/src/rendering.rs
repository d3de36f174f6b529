use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use blended_gridding::prelude::Grid2;
use image::{Rgb, RgbImage};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Installs a formatting subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it more than once is harmless.
pub fn init_tracing() {
    if INITIALISED.set(()).is_err() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stdout().is_terminal());
    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
}

/// How to turn a gridded field into an image.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Pixels per grid cell along each axis.
    pub scale: u32,
    /// Value range mapped onto the color ramp; the field's own range when `None`.
    pub range: Option<(f32, f32)>,
    /// Cells drawn as markers on top of the field, e.g. known samples.
    pub markers: Vec<(usize, usize)>,
    pub marker_color: [u8; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 4,
            range: None,
            markers: Vec::new(),
            marker_color: [255, 255, 255],
        }
    }
}

impl RenderConfig {
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
            ..Self::default()
        }
    }

    pub fn with_range(mut self, lo: f32, hi: f32) -> Self {
        self.range = Some((lo, hi));
        self
    }

    pub fn with_markers(mut self, markers: Vec<(usize, usize)>) -> Self {
        self.markers = markers;
        self
    }
}

/// Writes `field` as a PNG, axis 1 running left to right and axis 2 top to bottom.
pub fn render_field_to_png(
    field: &Grid2<f32>,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let (lo, hi) = config.range.unwrap_or_else(|| {
        field
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    });
    let span = if hi > lo { hi - lo } else { 1.0 };

    let scale = config.scale.max(1);
    let (n1, n2) = field.shape();
    let mut img = RgbImage::new(n1 as u32 * scale, n2 as u32 * scale);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let v = field.get((x / scale) as usize, (y / scale) as usize);
        *pixel = ramp(((v - lo) / span).clamp(0.0, 1.0));
    }

    let radius = (scale / 2).max(1) as i64;
    for &(i1, i2) in &config.markers {
        let cx = (i1 as i64) * scale as i64 + scale as i64 / 2;
        let cy = (i2 as i64) * scale as i64 + scale as i64 / 2;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (x, y) = (cx + dx, cy + dy);
                if dx * dx + dy * dy <= radius * radius
                    && x >= 0
                    && y >= 0
                    && (x as u32) < img.width()
                    && (y as u32) < img.height()
                {
                    img.put_pixel(x as u32, y as u32, Rgb(config.marker_color));
                }
            }
        }
    }

    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote {}.", path.display());
    Ok(())
}

/// Blue to yellow to red.
fn ramp(u: f32) -> Rgb<u8> {
    let (r, g, b) = if u < 0.5 {
        let t = u * 2.0;
        (40.0 + 215.0 * t, 70.0 + 150.0 * t, 200.0 - 150.0 * t)
    } else {
        let t = (u - 0.5) * 2.0;
        (255.0, 220.0 - 180.0 * t, 50.0 - 20.0 * t)
    };
    Rgb([r as u8, g as u8, b as u8])
}
