use spark_core::SnapshotWindow;
use std::io::{self, Write};

const FULL: u8 = 0xFF;
const CHARGED: u8 = 0x15;
const FAINT: u8 = 0x07;

/// Grayscale canvas fed with snapshot records.
///
/// Each grid cell covers `scale x scale` pixels. A pixel keeps the brightest
/// level ever painted on it.
pub struct Canvas {
    cols: usize,
    rows: usize,
    scale: usize,
    pixels: Vec<u8>,
}

/// Brightness for a weight: active cells at full, the charged halo dim,
/// everything else barely visible.
pub fn fade_level(weight: f64) -> u8 {
    if weight == 1.0 {
        FULL
    } else if weight > 0.5 {
        CHARGED
    } else {
        FAINT
    }
}

impl Canvas {
    /// Canvas for a grid with inclusive bounds `0..=width` x `0..=height`.
    ///
    /// `None` when the pixel count does not fit in `usize`.
    pub fn new(width: i32, height: i32, scale: usize) -> Option<Self> {
        let cols = (width.max(0) as usize).checked_add(1)?;
        let rows = (height.max(0) as usize).checked_add(1)?;
        let scale = scale.max(1);
        let cells = cols.checked_mul(rows)?;
        Some(Self {
            cols,
            rows,
            scale,
            pixels: vec![0; cells],
        })
    }

    pub fn paint(&mut self, x: i32, y: i32, weight: f64) {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return;
        }
        let idx = y as usize * self.cols + x as usize;
        self.pixels[idx] = self.pixels[idx].max(fade_level(weight));
    }

    pub fn paint_window(&mut self, window: &SnapshotWindow) {
        for cell in &window.cells {
            self.paint(cell.x, cell.y, cell.weight);
        }
    }

    pub fn level(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return None;
        }
        Some(self.pixels[y as usize * self.cols + x as usize])
    }

    /// Write the canvas as a plain-text PGM (P2) image.
    pub fn write_pgm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let (Some(px_width), Some(px_height)) = (
            self.cols.checked_mul(self.scale),
            self.rows.checked_mul(self.scale),
        ) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "scaled image dimensions overflow",
            ));
        };
        writeln!(out, "P2")?;
        writeln!(out, "{px_width} {px_height}")?;
        writeln!(out, "255")?;
        for row in self.pixels.chunks(self.cols) {
            let line = row
                .iter()
                .flat_map(|&p| std::iter::repeat_n(p, self.scale))
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            for _ in 0..self.scale {
                writeln!(out, "{line}")?;
            }
        }
        Ok(())
    }
}
