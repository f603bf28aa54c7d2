mod canvas;

use anyhow::{Context, Result};
use canvas::Canvas;
use clap::{Parser, ValueEnum};
use log::{info, warn};
use spark_core::{spawn_run, Position, SaturationPolicy, SparkConfig};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pixel size of one grid cell in rendered images.
const DEFAULT_SCALE: usize = 3;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Saturation {
    Hold,
    Fail,
}

impl From<Saturation> for SaturationPolicy {
    fn from(value: Saturation) -> Self {
        match value {
            Saturation::Hold => SaturationPolicy::Hold,
            Saturation::Fail => SaturationPolicy::Fail,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "spark", about = "Grow a branching spark on a bounded grid")]
struct Args {
    /// JSON configuration message; flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    height: Option<i32>,
    /// Initial spark cell as "x,y".
    #[arg(long)]
    position: Option<String>,
    /// Number of ticks to run.
    #[arg(long)]
    intervals: Option<usize>,
    /// Growth sharpness exponent.
    #[arg(long)]
    exp: Option<f64>,
    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
    /// Rejection draws per tick before falling back to the best frontier cell.
    #[arg(long)]
    max_attempts: Option<usize>,
    #[arg(long, value_enum)]
    saturation: Option<Saturation>,
    /// Write snapshot messages as JSON lines ("-" for stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Render the painted canvas to a PGM image.
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: usize,
    /// Print the run summary as JSON.
    #[arg(long)]
    summary: bool,
}

/// Parse "x,y" (spaces allowed). `None` unless both parts are integers.
fn parse_position(text: &str) -> Option<Position> {
    let (x, y) = text.split_once(',')?;
    let x = x.trim().parse().ok()?;
    let y = y.trim().parse().ok()?;
    Some(Position::new(x, y))
}

fn build_config(args: &Args) -> Result<SparkConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SparkConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(text) = &args.position {
        match parse_position(text) {
            Some(position) => config.initial_position = position,
            None => warn!(
                "ignoring unparsable position {text:?}, using {}",
                config.initial_position
            ),
        }
    }
    if let Some(intervals) = args.intervals {
        config.number_of_intervals = intervals;
    }
    if let Some(exp) = args.exp {
        config.exp = exp;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(attempts) = args.max_attempts {
        config.max_selection_attempts = attempts;
    }
    if let Some(saturation) = args.saturation {
        config.saturation = saturation.into();
    }
    Ok(config)
}

/// Counts received snapshots against the expected total.
struct Progress {
    total: usize,
    received: usize,
    next_report: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            total,
            received: 0,
            next_report: 10,
        }
    }

    fn record(&mut self) -> usize {
        self.received += 1;
        let percent = self.received * 100 / self.total.max(1);
        if percent >= self.next_report {
            info!("progress: {percent}% ({}/{})", self.received, self.total);
            self.next_report = (percent / 10 + 1) * 10;
        }
        percent
    }

    fn is_complete(&self) -> bool {
        self.received >= self.total
    }
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file =
        File::create(path).with_context(|| format!("creating output {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = build_config(&args)?;
    config.validate().context("invalid configuration")?;

    let mut canvas = match &args.image {
        Some(_) => Some(
            Canvas::new(config.width, config.height, args.scale)
                .context("image dimensions overflow")?,
        ),
        None => None,
    };
    if let Some(canvas) = canvas.as_mut() {
        let seed = config.initial_position;
        canvas.paint(seed.x, seed.y, 1.0);
    }
    let mut output = args.output.as_deref().map(open_output).transpose()?;

    let run = spawn_run(config).context("invalid configuration")?;
    let mut progress = Progress::new(run.intervals());
    for window in run.snapshots().iter() {
        if let Some(out) = output.as_mut() {
            serde_json::to_writer(&mut *out, &window.cells)?;
            writeln!(out)?;
        }
        if let Some(canvas) = canvas.as_mut() {
            canvas.paint_window(&window);
        }
        progress.record();
    }
    let summary = run.join()?;
    if !progress.is_complete() {
        warn!(
            "received {} of {} snapshots",
            progress.received, progress.total
        );
    }

    if let Some(mut out) = output {
        out.flush()?;
    }
    if let (Some(canvas), Some(path)) = (canvas, &args.image) {
        let file =
            File::create(path).with_context(|| format!("creating image {}", path.display()))?;
        let mut out = BufWriter::new(file);
        canvas.write_pgm(&mut out)?;
        out.flush()?;
        info!("wrote {}", path.display());
    }
    if args.summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_core::SparkConfigError;

    #[test]
    fn parses_positions_with_spaces() {
        assert_eq!(parse_position("12,40"), Some(Position::new(12, 40)));
        assert_eq!(parse_position(" 3 , 4 "), Some(Position::new(3, 4)));
        assert_eq!(parse_position("3;4"), None);
        assert_eq!(parse_position("x,4"), None);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "spark",
            "--width",
            "40",
            "--position",
            "5,6",
            "--exp",
            "0",
            "--saturation",
            "fail",
        ]);
        let config = build_config(&args).expect("config");
        assert_eq!(config.width, 40);
        assert_eq!(config.height, SparkConfig::default().height);
        assert_eq!(config.initial_position, Position::new(5, 6));
        assert_eq!(config.exp, 0.0);
        assert_eq!(config.saturation, SaturationPolicy::Fail);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn bad_position_falls_back_to_default() {
        let args = Args::parse_from(["spark", "--position", "left"]);
        let config = build_config(&args).expect("config");
        assert_eq!(config.initial_position, Position::new(100, 100));
    }

    #[test]
    fn oversized_grid_is_rejected_by_validation() {
        let args = Args::parse_from([
            "spark",
            "--width",
            "2000000000",
            "--height",
            "2000000000",
            "--image",
            "out.pgm",
        ]);
        let config = build_config(&args).expect("config");
        assert!(matches!(
            config.validate(),
            Err(SparkConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn progress_reports_completion() {
        let mut progress = Progress::new(4);
        assert_eq!(progress.record(), 25);
        progress.record();
        progress.record();
        assert!(!progress.is_complete());
        assert_eq!(progress.record(), 100);
        assert!(progress.is_complete());
    }
}
