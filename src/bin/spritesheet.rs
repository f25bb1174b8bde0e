use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "spritesheet", version)]
struct Cli {
    /// Log pipeline steps to stderr (`RUST_LOG` overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the frame files of a folder in sheet order.
    Scan(ScanArgs),
    /// Print the resolved crop, grid and cell placements as JSON.
    Plan(PlanArgs),
    /// Composite a folder of frames into a sprite sheet.
    Export(ExportArgs),
    /// Render the crop preview of a single frame as a PNG.
    Preview(PreviewArgs),
    /// Write a config file holding the default settings.
    InitConfig(InitConfigArgs),
}

#[derive(Parser, Debug)]
struct ScanArgs {
    /// Folder holding the frame images.
    #[arg(long)]
    dir: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[arg(long)]
    dir: PathBuf,

    #[command(flatten)]
    sheet: SheetArgs,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[arg(long)]
    dir: PathBuf,

    /// Output sheet path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    sheet: SheetArgs,

    /// Decode frames on a thread pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel` (default: rayon's choice).
    #[arg(long, requires = "parallel")]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Frame image to preview.
    #[arg(long)]
    frame: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    crop: CropArgs,

    #[command(flatten)]
    margins: MarginArgs,
}

#[derive(Parser, Debug)]
struct InitConfigArgs {
    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

/// Settings shared by `plan` and `export`; flags override the config file.
#[derive(Args, Debug)]
struct SheetArgs {
    /// JSON config to start from.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid columns. Without `--config`, `--columns` or `--rows` the grid is the
    /// near-square one for the frame count.
    #[arg(long)]
    columns: Option<i32>,

    /// Rows; `0` derives them from the frame count.
    #[arg(long)]
    rows: Option<i32>,

    #[arg(long)]
    padding: Option<i32>,

    #[arg(long)]
    spacing: Option<i32>,

    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    #[command(flatten)]
    crop: CropArgs,

    #[command(flatten)]
    margins: MarginArgs,
}

/// Explicit crop rectangle; width/height `<= 0` keep the full frame on that axis.
#[derive(Args, Debug)]
struct CropArgs {
    #[arg(long, allow_negative_numbers = true)]
    x: Option<i32>,

    #[arg(long, allow_negative_numbers = true)]
    y: Option<i32>,

    #[arg(long, allow_negative_numbers = true)]
    width: Option<i32>,

    #[arg(long, allow_negative_numbers = true)]
    height: Option<i32>,
}

/// Crop given as insets from each frame edge.
#[derive(Args, Debug)]
struct MarginArgs {
    #[arg(long, conflicts_with_all = ["x", "y", "width", "height"])]
    top: Option<i32>,

    #[arg(long, conflicts_with_all = ["x", "y", "width", "height"])]
    bottom: Option<i32>,

    #[arg(long, conflicts_with_all = ["x", "y", "width", "height"])]
    left: Option<i32>,

    #[arg(long, conflicts_with_all = ["x", "y", "width", "height"])]
    right: Option<i32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    #[value(alias = "jpeg")]
    Jpg,
    Bmp,
}

impl From<FormatChoice> for spritesheet::OutputFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Png => Self::Png,
            FormatChoice::Jpg => Self::Jpg,
            FormatChoice::Bmp => Self::Bmp,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Scan(args) => cmd_scan(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Export(args) => cmd_export(args),
        Command::Preview(args) => cmd_preview(args),
        Command::InitConfig(args) => cmd_init_config(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "spritesheet=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl CropArgs {
    fn is_set(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.width.is_some() || self.height.is_some()
    }

    fn apply(&self, crop: &mut spritesheet::CropRect) {
        if let Some(x) = self.x {
            crop.x = x;
        }
        if let Some(y) = self.y {
            crop.y = y;
        }
        if let Some(width) = self.width {
            crop.width = width;
        }
        if let Some(height) = self.height {
            crop.height = height;
        }
    }
}

impl MarginArgs {
    fn to_margins(&self) -> Option<spritesheet::Margins> {
        if self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
        {
            return None;
        }
        Some(spritesheet::Margins::new(
            self.top.unwrap_or(0),
            self.bottom.unwrap_or(0),
            self.left.unwrap_or(0),
            self.right.unwrap_or(0),
        ))
    }
}

/// Crop for `frame` from explicit flags or margins; `None` when neither was given.
fn crop_override(
    crop: &CropArgs,
    margins: &MarginArgs,
    base: spritesheet::CropRect,
    frame: Option<&Path>,
) -> anyhow::Result<Option<spritesheet::CropRect>> {
    if crop.is_set() {
        let mut out = base;
        crop.apply(&mut out);
        return Ok(Some(out));
    }
    let Some(margins) = margins.to_margins() else {
        return Ok(None);
    };
    let frame = frame.context("margins need at least one frame to measure")?;
    let size = spritesheet::probe_frame_size(frame)?;
    let out = spritesheet::crop_from_margins(size, margins)
        .with_context(|| format!("frame '{}' has no usable size", frame.display()))?;
    Ok(Some(out))
}

fn sheet_config(
    args: &SheetArgs,
    frames: &spritesheet::FrameSet,
) -> anyhow::Result<spritesheet::SheetConfig> {
    let mut config = match &args.config {
        Some(path) => spritesheet::SheetConfig::from_path(path)?,
        None => spritesheet::SheetConfig::default(),
    };
    if args.config.is_none()
        && args.columns.is_none()
        && args.rows.is_none()
        && let Some(layout) = spritesheet::suggest_layout(frames.len())
    {
        config.columns = layout.columns;
        config.rows = layout.rows;
    }

    if let Some(columns) = args.columns {
        config.columns = columns;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(padding) = args.padding {
        config.padding = padding;
    }
    if let Some(spacing) = args.spacing {
        config.spacing = spacing;
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }
    if let Some(crop) = crop_override(&args.crop, &args.margins, config.crop, frames.first())? {
        config.crop = crop;
    }
    Ok(config)
}

fn cmd_scan(args: ScanArgs) -> anyhow::Result<()> {
    let frames = spritesheet::scan_frames(&args.dir)?;
    for path in &frames {
        println!("{}", path.display());
    }
    eprintln!("{} frame(s)", frames.len());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let frames = spritesheet::scan_frames(&args.dir)?;
    let config = sheet_config(&args.sheet, &frames)?;
    config.validate()?;

    let first = frames
        .first()
        .with_context(|| format!("no frames in '{}'", args.dir.display()))?;
    let natural = spritesheet::probe_frame_size(first)?;
    let crop = spritesheet::resolve_crop(config.crop, natural.width, natural.height);
    let plan = spritesheet::plan_grid(
        frames.len(),
        config.columns,
        config.rows,
        spritesheet::FrameSize::new(crop.width, crop.height),
        config.padding,
        config.spacing,
    )?;

    let report = serde_json::json!({
        "frames": frames.len(),
        "frame_size": natural,
        "crop": crop,
        "plan": plan,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize plan")?
    );
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let frames = spritesheet::scan_frames(&args.dir)?;
    if frames.is_empty() {
        anyhow::bail!("no frames in '{}'", args.dir.display());
    }

    let mut config = sheet_config(&args.sheet, &frames)?;
    if args.sheet.format.is_none()
        && args.sheet.config.is_none()
        && let Some(format) = spritesheet::OutputFormat::from_path(&args.out)
    {
        config.output_format = format;
    }

    let threading = spritesheet::CompositeThreading {
        parallel: args.parallel,
        threads: args.threads,
        ..spritesheet::CompositeThreading::default()
    };
    let out = spritesheet::export_sheet_with(frames.paths(), &config, &args.out, &threading)?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let crop = crop_override(
        &args.crop,
        &args.margins,
        spritesheet::CropRect::full(),
        Some(&args.frame),
    )?
    .unwrap_or_else(spritesheet::CropRect::full);

    let png = spritesheet::render_preview(&args.frame, crop)?;
    spritesheet::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    spritesheet::SheetConfig::default().to_path(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
