use crate::config::{Config, load_config};
use crate::diagram::ForestDiagram;
use crate::ir::parse_plans;
use crate::layout_dump::write_layout_dump;
use crate::render::{Renderers, render_svg, write_output_svg};
use crate::view::Viewport;
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "plan-forest",
    version,
    about = "Render query execution plans as a forest diagram"
)]
pub struct Args {
    /// Input file (JSON plan or array of plans) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Collapse every node at this depth or deeper (root is depth 0)
    #[arg(long = "collapse-depth")]
    pub collapse_depth: Option<usize>,

    /// Leave the minimap out of the output
    #[arg(long = "no-minimap")]
    pub no_minimap: bool,

    /// Log to stderr; repeat for more detail
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = resolve_config(&args)?;
    let input = read_input(args.input.as_deref())?;
    let plans = parse_plans(&input)?;

    let mut diagram = ForestDiagram::new(config.diagram.clone());
    diagram.load(&plans);
    if let Some(depth) = args.collapse_depth {
        let collapsed = diagram.collapse_below_depth(depth);
        tracing::debug!(depth, collapsed, "collapsed below depth");
        diagram.reset_to_fit();
    }

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render(&diagram, &config);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render(&diagram, &config);
            write_png(&svg, &output, &config)?;
        }
        OutputFormat::Json => {
            write_layout_dump(args.output.as_deref(), &diagram.scene())?;
        }
    }
    Ok(())
}

fn render(diagram: &ForestDiagram, config: &Config) -> String {
    let renderers = Renderers::new(&config.render);
    render_svg(&diagram.scene(), &config.theme, &config.render, &renderers)
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    let current = config.diagram.viewport;
    config.diagram.viewport = Viewport::new(
        args.width.unwrap_or(current.width),
        args.height.unwrap_or(current.height),
    );
    if args.no_minimap {
        config.diagram.show_minimap = false;
    }
    config.diagram = config.diagram.sanitized();
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
