use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rastergraph::{Affine, GraphDesc, GraphRenderer, Raster, RasterRegion, RendererConfig};

#[derive(Parser, Debug)]
#[command(name = "rastergraph", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a graph description to a PNG.
    Render(RenderArgs),
    /// Print the nodes of a graph description.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input graph JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// User-space area to render as `x,y,w,h`. Defaults to the root's bounds.
    #[arg(long, value_parser = parse_area, allow_hyphen_values = true)]
    area: Option<RasterRegion>,

    /// Integer view translation as `dx,dy`.
    #[arg(long, value_parser = parse_translate, allow_hyphen_values = true)]
    translate: Option<(i32, i32)>,

    /// Straight RGBA8 color painted under the graph as `r,g,b,a`.
    #[arg(long, value_parser = parse_rgba)]
    clear: Option<[u8; 4]>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input graph JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn read_graph(path: &Path) -> anyhow::Result<(rastergraph::FilterGraph, rastergraph::NodeId)> {
    let desc = GraphDesc::load(path)?;
    let assets_root = path.parent().unwrap_or_else(|| Path::new("."));
    let config = RendererConfig::from_env();
    let built = desc
        .build_with_capacity(assets_root, config.tile_cache_capacity)
        .with_context(|| format!("build graph '{}'", path.display()))?;
    Ok(built)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (graph, root) = read_graph(&args.in_path)?;
    let area = match args.area {
        Some(area) => area,
        None => graph.bounds(root)?,
    };
    if area.is_empty() {
        anyhow::bail!("nothing to render: area {area:?} is empty");
    }
    let (dx, dy) = args.translate.unwrap_or((0, 0));

    let mut config = RendererConfig::from_env();
    if args.clear.is_some() {
        config.clear_rgba = args.clear;
    }

    let buffer = Raster::new(area.translate(dx, dy))?;
    let mut renderer = GraphRenderer::with_config(buffer, &config)?;
    renderer.attach_graph(Arc::new(graph), root);
    renderer.set_transform(Some(Affine::translate((f64::from(dx), f64::from(dy)))));
    renderer.repaint(area.to_rect())?;

    let frame = renderer.into_output_buffer();
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let (graph, root) = read_graph(&args.in_path)?;
    for id in graph.ids() {
        let node = graph.node(id)?;
        let b = node.bounds();
        let grid = node.tile_grid();
        let sources: Vec<String> = node.sources().iter().map(|s| s.0.to_string()).collect();
        println!(
            "{}{:>3} {:<10} bounds=({}, {}, {}x{}) sources=[{}] tiles={}x{}@({}, {})",
            if id == root { '*' } else { ' ' },
            id.0,
            node.kind(),
            b.x(),
            b.y(),
            b.width(),
            b.height(),
            sources.join(", "),
            grid.tile_width(),
            grid.tile_height(),
            grid.offset_x(),
            grid.offset_y(),
        );
    }
    Ok(())
}

fn parse_ints<const N: usize>(s: &str) -> Result<[i64; N], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} comma-separated integers, got '{s}'"));
    }
    let mut out = [0i64; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("'{part}' is not an integer: {e}"))?;
    }
    Ok(out)
}

fn parse_area(s: &str) -> Result<RasterRegion, String> {
    let [x, y, w, h] = parse_ints::<4>(s)?;
    let int = |v: i64| i32::try_from(v).map_err(|_| format!("{v} is out of range"));
    let dim = |v: i64| u32::try_from(v).map_err(|_| format!("size {v} must be non-negative"));
    Ok(RasterRegion::new(int(x)?, int(y)?, dim(w)?, dim(h)?))
}

fn parse_translate(s: &str) -> Result<(i32, i32), String> {
    let [dx, dy] = parse_ints::<2>(s)?;
    let int = |v: i64| i32::try_from(v).map_err(|_| format!("{v} is out of range"));
    Ok((int(dx)?, int(dy)?))
}

fn parse_rgba(s: &str) -> Result<[u8; 4], String> {
    let v = parse_ints::<4>(s)?;
    let mut out = [0u8; 4];
    for (slot, c) in out.iter_mut().zip(v) {
        *slot = u8::try_from(c).map_err(|_| format!("channel {c} must be in 0..=255"))?;
    }
    Ok(out)
}
