use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use framepipe::{
    Affine, BezPath, Canvas as _, Color, CompositorContext, ContainerLayer, DisplayList,
    DisplayListBuilder, DisplayListLayer, DrawStatus, FrameItem, FrameSize, FrameTimings,
    FramepipeOpts, ImageTexture, LayerTree, LayerTreePipeline, OpacityLayer, PixmapCanvas, Point,
    PresentedFrames, RasterImage, RasterStatus, Rasterizer, Rect, Size, SoftwareSurface,
    TextureLayer, TransformLayer, Vec2,
};

const ROOT_LAYER_ID: u64 = 1 << 48;
const SCROLL_LAYER_ID: u64 = (1 << 48) + 1;
const BADGE_LAYER_ID: u64 = (1 << 48) + 2;
const VIDEO_TEXTURE_ID: i64 = 7;

#[derive(Parser, Debug)]
#[command(name = "framepipe", version)]
struct Cli {
    /// Optional JSON config (see `FramepipeOpts`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a synthetic UI thread and the raster thread, then print frame stats.
    Run(RunArgs),
    /// Raster one synthetic frame to a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Number of frames the UI thread produces.
    #[arg(long, default_value_t = 240)]
    frames: u64,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Pause between UI frames, in milliseconds.
    #[arg(long, default_value_t = 2)]
    interval_ms: u64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Root scale (device pixel ratio).
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let opts = load_opts(cli.config.as_deref())?;
    match cli.cmd {
        Command::Run(args) => cmd_run(args, opts),
        Command::Frame(args) => cmd_frame(args, opts),
    }
}

fn load_opts(path: Option<&Path>) -> anyhow::Result<FramepipeOpts> {
    let opts = match path {
        Some(p) => FramepipeOpts::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => FramepipeOpts::default(),
    };
    opts.with_env_overrides()
        .context("apply FRAMEPIPE_* environment overrides")
}

struct Scene {
    background: Arc<DisplayList>,
    tiles: Arc<DisplayList>,
    badge: Arc<DisplayList>,
}

impl Scene {
    fn new(size: FrameSize) -> Self {
        let mut background = DisplayListBuilder::new();
        background.fill_rect(size.to_rect(), Color::from_rgba8(24, 26, 32, 255));

        let mut tiles = DisplayListBuilder::new();
        for row in 0..8u8 {
            for col in 0..8u8 {
                let x = f64::from(col) * 16.0;
                let y = f64::from(row) * 16.0;
                tiles.fill_rect(
                    Rect::new(x + 1.0, y + 1.0, x + 15.0, y + 15.0),
                    Color::from_rgba8(col * 30, row * 30, 200, 255),
                );
            }
        }

        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((64.0, 0.0));
        path.line_to((32.0, 48.0));
        path.close_path();
        let mut badge = DisplayListBuilder::new();
        badge.fill_path(&path, Color::from_rgba8(250, 200, 40, 255));

        Self {
            background: background.build(),
            tiles: tiles.build(),
            badge: badge.build(),
        }
    }

    fn layer_tree(&self, frame: u64, size: FrameSize, texture: Option<i64>) -> LayerTree {
        let dx = (frame % 120) as f64 * 2.0;
        let mut root = ContainerLayer::with_unique_id(ROOT_LAYER_ID);
        root.add(DisplayListLayer::new(Vec2::ZERO, Arc::clone(&self.background)));
        root.add(
            TransformLayer::with_unique_id(Affine::translate((32.0 + dx, 32.0)), SCROLL_LAYER_ID)
                .with_child(
                    DisplayListLayer::new(Vec2::ZERO, Arc::clone(&self.tiles)).with_is_complex(true),
                ),
        );
        root.add(
            OpacityLayer::with_unique_id(0.6, Vec2::new(240.0, 48.0), BADGE_LAYER_ID)
                .with_child(DisplayListLayer::new(Vec2::ZERO, Arc::clone(&self.badge))),
        );
        if let Some(id) = texture {
            root.add(TextureLayer::new(
                id,
                Point::new(32.0, 200.0),
                Size::new(160.0, 90.0),
            ));
        }
        LayerTree::new(root, size, 1.0)
    }
}

fn cmd_run(args: RunArgs, opts: FramepipeOpts) -> anyhow::Result<()> {
    let size = FrameSize::new(args.width, args.height);
    anyhow::ensure!(!size.is_empty(), "frame size must be non-zero");

    let pipeline = Arc::new(LayerTreePipeline::new(opts.pipeline_depth));
    let presented = PresentedFrames::new(1);
    let mut rasterizer = Rasterizer::new(opts);
    rasterizer.setup(Box::new(SoftwareSurface::new(Arc::new(presented.clone()))));

    let video = Arc::new(ImageTexture::new(VIDEO_TEXTURE_ID));
    let registry = Arc::clone(rasterizer.compositor().texture_registry());
    registry.register_texture(Arc::clone(&video) as Arc<dyn framepipe::Texture>);

    let ui_done = Arc::new(AtomicBool::new(false));
    let budget = Duration::from_secs_f64(1.0 / opts.refresh_rate_hz);
    let ui = {
        let pipeline = Arc::clone(&pipeline);
        let ui_done = Arc::clone(&ui_done);
        let registry = Arc::clone(&registry);
        let video = Arc::clone(&video);
        let frames = args.frames;
        let interval = Duration::from_millis(args.interval_ms);
        thread::spawn(move || -> anyhow::Result<u64> {
            let scene = Scene::new(size);
            let mut dropped = 0u64;
            for frame in 0..frames {
                if frame % 15 == 0 {
                    let shade = ((frame / 15) % 8) as u8 * 32;
                    let color = Color::from_rgba8(shade, 96, 255 - shade, 255);
                    video.push_frame(RasterImage::solid(16, 9, color.to_premul_rgba8())?);
                    registry.on_texture_frame_available(VIDEO_TEXTURE_ID);
                }

                let build_start = Instant::now();
                let tree = scene.layer_tree(frame, size, Some(VIDEO_TEXTURE_ID));
                let timings = FrameTimings::new(build_start, Instant::now(), budget);
                if !pipeline.produce_with(|| Some(FrameItem::new(tree, timings))) {
                    dropped += 1;
                }
                thread::sleep(interval);
            }
            ui_done.store(true, Ordering::Release);
            Ok(dropped)
        })
    };

    loop {
        let result = rasterizer.draw(&pipeline);
        match result.status {
            DrawStatus::PipelineEmpty => {
                if ui_done.load(Ordering::Acquire) && pipeline.is_empty() {
                    break;
                }
                thread::sleep(Duration::from_millis(1));
            }
            DrawStatus::Success | DrawStatus::Discarded => {}
            other => tracing::warn!(status = ?other, "frame not presented"),
        }
    }

    let ui_dropped = ui
        .join()
        .map_err(|_| anyhow::anyhow!("ui thread panicked"))??;

    let stats = rasterizer.stats();
    let compositor = rasterizer.compositor();
    let metrics = compositor.raster_cache().metrics();
    println!("frames produced:     {}", args.frames);
    println!("dropped by pipeline: {ui_dropped}");
    println!("frames drawn:        {}", stats.frames_drawn);
    println!("frames dropped:      {}", stats.frames_dropped);
    println!(
        "raster time:         avg {:?}, max {:?}, {} janky",
        compositor.frame_time().average_delta(),
        compositor.frame_time().max_delta(),
        compositor.frame_time().janky_laps()
    );
    println!(
        "build time:          avg {:?}, max {:?}",
        compositor.engine_time().average_delta(),
        compositor.engine_time().max_delta()
    );
    println!(
        "raster cache:        {} entries ({} layer, {} display list), {} bytes",
        metrics.in_use_count,
        compositor.raster_cache().layer_cached_entries_count(),
        compositor.raster_cache().display_list_cached_entries_count(),
        metrics.in_use_bytes
    );
    if let Some(last) = presented.last() {
        println!("last frame:          {}x{}", last.width, last.height);
    }

    rasterizer.teardown();
    Ok(())
}

fn cmd_frame(args: FrameArgs, opts: FramepipeOpts) -> anyhow::Result<()> {
    let size = FrameSize::new(args.width, args.height);
    let scene = Scene::new(size);
    let mut tree = scene.layer_tree(0, size, None);

    let mut compositor = CompositorContext::new(opts);
    let mut canvas = PixmapCanvas::with_size(size).context("allocate frame canvas")?;
    let status = {
        let mut frame = compositor.acquire_frame(
            None,
            Some(&mut canvas),
            Affine::scale(args.scale),
            opts.instrumentation,
        );
        frame.raster(&mut tree, false)
    };
    anyhow::ensure!(status == RasterStatus::Success, "raster failed: {status:?}");
    let frame = canvas.snapshot();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
