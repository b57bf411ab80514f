use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reelcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the wrapped caption script for a topic.
    Script(ScriptArgs),
    /// Render a single caption frame as a PNG.
    Frame(FrameArgs),
    /// Render a captioned MP4 (requires `ffmpeg`).
    Render(RenderArgs),
    /// Run the upload relay HTTP server.
    Serve(ServeArgs),
    /// Send an MP4 to an upload relay.
    Upload(UploadArgs),
}

#[derive(Parser, Debug)]
struct ScriptArgs {
    /// Topic to write captions about; empty prints the placeholder script.
    #[arg(long, default_value = "")]
    topic: String,

    /// Print the script as a JSON array.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Caption text.
    #[arg(long)]
    text: String,

    /// Progress shown by the ring, in [0, 1].
    #[arg(long, default_value_t = 0.0)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output size preset.
    #[arg(long, value_enum, default_value_t = ResolutionChoice::Portrait)]
    resolution: ResolutionChoice,

    /// TTF/OTF font for caption text. Defaults to the bundled DejaVu Sans.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Generate the script from this topic.
    #[arg(long, conflicts_with = "script")]
    topic: Option<String>,

    /// Read the script from a text file, one caption per line.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Seconds each caption line stays on screen.
    #[arg(long, default_value_t = 2.5)]
    seconds_per_line: f64,

    /// Output size preset.
    #[arg(long, value_enum, default_value_t = ResolutionChoice::Portrait)]
    resolution: ResolutionChoice,

    /// TTF/OTF font for caption text. Defaults to the bundled DejaVu Sans.
    #[arg(long)]
    font: Option<PathBuf>,

    /// `ffmpeg` executable.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Print the final render state as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Listen address (overrides `REELCAST_BIND`).
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// Remote video API base URL (overrides `REELCAST_GRAPH_BASE_URL`).
    #[arg(long)]
    graph_base_url: Option<String>,
}

#[derive(Parser, Debug)]
struct UploadArgs {
    /// MP4 to upload.
    #[arg(long)]
    file: PathBuf,

    /// Destination page id.
    #[arg(long)]
    page_id: String,

    /// Page access token.
    #[arg(long)]
    access_token: String,

    /// Post description.
    #[arg(long)]
    description: Option<String>,

    /// Relay upload endpoint.
    #[arg(long, default_value = "http://127.0.0.1:3000/api/upload")]
    relay: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResolutionChoice {
    Portrait,
    Landscape,
    Square,
}

impl From<ResolutionChoice> for reelcast::Resolution {
    fn from(c: ResolutionChoice) -> Self {
        match c {
            ResolutionChoice::Portrait => reelcast::Resolution::Portrait,
            ResolutionChoice::Landscape => reelcast::Resolution::Landscape,
            ResolutionChoice::Square => reelcast::Resolution::Square,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Script(args) => cmd_script(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Serve(args) => cmd_serve(args),
        Command::Upload(args) => cmd_upload(args),
    }
}

fn load_font(path: Option<&Path>) -> anyhow::Result<Option<reelcast::CaptionFont>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let font = reelcast::CaptionFont::from_path(path)?;
    tracing::debug!(family = font.family(), "caption font loaded");
    Ok(Some(font))
}

fn cmd_script(args: ScriptArgs) -> anyhow::Result<()> {
    let script = reelcast::Script::from_topic(&args.topic);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&script)?);
    } else {
        for line in script.lines() {
            println!("{line}");
        }
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let canvas = reelcast::Resolution::from(args.resolution).canvas();
    let font = load_font(args.font.as_deref())?;
    let mut renderer = reelcast::FrameRenderer::new(canvas, font)?;
    renderer.render(&args.text, args.progress)?;

    let frame = renderer.frame();
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
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

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut session = reelcast::Session::new();
    match (&args.script, &args.topic) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read script '{}'", path.display()))?;
            session.set_script(reelcast::Script::parse(&text));
        }
        (None, topic) => {
            session.generate(topic.as_deref().unwrap_or_default());
        }
    }

    let config = reelcast::RenderConfig::new(args.seconds_per_line, args.resolution.into());
    let font = load_font(args.font.as_deref())?;
    let mut runtime = reelcast::FfmpegRuntime::new(args.ffmpeg.clone());

    let mut last_decile = None;
    let result = session
        .render(config, &mut runtime, font, &mut |state| {
            if let reelcast::RenderState::Generating { progress } = state {
                let decile = (progress * 10.0).floor() as u32;
                if last_decile != Some(decile) {
                    last_decile = Some(decile);
                    tracing::info!(percent = decile * 10, "rendering frames");
                }
            }
        })
        .map(|_| ());

    if args.json {
        println!("{}", serde_json::to_string(session.state())?);
    }
    result?;

    let artifact = session
        .artifact()
        .context("render finished without an artifact")?;
    artifact.write_to(&args.out)?;
    eprintln!("wrote {} ({} bytes)", args.out.display(), artifact.len());
    Ok(())
}

fn tokio_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = reelcast::RelayConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(url) = args.graph_base_url {
        config.graph_base_url = url;
    }

    tokio_runtime()?.block_on(reelcast::serve(config))?;
    Ok(())
}

fn cmd_upload(args: UploadArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("read video '{}'", args.file.display()))?;
    let artifact = reelcast::VideoArtifact::new(bytes);
    let credentials = reelcast::UploadCredentials::new(args.page_id, args.access_token);
    let client = reelcast::RelayClient::new(args.relay);

    let reply = tokio_runtime()?.block_on(client.upload(
        &artifact,
        &credentials,
        args.description.as_deref(),
    ))?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
