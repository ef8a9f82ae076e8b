//! Obsidian CLI
//!
//! Usage:
//!   obsidian [OPTIONS] [SCENE]
//!
//! Options:
//!   -o, --output <FILE>      Write SVG to a file instead of stdout
//!       --png <FILE>         Also rasterize to a PNG file
//!   -s, --stylesheet <FILE>  Stylesheet file for color palette (TOML format)
//!       --scale <N>          Pixels per canvas unit for PNG output
//!   -l, --list               List the bundled scenes
//!   -h, --help               Print help

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use obsidian::demo::{self, SCENES};
use obsidian::Stylesheet;

#[derive(Parser)]
#[command(name = "obsidian")]
#[command(about = "Render constraint-solved vector diagrams")]
struct Cli {
    /// Scene to render (see --list)
    #[arg(default_value = "diagram")]
    scene: String,

    /// Output SVG file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output PNG file
    #[arg(long)]
    png: Option<PathBuf>,

    /// Stylesheet file for color palette (TOML format)
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,

    /// Pixels per canvas unit for PNG output
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// List the bundled scenes
    #[arg(short, long)]
    list: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if cli.list {
        for scene in SCENES {
            println!("{:<10} {}", scene.name, scene.description);
        }
        return;
    }

    let Some(scene) = demo::find(&cli.scene) else {
        eprintln!("Error: unknown scene '{}' (try --list)", cli.scene);
        std::process::exit(1);
    };

    // Load stylesheet
    let stylesheet = match &cli.stylesheet {
        Some(path) => match Stylesheet::from_file(path) {
            Ok(s) => s.over_default(),
            Err(e) => {
                eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Stylesheet::default(),
    };

    let mut canvas = (scene.build)().with_stylesheet(stylesheet);
    let config = canvas.config().clone().with_png_scale(cli.scale);
    canvas = canvas.with_config(config);

    let result = match &cli.output {
        Some(path) => canvas.save_svg(path).map(|_| ()),
        None => canvas.to_svg().map(|svg| println!("{}", svg)),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Some(path) = &cli.png {
        if let Err(e) = canvas.save_png(path) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
