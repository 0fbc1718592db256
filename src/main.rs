use clap::{Parser, Subcommand};
use magic_card::client::{DemoClient, HttpSummaryClient, SummaryClient};
use magic_card::config::{self, AppConfig};
use magic_card::gallery::GalleryController;
use magic_card::types::{Density, HighlightMode, Layout, StylePatch, Theme};
use magic_card::classify::{self, SampleLink};
use magic_card::{export, output};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Style overrides shared by every command that renders cards.
#[derive(clap::Args, Clone, Default)]
struct StyleArgs {
    /// Accent color (#rgb or #rrggbb)
    #[arg(long)]
    accent: Option<String>,

    #[arg(long, value_enum)]
    density: Option<Density>,

    /// Show or hide the highlights block
    #[arg(long, value_enum)]
    highlights: Option<HighlightMode>,

    #[arg(long, value_enum)]
    layout: Option<Layout>,

    /// Themes to render, in order (comma separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    themes: Option<Vec<Theme>>,
}

/// The link to work on: given directly or picked from the samples.
#[derive(clap::Args, Clone)]
#[group(required = true, multiple = false)]
struct LinkArgs {
    /// YouTube or X/Twitter link
    url: Option<String>,

    /// Use a built-in sample link instead
    #[arg(long, value_enum)]
    sample: Option<SampleLink>,
}

impl LinkArgs {
    fn url(&self) -> &str {
        match (&self.url, self.sample) {
            (Some(url), _) => url,
            (None, Some(sample)) => sample.url(),
            (None, None) => "",
        }
    }
}

impl StyleArgs {
    fn into_patch(self) -> StylePatch {
        StylePatch {
            accent: self.accent,
            density: self.density,
            highlights: self.highlights,
            layout: self.layout,
            themes: self.themes,
        }
    }
}

#[derive(Parser)]
#[command(name = "magic-card")]
#[command(about = "Turn YouTube and X links into themed summary cards")]
#[command(long_about = "\
Turn YouTube and X links into themed summary cards

Paste a link, get the same summary rendered in every theme side by side, and
export the one you like as a PNG.

Supported links:

  https://www.youtube.com/watch?v=<id>
  https://youtu.be/<id>
  https://www.youtube.com/shorts/<id>
  https://x.com/<user>/status/<id>      (twitter.com works too)

Summaries come from the backend at <api base>/api/magic. The base is taken
from --api-base, then [api] base in magic-card.toml, then the local or remote
endpoint depending on [api] origin. Use --demo to render offline sample data,
and --sample youtube|twitter instead of a link to try a ready-made one.

Run 'magic-card gen-config' to generate a documented magic-card.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing magic-card.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Output directory for gallery.html and exported PNGs
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Summary backend base URL (overrides config)
    #[arg(long, env = "MAGIC_CARD_API_BASE", global = true)]
    api_base: Option<String>,

    /// Use built-in demo content instead of the backend
    #[arg(long, global = true)]
    demo: bool,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the platform and content id extracted from a link
    Classify {
        #[command(flatten)]
        link: LinkArgs,
    },
    /// Fetch a summary and write the themed gallery
    Card {
        #[command(flatten)]
        link: LinkArgs,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Fetch a summary and export one themed card as PNG
    Export {
        #[command(flatten)]
        link: LinkArgs,
        /// Theme of the card to export
        #[arg(long, value_enum)]
        theme: Theme,
        /// Device pixel ratio to export for (clamped to 2..=4)
        #[arg(long)]
        pixel_ratio: Option<f64>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Write the gallery with placeholder content, without calling the backend
    Preview {
        #[command(flatten)]
        style: StyleArgs,
    },
    /// List available themes
    Themes,
    /// Print a stock magic-card.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Classify { ref link } => {
            output::print_classify(classify::classify(link.url()).as_ref());
        }
        Command::Card {
            ref link,
            ref style,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let client = summary_client(&cli, &config)?;
            let mut controller = controller_with_style(&config, style.clone())?;
            controller.on_submit(client.as_ref(), link.url()).await?;
            let written = write_gallery(&controller, &cli.output)?;
            output::print_card(controller.state().data.as_ref(), controller.gallery(), &written);
        }
        Command::Export {
            ref link,
            theme,
            pixel_ratio,
            ref style,
        } => {
            let mut config = config::load_config(&cli.config_dir)?;
            if let Some(ratio) = pixel_ratio {
                config.export.device_pixel_ratio = ratio;
            }
            let client = summary_client(&cli, &config)?;
            let mut controller = controller_with_style(&config, style.clone())?;
            controller.on_submit(client.as_ref(), link.url()).await?;

            let capturer = export::default_capturer();
            let result = controller.export(theme, capturer.as_deref(), &config.export, &cli.output);
            output::print_status(controller.status());
            let path = result?;
            output::print_export(theme, &path);
        }
        Command::Preview { ref style } => {
            let config = config::load_config(&cli.config_dir)?;
            let controller = controller_with_style(&config, style.clone())?;
            let written = write_gallery(&controller, &cli.output)?;
            output::print_card(None, controller.gallery(), &written);
        }
        Command::Themes => {
            let config = config::load_config(&cli.config_dir)?;
            output::print_themes(&config.style.themes);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Demo content when asked for on the command line or in config, the HTTP
/// backend otherwise.
fn summary_client(
    cli: &Cli,
    config: &AppConfig,
) -> Result<Box<dyn SummaryClient>, Box<dyn std::error::Error>> {
    if cli.demo || config.api.demo {
        return Ok(Box::new(DemoClient));
    }
    let client = HttpSummaryClient::from_config(&config.api, cli.api_base.as_deref())?;
    Ok(Box::new(client))
}

fn controller_with_style(
    config: &AppConfig,
    style: StyleArgs,
) -> Result<GalleryController, Box<dyn std::error::Error>> {
    let mut controller = GalleryController::from_config(config);
    let patch = style.into_patch();
    if !patch.is_empty() {
        controller.on_style_change(patch)?;
    }
    Ok(controller)
}

fn write_gallery(controller: &GalleryController, out_dir: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join("gallery.html");
    std::fs::write(&path, controller.document())?;
    Ok(path)
}
