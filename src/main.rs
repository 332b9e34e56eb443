use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use domain_banner::generate::{MAX_LOGO_SIZE, MIN_LOGO_SIZE};
use domain_banner::layout::{DEFAULT_FAVICON_SIZE, DEFAULT_LOGO_SIZE};
use domain_banner::{
    Config, FontRegistry, GenRequest, Generator, ImageKind, OutputFormat, Server, Theme,
};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "domain-banner", version, about)]
struct Cli {
    /// JSON config file
    #[arg(long, env = "BANNER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory scanned for font files
    #[arg(long, env = "BANNER_FONT_DIR", global = true)]
    font_dir: Option<PathBuf>,

    /// Only use fonts from --font-dir
    #[arg(long, global = true)]
    no_system_fonts: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        #[arg(long, env = "BANNER_ADDRESS")]
        address: Option<IpAddr>,

        #[arg(short, long, env = "BANNER_PORT")]
        port: Option<u16>,
    },

    /// Render one image to a file
    Render {
        /// Domain or URL to draw
        domain: String,

        #[arg(long, value_enum, default_value_t = Kind::Banner)]
        kind: Kind,

        /// Edge length for logos and favicons
        #[arg(long)]
        size: Option<u32>,

        /// Brand palette
        #[arg(long)]
        style: Option<String>,

        #[arg(long)]
        dark: bool,

        /// Output path; `.svg` writes vector output
        #[arg(short, long)]
        output: PathBuf,

        /// Print the chosen banner sizes as JSON
        #[arg(long)]
        layout: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Banner,
    Logo,
    Favicon,
    Ico,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).context("Critical: Configuration is malformed")?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.font_dir {
        config.fonts.dir = Some(dir.clone());
    }
    if cli.no_system_fonts {
        config.fonts.system_fonts = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        None => Server::builder().config(config).build()?.run().await,
        Some(Command::Serve { address, port }) => {
            if let Some(address) = address {
                config.server.address = address;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            Server::builder().config(config).build()?.run().await
        }
        Some(Command::Render {
            domain,
            kind,
            size,
            style,
            dark,
            output,
            layout,
        }) => {
            let kind = match kind {
                Kind::Banner => ImageKind::Banner,
                Kind::Logo => ImageKind::Logo {
                    size: size.unwrap_or(DEFAULT_LOGO_SIZE).clamp(MIN_LOGO_SIZE, MAX_LOGO_SIZE),
                },
                Kind::Favicon => ImageKind::Favicon {
                    size: size.unwrap_or(DEFAULT_FAVICON_SIZE).clamp(1, 256),
                },
                Kind::Ico => ImageKind::IconFile,
            };
            let format = OutputFormat::from_param(output.extension().and_then(|e| e.to_str()));
            let theme = if dark { Theme::Dark } else { Theme::Light };

            let fonts = FontRegistry::load(&config.fonts).context("Failed to load fonts")?;
            let request = GenRequest::new(domain, kind)
                .with_format(format)
                .with_style(style)
                .with_theme(theme);
            let generated = Generator::new(&fonts, &config.tagline).generate(&request)?;

            std::fs::write(&output, &generated.bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(path = %output.display(), bytes = generated.bytes.len(), "Wrote image");

            if layout {
                if let Some(result) = generated.layout {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
            }
            Ok(())
        }
    }
}
