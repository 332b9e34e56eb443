//! domain-banner: gradient wordmarks, logos and favicons for domain names
//!
//! Given a host or URL, the crate derives the root domain and its initial
//! letter, fits the text into a fixed canvas and draws it with a brand
//! gradient. Output is PNG, SVG or a multi-resolution `.ico`.
//!
//! # Example
//!
//! ```no_run
//! use domain_banner::{
//!     FontConfig, FontRegistry, GenRequest, Generator, ImageKind, OutputFormat, Theme,
//!     DEFAULT_TAGLINE,
//! };
//!
//! let fonts = FontRegistry::load(&FontConfig::default())?;
//! let request = GenRequest::new("https://www.netproxy.io/pricing", ImageKind::Banner)
//!     .with_theme(Theme::Dark)
//!     .with_style(Some("aurora"))
//!     .with_format(OutputFormat::Svg);
//!
//! let image = Generator::new(&fonts, DEFAULT_TAGLINE).generate(&request)?;
//! assert_eq!(image.content_type, "image/svg+xml; charset=utf-8");
//! # Ok::<(), domain_banner::Error>(())
//! ```
//!
//! # Layout without rendering
//!
//! Layout is independent of the output backend. Any [`GlyphSource`] can be
//! used to compute a [`Scene`] and the sizes chosen for it:
//!
//! ```no_run
//! use domain_banner::layout::{Banner, compose_banner};
//! use domain_banner::{FontConfig, FontRegistry, Theme, get_brand, DEFAULT_TAGLINE};
//!
//! let fonts = FontRegistry::load(&FontConfig::default())?;
//! let (scene, layout) = compose_banner(
//!     &fonts,
//!     &Banner {
//!         domain: "netproxy.io",
//!         letter: 'N',
//!         brand: get_brand(None),
//!         theme: Theme::Light,
//!         tagline: DEFAULT_TAGLINE,
//!     },
//! );
//! println!("{} items, domain at {}px", scene.items.len(), layout.domain_size);
//! # Ok::<(), domain_banner::Error>(())
//! ```

pub mod brand;
pub mod config;
pub mod domain;
pub mod error;
pub mod fit;
pub mod font;
pub mod generate;
pub mod icon;
pub mod layout;
pub mod render;
pub mod scene;
pub mod text;

#[cfg(feature = "server")]
pub mod server;

pub use brand::{Brand, BrandStyle, ColorStop, TextColors, Theme, get_brand};
pub use config::{Config, ConfigError, FontConfig, ServerConfig};
pub use domain::{
    DomainParts, first_letter_of_domain, normalize_host, root_domain, split_domain_for_gradient,
};
pub use error::{Error, Result};
pub use fit::fit_to_width;
pub use font::{FontError, FontRegistry, FontWeight, GlyphMetrics, GlyphOutline, GlyphSource};
pub use generate::{GenRequest, Generated, Generator, ImageKind, parse_size};
pub use icon::{FAVICON_SIZES, IconEntry, IconError, build_icon_file};
pub use layout::{DEFAULT_TAGLINE, LayoutResult};
pub use render::OutputFormat;
pub use scene::Scene;
pub use text::{TextStyle, measure_run};

#[cfg(feature = "server")]
pub use server::{AppState, Server, ServerBuilder, router};
