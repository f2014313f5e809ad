//! CLI command definitions and dispatch.

pub mod init;
pub mod list;
pub mod params;
pub mod render;
pub mod view;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rendition_common::config::ServiceConfig;
use rendition_common::constants::{self, CONFIG_FILE};
use rendition_engine::descriptor::DescriptorEngine;
use rendition_service::service::ReportCatalogService;

/// Rendition: report template catalog and renderer.
#[derive(Parser, Debug)]
#[command(name = constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Data directory holding templates, `engine/`, and `output/`.
    #[arg(long, global = true, env = constants::DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (defaults to `rendition.yaml` in the data directory, if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL under which HTML views reference images.
    #[arg(long, global = true, env = "RENDITION_IMAGE_BASE_URL")]
    pub image_base_url: Option<String>,

    /// Leave templates that fail to load out of the catalog instead of failing.
    #[arg(long, global = true)]
    pub skip_invalid: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log line format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scaffold a data directory with an engine home and a sample template.
    Init(init::InitArgs),
    /// List the report templates in the catalog.
    List(list::ListArgs),
    /// Describe the parameters of one template.
    Params(params::ParamsArgs),
    /// Run a template into a persisted document.
    Render(render::RenderArgs),
    /// Render a persisted document as HTML or PDF.
    View(view::ViewArgs),
}

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    data_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    image_base_url: Option<String>,
    skip_invalid: bool,
}

impl GlobalArgs {
    /// Data directory from the flag, else the resolved default.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| constants::data_dir().clone())
    }

    /// Resolves the service configuration: file first, then flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit or discovered configuration file
    /// cannot be loaded.
    pub fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let data_dir = self.data_dir();
        let file = self.config.clone().or_else(|| {
            let candidate = data_dir.join(CONFIG_FILE);
            candidate.is_file().then_some(candidate)
        });

        let mut config = match file {
            Some(path) => ServiceConfig::load(&path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => ServiceConfig::from_data_dir(&data_dir),
        };
        if let Some(url) = &self.image_base_url {
            config = config.with_image_base_url(url.clone());
        }
        if self.skip_invalid {
            config.skip_invalid_templates = true;
        }
        tracing::debug!(?config, "service configuration resolved");
        Ok(config)
    }

    /// Builds and starts a service, runs `f`, then stops and destroys it
    /// whether or not `f` succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be built or `f` fails.
    pub fn with_service<T>(
        &self,
        f: impl FnOnce(&ReportCatalogService<DescriptorEngine>) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let config = self.service_config()?;
        let service = ReportCatalogService::new(config, DescriptorEngine::new());
        if let Err(e) = service.create() {
            service.destroy();
            return Err(e).context("building the report catalog");
        }
        service.start()?;

        let outcome = f(&service);

        if let Err(e) = service.stop() {
            tracing::warn!(error = %e, "failed to stop service");
        }
        service.destroy();
        outcome
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let global = GlobalArgs {
        data_dir: cli.data_dir,
        config: cli.config,
        image_base_url: cli.image_base_url,
        skip_invalid: cli.skip_invalid,
    };
    match cli.command {
        Command::Init(args) => init::execute(&global, args),
        Command::List(args) => list::execute(&global, args),
        Command::Params(args) => params::execute(&global, args),
        Command::Render(args) => render::execute(&global, args),
        Command::View(args) => view::execute(&global, args),
    }
}
