//! The report catalog service.
//!
//! [`ReportCatalogService`] owns the engine, the template cache, and the
//! catalog built from the template directory. It gates every operation on
//! its lifecycle state and wraps engine failures with the template they
//! belong to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use rendition_common::config::ServiceConfig;
use rendition_common::error::{ReportError, Result};
use rendition_common::types::{ServiceState, TemplateCatalogEntry};
use rendition_engine::context::Operation;
use rendition_engine::engine::ReportEngine;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cache::TemplateCache;
use crate::coerce::coerce_all;
use crate::discovery::{TemplateFile, discover_templates};
use crate::extract::ParameterMetadataExtractor;
use crate::lifecycle::Lifecycle;
use crate::lock;
use crate::pipeline::{ContextGuard, RenderRequest, ViewRequest, render_options, view_file_name};

type Catalog = BTreeMap<String, TemplateCatalogEntry>;

/// Lifecycle-gated catalog of report templates over a rendering engine.
pub struct ReportCatalogService<E: ReportEngine> {
    config: ServiceConfig,
    engine: Arc<E>,
    lifecycle: Lifecycle,
    cache: TemplateCache<E::Template>,
    catalog: RwLock<Arc<Catalog>>,
    build: Mutex<()>,
}

impl<E: ReportEngine> ReportCatalogService<E> {
    /// Creates an uninitialized service. Nothing touches the engine or the
    /// filesystem until [`create`](Self::create).
    pub fn new(config: ServiceConfig, engine: E) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            lifecycle: Lifecycle::new(),
            cache: TemplateCache::new(),
            catalog: RwLock::new(Arc::default()),
            build: Mutex::new(()),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        self.lifecycle.current()
    }

    /// Configuration the service was built with.
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The engine the service drives.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns a receiver that observes lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.lifecycle.subscribe()
    }

    /// Waits until the service has reached `target` or moved past it, and
    /// returns the state observed. `Destroyed` follows every state, so a
    /// destroyed service releases all waiters.
    pub async fn wait_for_state(&self, target: ServiceState) -> ServiceState {
        let mut rx = self.lifecycle.subscribe();
        let reached = rx
            .wait_for(|state| state.has_reached(target))
            .await
            .map(|state| *state);
        reached.unwrap_or_else(|_| self.state())
    }

    /// Starts the engine and builds the catalog from the template directory.
    ///
    /// Every template is compiled and its parameters extracted. If any
    /// template fails, the engine is shut down, the cache is cleared, and the
    /// service stays uninitialized, unless `skip_invalid_templates` is set,
    /// in which case failing templates are left out of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] unless uninitialized,
    /// [`ReportError::Configuration`] if the template directory or engine
    /// home is missing, and [`ReportError::Initialization`] naming the first
    /// template that failed to load, or the template directory if it could
    /// not be scanned.
    pub fn create(&self) -> Result<()> {
        let _build = lock::lock(&self.build, "service.create");
        self.lifecycle.require(ServiceState::Uninitialized, "create")?;
        self.prepare_layout()?;

        let home = &self.config.engine_home;
        self.engine
            .startup(home)
            .map_err(|source| ReportError::Engine {
                operation: "start from",
                template: home.display().to_string(),
                source,
            })?;

        let catalog = match self.build_catalog() {
            Ok(catalog) => catalog,
            Err(e) => {
                self.engine.shutdown();
                self.cache.clear();
                tracing::error!(error = %e, "report catalog build failed");
                return Err(e);
            }
        };

        let count = catalog.len();
        *lock::write(&self.catalog, "service.commit") = Arc::new(catalog);
        self.lifecycle.advance(ServiceState::Created, "create")?;
        tracing::info!(
            templates = count,
            dir = %self.config.template_dir.display(),
            "report catalog committed"
        );
        Ok(())
    }

    /// Runs [`create`](Self::create) on the blocking thread pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn create_in_background(self: &Arc<Self>) -> JoinHandle<Result<()>> {
        let service = Arc::clone(self);
        tokio::task::spawn_blocking(move || service.create())
    }

    /// Marks a created service as started.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] unless the service is `Created`.
    pub fn start(&self) -> Result<()> {
        self.lifecycle.advance(ServiceState::Started, "start")
    }

    /// Stops a started service; new calls are rejected from now on.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] unless the service is `Started`.
    pub fn stop(&self) -> Result<()> {
        self.lifecycle.advance(ServiceState::Stopped, "stop")
    }

    /// Releases the catalog, the cache, and the engine.
    ///
    /// Callers stop the service and let in-flight calls finish first.
    /// Destroying an already destroyed service does nothing.
    pub fn destroy(&self) {
        let _build = lock::lock(&self.build, "service.destroy");
        let Some(previous) = self.lifecycle.destroy() else {
            tracing::debug!("service already destroyed");
            return;
        };
        self.cache.clear();
        *lock::write(&self.catalog, "service.destroy") = Arc::default();
        // A service that never finished create has no running engine.
        if previous != ServiceState::Uninitialized {
            self.engine.shutdown();
        }
        tracing::info!(from = %previous, "report catalog service destroyed");
    }

    /// Lists every catalog entry, ordered by file name.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] unless `Created` or `Started`.
    pub fn list_reports(&self) -> Result<Vec<TemplateCatalogEntry>> {
        self.lifecycle.require_serving("list reports")?;
        Ok(self.catalog().values().cloned().collect())
    }

    /// Looks up one catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] unless `Created` or `Started`,
    /// and [`ReportError::UnknownTemplate`] if `name` is not in the catalog.
    pub fn report(&self, name: &str) -> Result<TemplateCatalogEntry> {
        self.lifecycle.require_serving("look up report")?;
        lookup(&self.catalog(), name).cloned()
    }

    /// Runs a template into a persisted document and returns the document's
    /// file name, relative to the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] unless `Created` or `Started`,
    /// [`ReportError::UnknownTemplate`] before any engine call if the
    /// template is not in the catalog, a coercion error for bad input, and
    /// [`ReportError::Render`] if the engine fails.
    pub fn render(&self, request: &RenderRequest) -> Result<String> {
        self.lifecycle.require_serving("render")?;
        let catalog = self.catalog();
        let entry = lookup(&catalog, &request.template)?;
        let parameters = coerce_all(entry, &request.parameters)?;

        let path = self.config.template_dir.join(&entry.file_name);
        let template = self.compiled(&entry.file_name, &path)?;
        let artifact = self.config.document_file_name(&entry.file_name);
        let document_path = self.output_path(&artifact);
        let failed = |source| ReportError::Render {
            template: entry.file_name.clone(),
            source,
        };

        tracing::debug!(
            template = %entry.file_name,
            parameters = parameters.len(),
            document = %document_path.display(),
            "dispatching render"
        );
        let guard = ContextGuard::open(self.engine.as_ref(), Operation::Run, &entry.file_name)
            .map_err(failed)?;
        self.engine
            .execute(&template, guard.context(), &parameters, &document_path)
            .map_err(failed)?;
        tracing::info!(template = %entry.file_name, document = %artifact, "report rendered");
        Ok(artifact)
    }

    /// Renders a template's persisted document into HTML or PDF and returns
    /// the output file name, relative to the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IllegalState`] unless `Created` or `Started`,
    /// [`ReportError::UnknownTemplate`] if the template is not in the
    /// catalog, and [`ReportError::View`] if the document is missing or the
    /// engine fails.
    pub fn view(&self, request: &ViewRequest) -> Result<String> {
        self.lifecycle.require_serving("view")?;
        let catalog = self.catalog();
        let entry = lookup(&catalog, &request.template)?;
        let failed = |source| ReportError::View {
            template: entry.file_name.clone(),
            source,
        };

        let document_path = self.output_path(&self.config.document_file_name(&entry.file_name));
        let document = self.engine.open_document(&document_path).map_err(failed)?;
        let output = view_file_name(&entry.file_name, request.format);
        let options = render_options(
            &self.config,
            &entry.file_name,
            request.format,
            request.image_base_url.as_deref(),
        );

        tracing::debug!(
            template = %entry.file_name,
            format = %request.format,
            output = %options.output_path.display(),
            "dispatching view"
        );
        let guard = ContextGuard::open(self.engine.as_ref(), Operation::Render, &entry.file_name)
            .map_err(failed)?;
        self.engine
            .render_document(&document, guard.context(), &request.parameters, &options)
            .map_err(failed)?;
        tracing::info!(template = %entry.file_name, output = %output, "report view written");
        Ok(output)
    }

    /// Resolves an artifact name returned by [`render`](Self::render) or
    /// [`view`](Self::view) against the output directory.
    pub fn output_path(&self, artifact: &str) -> PathBuf {
        self.config.output_dir.join(artifact)
    }

    fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&lock::read(&self.catalog, "service.catalog"))
    }

    fn prepare_layout(&self) -> Result<()> {
        for (what, dir) in [
            ("template directory", &self.config.template_dir),
            ("engine home", &self.config.engine_home),
        ] {
            if !dir.is_dir() {
                return Err(ReportError::Configuration {
                    message: format!("{what} {} does not exist", dir.display()),
                });
            }
        }
        for dir in [self.config.output_dir.clone(), self.config.image_directory()] {
            std::fs::create_dir_all(&dir).map_err(|source| ReportError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn build_catalog(&self) -> Result<Catalog> {
        let extractor = ParameterMetadataExtractor::new(self.engine.as_ref());
        let mut catalog = Catalog::new();

        let files = discover_templates(&self.config).map_err(|e| ReportError::Initialization {
            template: self.config.template_dir.display().to_string(),
            source: Box::new(e),
        })?;
        for file in files {
            match self.load(&extractor, &file) {
                Ok(entry) => {
                    tracing::debug!(
                        template = %entry.file_name,
                        title = %entry.title,
                        parameters = entry.parameters.len(),
                        "report template loaded"
                    );
                    let _ = catalog.insert(file.file_name, entry);
                }
                Err(e) if self.config.skip_invalid_templates => {
                    tracing::warn!(
                        template = %file.file_name,
                        error = %e,
                        "skipping report template"
                    );
                }
                Err(e) => {
                    return Err(ReportError::Initialization {
                        template: file.file_name,
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(catalog)
    }

    fn load(
        &self,
        extractor: &ParameterMetadataExtractor<'_, E>,
        file: &TemplateFile,
    ) -> Result<TemplateCatalogEntry> {
        let template = self.compiled(&file.file_name, &file.path)?;
        extractor.catalog_entry(&file.file_name, &template)
    }

    fn compiled(&self, file_name: &str, path: &Path) -> Result<Arc<E::Template>> {
        self.cache
            .get_or_compile(file_name, || self.engine.compile(path))
            .map_err(|source| ReportError::Engine {
                operation: "compile",
                template: file_name.to_string(),
                source,
            })
    }
}

fn lookup<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a TemplateCatalogEntry> {
    catalog.get(name).ok_or_else(|| ReportError::UnknownTemplate {
        name: name.to_string(),
    })
}
