//! Shared fixtures for the service integration tests.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use rendition_common::config::ServiceConfig;
use rendition_common::error::{EngineError, EngineResult};
use rendition_common::types::{BoundParameters, SelectionItem};
use rendition_engine::context::ExecutionContext;
use rendition_engine::definition::ParameterDefinition;
use rendition_engine::engine::ReportEngine;
use rendition_engine::options::RenderOptions;
use rendition_service::service::ReportCatalogService;
use tempfile::TempDir;

/// What the stub engine knows about one template file.
#[derive(Debug, Clone, Default)]
pub struct StubSpec {
    pub title: Option<String>,
    pub description: Option<String>,
    pub definitions: Vec<ParameterDefinition>,
}

/// Compiled handle produced by [`StubEngine`].
#[derive(Debug)]
pub struct StubTemplate {
    pub file_name: String,
    pub spec: StubSpec,
}

/// Engine that records every call and writes placeholder artifacts.
#[derive(Debug, Default)]
pub struct StubEngine {
    specs: HashMap<String, StubSpec>,
    failing: HashSet<String>,
    compile_delay: Option<Duration>,
    remove_on_startup: Option<PathBuf>,
    pub fail_execute: AtomicBool,
    pub startups: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub compiles: AtomicUsize,
    pub executes: AtomicUsize,
    pub renders: AtomicUsize,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub cascading_keys: Mutex<Vec<(String, Vec<Option<String>>)>>,
    pub bound: Mutex<Vec<BoundParameters>>,
    pub render_options: Mutex<Vec<RenderOptions>>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, file_name: &str, spec: StubSpec) -> Self {
        let _ = self.specs.insert(file_name.to_string(), spec);
        self
    }

    pub fn failing(mut self, file_name: &str) -> Self {
        let _ = self.failing.insert(file_name.to_string());
        self
    }

    pub fn with_compile_delay(mut self, delay: Duration) -> Self {
        self.compile_delay = Some(delay);
        self
    }

    /// Deletes `dir` when the engine starts, after the layout checks passed.
    pub fn removing_on_startup(mut self, dir: &Path) -> Self {
        self.remove_on_startup = Some(dir.to_path_buf());
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn bump(counter: &AtomicUsize) {
    let _ = counter.fetch_add(1, Ordering::SeqCst);
}

fn write(path: &Path, content: &str) -> EngineResult<()> {
    std::fs::write(path, content).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl ReportEngine for StubEngine {
    type Template = StubTemplate;
    type Document = PathBuf;

    fn startup(&self, _home: &Path) -> EngineResult<()> {
        bump(&self.startups);
        if let Some(dir) = &self.remove_on_startup {
            std::fs::remove_dir_all(dir).expect("remove directory on startup");
        }
        Ok(())
    }

    fn shutdown(&self) {
        bump(&self.shutdowns);
    }

    fn compile(&self, path: &Path) -> EngineResult<StubTemplate> {
        bump(&self.compiles);
        if let Some(delay) = self.compile_delay {
            std::thread::sleep(delay);
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if self.failing.contains(&file_name) {
            return Err(EngineError::Compile {
                path: path.to_path_buf(),
                message: "corrupt template".into(),
            });
        }
        let spec = self.specs.get(&file_name).cloned().unwrap_or_default();
        Ok(StubTemplate { file_name, spec })
    }

    fn title(&self, template: &StubTemplate) -> Option<String> {
        template.spec.title.clone()
    }

    fn description(&self, template: &StubTemplate) -> Option<String> {
        template.spec.description.clone()
    }

    fn parameter_definitions(
        &self,
        template: &StubTemplate,
    ) -> EngineResult<Vec<ParameterDefinition>> {
        Ok(template.spec.definitions.clone())
    }

    fn selection_list(
        &self,
        _template: &StubTemplate,
        parameter: &str,
    ) -> EngineResult<Option<Vec<SelectionItem>>> {
        Ok(Some(vec![SelectionItem::new(parameter, parameter)]))
    }

    fn cascading_selection_list(
        &self,
        _template: &StubTemplate,
        group: &str,
        key: &[Option<String>],
    ) -> EngineResult<Option<Vec<SelectionItem>>> {
        self.cascading_keys
            .lock()
            .unwrap()
            .push((group.to_string(), key.to_vec()));
        Ok(Some(Vec::new()))
    }

    fn open_context(
        &self,
        operation: rendition_engine::context::Operation,
        template: &str,
    ) -> EngineResult<ExecutionContext> {
        bump(&self.opened);
        Ok(ExecutionContext::new(operation, template))
    }

    fn close_context(&self, _context: &ExecutionContext) {
        bump(&self.closed);
    }

    fn execute(
        &self,
        template: &StubTemplate,
        _context: &ExecutionContext,
        parameters: &BoundParameters,
        document_path: &Path,
    ) -> EngineResult<()> {
        bump(&self.executes);
        self.bound.lock().unwrap().push(parameters.clone());
        if self.fail_execute.load(Ordering::SeqCst) {
            return Err(EngineError::Execution {
                message: "data source unavailable".into(),
            });
        }
        write(document_path, &template.file_name)
    }

    fn open_document(&self, path: &Path) -> EngineResult<PathBuf> {
        if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(EngineError::Document {
                path: path.to_path_buf(),
                message: "not found".into(),
            })
        }
    }

    fn render_document(
        &self,
        document: &PathBuf,
        _context: &ExecutionContext,
        _parameters: &BoundParameters,
        options: &RenderOptions,
    ) -> EngineResult<()> {
        bump(&self.renders);
        self.render_options.lock().unwrap().push(options.clone());
        write(&options.output_path, &document.display().to_string())
    }
}

/// Temporary data directory laid out the way [`ServiceConfig::from_data_dir`] expects.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new(templates: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("engine")).expect("engine home");
        for name in templates {
            std::fs::write(dir.path().join(name), "template").expect("template");
        }
        Self { dir }
    }

    pub fn config(&self) -> ServiceConfig {
        ServiceConfig::from_data_dir(self.dir.path())
    }

    pub fn service(&self, engine: StubEngine) -> ReportCatalogService<StubEngine> {
        ReportCatalogService::new(self.config(), engine)
    }

    pub fn created(&self, engine: StubEngine) -> ReportCatalogService<StubEngine> {
        let service = self.service(engine);
        service.create().expect("create");
        service
    }
}
