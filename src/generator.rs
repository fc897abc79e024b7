//! Generation driver: catalog in, one entity file per table out.

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::model::{ModelError, Schema};
use crate::render::EntityRenderer;
use indexmap::IndexMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TITLE: &str = "Build Doctrine Entities";
pub const DEFAULT_EXTENSION: &str = "php";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Catalog has no schema")]
    NoSchema,
    #[error("Schema {0} not found in catalog")]
    UnknownSchema(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Failed to write {path}: {source}")]
    Io { path: String, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

/// Operator-facing side of the host tool.
pub trait Host {
    /// Ask for a line of text; `None` means the operator cancelled.
    fn request_text(&mut self, prompt: &str, default: &str) -> Option<String>;
    fn notify(&mut self, notice: Notice);
}

/// Destination for generated files.
pub trait FileSink {
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()>;
    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()>;
}

/// Writes to the local filesystem.
#[derive(Debug, Default)]
pub struct FsSink;

impl FileSink for FsSink {
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }
}

/// Keeps generated files in memory, in write order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub dirs: Vec<PathBuf>,
    pub files: IndexMap<PathBuf, String>,
}

impl FileSink for MemorySink {
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        if !self.dirs.iter().any(|d| d == path) {
            self.dirs.push(path.to_path_buf());
        }
        Ok(())
    }

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub enum Outcome {
    /// Operator dismissed the namespace prompt; nothing was touched.
    Cancelled,
    Generated(Generated),
    Failed(GenerateError),
}

/// Render every table of a schema as `(file name, content)` pairs.
pub fn render_schema(schema: &Schema, namespace: &str, extension: &str) -> Vec<(String, String)> {
    let renderer = EntityRenderer::new(namespace);
    schema
        .tables
        .values()
        .map(|table| {
            tracing::debug!(table = %table.name, "rendering entity");
            (
                format!("{}.{}", table.class_name(), extension),
                renderer.render(table),
            )
        })
        .collect()
}

/// Generate entities for the first schema of `catalog` into `output_dir`.
pub fn generate(
    catalog: &Catalog,
    output_dir: &Path,
    namespace: &str,
) -> Result<Generated, GenerateError> {
    generate_into(&mut FsSink, catalog, None, output_dir, namespace, DEFAULT_EXTENSION)
}

/// Generate entities for one schema through an arbitrary sink.
///
/// Files are written as they are rendered; a failure leaves earlier files in
/// place.
pub fn generate_into<S: FileSink>(
    sink: &mut S,
    catalog: &Catalog,
    schema_name: Option<&str>,
    output_dir: &Path,
    namespace: &str,
    extension: &str,
) -> Result<Generated, GenerateError> {
    let schema = resolve_schema(catalog, schema_name)?;

    sink.create_dir_all(output_dir).map_err(|source| GenerateError::Io {
        path: output_dir.display().to_string(),
        source,
    })?;

    let mut files = Vec::with_capacity(schema.tables.len());
    for (file_name, content) in render_schema(&schema, namespace, extension) {
        let path = output_dir.join(&file_name);
        sink.write_file(&path, &content)
            .map_err(|source| GenerateError::Io {
                path: path.display().to_string(),
                source,
            })?;
        tracing::info!(path = %path.display(), "wrote entity");
        files.push(path);
    }

    Ok(Generated {
        output_dir: output_dir.to_path_buf(),
        files,
    })
}

/// Build the model of the selected schema.
pub fn resolve_schema(catalog: &Catalog, schema_name: Option<&str>) -> Result<Schema, GenerateError> {
    let def = match catalog.schema(schema_name) {
        Some(def) => def,
        None => {
            return Err(match schema_name {
                Some(name) => GenerateError::UnknownSchema(name.to_string()),
                None => GenerateError::NoSchema,
            });
        }
    };
    Ok(Schema::build(def)?)
}

/// Full plugin flow: prompt for the namespace, generate, report.
pub fn run<H: Host, S: FileSink>(
    host: &mut H,
    sink: &mut S,
    catalog: &Catalog,
    config: &AppConfig,
) -> Outcome {
    let Some(namespace) = host.request_text("Namespace", &config.namespace) else {
        tracing::debug!("namespace prompt cancelled");
        return Outcome::Cancelled;
    };

    let schema_name = config.schema.as_deref();
    let output_dir = match &config.output_dir {
        Some(dir) => dir.clone(),
        None => {
            let name = catalog
                .schema(schema_name)
                .map(|s| s.name.as_str())
                .unwrap_or_default();
            crate::config::default_output_dir(name)
        }
    };

    match generate_into(sink, catalog, schema_name, &output_dir, &namespace, &config.extension) {
        Ok(generated) => {
            tracing::info!(
                count = generated.files.len(),
                dir = %generated.output_dir.display(),
                "entities generated"
            );
            host.notify(Notice {
                kind: NoticeKind::Info,
                title: TITLE.to_string(),
                message: format!(
                    "Your entities have been built in {}",
                    generated.output_dir.display()
                ),
            });
            Outcome::Generated(generated)
        }
        Err(err) => {
            tracing::error!(error = %err, "entity generation failed");
            host.notify(Notice {
                kind: NoticeKind::Error,
                title: TITLE.to_string(),
                message: "Your entities have not been built".to_string(),
            });
            Outcome::Failed(err)
        }
    }
}
