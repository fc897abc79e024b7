pub mod annotation;
pub mod catalog;
pub mod config;
pub mod docblock;
pub mod generator;
pub mod logging;
pub mod model;
pub mod naming;
pub mod render;
pub mod types;

use indexmap::IndexMap;
use wasm_bindgen::prelude::*;

use catalog::Catalog;
use generator::{DEFAULT_EXTENSION, render_schema, resolve_schema};

pub use generator::{GenerateError, generate};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a catalog JSON export to a JSON object of `{ file name: source }`.
#[wasm_bindgen(js_name = "generateEntities")]
pub fn generate_entities(
    catalog_json: &str,
    namespace: &str,
    schema: Option<String>,
) -> Result<String, String> {
    let catalog = Catalog::from_json(catalog_json).map_err(|e| e.to_string())?;
    let schema = resolve_schema(&catalog, schema.as_deref()).map_err(|e| e.to_string())?;

    let files: IndexMap<String, String> = render_schema(&schema, namespace, DEFAULT_EXTENSION)
        .into_iter()
        .collect();

    serde_json::to_string(&files).map_err(|e| e.to_string())
}
