//! Known Gemini models with a public lookup API.

use crate::types::{GOOGLE_BASE_URL, Model};

/// Model used when neither the CLI nor the config file names one
pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash-exp";

struct ModelEntry {
    id: &'static str,
    name: &'static str,
    max_tokens: u32,
}

const MODEL_ENTRIES: &[ModelEntry] = &[
    ModelEntry {
        id: "gemini-2.0-flash-exp",
        name: "Gemini 2.0 Flash (experimental)",
        max_tokens: 8192,
    },
    ModelEntry {
        id: "gemini-2.0-flash",
        name: "Gemini 2.0 Flash",
        max_tokens: 8192,
    },
    ModelEntry {
        id: "gemini-2.5-flash",
        name: "Gemini 2.5 Flash",
        max_tokens: 65536,
    },
    ModelEntry {
        id: "gemini-2.5-pro",
        name: "Gemini 2.5 Pro",
        max_tokens: 65536,
    },
];

impl ModelEntry {
    fn to_model(&self) -> Model {
        Model {
            id: self.id.to_string(),
            name: self.name.to_string(),
            base_url: GOOGLE_BASE_URL.to_string(),
            max_tokens: self.max_tokens,
        }
    }
}

/// Look up a model by ID.
pub fn get_model_by_id(id: &str) -> Option<Model> {
    MODEL_ENTRIES
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.to_model())
}

/// Resolve a model id, falling back to a generic Gemini definition for
/// ids missing from the registry.
pub fn resolve_model(id: &str) -> Model {
    get_model_by_id(id).unwrap_or_else(|| Model::gemini(id))
}

/// Get all known models.
pub fn get_all_models() -> Vec<Model> {
    MODEL_ENTRIES.iter().map(|e| e.to_model()).collect()
}

/// The default model.
pub fn default_model() -> Model {
    resolve_model(DEFAULT_MODEL_ID)
}
