use bytes::Bytes;
use serde_json::json;

use crate::config::AppConfig;
use crate::error::CanonicalError;
use crate::transport::BackendClient;

/// Shared application state accessible to all handlers.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub backend: BackendClient,
    models_response_body: Bytes,
}

impl AppState {
    /// Build the shared state: the backend client plus the pre-rendered
    /// `/v1/models` body.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend client cannot be constructed.
    pub fn new(config: AppConfig) -> Result<Self, CanonicalError> {
        let backend = BackendClient::new(&config.server, &config.backend)?;
        let models_response_body = build_models_response_body(&config);
        Ok(Self {
            config,
            backend,
            models_response_body,
        })
    }

    #[must_use]
    pub fn models_response_body(&self) -> Bytes {
        self.models_response_body.clone()
    }

    /// The backend model for a request: the client's choice, or the
    /// configured default when the client named none.
    #[must_use]
    pub fn resolve_model(&self, requested: &str) -> String {
        let requested = requested.trim();
        if requested.is_empty() {
            self.config.backend.default_model.clone()
        } else {
            requested.to_string()
        }
    }
}

/// Render the model list from configuration. With no configured models the
/// default model is listed on its own.
fn build_models_response_body(config: &AppConfig) -> Bytes {
    let data: Vec<serde_json::Value> = if config.backend.models.is_empty() {
        vec![json!({
            "id": config.backend.default_model,
            "object": "model",
            "owned_by": crate::config::DEFAULT_OWNED_BY,
        })]
    } else {
        config
            .backend
            .models
            .iter()
            .map(|model| {
                let mut entry = json!({
                    "id": model.id(),
                    "object": "model",
                    "owned_by": model.owned_by(),
                });
                if let crate::config::ModelEntry::Detailed {
                    name, description, ..
                } = model
                {
                    if let Some(name) = name {
                        entry["name"] = json!(name);
                    }
                    if let Some(description) = description {
                        entry["description"] = json!(description);
                    }
                }
                entry
            })
            .collect()
    };

    let body = json!({ "object": "list", "data": data });
    Bytes::from(body.to_string())
}
