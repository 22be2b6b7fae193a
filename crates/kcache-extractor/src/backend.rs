//! Backend selection: hosted API when a credential is configured, local
//! Ollama server otherwise
//!
//! Selection is a pure branch on the environment. No reachability check is
//! made here; an unreachable backend surfaces as an error from the call.

use crate::config::ExtractorConfig;
use kcache_llm::{GeminiProvider, OllamaProvider, Provider};
use tracing::info;

/// Credential variables, checked in order
pub const API_KEY_VARS: [&str; 2] = ["LANGEXTRACT_API_KEY", "GOOGLE_API_KEY"];

/// Model used when a credential is present
pub const HOSTED_MODEL_ID: &str = "gemini-2.5-flash";

/// Model used against the local server
pub const LOCAL_MODEL_ID: &str = "gemma2:2b";

/// Local inference server
pub const LOCAL_MODEL_URL: &str = "http://localhost:11434";

/// Parameters for an extraction call
///
/// `None` for `fence_output` or `use_schema_constraints` means the engine
/// default applies: schema constraints on, fencing only when unconstrained.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendParams {
    /// Model identifier
    pub model_id: String,

    /// Endpoint of the local server (`None` for the hosted API)
    pub model_url: Option<String>,

    /// Whether the model is asked to wrap its JSON in a fenced block
    pub fence_output: Option<bool>,

    /// Whether output is constrained to the extraction schema
    pub use_schema_constraints: Option<bool>,

    api_key: Option<String>,
}

impl BackendParams {
    /// Parameters for the hosted backend
    pub fn hosted(api_key: impl Into<String>) -> Self {
        Self {
            model_id: HOSTED_MODEL_ID.to_string(),
            model_url: None,
            fence_output: None,
            use_schema_constraints: None,
            api_key: Some(api_key.into()),
        }
    }

    /// Parameters for the local backend; the local engine cannot enforce
    /// fencing or schemas, so both are off
    pub fn local() -> Self {
        Self {
            model_id: LOCAL_MODEL_ID.to_string(),
            model_url: Some(LOCAL_MODEL_URL.to_string()),
            fence_output: Some(false),
            use_schema_constraints: Some(false),
            api_key: None,
        }
    }

    /// Select from the process environment
    pub fn from_env() -> Self {
        select_backend(|name| std::env::var(name).ok())
    }

    /// Replace the model identifier
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Replace the local endpoint (ignored by the hosted backend)
    pub fn with_model_url(mut self, model_url: impl Into<String>) -> Self {
        if !self.is_hosted() {
            self.model_url = Some(model_url.into());
        }
        self
    }

    /// Whether the hosted backend was selected
    pub fn is_hosted(&self) -> bool {
        self.api_key.is_some()
    }

    /// API credential, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Effective schema-constraint flag
    pub fn schema_constraints(&self) -> bool {
        self.use_schema_constraints.unwrap_or(true)
    }

    /// Effective fencing flag
    pub fn fenced(&self) -> bool {
        self.fence_output.unwrap_or(!self.schema_constraints())
    }

    /// Build the provider these parameters describe
    pub fn build_provider(&self, config: &ExtractorConfig) -> Provider {
        match &self.api_key {
            Some(key) => {
                let mut provider = GeminiProvider::new(key.clone(), self.model_id.clone())
                    .with_timeout(config.request_timeout())
                    .with_max_attempts(config.max_attempts);
                if let Some(base_url) = &config.hosted_base_url {
                    provider = provider.with_base_url(base_url.clone());
                }
                Provider::Gemini(provider)
            }
            None => {
                let url = self.model_url.as_deref().unwrap_or(LOCAL_MODEL_URL);
                Provider::Ollama(
                    OllamaProvider::new(url, self.model_id.clone())
                        .with_timeout(config.request_timeout())
                        .with_max_attempts(config.max_attempts),
                )
            }
        }
    }
}

impl std::fmt::Debug for BackendParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendParams")
            .field("model_id", &self.model_id)
            .field("model_url", &self.model_url)
            .field("fence_output", &self.fence_output)
            .field("use_schema_constraints", &self.use_schema_constraints)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Pick backend parameters given a variable lookup.
///
/// The first credential variable with a non-empty value wins and is then
/// trimmed; a value that is only whitespace therefore selects the local
/// backend. At most two lookups are made.
pub fn select_backend(lookup: impl Fn(&str) -> Option<String>) -> BackendParams {
    let key = API_KEY_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|value| !value.is_empty()))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    let params = match key {
        Some(key) => BackendParams::hosted(key),
        None => BackendParams::local(),
    };

    info!(
        model = %params.model_id,
        hosted = params.is_hosted(),
        "Selected extraction backend"
    );
    params
}
