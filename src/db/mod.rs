//! AppState and record store wiring.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::AppConfig;
use crate::generator::{default_template, CertificateTemplate, Orientation, DEFAULT_TEMPLATE_ID};
use crate::storage::{
    CertificateStore, InMemoryCertificateStore, InMemoryTemplateStore, StoreError, TemplateStore,
};

#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<dyn TemplateStore>,
    pub certificates: Arc<dyn CertificateStore>,
    pub config: AppConfig,
}

impl AppState {
    /// State backed by the in-memory stores.
    pub fn new(config: AppConfig) -> Self {
        Self::with_stores(
            Arc::new(InMemoryTemplateStore::new()),
            Arc::new(InMemoryCertificateStore::new()),
            config,
        )
    }

    pub fn with_stores(
        templates: Arc<dyn TemplateStore>,
        certificates: Arc<dyn CertificateStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            templates,
            certificates,
            config,
        }
    }

    /// Look a template up by id; the nil id yields the built-in layout.
    pub async fn find_template(&self, id: Uuid) -> Result<Option<CertificateTemplate>, StoreError> {
        if id == DEFAULT_TEMPLATE_ID {
            return Ok(Some(default_template(Orientation::default())));
        }
        self.templates.get(id).await
    }
}
