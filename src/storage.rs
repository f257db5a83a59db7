//! Record stores for templates and emitted certificates.
//!
//! Handlers only see the traits; the in-memory implementations back the
//! server and the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::certificate::models::{CertificateFilter, EmittedCertificate};
use crate::generator::CertificateTemplate;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("record {0} already exists")]
    Duplicate(Uuid),
    #[error("record {0} not found")]
    NotFound(Uuid),
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn list(&self) -> Result<Vec<CertificateTemplate>, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<CertificateTemplate>, StoreError>;
    async fn insert(&self, template: CertificateTemplate) -> Result<(), StoreError>;
    /// Replace an existing template.
    async fn update(&self, template: CertificateTemplate) -> Result<(), StoreError>;
    /// Returns whether a template was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Emitted certificates are write-once; there is no update.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    async fn list(&self, filter: &CertificateFilter) -> Result<Vec<EmittedCertificate>, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<EmittedCertificate>, StoreError>;
    async fn insert(&self, certificate: EmittedCertificate) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<HashMap<Uuid, CertificateTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn list(&self) -> Result<Vec<CertificateTemplate>, StoreError> {
        let templates = self.templates.read();
        let mut all: Vec<CertificateTemplate> = templates.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn get(&self, id: Uuid) -> Result<Option<CertificateTemplate>, StoreError> {
        Ok(self.templates.read().get(&id).cloned())
    }

    async fn insert(&self, template: CertificateTemplate) -> Result<(), StoreError> {
        let mut templates = self.templates.write();
        if templates.contains_key(&template.id) {
            return Err(StoreError::Duplicate(template.id));
        }
        templates.insert(template.id, template);
        Ok(())
    }

    async fn update(&self, template: CertificateTemplate) -> Result<(), StoreError> {
        let mut templates = self.templates.write();
        match templates.get_mut(&template.id) {
            Some(existing) => {
                *existing = template;
                Ok(())
            }
            None => Err(StoreError::NotFound(template.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.templates.write().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryCertificateStore {
    certificates: RwLock<HashMap<Uuid, EmittedCertificate>>,
}

impl InMemoryCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CertificateStore for InMemoryCertificateStore {
    async fn list(&self, filter: &CertificateFilter) -> Result<Vec<EmittedCertificate>, StoreError> {
        let certificates = self.certificates.read();
        let mut matching: Vec<EmittedCertificate> = certificates
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        // Newest first.
        matching.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(matching)
    }

    async fn get(&self, id: Uuid) -> Result<Option<EmittedCertificate>, StoreError> {
        Ok(self.certificates.read().get(&id).cloned())
    }

    async fn insert(&self, certificate: EmittedCertificate) -> Result<(), StoreError> {
        let mut certificates = self.certificates.write();
        if certificates.contains_key(&certificate.id) {
            return Err(StoreError::Duplicate(certificate.id));
        }
        certificates.insert(certificate.id, certificate);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.certificates.write().remove(&id).is_some())
    }
}
