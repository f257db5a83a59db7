use serde::Serialize;
use utoipa::ToSchema;

use super::cleanup;
use super::context::{CertificateTemplate, RenderingContext};
use super::css::patch_stylesheet;
use super::migration::migrate_from;
use super::resolver::resolve_placeholders;
use super::tokens::{find_unresolved, Token};

/// A rendered certificate document.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenderOutput {
    pub html: String,
    /// Tokens the context could not fill, in catalog order.
    #[schema(value_type = Vec<String>, example = json!(["[SIGNER NAME]"]))]
    pub unresolved_tokens: Vec<Token>,
}

impl RenderOutput {
    pub fn is_complete(&self) -> bool {
        self.unresolved_tokens.is_empty()
    }
}

/// Run the full pipeline: migrate, patch the stylesheet, resolve, clean up.
pub fn render(template: &CertificateTemplate, context: &RenderingContext) -> RenderOutput {
    let migrated = migrate_from(&template.html_body, template.schema_version);
    let patched = patch_stylesheet(&migrated.html);
    let resolved = resolve_placeholders(&patched, template, context);
    let html = cleanup::normalize(&resolved);

    let unresolved_tokens = find_unresolved(&html);
    for token in &unresolved_tokens {
        log::warn!("Template {} left {} unresolved", template.id, token);
    }
    log::debug!(
        "Rendered template {} ({} migration steps, {} bytes, {} unresolved)",
        template.id,
        migrated.applied.len(),
        html.len(),
        unresolved_tokens.len()
    );

    RenderOutput {
        html,
        unresolved_tokens,
    }
}
