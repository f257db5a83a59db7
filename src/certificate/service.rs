//! Emission workflow: validate, render, persist.

use std::sync::Arc;

use actix_web::web;
use futures::future::join_all;
use thiserror::Error;
use uuid::Uuid;

use crate::certificate::models::{
    BatchEmitRequest, BatchEmitResponse, BatchFailure, EmitCertificateRequest,
    EmittedCertificate, PreviewRequest,
};
use crate::generator::{render, CertificateTemplate, RenderOutput, RenderingContext, Token};
use crate::storage::StoreError;
use crate::validation::{ValidationError, ValidationErrors, Validator};
use crate::AppState;

#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("template {0} not found")]
    TemplateNotFound(Uuid),
    #[error("rendered certificate still contains {}", join_tokens(.0))]
    Unresolved(Vec<Token>),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("render task failed: {0}")]
    Render(String),
}

fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

async fn load_template(state: &AppState, id: Uuid) -> Result<CertificateTemplate, EmissionError> {
    state
        .find_template(id)
        .await?
        .ok_or(EmissionError::TemplateNotFound(id))
}

/// Render on the blocking pool, handing the context back with the output.
async fn render_blocking(
    template: Arc<CertificateTemplate>,
    context: RenderingContext,
) -> Result<(RenderingContext, RenderOutput), EmissionError> {
    web::block(move || {
        let output = render(&template, &context);
        (context, output)
    })
    .await
    .map_err(|e| EmissionError::Render(e.to_string()))
}

/// Render without persisting anything.
pub async fn preview(state: &AppState, request: PreviewRequest) -> Result<RenderOutput, EmissionError> {
    let mut template = load_template(state, request.template_id).await?;
    if let Some(html_body) = request.html_body {
        template.html_body = html_body;
        template.schema_version = 0;
    }
    let context = request.context.with_filtered_dates();
    let (_, output) = render_blocking(Arc::new(template), context).await?;
    Ok(output)
}

/// Issue a single certificate.
pub async fn emit(
    state: &AppState,
    request: EmitCertificateRequest,
) -> Result<EmittedCertificate, EmissionError> {
    request.validate()?;
    let template = Arc::new(load_template(state, request.template_id).await?);
    let context = request.context.clone().with_filtered_dates();
    let (context, output) = render_blocking(template, context).await?;
    store_emission(state, &request, &context, output).await
}

async fn store_emission(
    state: &AppState,
    request: &EmitCertificateRequest,
    context: &RenderingContext,
    output: RenderOutput,
) -> Result<EmittedCertificate, EmissionError> {
    if state.config.block_on_unresolved_tokens && !output.is_complete() {
        return Err(EmissionError::Unresolved(output.unresolved_tokens));
    }

    let certificate = EmittedCertificate::new(
        request.template_id,
        request.employee_id,
        request.signer_id,
        context,
        output,
    );
    state.certificates.insert(certificate.clone()).await?;
    log::info!(
        "Certificate {} issued to employee {} from template {}",
        certificate.id,
        certificate.employee_id,
        certificate.template_id
    );
    Ok(certificate)
}

/// Issue one certificate per batch item.
///
/// Items are rendered concurrently on the blocking pool. A failing item is
/// reported in `failed` and does not stop the others.
pub async fn emit_batch(
    state: &AppState,
    request: BatchEmitRequest,
) -> Result<BatchEmitResponse, EmissionError> {
    if request.items.is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::new("items", "At least one item is required"));
        return Err(errors.into());
    }

    let template = Arc::new(load_template(state, request.template_id).await?);
    let mut failed = Vec::new();
    let mut pending = Vec::new();

    for (index, item) in request.into_requests().into_iter().enumerate() {
        match item.validate() {
            Ok(()) => pending.push((index, item)),
            Err(errors) => failed.push(BatchFailure {
                index,
                employee_id: item.employee_id,
                message: errors.to_message(),
            }),
        }
    }

    let renders = pending.into_iter().map(|(index, item)| {
        let template = Arc::clone(&template);
        async move {
            let context = item.context.clone().with_filtered_dates();
            let rendered = render_blocking(template, context).await;
            (index, item, rendered)
        }
    });

    let mut issued = Vec::new();
    for (index, item, rendered) in join_all(renders).await {
        let outcome = match rendered {
            Ok((context, output)) => store_emission(state, &item, &context, output).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(certificate) => issued.push(certificate),
            Err(e) => failed.push(BatchFailure {
                index,
                employee_id: item.employee_id,
                message: e.to_string(),
            }),
        }
    }

    failed.sort_by_key(|f| f.index);
    log::info!(
        "Batch emission from template {}: {} issued, {} failed",
        template.id,
        issued.len(),
        failed.len()
    );
    Ok(BatchEmitResponse { issued, failed })
}
