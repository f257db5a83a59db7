use actix_web::{
    http::header,
    web::{self, Path},
    HttpResponse, Responder,
};
use uuid::Uuid;

use crate::certificate::models::{
    BatchEmitRequest, BatchEmitResponse, EmitCertificateRequest, EmittedCertificate, ListQuery,
    PreviewRequest,
};
use crate::certificate::service::{self, EmissionError};
use crate::generator::common::sanitize_filename;
use crate::generator::{prepare_for_print, RenderOutput};
use crate::{AppState, ErrorResponse};

fn emission_error_response(err: EmissionError) -> HttpResponse {
    match &err {
        EmissionError::Validation(errors) => {
            HttpResponse::BadRequest().json(ErrorResponse::validation(errors))
        }
        EmissionError::TemplateNotFound(_) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found(&err.to_string()))
        }
        EmissionError::Unresolved(_) => {
            log::warn!("Emission rejected: {}", err);
            HttpResponse::UnprocessableEntity()
                .json(ErrorResponse::new("UnresolvedTokens", &err.to_string()))
        }
        EmissionError::Store(_) | EmissionError::Render(_) => {
            log::error!("Emission failed: {}", err);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&err.to_string()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/certificates/preview",
    tag = "Certificates",
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Rendered document, not persisted", body = RenderOutput),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn preview_certificate(
    state: web::Data<AppState>,
    req: web::Json<PreviewRequest>,
) -> impl Responder {
    match service::preview(&state, req.into_inner()).await {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => emission_error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/certificates",
    tag = "Certificates",
    request_body = EmitCertificateRequest,
    responses(
        (status = 201, description = "Certificate issued", body = EmittedCertificate),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 422, description = "Unresolved tokens while blocking is enabled", body = ErrorResponse)
    )
)]
pub async fn emit_certificate(
    state: web::Data<AppState>,
    req: web::Json<EmitCertificateRequest>,
) -> impl Responder {
    match service::emit(&state, req.into_inner()).await {
        Ok(certificate) => HttpResponse::Created().json(certificate),
        Err(e) => emission_error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/certificates/batch",
    tag = "Certificates",
    request_body = BatchEmitRequest,
    responses(
        (status = 200, description = "Issued certificates and per-item failures", body = BatchEmitResponse),
        (status = 400, description = "Empty batch", body = ErrorResponse),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn emit_batch(
    state: web::Data<AppState>,
    req: web::Json<BatchEmitRequest>,
) -> impl Responder {
    match service::emit_batch(&state, req.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => emission_error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/certificates",
    tag = "Certificates",
    params(ListQuery),
    responses(
        (status = 200, description = "Issued certificates, newest first", body = Vec<EmittedCertificate>),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
pub async fn list_certificates(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    let filter = match query.into_inner().into_filter() {
        Ok(filter) => filter,
        Err(errors) => return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors)),
    };

    match state.certificates.list(&filter).await {
        Ok(certificates) => HttpResponse::Ok().json(certificates),
        Err(e) => {
            log::error!("Failed to list certificates: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

async fn find_certificate(
    state: &AppState,
    id: Uuid,
) -> Result<EmittedCertificate, HttpResponse> {
    match state.certificates.get(id).await {
        Ok(Some(certificate)) => Ok(certificate),
        Ok(None) => Err(HttpResponse::NotFound().json(ErrorResponse::not_found("Certificate not found"))),
        Err(e) => {
            log::error!("Failed to load certificate {}: {}", id, e);
            Err(HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string())))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/certificates/{id}",
    tag = "Certificates",
    params(
        ("id" = Uuid, Path, description = "Certificate ID")
    ),
    responses(
        (status = 200, description = "Certificate found", body = EmittedCertificate),
        (status = 404, description = "Certificate not found", body = ErrorResponse)
    )
)]
pub async fn get_certificate(state: web::Data<AppState>, id: Path<Uuid>) -> impl Responder {
    match find_certificate(&state, id.into_inner()).await {
        Ok(certificate) => HttpResponse::Ok().json(certificate),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/api/certificates/{id}/print",
    tag = "Certificates",
    params(
        ("id" = Uuid, Path, description = "Certificate ID")
    ),
    responses(
        (status = 200, description = "Stored document prepared for printing", body = String, content_type = "text/html"),
        (status = 404, description = "Certificate not found", body = ErrorResponse)
    )
)]
pub async fn print_certificate(state: web::Data<AppState>, id: Path<Uuid>) -> impl Responder {
    let certificate = match find_certificate(&state, id.into_inner()).await {
        Ok(certificate) => certificate,
        Err(response) => return response,
    };

    let html = prepare_for_print(&certificate.rendered_html, state.config.print_delay_ms);
    let filename = format!(
        "certificate-{}.html",
        sanitize_filename(&certificate.employee_name, "employee")
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", filename),
        ))
        .body(html)
}

#[utoipa::path(
    delete,
    path = "/api/certificates/{id}",
    tag = "Certificates",
    params(
        ("id" = Uuid, Path, description = "Certificate ID")
    ),
    responses(
        (status = 204, description = "Certificate deleted"),
        (status = 404, description = "Certificate not found", body = ErrorResponse)
    )
)]
pub async fn delete_certificate(state: web::Data<AppState>, id: Path<Uuid>) -> impl Responder {
    let id = id.into_inner();
    match state.certificates.delete(id).await {
        Ok(true) => {
            log::info!("Certificate {} deleted", id);
            HttpResponse::NoContent().finish()
        }
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("Certificate not found")),
        Err(e) => {
            log::error!("Failed to delete certificate {}: {}", id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/certificates")
            .route(web::get().to(list_certificates))
            .route(web::post().to(emit_certificate)),
    )
    .service(web::resource("/certificates/preview").route(web::post().to(preview_certificate)))
    .service(web::resource("/certificates/batch").route(web::post().to(emit_batch)))
    .service(web::resource("/certificates/{id}/print").route(web::get().to(print_certificate)))
    .service(
        web::resource("/certificates/{id}")
            .route(web::get().to(get_certificate))
            .route(web::delete().to(delete_certificate)),
    );
}
