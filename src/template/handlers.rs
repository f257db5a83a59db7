use actix_web::{
    web::{self, Path},
    HttpResponse, Responder,
};
use uuid::Uuid;

use crate::generator::{
    default_template, migrate_from, CertificateTemplate, DEFAULT_TEMPLATE_ID,
};
use crate::template::models::{CreateTemplateRequest, DefaultTemplateQuery, MigrationResponse};
use crate::validation::Validator;
use crate::{AppState, ErrorResponse};

fn store_failure(action: &str, e: impl std::fmt::Display) -> HttpResponse {
    log::error!("Failed to {}: {}", action, e);
    HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
}

fn built_in_is_read_only() -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::bad_request(
        "The built-in template cannot be modified",
    ))
}

#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    responses(
        (status = 200, description = "Stored templates", body = Vec<CertificateTemplate>)
    )
)]
pub async fn list_templates(state: web::Data<AppState>) -> impl Responder {
    match state.templates.list().await {
        Ok(templates) => HttpResponse::Ok().json(templates),
        Err(e) => store_failure("list templates", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "Templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = CertificateTemplate),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_template(
    state: web::Data<AppState>,
    req: web::Json<CreateTemplateRequest>,
) -> impl Responder {
    let req = req.into_inner();
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }

    let template = req.into_template();
    match state.templates.insert(template.clone()).await {
        Ok(()) => {
            log::info!("Template {} ('{}') created", template.id, template.name);
            HttpResponse::Created().json(template)
        }
        Err(e) => store_failure("create template", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/templates/default",
    tag = "Templates",
    params(DefaultTemplateQuery),
    responses(
        (status = 200, description = "Built-in template", body = CertificateTemplate)
    )
)]
pub async fn get_default_template(query: web::Query<DefaultTemplateQuery>) -> impl Responder {
    let orientation = query.orientation.unwrap_or_default();
    HttpResponse::Ok().json(default_template(orientation))
}

#[utoipa::path(
    get,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(
        ("id" = Uuid, Path, description = "Template ID; the nil id is the built-in template")
    ),
    responses(
        (status = 200, description = "Template found", body = CertificateTemplate),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn get_template(state: web::Data<AppState>, id: Path<Uuid>) -> impl Responder {
    match state.find_template(id.into_inner()).await {
        Ok(Some(template)) => HttpResponse::Ok().json(template),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Template not found")),
        Err(e) => store_failure("load template", e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 204, description = "Template deleted"),
        (status = 400, description = "The built-in template", body = ErrorResponse),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn delete_template(state: web::Data<AppState>, id: Path<Uuid>) -> impl Responder {
    let id = id.into_inner();
    if id == DEFAULT_TEMPLATE_ID {
        return built_in_is_read_only();
    }

    match state.templates.delete(id).await {
        Ok(true) => {
            log::info!("Template {} deleted", id);
            HttpResponse::NoContent().finish()
        }
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("Template not found")),
        Err(e) => store_failure("delete template", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/templates/{id}/migrate",
    tag = "Templates",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template lifted to the current layout", body = MigrationResponse),
        (status = 400, description = "The built-in template", body = ErrorResponse),
        (status = 404, description = "Template not found", body = ErrorResponse)
    )
)]
pub async fn migrate_template(state: web::Data<AppState>, id: Path<Uuid>) -> impl Responder {
    let id = id.into_inner();
    if id == DEFAULT_TEMPLATE_ID {
        return built_in_is_read_only();
    }

    let mut template = match state.templates.get(id).await {
        Ok(Some(template)) => template,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::not_found("Template not found"))
        }
        Err(e) => return store_failure("load template", e),
    };

    let migrated = migrate_from(&template.html_body, template.schema_version);
    let applied: Vec<String> = migrated.applied.iter().map(|s| s.to_string()).collect();

    if !applied.is_empty() {
        template.html_body = migrated.html;
        template.schema_version = migrated.schema_version;
        if let Err(e) = state.templates.update(template.clone()).await {
            return store_failure("store migrated template", e);
        }
        log::info!(
            "Template {} migrated to v{} ({} steps)",
            id,
            template.schema_version,
            applied.len()
        );
    }

    HttpResponse::Ok().json(MigrationResponse { template, applied })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/templates")
            .route(web::get().to(list_templates))
            .route(web::post().to(create_template)),
    )
    .service(web::resource("/templates/default").route(web::get().to(get_default_template)))
    .service(web::resource("/templates/{id}/migrate").route(web::post().to(migrate_template)))
    .service(
        web::resource("/templates/{id}")
            .route(web::get().to(get_template))
            .route(web::delete().to(delete_template)),
    );
}
