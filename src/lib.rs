use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod certificate;
pub mod config;
pub mod db;
pub mod generator;
pub mod storage;
pub mod template;
pub mod validation;


pub use crate::config::AppConfig;
pub use crate::db::AppState;

use crate::validation::{ValidationError, ValidationErrors};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    /// Field-level problems, when the request failed validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationError>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: Vec::new(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        let mut response = Self::new("ValidationError", &errors.to_message());
        response.details = errors.errors().to_vec();
        response
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::template::handlers::list_templates,
        crate::template::handlers::create_template,
        crate::template::handlers::get_default_template,
        crate::template::handlers::get_template,
        crate::template::handlers::delete_template,
        crate::template::handlers::migrate_template,
        crate::certificate::handlers::preview_certificate,
        crate::certificate::handlers::emit_certificate,
        crate::certificate::handlers::emit_batch,
        crate::certificate::handlers::list_certificates,
        crate::certificate::handlers::get_certificate,
        crate::certificate::handlers::print_certificate,
        crate::certificate::handlers::delete_certificate
    ),
    components(
        schemas(
            generator::CertificateTemplate,
            generator::Orientation,
            generator::RenderingContext,
            generator::EmployeeSnapshot,
            generator::CompanySnapshot,
            generator::SignerSnapshot,
            generator::RenderOutput,
            template::models::CreateTemplateRequest,
            template::models::MigrationResponse,
            certificate::models::EmittedCertificate,
            certificate::models::EmitCertificateRequest,
            certificate::models::BatchItem,
            certificate::models::BatchEmitRequest,
            certificate::models::BatchEmitResponse,
            certificate::models::BatchFailure,
            certificate::models::PreviewRequest,
            validation::ValidationError,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Templates", description = "Certificate template endpoints."),
        (name = "Certificates", description = "Certificate preview, emission and printing endpoints.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Localhost server")
    )
)]
pub struct ApiDoc;

/// Register every `/api` route on `cfg`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(template::handlers::config)
            .configure(certificate::handlers::config),
    );
}

fn build_cors(config: &AppConfig) -> Cors {
    let cors = if config.allows_any_origin() {
        Cors::default().allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .supports_credentials()
    };

    cors.allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(3600)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app_state = web::Data::new(AppState::new(config.clone()));

    let prometheus = PrometheusMetricsBuilder::new("certificate_issuance_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    log::info!(
        "Starting server at http://{}:{} (print delay {} ms, block on unresolved tokens: {})",
        config.host,
        config.port,
        config.print_delay_ms,
        config.block_on_unresolved_tokens
    );

    let bind_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(build_cors(&config))
            .app_data(app_state.clone())
            .configure(configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((bind_config.host.as_str(), bind_config.port))
    .with_context(|| format!("failed to bind {}:{}", bind_config.host, bind_config.port))?
    .run()
    .await
    .context("server error")
}
