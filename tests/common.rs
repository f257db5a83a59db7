#![allow(dead_code)]

use actix_web::web;
use certificate_issuance_server::{AppConfig, AppState};
use serde_json::{json, Value};

/// In-memory AppState with default configuration.
pub fn setup_test_app_state() -> web::Data<AppState> {
    setup_test_app_state_with(AppConfig::default())
}

pub fn setup_test_app_state_with(config: AppConfig) -> web::Data<AppState> {
    web::Data::new(AppState::new(config))
}

/// Nil id, which selects the built-in template.
pub const DEFAULT_TEMPLATE: &str = "00000000-0000-0000-0000-000000000000";

pub fn full_context() -> Value {
    json!({
        "employee": {
            "full_name": "Maria Souza",
            "national_id": "12.345.678-9",
            "job_title": "Electrician"
        },
        "company": {
            "legal_name": "ACME Services Ltd",
            "tax_id": "00.000.000/0001-00"
        },
        "signer": {
            "full_name": "João Lima",
            "job_title": "Safety Engineer"
        },
        "training_dates": ["2025-01-10", "", "2025-01-11"],
        "training_name": "NR-10 Electrical Safety",
        "description": "with practical exercises."
    })
}

/// Two training days and no national id on file.
pub fn electrician_without_id_context() -> Value {
    json!({
        "employee": {
            "full_name": "Maria Souza",
            "job_title": "Electrician"
        },
        "training_dates": ["2025-01-10", "2025-01-11"]
    })
}

pub fn employee_only_context(name: &str) -> Value {
    json!({
        "employee": { "full_name": name },
        "training_dates": ["2025-02-03"]
    })
}

pub const LEGACY_TEMPLATE_HTML: &str = r#"<html><head><style>
    .signature { margin: 4px; }
    .program-content { background: rgba(30, 64, 175, 0.05); border-radius: 8px; }
</style></head>
<body>
  <div class="certificate">
    <div class="content">
      <div class="issuing-company">ACME Training Ltd</div>
      <div class="certifies-that">We certify that</div>
      <div class="training-text">Regulatory Standard - [NR], with a workload of [WORKLOAD] hours. [CERTIFICATE DESCRIPTION]</div>
      <div class="program-content"><ul>[PROGRAM CONTENT LIST]</ul></div>
    </div>
    <div class="footer">
      <div class="footer-date">[ISSUE DATE]</div>
      <div class="signature">
        <div class="signature-line"></div>
        <p class="signature-name">[EMPLOYEE NAME]</p>
        <p class="signature-title">Instructor of the Training</p>
      </div>
    </div>
  </div>
</body></html>"#;
