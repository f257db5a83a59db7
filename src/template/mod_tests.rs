#[cfg(test)]
mod tests {
    use crate::generator::Orientation;
    use crate::template::models::CreateTemplateRequest;
    use crate::validation::Validator;

    fn request(html_body: &str) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: "  Work at Height ".to_string(),
            html_body: html_body.to_string(),
            orientation: Orientation::Portrait,
            program_content: vec!["Anchorage".into(), "  ".into(), " Harness ".into()],
            footer_address: Some("   ".into()),
            expected_day_count: Some(0),
            schema_version: None,
        }
    }

    #[test]
    fn test_into_template_normalizes_fields() {
        let template = request("<p>[EMPLOYEE NAME]</p>").into_template();

        assert!(!template.id.is_nil());
        assert_eq!(template.name, "Work at Height");
        assert_eq!(template.program_content, vec!["Anchorage", "Harness"]);
        assert_eq!(template.footer_address, None);
        assert_eq!(template.expected_day_count, 1);
        assert_eq!(template.schema_version, 0);
        assert_eq!(template.orientation, Orientation::Portrait);
    }

    #[test]
    fn test_blank_html_body_is_rejected() {
        let errors = request(" \n ").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "html_body");
        assert!(request("<p></p>").validate().is_ok());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let req: CreateTemplateRequest =
            serde_json::from_str(r#"{"name":"Basic","html_body":"<p>x</p>"}"#).unwrap();
        assert_eq!(req.orientation, Orientation::Landscape);
        assert!(req.program_content.is_empty());
        assert!(req.schema_version.is_none());
    }
}
