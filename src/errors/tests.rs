// 错误处理系统测试

#[cfg(test)]
mod tests {
    use crate::errors::{
        get_request_id_from_http, ErrorResponse, RequestIdMiddleware, StudioError,
        KNOWLEDGE_BASE_NOT_FOUND, PROFILE_NOT_FOUND,
    };
    use actix_web::body::to_bytes;
    use actix_web::test::{call_service, init_service, read_body, TestRequest};
    use actix_web::{web, App, ResponseError};
    use uuid::Uuid;

    #[test]
    fn test_validation_error() {
        let error = StudioError::validation("title", "标题不能为空");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.status_code(), 400);
        assert!(!error.should_log());
    }

    #[test]
    fn test_fixed_not_found_messages() {
        assert_eq!(StudioError::profile_not_found().to_string(), PROFILE_NOT_FOUND);
        assert_eq!(
            StudioError::knowledge_base_not_found().to_string(),
            KNOWLEDGE_BASE_NOT_FOUND
        );
        assert_eq!(StudioError::profile_not_found().status_code(), 404);
    }

    #[test]
    fn test_referential_integrity_names_missing_id() {
        let id = Uuid::new_v4();
        let error = StudioError::missing_knowledge_base(id);

        assert_eq!(error.status_code(), 404);
        assert_eq!(error.to_string(), format!("Knowledge base not found {}", id));

        let response = ErrorResponse::from_error(&error);
        assert_eq!(response.error.code, "REFERENTIAL_INTEGRITY");
        assert_eq!(
            response.error.details,
            Some(serde_json::json!({ "knowledge_base_id": id }))
        );
    }

    #[test]
    fn test_store_failures_are_server_errors() {
        let db = StudioError::database("连接失败");
        assert_eq!(db.status_code(), 500);
        assert!(db.should_log());
        assert_eq!(ErrorResponse::from_error(&db).error.details, None);

        let storage = StudioError::storage("写入失败", "/tmp/catalog.json");
        assert_eq!(storage.error_code(), "STORAGE_ERROR");
        assert_eq!(storage.status_code(), 500);
    }

    #[test]
    fn test_db_err_is_not_conflated_with_not_found() {
        let error: StudioError = sea_orm::DbErr::RecordNotFound("chat_profiles".into()).into();
        assert_eq!(error.error_code(), "DATABASE_ERROR");
        assert_eq!(error.status_code(), 500);
    }

    #[test]
    fn test_common_error_conversion() {
        let common_error = studio_common::CommonError::validation("测试验证错误");
        let error: StudioError = common_error.into();
        assert_eq!(error.error_code(), "VALIDATION_ERROR");

        let common_error = studio_common::CommonError::configuration("缺少密钥");
        let error: StudioError = common_error.into();
        assert_eq!(error.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_error_response_with_request_id() {
        let error = StudioError::internal("测试错误");
        let response = ErrorResponse::from_error(&error).with_request_id("req-123".to_string());

        assert!(!response.success);
        assert_eq!(response.request_id, Some("req-123".to_string()));
        assert_eq!(response.status(), 500);
    }

    #[actix_web::test]
    async fn test_response_error_body() {
        let error = StudioError::profile_not_found();
        let response = error.error_response();
        assert_eq!(response.status().as_u16(), 404);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], PROFILE_NOT_FOUND);
    }

    async fn echo_request_id(req: actix_web::HttpRequest) -> actix_web::HttpResponse {
        let id = get_request_id_from_http(&req).unwrap_or_default();
        actix_web::HttpResponse::Ok().body(id)
    }

    #[actix_web::test]
    async fn test_request_id_is_generated_when_missing() {
        let app = init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/", web::get().to(echo_request_id)),
        )
        .await;

        for header in [None, Some("   ")] {
            let mut req = TestRequest::get().uri("/");
            if let Some(value) = header {
                req = req.insert_header(("X-Request-ID", value));
            }
            let resp = call_service(&app, req.to_request()).await;
            let header = resp.headers().get("x-request-id").unwrap().to_str().unwrap().to_string();
            assert!(Uuid::parse_str(&header).is_ok());

            let body = read_body(resp).await;
            assert_eq!(body, header.as_bytes());
        }
    }

    #[actix_web::test]
    async fn test_request_id_is_echoed() {
        let app = init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/", web::get().to(echo_request_id)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/")
            .insert_header(("X-Request-ID", "trace-7"))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.headers().get("x-request-id").unwrap(), "trace-7");
        assert_eq!(read_body(resp).await, "trace-7".as_bytes());
    }
}
