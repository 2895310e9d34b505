//! API module - HTTP routes and handlers

pub mod handlers;
pub mod openapi;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;

/// Configure all API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/sessions")
            .route("", web::post().to(handlers::sessions::create_session))
            .route("/{session_id}", web::get().to(handlers::sessions::get_session))
            .route("/{session_id}", web::delete().to(handlers::sessions::delete_session))
            // Template context
            .route("/{session_id}/template", web::put().to(handlers::sessions::select_template))
            .route("/{session_id}/provider", web::put().to(handlers::sessions::select_provider))
            .route("/{session_id}/variants", web::put().to(handlers::sessions::select_variants))
            .route("/{session_id}/selection", web::get().to(handlers::sessions::get_selection))
            // Design and placement
            .route("/{session_id}/design", web::post().to(handlers::design::upload_design))
            .route("/{session_id}/design/hosted", web::put().to(handlers::design::use_hosted_design))
            .route("/{session_id}/transform/preset", web::put().to(handlers::design::set_preset))
            .route("/{session_id}/transform/advanced", web::put().to(handlers::design::apply_advanced))
            .route("/{session_id}/preview", web::get().to(handlers::design::preview))
            // Authoritative mockups
            .route("/{session_id}/generate", web::post().to(handlers::generate::generate_mockups))
            .route("/{session_id}/gallery/select", web::post().to(handlers::gallery::select_mockup))
            .route("/{session_id}/gallery/next", web::post().to(handlers::gallery::next_mockup))
            .route("/{session_id}/gallery/previous", web::post().to(handlers::gallery::previous_mockup))
    )
    .route("/health", web::get().to(handlers::health::health_check))
    // Swagger UI and OpenAPI spec
    .service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
            .url("/api-docs/openapi.json", ApiDoc::openapi())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use bytes::Bytes;
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
    use serde_json::{json, Value};

    use crate::domain::{ContentId, ProductTemplate, TemplateVariant};
    use crate::engine::{ImageLoader, LocalCompositor};
    use crate::pipeline::MockupPipeline;
    use crate::providers::{
        AssetHost, CatalogLookup, GeneratedMockup, GenerationRequest, GenerationResponse, MockupGenerator,
        ProviderError, ProviderResult,
    };
    use crate::session::SessionStore;
    use crate::AppState;

    struct FakeCatalog;

    #[async_trait]
    impl CatalogLookup for FakeCatalog {
        fn code(&self) -> &'static str {
            "fake"
        }

        async fn template(&self, template_id: &str) -> ProviderResult<ProductTemplate> {
            if template_id != "146" {
                return Err(ProviderError::NotFound(template_id.to_string()));
            }
            Ok(ProductTemplate {
                id: "146".to_string(),
                title: "Premium Hoodie XL".to_string(),
                // Unreachable on purpose: previews must degrade, not hang
                images: vec!["http://127.0.0.1:1/hoodie.png".to_string()],
                provider_id: "printful".to_string(),
                variants: vec![TemplateVariant::new("10", "Black / M"), TemplateVariant::new("11", "Black / L")],
            })
        }

        async fn variants(&self, _template_id: &str, _provider_id: &str) -> ProviderResult<Vec<TemplateVariant>> {
            Ok(vec![TemplateVariant::new("900", "One size")])
        }
    }

    struct FakeHost;

    #[async_trait]
    impl AssetHost for FakeHost {
        async fn upload(&self, content_id: &ContentId, _data: Bytes, _content_type: &str) -> ProviderResult<String> {
            Ok(format!("https://cdn.test/designs/{}.png", content_id))
        }
    }

    struct FakeGenerator;

    #[async_trait]
    impl MockupGenerator for FakeGenerator {
        async fn generate(&self, request: &GenerationRequest) -> ProviderResult<GenerationResponse> {
            Ok(GenerationResponse {
                mockups: vec![
                    GeneratedMockup {
                        url: "https://m.test/front.png".to_string(),
                        variant_ids: request.variant_ids.clone(),
                        position_label: Some("front".to_string()),
                        is_default: false,
                    },
                    GeneratedMockup {
                        url: "https://m.test/lifestyle.png".to_string(),
                        variant_ids: request.variant_ids.clone(),
                        position_label: None,
                        is_default: true,
                    },
                ],
                batch_id: Some("batch-1".to_string()),
                error: None,
            })
        }
    }

    /// Never answers, like a renderer that hangs
    struct StalledGenerator;

    #[async_trait]
    impl MockupGenerator for StalledGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> ProviderResult<GenerationResponse> {
            futures::future::pending().await
        }
    }

    fn state() -> web::Data<AppState> {
        state_with(Arc::new(FakeGenerator))
    }

    fn state_with(generator: Arc<dyn MockupGenerator>) -> web::Data<AppState> {
        web::Data::new(AppState {
            sessions: SessionStore::new(),
            catalog: Arc::new(FakeCatalog),
            pipeline: MockupPipeline::new(Arc::new(FakeHost), generator, 64),
            loader: ImageLoader::new(Duration::from_secs(2), 16).unwrap(),
            compositor: LocalCompositor::default(),
            started_at: Instant::now(),
        })
    }

    fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([shade, 0, 0, 255])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    fn uri(id: &str, suffix: &str) -> String {
        format!("/api/v1/sessions/{}{}", id, suffix)
    }

    #[actix_web::test]
    async fn test_editing_flow() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let id = body["session"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/template"))
            .set_json(json!({"template_id": "146"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["profile_id"], "hoodie");
        assert_eq!(body["session"]["selected_variants"], json!(["10"]));

        let req = test::TestRequest::post()
            .uri(&uri(&id, "/design"))
            .set_payload(png(40, 20, 200))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["design"]["width"], 40);
        assert_eq!(body["session"]["design"]["height"], 20);

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/variants"))
            .set_json(json!({"variant_ids": ["11", "10"]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["selected_variants"], json!(["10", "11"]));

        let req = test::TestRequest::post().uri(&uri(&id, "/generate")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"], "committed");
        let gallery = &body["session"]["gallery"];
        assert_eq!(gallery["state"], "populated");
        assert_eq!(gallery["selected_index"], 1);
        assert_eq!(gallery["mockups"][0]["label"], "Front");
        assert_eq!(gallery["stale"], false);

        let req = test::TestRequest::post().uri(&uri(&id, "/gallery/next")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["gallery"]["selected_index"], 0);

        let req = test::TestRequest::get().uri(&uri(&id, "/selection")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["selected_mockup_url"], "https://m.test/front.png");
        assert!(body["design_url"].as_str().unwrap().starts_with("https://cdn.test/designs/"));

        // New artwork keeps the set but marks it stale
        let req = test::TestRequest::post()
            .uri(&uri(&id, "/design"))
            .set_payload(png(40, 20, 10))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["gallery"]["stale"], true);
        assert_eq!(body["session"]["gallery"]["state"], "populated");

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/transform/advanced"))
            .set_json(json!({"scale_factor": 9.0, "rotation": -400.0}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["transform"]["scale_factor"], 2.0);
        assert_eq!(body["session"]["transform"]["rotation"], -180.0);
        assert_eq!(body["session"]["transform"]["scale_class"], "fill");
    }

    #[actix_web::test]
    async fn test_error_bodies() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri(&uri(&uuid::Uuid::new_v4().to_string(), "")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "SESSION_NOT_FOUND");

        let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["session"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post().uri(&uri(&id, "/generate")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "NO_TEMPLATE_SELECTED");

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/template"))
            .set_json(json!({"template_id": "999"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "TEMPLATE_NOT_FOUND");

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/template"))
            .set_json(json!({"template_id": "146"}))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post().uri(&uri(&id, "/generate")).to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["error"]["code"], "NO_DESIGN");

        let req = test::TestRequest::post()
            .uri(&uri(&id, "/design"))
            .set_payload("not an image")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_DESIGN");

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/variants"))
            .set_json(json!({"variant_ids": ["404"]}))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["error"]["code"], "UNKNOWN_VARIANT");
    }

    #[actix_web::test]
    async fn test_preview_degrades_when_template_unreachable() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["session"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/template"))
            .set_json(json!({"template_id": "146"}))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri(&uri(&id, "/preview")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.headers().get("X-Preview-Outcome").unwrap(), "unavailable");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"], "unavailable");
    }

    #[actix_web::test]
    async fn test_provider_switch_replaces_variants() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["session"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/template"))
            .set_json(json!({"template_id": "146"}))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/provider"))
            .set_json(json!({"provider_id": "gelato"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["provider_id"], "gelato");
        assert_eq!(body["session"]["selected_variants"], json!(["900"]));
        assert_eq!(body["session"]["gallery"]["state"], "empty");
    }

    #[actix_web::test]
    async fn test_dropped_generate_request_ends_loading() {
        let app = test::init_service(
            App::new().app_data(state_with(Arc::new(StalledGenerator))).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["session"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&uri(&id, "/template"))
            .set_json(json!({"template_id": "146"}))
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri(&uri(&id, "/design"))
            .set_payload(png(8, 8, 90))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post().uri(&uri(&id, "/generate")).to_request();
        let timed_out = tokio::time::timeout(Duration::from_millis(200), test::call_service(&app, req)).await;
        assert!(timed_out.is_err());

        let req = test::TestRequest::get().uri(&uri(&id, "")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["gallery"]["state"], "empty");
    }

    #[actix_web::test]
    async fn test_health_reports_catalog() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["catalog"], "fake");
        assert_eq!(body["active_sessions"], 0);
    }
}
