// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderName,
    routing::get,
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        DeleteDonationsResponse, ErrorResponse, FoundDonationsResponse, GoalView,
        MonetaryDonationLinks, SaveGoalRequest, SubmitDonationResponse, UploadImageResponse,
    },
    state::AppState,
    storage::repository::{
        DonationGoal, DonationRequest, Field, FieldError, GalleryImage, GoalProgress, Month,
        StoredDonationRequest,
    },
};

pub mod donations;
pub mod gallery;
pub mod goals;
pub mod health;
pub mod media;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub fn router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    let admin_routes = Router::new()
        .route("/donations/names", get(donations::list_donor_names))
        .route(
            "/donations",
            get(donations::find_donations).delete(donations::delete_donations),
        )
        .route(
            "/goals/{month}",
            get(goals::admin_month_goal).put(goals::save_goal),
        )
        .route(
            "/gallery",
            get(gallery::list_images)
                .post(gallery::upload_image)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/gallery/{name}",
            get(gallery::get_image).delete(gallery::delete_image),
        );

    let v1_routes = Router::new()
        .route("/donations", axum::routing::post(donations::submit_donation))
        .route("/donations/monetary", get(donations::monetary_links))
        .route("/goals", get(goals::current_goal))
        .route("/goals/{month}", get(goals::month_goal))
        .route("/gallery", get(gallery::gallery))
        .route("/media/{*key}", get(media::serve_media))
        .nest("/admin", admin_routes);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Registers the bearer scheme the admin routes use.
struct AdminKeyScheme;

impl Modify for AdminKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_key",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        donations::submit_donation,
        donations::monetary_links,
        donations::list_donor_names,
        donations::find_donations,
        donations::delete_donations,
        goals::current_goal,
        goals::month_goal,
        goals::admin_month_goal,
        goals::save_goal,
        gallery::gallery,
        gallery::list_images,
        gallery::upload_image,
        gallery::get_image,
        gallery::delete_image,
        media::serve_media,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            DonationRequest,
            StoredDonationRequest,
            SubmitDonationResponse,
            MonetaryDonationLinks,
            FoundDonationsResponse,
            DeleteDonationsResponse,
            Month,
            DonationGoal,
            GoalProgress,
            GoalView,
            SaveGoalRequest,
            GalleryImage,
            UploadImageResponse,
            ErrorResponse,
            Field,
            FieldError,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&AdminKeyScheme),
    tags(
        (name = "Donations", description = "Item donation requests and monetary payment links"),
        (name = "Goals", description = "Monthly donation goals and progress"),
        (name = "Gallery", description = "Gallery images and media links"),
        (name = "Admin", description = "Charity administration (bearer admin key)"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const ADMIN_KEY: &str = "test-admin-key";

    fn app() -> Router {
        router(AppState::in_memory().with_admin_key(ADMIN_KEY))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn admin(method: Method, uri: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
            .body(body)
            .unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::default());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn donation_flow_over_http() {
        let app = app();

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/v1/donations",
                json!({
                    "name": "Alice Smith",
                    "item": "Blankets",
                    "contact": "0831234567",
                    "email": "alice@mail.com"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let key = body["key"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            admin(Method::GET, "/v1/admin/donations?name=Alice%20Smith", Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["latest"], json!(key));
        assert_eq!(body["matches"][0]["item"], "Blankets");

        let (status, body) = send(
            &app,
            admin(Method::DELETE, "/v1/admin/donations?name=Alice%20Smith", Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "deleted": 1 }));
    }

    #[tokio::test]
    async fn monetary_links_are_public() {
        let (status, body) = send(
            &app(),
            Request::get("/v1/donations/monetary").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["debit_order_url"],
            "https://www.feedingthefurballs.org/payment-mandate.php"
        );
        assert!(body["zapper_url"].as_str().unwrap().starts_with("https://www.zapper.com/"));
    }

    #[tokio::test]
    async fn invalid_donation_reports_fields() {
        let (status, body) = send(
            &app(),
            json_request(
                Method::POST,
                "/v1/donations",
                json!({
                    "name": "",
                    "item": "Please Select an Item",
                    "contact": "0831234567",
                    "email": "bad@x"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "item", "email"]);
    }

    #[tokio::test]
    async fn goal_flow_over_http() {
        let app = app();

        let (status, body) = send(
            &app,
            Request::get("/v1/goals/march").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "month": "March", "goal": null, "progress": null }));

        let mut request = json_request(
            Method::PUT,
            "/v1/admin/goals/March",
            json!({ "monthly_donations": "500", "monthly_goal": "1000" }),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {ADMIN_KEY}").parse().unwrap(),
        );
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            &app,
            Request::get("/v1/goals/March").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(body["goal"]["monthly_goal"], "1000");
        assert_eq!(body["progress"]["remaining"], 500);
    }

    #[tokio::test]
    async fn gallery_flow_over_http() {
        let app = app();

        for name in ["a.jpg", "c.jpg", "b.jpg"] {
            let (status, body) = send(
                &app,
                admin(
                    Method::POST,
                    &format!("/v1/admin/gallery?name={name}"),
                    Body::from(vec![0xFF, 0xD8, 0xFF]),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["name"], name);
        }

        let (_, body) = send(
            &app,
            Request::get("/v1/gallery?limit=2").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(
            body,
            json!([
                { "name": "c.jpg", "url": "memory://images/c.jpg" },
                { "name": "b.jpg", "url": "memory://images/b.jpg" }
            ])
        );

        let (status, _) = send(&app, admin(Method::DELETE, "/v1/admin/gallery/c.jpg", Body::empty())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, admin(Method::GET, "/v1/admin/gallery", Body::empty())).await;
        assert_eq!(body, json!(["b.jpg", "a.jpg"]));
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let app = router(
            AppState::in_memory()
                .with_admin_key(ADMIN_KEY)
                .with_max_upload_bytes(4),
        );
        let response = app
            .oneshot(admin(
                Method::POST,
                "/v1/admin/gallery?name=big.jpg",
                Body::from(vec![0u8; 16]),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn admin_routes_require_key() {
        let (status, body) = send(
            &app(),
            Request::get("/v1/admin/donations/names").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "missing_auth_header");

        let closed = router(AppState::in_memory());
        let (status, _) = send(
            &closed,
            admin(Method::GET, "/v1/admin/gallery", Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = app()
            .oneshot(Request::get("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn openapi_lists_admin_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("admin_key"));
        assert!(doc.paths.paths.contains_key("/v1/donations"));
        assert!(doc.paths.paths.contains_key("/v1/donations/monetary"));
    }
}
