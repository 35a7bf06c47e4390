use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use fhub::domain::config::ApiConfig;
use fhub_server::Server;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let server = Server::builder()
        .config(ApiConfig::default())
        .build()
        .await
        .expect("server should build");
    fhub_server::app(server.state().clone())
}

async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn post_feature(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/dashboardapi/features")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_then_fetch_feature() {
    let app = test_app().await;

    let payload = json!({ "name": "Checkout", "is_enabled": true, "description": null, "filters": [] });
    let response = app.clone().oneshot(post_feature(&payload)).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/dashboardapi/features/Checkout")
    );

    let response = app
        .oneshot(
            Request::get("/dashboardapi/features/Checkout").body(Body::empty()).expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["name"], "Checkout");
    assert_eq!(body["is_enabled"], true);
}

#[tokio::test]
async fn duplicate_create_conflicts() {
    let app = test_app().await;
    let payload = json!({ "name": "Dup", "is_enabled": false, "description": null, "filters": [] });

    let response = app.clone().oneshot(post_feature(&payload)).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(post_feature(&payload)).await.expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response.into_body()).await;
    assert!(body["message"].as_str().is_some_and(|m| m.contains("Dup")));
}

#[tokio::test]
async fn invalid_filter_parameters_are_bad_request() {
    let app = test_app().await;
    let payload = json!({
        "name": "Rollout",
        "is_enabled": true,
        "description": null,
        "filters": [{ "filter_type": "Percentage", "parameters": "{\"Value\":\"ten\"}" }]
    });

    let response = app.oneshot(post_feature(&payload)).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(
        body["message"],
        "Rollout filter parameters are not valid JSON for PercentageFilterSettings."
    );
}

#[tokio::test]
async fn delete_is_204_then_404() {
    let app = test_app().await;
    let payload = json!({ "name": "Temp", "is_enabled": true, "description": null, "filters": [] });
    let response = app.clone().oneshot(post_feature(&payload)).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri("/dashboardapi/features/Temp")
            .body(Body::empty())
            .expect("request")
    };
    let response = app.clone().oneshot(delete()).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(delete()).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn evaluation_is_total_over_names() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::get("/features/NoSuchFlag").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response.into_body()).await, json!(false));
}

#[tokio::test]
async fn filter_catalog_lists_builtins() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::get("/dashboardapi/filters").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    let names: Vec<&str> =
        body.as_array().expect("array").iter().filter_map(|f| f["name"].as_str()).collect();
    assert_eq!(names, ["Percentage", "TimeWindow"]);
}
