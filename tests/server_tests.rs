use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use heart_risk::{server, Model};
use std::path::Path;
use tower::ServiceExt;

fn create_test_app() -> Router {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/heart_disease_rf_model.json");
    let model = Model::load(&path).expect("test");
    server::router(server::AppState::new(model))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("test");
    String::from_utf8(bytes.to_vec()).expect("test")
}

const BASELINE_FORM: &str = "age=50&sex=male&cp=typical+angina&trestbps=120&chol=200&fbs=False\
&restecg=normal&thalach=150&exang=No&oldpeak=0.0&slope=upsloping&ca=0&thal=normal";

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("test")
}

fn json_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("test")
}

fn baseline_json() -> serde_json::Value {
    serde_json::json!({
        "age": 50, "sex": "male", "cp": "typical angina", "trestbps": 120, "chol": 200,
        "fbs": "False", "restecg": "normal", "thalach": 150, "exang": "No", "oldpeak": 0.0,
        "slope": "upsloping", "ca": 0, "thal": "normal"
    })
}

#[tokio::test]
async fn test_index_renders_form() {
    let app = create_test_app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("test"))
        .await
        .expect("test");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Heart Disease Risk Prediction"));
    assert!(html.contains("<form id=\"patient_form\""));
    assert!(html.contains(">Predict</button>"));
    assert!(!html.contains("class=\"banner"));
}

#[tokio::test]
async fn test_form_submission_low_risk() {
    let app = create_test_app();
    let response = app.oneshot(form_request(BASELINE_FORM)).await.expect("test");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("banner success"));
    assert!(html.contains("Low Risk of Heart Disease (Confidence: 0.78)"));
    // submitted values are kept in the form
    assert!(html.contains("<option value=\"False\" selected>"));
}

#[tokio::test]
async fn test_form_submission_high_risk() {
    let app = create_test_app();
    let body = BASELINE_FORM
        .replace("age=50", "age=65")
        .replace("cp=typical+angina", "cp=asymptomatic")
        .replace("ca=0", "ca=2")
        .replace("thal=normal", "thal=reversible+defect")
        .replace("exang=No", "exang=Yes");
    let response = app.oneshot(form_request(&body)).await.expect("test");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("banner warning"));
    assert!(html.contains("High Risk of Heart Disease (Confidence: 0.87)"));
}

#[tokio::test]
async fn test_form_out_of_range_rejected() {
    let app = create_test_app();
    let body = BASELINE_FORM.replace("chol=200", "chol=99");
    let response = app.oneshot(form_request(&body)).await.expect("test");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_string(response).await;
    assert!(html.contains("banner error"));
    assert!(html.contains("chol must be between 100 and 600"));
}

#[tokio::test]
async fn test_form_unknown_label_is_internal_error() {
    let app = create_test_app();
    let body = BASELINE_FORM.replace("sex=male", "sex=other");
    let response = app.oneshot(form_request(&body)).await.expect("test");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_string(response).await;
    assert!(!html.contains("Risk of Heart Disease"));
}

#[tokio::test]
async fn test_form_missing_field_rejected() {
    let app = create_test_app();
    let body = BASELINE_FORM.replace("&thal=normal", "");
    let response = app.oneshot(form_request(&body)).await.expect("test");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_json_prediction() {
    let app = create_test_app();
    let response = app.oneshot(json_request(baseline_json())).await.expect("test");

    assert_eq!(response.status(), StatusCode::OK);
    let out: serde_json::Value = serde_json::from_str(&body_string(response).await).expect("test");
    assert_eq!(out["prediction"], 0);
    assert_eq!(out["risk"], "low");
    let p = out["probability"].as_f64().expect("test");
    let c = out["confidence"].as_f64().expect("test");
    assert!((0.0..=1.0).contains(&p));
    assert_eq!(c, 1.0 - p);
    assert_eq!(out["message"], "Low Risk of Heart Disease (Confidence: 0.78)");
}

#[tokio::test]
async fn test_json_boundary_accepted_and_rejected() {
    let mut upper = baseline_json();
    upper["age"] = 120.into();
    upper["chol"] = 600.into();
    upper["oldpeak"] = 10.0.into();
    let response = create_test_app().oneshot(json_request(upper)).await.expect("test");
    assert_eq!(response.status(), StatusCode::OK);

    let mut under = baseline_json();
    under["age"] = 0.into();
    let response = create_test_app().oneshot(json_request(under)).await.expect("test");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let out: serde_json::Value = serde_json::from_str(&body_string(response).await).expect("test");
    assert!(out["error"].as_str().expect("test").contains("age"));
}

#[tokio::test]
async fn test_json_unknown_label_is_internal_error() {
    let mut body = baseline_json();
    body["slope"] = "sideways".into();
    let response = create_test_app().oneshot(json_request(body)).await.expect("test");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_form_unreadable_number_keeps_selections() {
    let app = create_test_app();
    let body = BASELINE_FORM
        .replace("age=50", "age=50.5")
        .replace("cp=typical+angina", "cp=asymptomatic")
        .replace("slope=upsloping", "slope=flat");
    let response = app.oneshot(form_request(&body)).await.expect("test");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_string(response).await;
    assert!(html.contains("banner error"));
    assert!(html.contains("age has an invalid value &quot;50.5&quot;"));
    assert!(html.contains("<option value=\"asymptomatic\" selected>"));
    assert!(html.contains("<option value=\"flat\" selected>"));
    assert!(html.contains("<option value=\"False\" selected>"));
    assert!(!html.contains("Risk of Heart Disease ("));
}
