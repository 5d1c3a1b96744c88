use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::{collections::HashMap, sync::Arc};

use crate::error::AssessError;
use crate::form::{self, Banner};
use crate::model::Model;
use crate::pipeline::{self, Assessment};
use crate::presenter::RiskLevel;
use crate::types::PatientInput;

// ---------- Server state ----------

/// Process-wide state, built once in `main` after the model loads.
///
/// The model is never replaced or mutated; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<Model>,
}

impl AppState {
    pub fn new(model: Model) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .with_state(state)
}

// ---------- Response types ----------

#[derive(Serialize)]
struct PredictionOut {
    prediction: u8,
    probability: f64,
    risk: RiskLevel,
    confidence: f64,
    message: String,
}

impl From<Assessment> for PredictionOut {
    fn from(a: Assessment) -> Self {
        Self {
            prediction: a.prediction,
            probability: a.probability,
            risk: a.risk.level,
            confidence: a.risk.confidence,
            message: a.risk.message(),
        }
    }
}

fn status_of(err: &AssessError) -> StatusCode {
    if err.is_user_error() {
        tracing::warn!("rejected submission: {err}");
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        tracing::error!("internal failure: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn log_outcome(a: &Assessment) {
    tracing::info!(
        "prediction={} probability={:.4} risk={:?}",
        a.prediction,
        a.probability,
        a.risk.level
    );
}

// ---------- Handlers ----------

async fn index() -> Html<String> {
    Html(form::render_page(&PatientInput::default(), None))
}

async fn predict_form(
    State(state): State<AppState>,
    payload: Result<Form<HashMap<String, String>>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let Form(fields) = match payload {
        Ok(f) => f,
        Err(rej) => {
            tracing::warn!("unreadable form submission: {rej}");
            let page = form::render_page(&PatientInput::default(), Some(Banner::Error(&rej.body_text())));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page));
        }
    };

    let form::Submission { values: input, error } = form::read_submission(&fields);
    if let Some(err) = error {
        tracing::warn!("rejected submission: {err}");
        let page = form::render_page(&input, Some(Banner::Error(&err.to_string())));
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(page));
    }

    match pipeline::assess(&state.model, &input) {
        Ok(a) => {
            log_outcome(&a);
            let page = form::render_page(&input, Some(Banner::Result(&a.risk)));
            (StatusCode::OK, Html(page))
        }
        Err(e) => {
            let status = status_of(&e);
            let msg = if e.is_user_error() {
                e.to_string()
            } else {
                "Prediction failed due to an internal error.".to_string()
            };
            (status, Html(form::render_page(&input, Some(Banner::Error(&msg)))))
        }
    }
}

async fn predict_json(
    State(state): State<AppState>,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> Result<Json<PredictionOut>, (StatusCode, Json<serde_json::Value>)> {
    let Json(input) = payload.map_err(|rej| {
        tracing::warn!("unreadable JSON submission: {rej}");
        (rej.status(), Json(json!({ "error": rej.body_text() })))
    })?;

    let a = pipeline::assess(&state.model, &input)
        .map_err(|e| (status_of(&e), Json(json!({ "error": e.to_string() }))))?;
    log_outcome(&a);
    Ok(Json(a.into()))
}
