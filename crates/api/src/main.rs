use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roi_core::compare::{Comparison, ScenarioSet, ScenarioSource};
use roi_core::templates::{self, Template};
use roi_core::whatif::{WhatIf, WhatIfOutcome};
use roi_core::{RoiInput, RoiOutput};

mod projects;

const DEFAULT_PORT: u16 = 8007;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = roi_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match roi_core::storage::migrate(&pool).await {
                Ok(()) => Some(pool),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; project library disabled");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; project library disabled");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "DATABASE_URL missing; project library disabled");
            None
        }
    };

    let app = app(AppState { pool });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pool: Option<PgPool>,
}

impl AppState {
    fn pool(&self) -> Result<&PgPool, StatusCode> {
        self.pool.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/health", get(health))
        .route("/calculate", post(calculate))
        .route("/compare", post(compare))
        .route("/what-if", post(what_if))
        .route("/templates", get(list_templates))
        .route("/templates/:id", get(get_template))
        .merge(projects::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    database: bool,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        database: state.pool.is_some(),
    })
}

async fn calculate(Json(input): Json<RoiInput>) -> Json<RoiOutput> {
    let out = roi_core::evaluate(&input);
    tracing::info!(
        process = %input.process_name,
        frequency = input.frequency.as_str(),
        priority = out.priority.as_str(),
        priority_score = out.priority_score,
        "calculated roi"
    );
    Json(out)
}

#[derive(Debug, Deserialize)]
struct CompareRequest {
    #[serde(default)]
    base: Option<ScenarioSource>,
    #[serde(default)]
    best: Option<ScenarioSource>,
    #[serde(default)]
    worst: Option<ScenarioSource>,
}

#[derive(Debug, Serialize)]
struct CompareResponse {
    scenarios: ScenarioSet,
    comparison: Comparison,
}

async fn compare(
    Json(req): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, (StatusCode, String)> {
    let scenarios = ScenarioSet::from_sources(req.base, req.best, req.worst);
    let comparison = roi_core::compare::compare(&scenarios)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(CompareResponse {
        scenarios,
        comparison,
    }))
}

#[derive(Debug, Deserialize)]
struct WhatIfRequest {
    inputs: RoiInput,
    #[serde(default)]
    adjustments: WhatIf,
}

async fn what_if(Json(req): Json<WhatIfRequest>) -> Json<WhatIfOutcome> {
    Json(req.adjustments.run(&req.inputs))
}

async fn list_templates() -> Json<&'static [Template]> {
    Json(templates::TEMPLATES)
}

async fn get_template(Path(id): Path<String>) -> Result<Json<&'static Template>, StatusCode> {
    templates::find(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &roi_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn offline_app() -> Router {
        app(AppState { pool: None })
    }

    async fn send(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = offline_app().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn invoice_form() -> Value {
        json!({
            "process_name": "Invoice Processing",
            "frequency": "daily",
            "runs_per_period": "20",
            "hours_per_run": "0.25",
            "staff_count": "2",
            "hourly_rate": "24",
            "implementation_cost": "15000",
            "software_license_cost": "3600",
            "annual_maintenance_cost": "1200",
            "expected_labor_reduction": "75",
            "error_rate": "",
        })
    }

    #[tokio::test]
    async fn healthz_is_plain_ok() {
        let res = offline_app()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_missing_database() {
        let (status, body) = send("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "healthy", "database": false }));
    }

    #[tokio::test]
    async fn calculate_accepts_form_strings() {
        let (status, body) = send("POST", "/calculate", Some(invoice_form())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["annual_labor_cost"], json!(87600.0));
        assert_eq!(body["net_annual_savings"], json!(60900.0));
        assert_eq!(body["payback_period_months"], json!(3.9));
        assert_eq!(body["implementation_cost"], json!(19800.0));
        assert_eq!(body["priority"], "High");
        assert_eq!(body["priority_score"], 100);
    }

    #[tokio::test]
    async fn calculate_matches_local_engine() {
        let (_, body) = send("POST", "/calculate", Some(invoice_form())).await;
        let remote: RoiOutput = serde_json::from_value(body).unwrap();
        let input: RoiInput = serde_json::from_value(invoice_form()).unwrap();
        assert_eq!(remote, roi_core::evaluate(&input));
    }

    #[tokio::test]
    async fn calculate_rejects_non_object_body() {
        let (status, _) = send("POST", "/calculate", Some(json!([1, 2, 3]))).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn out_of_range_literal_is_rejected_while_string_defaults() {
        let raw = |body: &'static str| {
            Request::post("/calculate")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let res = offline_app()
            .oneshot(raw(r#"{"hourly_rate": 1e400, "staff_count": 1}"#))
            .await
            .unwrap();
        assert!(res.status().is_client_error());

        let res = offline_app()
            .oneshot(raw(r#"{"hourly_rate": "1e400", "staff_count": 1}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn compare_needs_two_scenarios() {
        let (status, _) = send("POST", "/compare", Some(json!({ "base": invoice_form() }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let mut worst = invoice_form();
        worst["expected_labor_reduction"] = json!(40);
        let (status, body) = send(
            "POST",
            "/compare",
            Some(json!({ "base": invoice_form(), "worst": worst })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["comparison"]["rows"][0]["best"], "base");
        assert!(body["scenarios"]["worst"]["results"].is_object());
    }

    #[tokio::test]
    async fn compare_accepts_a_returned_scenario_set() {
        let input: RoiInput = serde_json::from_value(invoice_form()).unwrap();
        let best = RoiInput {
            expected_labor_reduction: 90.0,
            ..input.clone()
        };
        let mut stored =
            serde_json::to_value(ScenarioSet::from_inputs(Some(input), Some(best), None)).unwrap();
        stored["base"]["results"]["annual_labor_cost"] = json!(1);

        let (status, body) = send("POST", "/compare", Some(stored)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenarios"]["base"]["results"]["annual_labor_cost"], json!(87600.0));
        assert_eq!(body["comparison"]["rows"][0]["best"], "best");
    }

    #[tokio::test]
    async fn what_if_reports_deltas() {
        let (status, body) = send(
            "POST",
            "/what-if",
            Some(json!({ "inputs": invoice_form(), "adjustments": { "staff_count": 4 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["adjusted"]["annual_labor_cost"], json!(175200.0));
        assert_eq!(body["deltas"]["net_annual_savings"], json!(65700.0));
    }

    #[tokio::test]
    async fn templates_are_listed_and_looked_up() {
        let (status, body) = send("GET", "/templates", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(templates::TEMPLATES.len()));

        let (status, body) = send("GET", "/templates/lead-routing", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["defaults"]["frequency"], "daily");

        let (status, _) = send("GET", "/templates/payroll", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn projects_are_unavailable_without_database() {
        let (status, _) = send("GET", "/projects", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = send(
            "POST",
            "/projects",
            Some(json!({ "inputs": invoice_form() })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = send(
            "DELETE",
            "/projects/6f1c1c57-5f3a-4f5e-9a55-0b8f0d1c2e3a",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn portfolio_routes_are_not_taken_for_project_ids() {
        let (status, _) = send("GET", "/projects/summary?sort=payback&order=asc", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let ids = json!({
            "ids": [
                "6f1c1c57-5f3a-4f5e-9a55-0b8f0d1c2e3a",
                "0b8f0d1c-2e3a-4f5e-9a55-6f1c1c575f3a",
            ]
        });
        let (status, _) = send("POST", "/projects/compare?format=csv", Some(ids)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn portfolio_summary_rejects_unknown_sort_keys() {
        let (status, _) = send("GET", "/projects/summary?sort=sideways", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
