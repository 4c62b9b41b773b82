use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roi_core::domain::project::{NewProject, Project, ProjectUpdate};
use roi_core::portfolio::{self, SortKey, SortOrder, Summary};
use roi_core::storage::projects as store;

use crate::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/:id/duplicate", post(duplicate_project))
        .route("/projects/summary", get(portfolio_summary))
        .route("/projects/compare", post(compare_projects))
}

fn internal(e: anyhow::Error) -> StatusCode {
    sentry_anyhow::capture_anyhow(&e);
    tracing::error!(error = %e, "project library request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, StatusCode> {
    let pool = state.pool()?;
    let projects = store::list(pool).await.map_err(internal)?;
    Ok(Json(projects))
}

async fn create_project(
    State(state): State<AppState>,
    Json(new): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), StatusCode> {
    let pool = state.pool()?;
    let project = Project::create(new, chrono::Utc::now());
    store::insert(pool, &project).await.map_err(internal)?;

    tracing::info!(project_id = %project.id, name = %project.name, "project saved");
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, StatusCode> {
    let pool = state.pool()?;
    let project = store::fetch(pool, id)
        .await
        .map_err(internal)?
        .ok_or(StatusCode::NOT_FOUND)?;
    if !project.is_consistent() {
        tracing::warn!(project_id = %id, "stored results differ from re-evaluated inputs");
    }
    Ok(Json(project))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProjectUpdate>,
) -> Result<Json<Project>, StatusCode> {
    let pool = state.pool()?;
    let mut project = store::fetch(pool, id)
        .await
        .map_err(internal)?
        .ok_or(StatusCode::NOT_FOUND)?;

    project.apply_update(update, chrono::Utc::now());
    if !store::update(pool, &project).await.map_err(internal)? {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let pool = state.pool()?;
    if store::delete(pool, id).await.map_err(internal)? {
        tracing::info!(project_id = %id, "project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn duplicate_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Project>), StatusCode> {
    let pool = state.pool()?;
    let original = store::fetch(pool, id)
        .await
        .map_err(internal)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let copy = original.duplicate(chrono::Utc::now());
    store::insert(pool, &copy).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(copy)))
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    #[serde(default)]
    sort: SortKey,
    #[serde(default)]
    order: SortOrder,
}

#[derive(Debug, Serialize)]
struct PortfolioView {
    summary: Summary,
    projects: Vec<Project>,
}

async fn portfolio_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<PortfolioView>, StatusCode> {
    let pool = state.pool()?;
    let mut projects = store::list(pool).await.map_err(internal)?;
    portfolio::sort(&mut projects, query.sort, query.order);
    Ok(Json(PortfolioView {
        summary: portfolio::summarize(&projects),
        projects,
    }))
}

#[derive(Debug, Deserialize)]
struct CompareProjectsRequest {
    ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    #[serde(default)]
    format: ExportFormat,
}

async fn compare_projects(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    Json(req): Json<CompareProjectsRequest>,
) -> Result<Response, StatusCode> {
    let pool = state.pool()?;
    let found = store::fetch_many(pool, &req.ids).await.map_err(internal)?;
    let projects = portfolio::pick_in_order(found, &req.ids).map_err(|missing| {
        tracing::info!(?missing, "compare requested unknown projects");
        StatusCode::NOT_FOUND
    })?;

    let comparison = portfolio::compare_projects(&projects).map_err(|e| {
        tracing::info!(error = %e, "project comparison rejected");
        StatusCode::UNPROCESSABLE_ENTITY
    })?;

    match query.format {
        ExportFormat::Json => Ok(Json(comparison).into_response()),
        ExportFormat::Csv => {
            let body = comparison.to_csv().map_err(internal)?;
            Ok(csv_attachment(body))
        }
    }
}

fn csv_attachment(body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", portfolio::CSV_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response()
}
