//! Project library persisted in Postgres. Records are stored verbatim as JSONB.

use crate::compare::ScenarioSet;
use crate::domain::input::RoiInput;
use crate::domain::output::RoiOutput;
use crate::domain::project::Project;
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

type ProjectRow = (
    Uuid,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    Json<RoiInput>,
    Json<RoiOutput>,
    Json<ScenarioSet>,
);

const SELECT_COLUMNS: &str =
    "SELECT id, name, created_at, updated_at, inputs, results, scenarios FROM projects";

fn from_row(row: ProjectRow) -> Project {
    let (id, name, created, updated, inputs, results, scenarios) = row;
    Project {
        id,
        name,
        created,
        updated,
        inputs: inputs.0,
        results: results.0,
        scenarios: scenarios.0,
    }
}

pub async fn insert(pool: &sqlx::PgPool, project: &Project) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO projects (id, name, created_at, updated_at, inputs, results, scenarios) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(project.id)
    .bind(&project.name)
    .bind(project.created)
    .bind(project.updated)
    .bind(Json(&project.inputs))
    .bind(Json(&project.results))
    .bind(Json(&project.scenarios))
    .execute(pool)
    .await
    .with_context(|| format!("insert project failed (id={})", project.id))?;
    Ok(())
}

pub async fn fetch(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<Option<Project>> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("fetch project failed (id={id})"))?;
    Ok(row.map(from_row))
}

/// Newest first.
pub async fn list(pool: &sqlx::PgPool) -> anyhow::Result<Vec<Project>> {
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "{SELECT_COLUMNS} ORDER BY created_at DESC, id ASC"
    ))
    .fetch_all(pool)
    .await
    .context("list projects failed")?;
    Ok(rows.into_iter().map(from_row).collect())
}

/// Projects among `ids`, in no particular order. Unknown ids are skipped.
pub async fn fetch_many(pool: &sqlx::PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Project>> {
    let rows = sqlx::query_as::<_, ProjectRow>(&format!("{SELECT_COLUMNS} WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(pool)
        .await
        .with_context(|| format!("fetch projects failed ({} ids)", ids.len()))?;
    Ok(rows.into_iter().map(from_row).collect())
}

/// Returns false when no project has this id.
pub async fn update(pool: &sqlx::PgPool, project: &Project) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "UPDATE projects \
         SET name = $2, updated_at = $3, inputs = $4, results = $5, scenarios = $6 \
         WHERE id = $1",
    )
    .bind(project.id)
    .bind(&project.name)
    .bind(project.updated)
    .bind(Json(&project.inputs))
    .bind(Json(&project.results))
    .bind(Json(&project.scenarios))
    .execute(pool)
    .await
    .with_context(|| format!("update project failed (id={})", project.id))?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("delete project failed (id={id})"))?;
    Ok(res.rows_affected() > 0)
}
