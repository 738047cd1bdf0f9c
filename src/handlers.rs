use crate::calendar::{build_calendar_month, parse_month, practice_days};
use crate::errors::AppError;
use crate::heatmap::build_heatmap;
use crate::models::{
    AnalyticsResponse, Attempt, CalendarMonth, CalendarQuery, DisciplineGroup, Heatmap,
    HeatmapQuery, LogAttemptRequest, NewRoutineRequest, Outcome, RoutineDetail, RoutineSummary,
    DEFAULT_DISCIPLINE,
};
use crate::registry::Registry;
use crate::report::Report;
use crate::state::AppState;
use crate::stats::{build_analytics, daily_counts, routine_detail, summarize};
use crate::storage::persist_registry;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

pub async fn list_routines(State(state): State<AppState>) -> Json<Vec<DisciplineGroup>> {
    let registry = state.registry.lock().await;
    let groups = registry
        .by_discipline()
        .into_iter()
        .map(|(discipline, routines)| {
            let mut routines: Vec<RoutineSummary> = routines.into_iter().map(summarize).collect();
            routines.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            DisciplineGroup {
                discipline: discipline.to_string(),
                routines,
            }
        })
        .collect();
    Json(groups)
}

pub async fn create_routine(
    State(state): State<AppState>,
    Json(payload): Json<NewRoutineRequest>,
) -> Result<(StatusCode, Json<RoutineSummary>), AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("routine name must not be empty"));
    }
    let discipline = payload
        .discipline
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DISCIPLINE);

    let mut registry = state.registry.lock().await;
    let mut next = registry.clone();
    let summary = summarize(next.add_routine(name, discipline));
    commit(&state, &mut registry, next).await?;

    info!("added routine {} ({})", summary.name, summary.discipline);
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn get_routine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoutineDetail>, AppError> {
    let registry = state.registry.lock().await;
    let routine = registry
        .get(id)
        .ok_or_else(|| AppError::not_found(format!("no routine with id {id}")))?;
    Ok(Json(routine_detail(routine, &Local)))
}

pub async fn delete_routine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut registry = state.registry.lock().await;
    let mut next = registry.clone();
    if let Some(removed) = next.delete_routine(id) {
        commit(&state, &mut registry, next).await?;
        info!(
            "deleted routine {} with {} attempts",
            removed.name,
            removed.attempts.len()
        );
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Unknown routine ids are accepted and ignored; the body is `null`.
pub async fn log_attempt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LogAttemptRequest>,
) -> Result<Json<Option<Attempt>>, AppError> {
    let outcome = Outcome::parse(&payload.outcome)
        .ok_or_else(|| AppError::bad_request("outcome must be 'success' or 'miss'"))?;

    let mut registry = state.registry.lock().await;
    let mut next = registry.clone();
    let logged = next.log_attempt(id, outcome, Utc::now()).cloned();
    match &logged {
        Some(_) => commit(&state, &mut registry, next).await?,
        None => debug!("ignored attempt for missing routine {id}"),
    }
    Ok(Json(logged))
}

/// Writes `next` to disk and only then makes it the live registry.
async fn commit(state: &AppState, current: &mut Registry, next: Registry) -> Result<(), AppError> {
    persist_registry(&state.data_path, &next).await?;
    *current = next;
    Ok(())
}

pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    let registry = state.registry.lock().await;
    Json(build_analytics(&registry))
}

pub async fn get_heatmap(
    State(state): State<AppState>,
    Query(query): Query<HeatmapQuery>,
) -> Json<Heatmap> {
    let weeks = query.weeks.unwrap_or(state.heatmap_weeks);
    let registry = state.registry.lock().await;
    let counts = daily_counts(&registry, &Local);
    Json(build_heatmap(&counts, today(), weeks))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarMonth>, AppError> {
    let today = today();
    let anchor = match query.month.as_deref() {
        Some(month) => parse_month(month)
            .ok_or_else(|| AppError::bad_request("month must look like YYYY-MM"))?,
        None => today,
    };

    let registry = state.registry.lock().await;
    let practice = practice_days(registry.all_attempts(), &Local);
    Ok(Json(build_calendar_month(anchor, &practice, today)))
}

pub async fn report_text(State(state): State<AppState>) -> String {
    let report = {
        let registry = state.registry.lock().await;
        Report::capture(&registry, Utc::now(), &Local)
    };
    report.render_text()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
