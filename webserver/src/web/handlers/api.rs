//! REST API handlers
//!
//! Every session-scoped endpoint resolves the path id to its `DesignSession`
//! and forwards the operation. Errors render through `WebServerError`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use std::sync::Arc;

use designer::{DesignTextGenerator, DesignerError, ImageSearchProvider};
use shared::{FormFieldsPatch, RoomPatch, SessionId};

use crate::error::WebServerResult;
use crate::state::{SharedSession, WebServerState};
use crate::types::{ApiResponse, CacheView, DesignView, FormView, HealthView, RoomView};

type AppState<G, S> = State<Arc<WebServerState<G, S>>>;

async fn resolve<G, S>(state: &WebServerState<G, S>, raw_id: &str) -> WebServerResult<SharedSession<G, S>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let id = SessionId::from_string(raw_id)?;
    state.session(&id).await
}

async fn form_view<G, S>(session: &SharedSession<G, S>) -> FormView
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    FormView::new(*session.id(), session.snapshot().await)
}

/// Health check - GET /health
pub async fn health<G, S>(State(state): AppState<G, S>) -> Json<ApiResponse<HealthView>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    Json(ApiResponse::ok(HealthView {
        server_status: "running".to_string(),
        active_sessions: state.session_count().await,
        uptime_seconds: state.uptime().as_secs(),
        server_time: Utc::now().timestamp(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Create a session - POST /api/sessions
pub async fn create_session<G, S>(State(state): AppState<G, S>) -> impl IntoResponse
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let session = state.create_session().await;
    (StatusCode::CREATED, Json(ApiResponse::ok(form_view(&session).await)))
}

/// Close a session and abort its pending submit - DELETE /api/sessions/:id
pub async fn close_session<G, S>(
    State(state): AppState<G, S>,
    Path(session_id): Path<String>,
) -> WebServerResult<StatusCode>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let id = SessionId::from_string(&session_id)?;
    state.close_session(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current form - GET /api/sessions/:id/form
pub async fn get_form<G, S>(
    State(state): AppState<G, S>,
    Path(session_id): Path<String>,
) -> WebServerResult<Json<ApiResponse<FormView>>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let session = resolve(&state, &session_id).await?;
    Ok(Json(ApiResponse::ok(form_view(&session).await)))
}

/// Patch scalar form fields - PATCH /api/sessions/:id/form
pub async fn update_form<G, S>(
    State(state): AppState<G, S>,
    Path(session_id): Path<String>,
    payload: Result<Json<FormFieldsPatch>, JsonRejection>,
) -> WebServerResult<Json<ApiResponse<FormView>>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let Json(patch) = payload?;
    let session = resolve(&state, &session_id).await?;
    session.update_fields(patch).await;
    Ok(Json(ApiResponse::ok(form_view(&session).await)))
}

/// Clear the form, keeping cached designs - DELETE /api/sessions/:id/form
pub async fn reset_form<G, S>(
    State(state): AppState<G, S>,
    Path(session_id): Path<String>,
) -> WebServerResult<Json<ApiResponse<FormView>>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let session = resolve(&state, &session_id).await?;
    session.reset().await;
    Ok(Json(ApiResponse::ok(form_view(&session).await)))
}

/// Append an empty room - POST /api/sessions/:id/rooms
pub async fn add_room<G, S>(
    State(state): AppState<G, S>,
    Path(session_id): Path<String>,
) -> WebServerResult<impl IntoResponse>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let session = resolve(&state, &session_id).await?;
    let index = session.add_room().await;
    let rooms = session.rooms().await;

    let view = RoomView {
        index,
        room: rooms.get(index).cloned().unwrap_or_default(),
        room_count: rooms.len(),
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

/// Patch one room - PATCH /api/sessions/:id/rooms/:index
pub async fn update_room<G, S>(
    State(state): AppState<G, S>,
    path: Result<Path<(String, usize)>, PathRejection>,
    payload: Result<Json<RoomPatch>, JsonRejection>,
) -> WebServerResult<Json<ApiResponse<RoomView>>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let Path((session_id, index)) = path?;
    let Json(patch) = payload?;
    let session = resolve(&state, &session_id).await?;
    let room = session.update_room(index, patch).await?;
    let room_count = session.rooms().await.len();
    Ok(Json(ApiResponse::ok(RoomView { index, room, room_count })))
}

/// Remove one room; later rooms shift down - DELETE /api/sessions/:id/rooms/:index
pub async fn remove_room<G, S>(
    State(state): AppState<G, S>,
    path: Result<Path<(String, usize)>, PathRejection>,
) -> WebServerResult<Json<ApiResponse<RoomView>>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let Path((session_id, index)) = path?;
    let session = resolve(&state, &session_id).await?;
    let room = session.remove_room(index).await?;
    let room_count = session.rooms().await.len();
    Ok(Json(ApiResponse::ok(RoomView { index, room, room_count })))
}

/// Generate (or fetch the cached) design - POST /api/sessions/:id/design
pub async fn submit_design<G, S>(
    State(state): AppState<G, S>,
    Path(session_id): Path<String>,
) -> WebServerResult<Json<ApiResponse<DesignView>>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let session = resolve(&state, &session_id).await?;
    let submission = session.submit().await?;
    Ok(Json(ApiResponse::ok(DesignView::from(submission))))
}

/// Most recent design - GET /api/sessions/:id/design
pub async fn latest_design<G, S>(
    State(state): AppState<G, S>,
    Path(session_id): Path<String>,
) -> WebServerResult<Json<ApiResponse<DesignView>>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let session = resolve(&state, &session_id).await?;
    let entry = session.latest().await.ok_or(DesignerError::NoResult)?;
    Ok(Json(ApiResponse::ok(DesignView::from_entry(entry, true))))
}

/// Markdown download of the latest design - GET /api/sessions/:id/export
pub async fn export_design<G, S>(
    State(state): AppState<G, S>,
    Path(session_id): Path<String>,
) -> WebServerResult<impl IntoResponse>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let session = resolve(&state, &session_id).await?;
    let document = session.export().await?;

    let headers = [
        (header::CONTENT_TYPE, format!("{}; charset=utf-8", document.mime_type)),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.file_name),
        ),
    ];
    Ok((headers, document.content))
}

/// Cache counters - GET /api/sessions/:id/cache
pub async fn cache_stats<G, S>(
    State(state): AppState<G, S>,
    Path(session_id): Path<String>,
) -> WebServerResult<Json<ApiResponse<CacheView>>>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    let session = resolve(&state, &session_id).await?;
    Ok(Json(ApiResponse::ok(CacheView {
        session_id: *session.id(),
        stats: session.cache_stats().await,
    })))
}
