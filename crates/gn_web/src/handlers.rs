use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use gn_inference::{ComfortProfile, ComfortQuery, ComfortReply, SpeechQuery};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn comfort(state: &AppState, profile: ComfortProfile, query: ComfortQuery) -> ApiResult<Json<ComfortReply>> {
    let reply = state.comfort()?.comfort(profile, &query).await?;
    Ok(Json(reply))
}

pub async fn gentle_comfort(
    State(state): State<AppState>,
    Json(query): Json<ComfortQuery>,
) -> ApiResult<Json<ComfortReply>> {
    comfort(&state, ComfortProfile::Gentle, query).await
}

pub async fn bible_comfort(
    State(state): State<AppState>,
    Json(query): Json<ComfortQuery>,
) -> ApiResult<Json<ComfortReply>> {
    comfort(&state, ComfortProfile::Bible, query).await
}

pub async fn philosophy_comfort(
    State(state): State<AppState>,
    Json(query): Json<ComfortQuery>,
) -> ApiResult<Json<ComfortReply>> {
    comfort(&state, ComfortProfile::Philosophy, query).await
}

pub async fn tts(
    State(state): State<AppState>,
    Json(query): Json<SpeechQuery>,
) -> ApiResult<impl IntoResponse> {
    let audio = state.speech()?.synthesize(&query).await?;
    let disposition = format!("inline; filename=\"speech.{}\"", audio.format.extension());
    Ok((
        [
            (header::CONTENT_TYPE, audio.media_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        audio.bytes,
    ))
}
