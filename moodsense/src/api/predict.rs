//! Mood prediction endpoint.
//!
//! `POST /predict` — multipart form with one audio file field. Runs the
//! decode → extract → classify pipeline and returns `{"mood": <label>}`.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::{
    audio,
    error::{ApiError, ApiResult},
    features, AppState,
};

/// Upper bound on uploaded clip size (bytes)
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Prediction response body
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub mood: String,
}

/// POST /predict
///
/// Accepts a multipart form body and classifies the first file field. The
/// whole pipeline runs on the blocking pool; decode failures are the
/// caller's problem (400), extraction/model failures are ours (500).
pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<PredictResponse>> {
    let mut upload: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let extension = field
            .file_name()
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_string()));

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;

        upload = Some((bytes.to_vec(), extension));
        break;
    }

    let (bytes, extension) =
        upload.ok_or_else(|| ApiError::BadRequest("missing audio file field".to_string()))?;

    tracing::debug!(bytes = bytes.len(), "Received audio upload");

    let classifier = state.classifier.clone();
    let result = tokio::task::spawn_blocking(move || {
        let signal = audio::decode_audio_bytes(&bytes, extension.as_deref())?;
        let vector = features::extract(&signal);
        let mood = classifier.predict(&vector)?;
        Ok::<String, ApiError>(mood)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("prediction task failed: {e}")))?;

    match result {
        Ok(mood) => {
            tracing::debug!(%mood, "Prediction complete");
            Ok(Json(PredictResponse { mood }))
        }
        Err(err) => {
            if let ApiError::Internal(message) = &err {
                *state.last_error.write().await = Some(message.clone());
            }
            Err(err)
        }
    }
}

/// Build prediction routes
pub fn predict_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
