use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use super::models::*;
use crate::cog::{Cog, ImageOptions};
use crate::config::ServerConfig;
use crate::encode::OutputFormat;
use crate::engine::CogEngine;
use crate::error::Error;
use crate::planner::ViewRequest;

/// Shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub engine: Arc<CogEngine>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(CogEngine::new()),
        }
    }
}

/// Error response with a JSON body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::SourceUnavailable { .. } => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        } else {
            warn!(status = %self.status, error = %self.message, "request rejected");
        }
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

pub async fn about() -> Json<String> {
    Json(format!("Cogserv (cogserv={})", env!("CARGO_PKG_VERSION")))
}

/// `GET /cogserv/{bucket}/{key}~/tile/{z}/{x}/{y}.{ext}` and
/// `GET /cogserv/{bucket}/{key}~/map.{ext}`
pub async fn render(
    State(state): State<AppState>,
    Path((bucket, rest)): Path<(String, String)>,
    Query(query): Query<RenderQuery>,
) -> Result<Response, ApiError> {
    let (key, target) = parse_render_path(&rest)
        .ok_or_else(|| ApiError::not_found(format!("No route for {}", rest)))?;

    let format: OutputFormat = target.ext().parse()?;
    let locator = state.config.locator(&bucket, &key)?;

    let view = match target {
        RenderTarget::Tile { z, x, y, .. } => ViewRequest::Tile { z, x, y },
        RenderTarget::Map { .. } => {
            let width = query.width.unwrap_or(state.config.overview_width);
            if width > state.config.max_overview_width {
                return Err(Error::Geometry(format!(
                    "Overview width {} exceeds the limit of {}",
                    width, state.config.max_overview_width
                ))
                .into());
            }
            ViewRequest::Overview { width }
        }
    };

    let options = ImageOptions {
        format,
        quality: query.quality.unwrap_or(state.config.quality),
        color: query.color_options(),
    };

    let engine = state.engine.clone();
    let image = tokio::task::spawn_blocking(move || {
        Cog::new(engine.as_ref(), locator.to_string_lossy()).render(view, &options)
    })
    .await
    .map_err(|e| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("Render task failed: {}", e),
    })??;

    Ok(([(header::CONTENT_TYPE, image.mime.to_string())], image.bytes).into_response())
}
