//! Port for the external photo-processing service.

use crate::task::domain::{TaskSpec, TileSize};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for photo processor calls.
pub type PhotoProcessorResult<T> = Result<T, PhotoProcessorError>;

/// Reply to a cutout request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoutResponse {
    /// Whether the processor accepted the image.
    pub ok: bool,
    /// Base64 cutout at the requested size.
    pub standard_image_b64: Option<String>,
    /// Base64 high-resolution cutout.
    pub hd_image_b64: Option<String>,
}

impl CutoutResponse {
    /// Returns the high-resolution payload, or the standard one when the
    /// high-resolution payload is absent or blank.
    #[must_use]
    pub fn preferred_payload(&self) -> Option<&str> {
        [self.hd_image_b64.as_deref(), self.standard_image_b64.as_deref()]
            .into_iter()
            .flatten()
            .find(|payload| !payload.trim().is_empty())
    }
}

/// Reply to a recolor or layout request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResponse {
    /// Whether the processor produced an image.
    pub ok: bool,
    /// Base64 rendered image.
    pub image_b64: Option<String>,
}

/// Remote photo-processing capability.
#[async_trait]
pub trait PhotoProcessor: Send + Sync {
    /// Removes the background of `image` and crops it to `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoProcessorError`] when the call cannot be completed.
    async fn cutout(&self, image: &[u8], spec: &TaskSpec) -> PhotoProcessorResult<CutoutResponse>;

    /// Renders a cutout on a solid background of `color_hex`.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoProcessorError`] when the call cannot be completed.
    async fn recolor(
        &self,
        image: &[u8],
        color_hex: &str,
        dpi: u32,
    ) -> PhotoProcessorResult<RenderResponse>;

    /// Renders a print sheet of `image` tiles.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoProcessorError`] when the call cannot be completed.
    async fn compose_layout(
        &self,
        image: &[u8],
        tile: TileSize,
        dpi: u32,
        target_kb: u32,
    ) -> PhotoProcessorResult<RenderResponse>;
}

/// Errors returned by photo processor adapters.
#[derive(Debug, Clone, Error)]
pub enum PhotoProcessorError {
    /// The request could not be sent or the reply could not be read.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The processor answered with a non-success HTTP status.
    #[error("processor returned status {status}: {body_prefix}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading characters of the response body.
        body_prefix: String,
    },

    /// The reply body is not the expected JSON shape.
    #[error("invalid processor response: {0}")]
    InvalidResponse(String),
}

impl PhotoProcessorError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
