//! HTTP client for the photo-processing service.
//!
//! Each operation is a multipart `POST` carrying the image as `input_image`
//! plus form fields. Replies are JSON objects whose `status` may be a boolean
//! or a number.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::diagnostic_prefix;
use crate::task::{
    domain::{TaskSpec, TileSize},
    ports::{CutoutResponse, PhotoProcessor, PhotoProcessorError, PhotoProcessorResult, RenderResponse},
};

const CUTOUT_PATH: &str = "/idphoto";
const RECOLOR_PATH: &str = "/add_background";
const LAYOUT_PATH: &str = "/generate_layout_photos";

/// Photo processor reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPhotoProcessor {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProcessorReply {
    #[serde(default)]
    status: Option<serde_json::Value>,
    #[serde(default)]
    image_base64_standard: Option<String>,
    #[serde(default)]
    image_base64_hd: Option<String>,
    #[serde(default)]
    image_base64: Option<String>,
}

impl HttpPhotoProcessor {
    /// Creates a client for the service at `base_url` with a per-request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoProcessorError::Transport`] when the HTTP client cannot
    /// be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PhotoProcessorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PhotoProcessorError::transport)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    async fn post(&self, path: &str, form: Form) -> PhotoProcessorResult<ProcessorReply> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "calling photo processor");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(PhotoProcessorError::transport)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(PhotoProcessorError::transport)?;
        if !status.is_success() {
            return Err(PhotoProcessorError::Status {
                status: status.as_u16(),
                body_prefix: diagnostic_prefix(&body),
            });
        }
        serde_json::from_str(&body)
            .map_err(|_| PhotoProcessorError::InvalidResponse(diagnostic_prefix(&body)))
    }
}

fn image_part(image: &[u8], file_name: &'static str) -> Part {
    Part::bytes(image.to_vec()).file_name(file_name)
}

fn status_flag(status: Option<&serde_json::Value>) -> bool {
    match status {
        Some(serde_json::Value::Bool(flag)) => *flag,
        Some(serde_json::Value::Number(number)) => {
            number.as_i64().is_some_and(|value| value != 0)
                || number.as_u64().is_some_and(|value| value != 0)
                || number.as_f64().is_some_and(f64::is_normal)
        }
        _ => false,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|payload| !payload.trim().is_empty())
}

#[async_trait]
impl PhotoProcessor for HttpPhotoProcessor {
    async fn cutout(&self, image: &[u8], spec: &TaskSpec) -> PhotoProcessorResult<CutoutResponse> {
        let form = Form::new()
            .part("input_image", image_part(image, "input.jpg"))
            .text("height", spec.height_px.to_string())
            .text("width", spec.width_px.to_string())
            .text("hd", "true")
            .text("dpi", spec.dpi.to_string())
            .text("face_alignment", "true");
        let reply = self.post(CUTOUT_PATH, form).await?;
        Ok(CutoutResponse {
            ok: status_flag(reply.status.as_ref()),
            standard_image_b64: non_blank(reply.image_base64_standard),
            hd_image_b64: non_blank(reply.image_base64_hd),
        })
    }

    async fn recolor(
        &self,
        image: &[u8],
        color_hex: &str,
        dpi: u32,
    ) -> PhotoProcessorResult<RenderResponse> {
        let form = Form::new()
            .part("input_image", image_part(image, "rgba.png"))
            .text("color", color_hex.to_owned())
            .text("dpi", dpi.to_string());
        let reply = self.post(RECOLOR_PATH, form).await?;
        Ok(RenderResponse {
            ok: status_flag(reply.status.as_ref()),
            image_b64: non_blank(reply.image_base64),
        })
    }

    async fn compose_layout(
        &self,
        image: &[u8],
        tile: TileSize,
        dpi: u32,
        target_kb: u32,
    ) -> PhotoProcessorResult<RenderResponse> {
        let mut form = Form::new()
            .part("input_image", image_part(image, "input.jpg"))
            .text("height", tile.height.to_string())
            .text("width", tile.width.to_string())
            .text("dpi", dpi.to_string());
        if target_kb > 0 {
            form = form.text("kb", target_kb.to_string());
        }
        let reply = self.post(LAYOUT_PATH, form).await?;
        Ok(RenderResponse {
            ok: status_flag(reply.status.as_ref()),
            image_b64: non_blank(reply.image_base64),
        })
    }
}
