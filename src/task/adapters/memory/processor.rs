//! Deterministic photo processor for tests and offline runs.
//!
//! Every call echoes the input image back as a base64 payload. Faults can be
//! scripted per operation to exercise the pipeline's failure paths.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{TaskSpec, TileSize},
    ports::{CutoutResponse, PhotoProcessor, PhotoProcessorError, PhotoProcessorResult, RenderResponse},
};

/// Photo processor operations that can be counted and scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorOperation {
    /// Background removal.
    Cutout,
    /// Background recoloring.
    Recolor,
    /// Print sheet rendering.
    ComposeLayout,
}

/// Scripted misbehavior for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFault {
    /// The call fails before a reply arrives.
    Transport,
    /// The processor replies with `ok = false`.
    Rejected,
    /// The processor replies `ok` with a payload that is not base64.
    MalformedPayload,
    /// The processor replies `ok` without any payload.
    EmptyPayload,
}

#[derive(Debug, Default)]
struct ProcessorState {
    calls: HashMap<ProcessorOperation, usize>,
    faults: HashMap<ProcessorOperation, ScriptedFault>,
    recolor_requests: Vec<String>,
}

/// In-memory [`PhotoProcessor`] implementation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPhotoProcessor {
    state: Arc<RwLock<ProcessorState>>,
}

const MALFORMED_PAYLOAD: &str = "data:image/png;base64,@@not*base64@@";

impl InMemoryPhotoProcessor {
    /// Creates a processor that succeeds on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `operation` call misbehave as `fault`.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoProcessorError::Transport`] when the state lock is
    /// poisoned.
    pub fn fail_with(
        &self,
        operation: ProcessorOperation,
        fault: ScriptedFault,
    ) -> PhotoProcessorResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state.faults.insert(operation, fault);
        Ok(())
    }

    /// Removes a scripted fault.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoProcessorError::Transport`] when the state lock is
    /// poisoned.
    pub fn heal(&self, operation: ProcessorOperation) -> PhotoProcessorResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state.faults.remove(&operation);
        Ok(())
    }

    /// Returns how many times `operation` was called.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoProcessorError::Transport`] when the state lock is
    /// poisoned.
    pub fn call_count(&self, operation: ProcessorOperation) -> PhotoProcessorResult<usize> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.calls.get(&operation).copied().unwrap_or_default())
    }

    /// Returns the hex colors requested from `recolor`, in call order.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoProcessorError::Transport`] when the state lock is
    /// poisoned.
    pub fn recolor_requests(&self) -> PhotoProcessorResult<Vec<String>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.recolor_requests.clone())
    }

    fn begin_call(
        &self,
        operation: ProcessorOperation,
    ) -> PhotoProcessorResult<Option<ScriptedFault>> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        let count = state.calls.entry(operation).or_default();
        *count = count.saturating_add(1);
        Ok(state.faults.get(&operation).copied())
    }

    fn render(&self, operation: ProcessorOperation, image: &[u8]) -> PhotoProcessorResult<RenderResponse> {
        match self.begin_call(operation)? {
            None => Ok(RenderResponse {
                ok: true,
                image_b64: Some(STANDARD.encode(image)),
            }),
            Some(fault) => scripted_render(operation, fault),
        }
    }
}

#[async_trait]
impl PhotoProcessor for InMemoryPhotoProcessor {
    async fn cutout(&self, image: &[u8], _spec: &TaskSpec) -> PhotoProcessorResult<CutoutResponse> {
        match self.begin_call(ProcessorOperation::Cutout)? {
            None => {
                let encoded = STANDARD.encode(image);
                Ok(CutoutResponse {
                    ok: true,
                    standard_image_b64: Some(encoded.clone()),
                    hd_image_b64: Some(encoded),
                })
            }
            Some(ScriptedFault::Transport) => Err(scripted_transport(ProcessorOperation::Cutout)),
            Some(ScriptedFault::Rejected) => Ok(CutoutResponse::default()),
            Some(ScriptedFault::MalformedPayload) => Ok(CutoutResponse {
                ok: true,
                standard_image_b64: None,
                hd_image_b64: Some(MALFORMED_PAYLOAD.to_owned()),
            }),
            Some(ScriptedFault::EmptyPayload) => Ok(CutoutResponse {
                ok: true,
                ..CutoutResponse::default()
            }),
        }
    }

    async fn recolor(
        &self,
        image: &[u8],
        color_hex: &str,
        _dpi: u32,
    ) -> PhotoProcessorResult<RenderResponse> {
        {
            let mut state = self.state.write().map_err(|err| lock_error(&err))?;
            state.recolor_requests.push(color_hex.to_owned());
        }
        self.render(ProcessorOperation::Recolor, image)
    }

    async fn compose_layout(
        &self,
        image: &[u8],
        _tile: TileSize,
        _dpi: u32,
        _target_kb: u32,
    ) -> PhotoProcessorResult<RenderResponse> {
        self.render(ProcessorOperation::ComposeLayout, image)
    }
}

fn scripted_render(
    operation: ProcessorOperation,
    fault: ScriptedFault,
) -> PhotoProcessorResult<RenderResponse> {
    match fault {
        ScriptedFault::Transport => Err(scripted_transport(operation)),
        ScriptedFault::Rejected => Ok(RenderResponse::default()),
        ScriptedFault::MalformedPayload => Ok(RenderResponse {
            ok: true,
            image_b64: Some(MALFORMED_PAYLOAD.to_owned()),
        }),
        ScriptedFault::EmptyPayload => Ok(RenderResponse {
            ok: true,
            image_b64: None,
        }),
    }
}

fn scripted_transport(operation: ProcessorOperation) -> PhotoProcessorError {
    PhotoProcessorError::transport(std::io::Error::other(format!(
        "scripted transport failure during {operation:?}"
    )))
}

fn lock_error(err: &impl std::fmt::Display) -> PhotoProcessorError {
    PhotoProcessorError::transport(std::io::Error::other(err.to_string()))
}
