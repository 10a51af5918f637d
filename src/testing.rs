//! Helpers for deterministic tests.
//!
//! [`ManualClock`] is a steppable [`mockable::Clock`], [`sample_png`]
//! synthesizes small portrait images for pipeline runs and [`finished_task`]
//! builds a completed task without running the pipeline.

use crate::task::domain::{
    AssetName, ColorName, DEFAULT_COLOR, NewTask, SpecCatalog, Task, TaskDomainError,
};
use crate::user::domain::UserId;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use image::{ImageError, ImageFormat, Rgb, RgbImage};
use mockable::Clock;
use std::io::Cursor;
use std::sync::{Arc, PoisonError, RwLock};

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// Creates a clock frozen at 2024-01-01T00:00:00Z.
    #[must_use]
    pub fn at_epoch() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default())
    }

    /// Moves the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += step;
    }

    /// Moves the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now = instant;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Encodes a `width`×`height` PNG with a light backdrop and a dark block.
///
/// # Errors
///
/// Returns [`ImageError`] when encoding fails.
pub fn sample_png(width: u32, height: u32) -> Result<Vec<u8>, ImageError> {
    let block_left = width.div_euclid(4);
    let block_top = height.div_euclid(4);
    let block_right = width.saturating_sub(block_left);
    let block_bottom = height.saturating_sub(block_top);
    let canvas = RgbImage::from_fn(width, height, |x, y| {
        if (block_left..block_right).contains(&x) && (block_top..block_bottom).contains(&y) {
            Rgb([40, 40, 60])
        } else {
            Rgb([230, 230, 230])
        }
    });
    let mut encoded = Cursor::new(Vec::new());
    canvas.write_to(&mut encoded, ImageFormat::Png)?;
    Ok(encoded.into_inner())
}

/// Builds a `passport` task that already finished on a white backdrop.
///
/// # Errors
///
/// Returns [`TaskDomainError`] when a lifecycle step is rejected.
pub fn finished_task(owner: Option<UserId>, clock: &impl Clock) -> Result<Task, TaskDomainError> {
    let spec = SpecCatalog.resolve("passport", 0, 0, 0);
    let white = ColorName::new(DEFAULT_COLOR)?;
    let mut task = Task::new(
        NewTask {
            owner,
            spec,
            source_ref: "uploads/finished.png".to_owned(),
            available_colors: vec![white.clone()],
        },
        clock,
    );
    let base = format!("memory://assets/{}", task.id());
    task.record_baseline(format!("{base}/{}", AssetName::baseline()), clock)?;
    let variant = format!("{base}/{}", AssetName::variant(&white));
    task.record_variant(white.clone(), variant, clock);
    task.complete(&white, clock)?;
    Ok(task)
}
