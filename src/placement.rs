//! Placement of a single pixel: validate, check the cooldown, commit.
//!
//! The canvas write happens before the cooldown is advanced, so a placement
//! that fails to land never costs the identity a window.
//!
//! Two concurrent requests from the same identity can both pass the cooldown
//! check before either advances it. Both then commit and the later advance
//! overwrites the earlier one. Requests are never rejected wrongly, but a
//! racing identity may place twice inside one window.

use std::sync::Arc;

use crate::canvas::{Canvas, CanvasStore, Color};
use crate::cooldown::{CooldownLedger, CooldownStatus};
use crate::error::PlaceError;
use crate::store::DocumentStore;

pub struct PlacementCoordinator {
    canvas: CanvasStore,
    ledger: CooldownLedger,
    interval_ms: i64,
}

impl PlacementCoordinator {
    pub fn new(canvas: CanvasStore, ledger: CooldownLedger, interval_ms: i64) -> Self {
        Self {
            canvas,
            ledger,
            interval_ms,
        }
    }

    /// Build the canvas store and ledger over one shared backing store
    pub fn with_store(
        store: Arc<dyn DocumentStore>,
        size: usize,
        default_color: Color,
        interval_ms: i64,
    ) -> Self {
        Self::new(
            CanvasStore::new(Arc::clone(&store), size, default_color),
            CooldownLedger::new(store),
            interval_ms,
        )
    }

    pub fn canvas_size(&self) -> usize {
        self.canvas.size()
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    /// Current grid snapshot
    pub async fn canvas(&self, now: i64) -> Result<Canvas, PlaceError> {
        Ok(self.canvas.read_all(now).await?)
    }

    pub async fn cooldown_status(
        &self,
        identity: &str,
        now: i64,
    ) -> Result<CooldownStatus, PlaceError> {
        Ok(self.ledger.status(identity, now).await?)
    }

    /// Paint one cell and return the identity's new cooldown deadline
    pub async fn place_pixel(
        &self,
        identity: &str,
        x: i64,
        y: i64,
        color: &str,
        now: i64,
    ) -> Result<i64, PlaceError> {
        if identity.trim().is_empty() {
            return Err(PlaceError::InvalidInput("identity must not be empty".into()));
        }

        let size = self.canvas.size();
        if !Canvas::contains(size, x, y) {
            return Err(PlaceError::OutOfBounds { x, y, size });
        }

        let color = Color::parse(color)?;

        let cooldown_end = self.ledger.get_cooldown_end(identity, now).await?;
        if let CooldownStatus::Waiting { remaining_ms } = CooldownStatus::at(cooldown_end, now) {
            tracing::debug!("{} blocked for another {} ms", identity, remaining_ms);
            return Err(PlaceError::CooldownActive { remaining_ms });
        }

        self.canvas.write_cell(x, y, &color, identity, now).await?;

        let new_end = self
            .ledger
            .advance_cooldown(identity, self.interval_ms, now)
            .await?;

        tracing::info!("{} placed {} at ({}, {})", identity, color, x, y);
        Ok(new_end)
    }
}
