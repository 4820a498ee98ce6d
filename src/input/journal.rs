use crate::capture::Resolution;
use crate::error::{RelayError, RelayResult};
use crate::input::types::{MouseButton, PointerAction, RecordedAction};
use crate::input::InputInjector;
use chrono::Utc;
use parking_lot::Mutex as ParkingMutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Records injected actions in memory
///
/// Button actions are always kept. A run of consecutive pointer moves is
/// collapsed into its latest position, so the journal grows with the number
/// of button actions rather than with the frame count.
///
/// Clones share the same journal, so a handle kept by the caller still sees
/// actions recorded after the injector was moved into the server.
#[derive(Clone)]
pub struct JournalInjector {
    screen: Resolution,
    start_time: Instant,
    actions: Arc<ParkingMutex<Vec<RecordedAction>>>,
}

impl JournalInjector {
    pub fn new(screen: Resolution) -> Self {
        Self {
            screen,
            start_time: Instant::now(),
            actions: Arc::new(ParkingMutex::new(Vec::new())),
        }
    }

    fn record(&self, action: PointerAction) {
        tracing::debug!("inject {:?}", action);
        let entry = RecordedAction {
            action,
            process_time_ms: self.start_time.elapsed().as_secs_f64() * 1000.0,
            recorded_at: Utc::now(),
        };

        let mut actions = self.actions.lock();
        let is_move = |a: &PointerAction| matches!(a, PointerAction::Move { .. });
        if is_move(&action) && actions.last().is_some_and(|last| is_move(&last.action)) {
            actions.pop();
        }
        actions.push(entry);
    }

    pub fn actions(&self) -> Vec<RecordedAction> {
        self.actions.lock().clone()
    }

    /// Recorded actions other than pointer moves
    pub fn button_actions(&self) -> Vec<PointerAction> {
        self.actions
            .lock()
            .iter()
            .map(|r| r.action)
            .filter(|a| !matches!(a, PointerAction::Move { .. }))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.actions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.lock().is_empty()
    }

    /// Write the journal as pretty JSON
    pub fn flush_to_disk(&self, path: &Path) -> RelayResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(&*self.actions.lock())
            .map_err(|e| RelayError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        std::fs::write(path, data)?;

        tracing::info!("Wrote {} injected actions to {}", self.len(), path.display());
        Ok(())
    }
}

impl InputInjector for JournalInjector {
    fn pointer_move(&mut self, x: i32, y: i32) {
        self.record(PointerAction::Move { x, y });
    }

    fn button_down(&mut self) {
        self.record(PointerAction::ButtonDown);
    }

    fn button_up(&mut self) {
        self.record(PointerAction::ButtonUp);
    }

    fn click(&mut self, button: MouseButton) {
        self.record(PointerAction::Click { button });
    }

    fn double_click(&mut self) {
        self.record(PointerAction::DoubleClick);
    }

    fn screen_size(&self) -> Resolution {
        self.screen
    }
}
