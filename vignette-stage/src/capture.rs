//! Asynchronous environment capture.
//!
//! After a scene swap the stage asks an external capturer to build an
//! environment map from the scene's capture source. The capturer answers on a
//! channel whenever it is done; the stage drains that channel once per tick
//! and only applies an answer if it belongs to the most recent request.

use crate::StageError;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

/// Identifies one capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTicket {
    pub scene_index: usize,
    pub serial: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub ticket: CaptureTicket,
    pub source: String,
}

/// Capturer reply. `Ok` carries the renderer's reference to the captured map.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutcome {
    pub ticket: CaptureTicket,
    pub result: Result<String, String>,
}

/// Environment currently applied to the scene background and lighting.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    pub texture: String,
    pub source: String,
    pub scene_index: usize,
    pub background_blurriness: f32,
}

/// Something that can turn a capture source into an environment map.
///
/// Implementations must not block: send the outcome on `reply` when ready.
pub trait EnvironmentCapturer {
    fn request(&mut self, request: CaptureRequest, reply: Sender<CaptureOutcome>);
}

/// Owns the applied environment and the single outstanding request.
#[derive(Debug)]
pub struct EnvironmentSlot {
    current: Option<EnvironmentMap>,
    pending: Option<CaptureRequest>,
    next_serial: u64,
    blurriness: f32,
    tx: Sender<CaptureOutcome>,
    rx: Receiver<CaptureOutcome>,
}

impl EnvironmentSlot {
    pub fn new(blurriness: f32) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            current: None,
            pending: None,
            next_serial: 0,
            blurriness,
            tx,
            rx,
        }
    }

    /// Fire off a capture for `source`. Any earlier outstanding request
    /// becomes stale.
    pub fn request(
        &mut self,
        capturer: &mut dyn EnvironmentCapturer,
        scene_index: usize,
        source: &str,
    ) -> CaptureTicket {
        let ticket = CaptureTicket {
            scene_index,
            serial: self.next_serial,
        };
        self.next_serial += 1;

        let request = CaptureRequest {
            ticket,
            source: source.to_string(),
        };
        self.pending = Some(request.clone());
        debug!("Requesting environment capture {:?} from {}", ticket, source);
        capturer.request(request, self.tx.clone());
        ticket
    }

    /// Apply whatever replies have arrived. Returns true when the applied
    /// environment changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.rx.try_recv() {
            let Some(pending) = self.pending.as_ref().filter(|p| p.ticket == outcome.ticket)
            else {
                debug!("Discarding stale capture {:?}", outcome.ticket);
                continue;
            };

            match outcome.result {
                Ok(texture) => {
                    info!(
                        "Environment for scene {} applied from {}",
                        pending.ticket.scene_index, pending.source
                    );
                    self.current = Some(EnvironmentMap {
                        texture,
                        source: pending.source.clone(),
                        scene_index: pending.ticket.scene_index,
                        background_blurriness: self.blurriness,
                    });
                    changed = true;
                }
                Err(reason) => {
                    let err = StageError::CaptureFailure(reason);
                    warn!("{}; keeping previous environment", err);
                }
            }
            self.pending = None;
        }
        changed
    }

    pub fn current(&self) -> Option<&EnvironmentMap> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> Option<CaptureTicket> {
        self.pending.as_ref().map(|p| p.ticket)
    }
}
