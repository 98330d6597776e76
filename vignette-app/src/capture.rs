//! Simulated environment capturer.
//!
//! Each request is served on its own worker thread after a fixed latency,
//! so replies arrive out of band the way a real capture service would.

use crossbeam_channel::Sender;
use std::thread;
use std::time::Duration;
use tracing::debug;
use vignette_stage::{CaptureOutcome, CaptureRequest, EnvironmentCapturer};

pub struct ThreadedCapturer {
    latency: Duration,
    fail: bool,
    issued: u64,
}

impl ThreadedCapturer {
    pub fn new(latency: Duration, fail: bool) -> Self {
        Self {
            latency,
            fail,
            issued: 0,
        }
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl EnvironmentCapturer for ThreadedCapturer {
    fn request(&mut self, request: CaptureRequest, reply: Sender<CaptureOutcome>) {
        self.issued += 1;
        let latency = self.latency;
        let fail = self.fail;
        thread::spawn(move || {
            thread::sleep(latency);
            let result = if fail {
                Err(format!("capture of {} rejected", request.source))
            } else {
                Ok(format!("envmap-{}", request.ticket.serial))
            };
            debug!("Capture {:?} finished", request.ticket);
            // The slot may be gone if the app exited first.
            let _ = reply.send(CaptureOutcome {
                ticket: request.ticket,
                result,
            });
        });
    }
}
