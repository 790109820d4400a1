use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::config::{MIN_OUTPUT, RelayCount};
use crate::error::AppError;
use crate::gpio::{GpioBackend, Level};
use crate::timeout::{TimeoutEntry, TimeoutRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputIndex(u8);

impl OutputIndex {
    pub fn get(self) -> u8 {
        self.0
    }

    fn slot(self) -> usize {
        usize::from(self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputStatus {
    pub index: u8,
    pub on: bool,
    pub timeout: TimeoutEntry,
}

pub struct OutputBank<B: GpioBackend> {
    on: Vec<bool>,
    timeouts: TimeoutRegistry,
    max_output: u8,
    backend: Arc<B>,
}

impl<B: GpioBackend> OutputBank<B> {
    pub fn new(relay_count: RelayCount, backend: Arc<B>) -> Self {
        // slots 0 and 1 are never addressed
        let slots = usize::from(relay_count.get()) + 2;
        Self {
            on: vec![false; slots],
            timeouts: TimeoutRegistry::new(slots),
            max_output: relay_count.max_output(),
            backend,
        }
    }

    pub fn max_output(&self) -> u8 {
        self.max_output
    }

    pub fn validate(&self, raw: i32) -> Result<OutputIndex, AppError> {
        if raw < i32::from(MIN_OUTPUT) || raw > i32::from(self.max_output) {
            return Err(AppError::OutOfRange(format!(
                "output {raw} outside {MIN_OUTPUT}..={}",
                self.max_output
            )));
        }
        // range checked above, always fits
        Ok(OutputIndex(raw as u8))
    }

    pub fn is_on(&self, index: OutputIndex) -> bool {
        self.on[index.slot()]
    }

    pub fn timeout(&self, index: OutputIndex) -> TimeoutEntry {
        self.timeouts.get(index.slot()).unwrap_or_default()
    }

    pub fn apply_set(&mut self, index: OutputIndex) {
        info!("Setting output {}", index.get());
        self.write(index, true);
    }

    pub fn apply_clear(&mut self, index: OutputIndex) {
        info!("Clearing output {}", index.get());
        self.write(index, false);
    }

    pub fn apply_toggle(&mut self, index: OutputIndex) {
        info!("Toggling output {}", index.get());
        let on = !self.on[index.slot()];
        self.write(index, on);
    }

    /// Starts a countdown after which the output toggles. Callers reject
    /// durations of 100 ms or less before getting here.
    pub fn arm(&mut self, index: OutputIndex, duration_ms: i32) {
        info!(
            "Starting {duration_ms} ms timeout on output {}",
            index.get()
        );
        self.timeouts.arm(index.slot(), duration_ms);
    }

    pub fn tick(&mut self) {
        for raw in MIN_OUTPUT..=self.max_output {
            let index = OutputIndex(raw);
            if self.timeouts.advance(index.slot()) {
                info!("Timeout finished on output {raw}");
                // expiry always toggles, whatever armed the timer
                self.apply_toggle(index);
            }
        }
    }

    pub fn snapshot(&self) -> Vec<OutputStatus> {
        (MIN_OUTPUT..=self.max_output)
            .map(OutputIndex)
            .map(|index| OutputStatus {
                index: index.get(),
                on: self.is_on(index),
                timeout: self.timeout(index),
            })
            .collect()
    }

    fn write(&mut self, index: OutputIndex, on: bool) {
        self.on[index.slot()] = on;
        self.timeouts.deactivate(index.slot());
        if let Err(e) = self.backend.write_output(index.get(), Level::from(on)) {
            warn!("Failed to drive output {}: {e}", index.get());
        }
    }
}
