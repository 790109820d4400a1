use std::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::error::AppError;
use crate::gpio::{GpioBackend, Level};

#[derive(Default)]
pub struct MockGpioBackend {
    outputs: RwLock<FxHashMap<u8, MockPinState>>, // keyed by output index
    inputs: RwLock<FxHashMap<u8, Level>>,         // keyed by input index
}

#[derive(Clone, Copy)]
struct MockPinState {
    level: Level,
    writes: usize,
}

impl MockGpioBackend {
    pub fn set_input(&self, index: u8, level: Level) -> Result<(), AppError> {
        let mut inputs = self
            .inputs
            .write()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;
        inputs.insert(index, level);
        Ok(())
    }

    pub fn output_level(&self, index: u8) -> Option<Level> {
        self.outputs
            .read()
            .ok()
            .and_then(|pins| pins.get(&index).map(|p| p.level))
    }

    pub fn write_count(&self, index: u8) -> usize {
        self.outputs
            .read()
            .ok()
            .and_then(|pins| pins.get(&index).map(|p| p.writes))
            .unwrap_or(0)
    }
}

impl GpioBackend for MockGpioBackend {
    fn write_output(&self, index: u8, level: Level) -> Result<(), AppError> {
        let mut pins = self
            .outputs
            .write()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;

        let pin = pins.entry(index).or_insert(MockPinState {
            level: Level::Low,
            writes: 0,
        });
        pin.level = level;
        pin.writes += 1;

        Ok(())
    }

    fn read_input(&self, index: u8) -> Result<Level, AppError> {
        let inputs = self
            .inputs
            .read()
            .map_err(|e| AppError::Gpio(format!("lock poisoned: {e}")))?;
        Ok(inputs.get(&index).copied().unwrap_or(Level::Low))
    }
}
