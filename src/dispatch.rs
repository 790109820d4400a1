use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;

use crate::config::{AppConfig, InputRange, MIN_OUTPUT};
use crate::error::AppError;
use crate::gpio::{GpioBackend, Level};
use crate::outputs::{OutputBank, OutputIndex, OutputStatus};
use crate::parse::{parse_numeric, parse_pair};
use crate::timeout::{TICK_MS, TimeoutEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Set,
    Clear,
    Toggle,
}

impl Primitive {
    fn apply<B: GpioBackend>(self, bank: &mut OutputBank<B>, index: OutputIndex) {
        match self {
            Primitive::Set => bank.apply_set(index),
            Primitive::Clear => bank.apply_clear(index),
            Primitive::Toggle => bank.apply_toggle(index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetInput,
    Immediate(Primitive),
    Timed(Primitive),
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::GetInput,
        Command::Immediate(Primitive::Set),
        Command::Immediate(Primitive::Toggle),
        Command::Immediate(Primitive::Clear),
        Command::Timed(Primitive::Set),
        Command::Timed(Primitive::Toggle),
        Command::Timed(Primitive::Clear),
    ];

    pub fn path(self) -> &'static str {
        match self {
            Command::GetInput => "/input/get",
            Command::Immediate(Primitive::Set) => "/output/set",
            Command::Immediate(Primitive::Toggle) => "/output/toggle",
            Command::Immediate(Primitive::Clear) => "/output/clear",
            Command::Timed(Primitive::Set) => "/output/timedset",
            Command::Timed(Primitive::Toggle) => "/output/timedtoggle",
            Command::Timed(Primitive::Clear) => "/output/timedclear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Done,
    Input(Level),
}

impl Reply {
    pub fn token(self) -> &'static str {
        match self {
            Reply::Done => "OK",
            Reply::Input(Level::High) => "1",
            Reply::Input(Level::Low) => "0",
        }
    }
}

pub struct Controller<B: GpioBackend> {
    bank: Mutex<OutputBank<B>>,
    inputs: InputRange,
    default_on: Vec<u8>,
    backend: Arc<B>,
}

impl<B: GpioBackend> Controller<B> {
    pub fn new(config: &AppConfig, backend: Arc<B>) -> Self {
        Self {
            bank: Mutex::new(OutputBank::new(config.relay_count, backend.clone())),
            inputs: config.inputs,
            default_on: config.default_on.clone(),
            backend,
        }
    }

    pub fn apply_defaults(&self) -> Result<(), AppError> {
        let mut bank = self.bank.lock();
        for &raw in &self.default_on {
            let index = bank.validate(i32::from(raw))?;
            bank.apply_set(index);
        }
        info!("relay node ready, outputs {MIN_OUTPUT}..={}", bank.max_output());
        Ok(())
    }

    pub fn execute(&self, command: Command, operand: &str) -> Result<Reply, AppError> {
        let result = match command {
            Command::GetInput => self.query_input(operand).map(Reply::Input),
            Command::Immediate(primitive) => self
                .run_immediate(primitive, operand)
                .map(|_| Reply::Done),
            Command::Timed(primitive) => {
                self.run_timed(primitive, operand).map(|_| Reply::Done)
            }
        };
        if let Err(e) = &result {
            warn!("Rejected {}/{operand}: {e}", command.path());
        }
        result
    }

    pub fn run_immediate(&self, primitive: Primitive, operand: &str) -> Result<(), AppError> {
        let (raw, _) = parse_numeric(operand)?;

        let mut bank = self.bank.lock();
        let index = bank.validate(raw)?;
        primitive.apply(&mut bank, index);
        Ok(())
    }

    pub fn run_timed(&self, primitive: Primitive, operand: &str) -> Result<(), AppError> {
        let (raw, duration_ms) = parse_pair(operand)?;

        let mut bank = self.bank.lock();
        let index = bank.validate(raw)?;
        if duration_ms <= TICK_MS {
            return Err(AppError::InvalidDuration(format!(
                "{duration_ms} ms, must exceed {TICK_MS} ms"
            )));
        }

        primitive.apply(&mut bank, index);
        bank.arm(index, duration_ms);
        Ok(())
    }

    pub fn query_input(&self, operand: &str) -> Result<Level, AppError> {
        let (raw, _) = parse_numeric(operand)?;
        if !self.inputs.contains(raw) {
            return Err(AppError::OutOfRange(format!(
                "input {raw} outside {}..={}",
                self.inputs.min, self.inputs.max
            )));
        }
        // range checked above, always fits
        self.backend.read_input(raw as u8)
    }

    pub fn tick(&self) {
        self.bank.lock().tick();
    }

    pub fn is_on(&self, raw: i32) -> Option<bool> {
        let bank = self.bank.lock();
        bank.validate(raw).ok().map(|index| bank.is_on(index))
    }

    pub fn timeout(&self, raw: i32) -> Option<TimeoutEntry> {
        let bank = self.bank.lock();
        bank.validate(raw).ok().map(|index| bank.timeout(index))
    }

    pub fn snapshot(&self) -> Vec<OutputStatus> {
        self.bank.lock().snapshot()
    }
}
