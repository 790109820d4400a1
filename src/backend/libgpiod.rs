use std::path::PathBuf;

use libgpiod::{chip::Chip, line, request};
use parking_lot::FairMutex;
use rustc_hash::FxHashMap;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::gpio::{GpioBackend, Level};

pub struct LibgpiodBackend {
    outputs: GpiodHandle,
    inputs: GpiodHandle,
}

struct GpiodHandle {
    request: FairMutex<request::Request>,
    lines: FxHashMap<u8, u32>, // index -> line offset
}

impl GpiodHandle {
    fn new(
        chip: &Chip,
        lines: FxHashMap<u8, u32>,
        settings: line::Settings,
    ) -> Result<Self, AppError> {
        let offsets: Vec<u32> = lines.values().copied().collect();
        let mut line_cfg =
            line::Config::new().map_err(|e| AppError::Gpio(format!("line config: {e}")))?;
        line_cfg
            .add_line_settings(&offsets, settings)
            .map_err(|e| AppError::Gpio(format!("line config add settings: {e}")))?;

        let request = Self::request_lines(chip, &line_cfg)?;
        Ok(Self {
            request: FairMutex::new(request),
            lines,
        })
    }

    fn request_lines(chip: &Chip, line_cfg: &line::Config) -> Result<request::Request, AppError> {
        let mut req_cfg =
            request::Config::new().map_err(|e| AppError::Gpio(format!("request config: {e}")))?;
        req_cfg
            .set_consumer(env!("CARGO_PKG_NAME"))
            .map_err(|e| AppError::Gpio(format!("request consumer: {e}")))?;
        chip.request_lines(Some(&req_cfg), line_cfg)
            .map_err(|e| AppError::Gpio(format!("request lines: {e}")))
    }

    fn offset(&self, index: u8) -> Result<u32, AppError> {
        self.lines
            .get(&index)
            .copied()
            .ok_or_else(|| AppError::Gpio(format!("no line mapped for index {index}")))
    }
}

impl LibgpiodBackend {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let chip = Self::open_chip(&config.gpio.chip)?;

        let output_lines = config
            .output_indices()
            .map(|i| (i, config.gpio.output_line(i)))
            .collect();
        let input_lines = (config.inputs.min..=config.inputs.max)
            .map(|i| (i, config.gpio.input_line(i)))
            .collect();

        let outputs = GpiodHandle::new(&chip, output_lines, Self::output_settings()?)?;
        let inputs = GpiodHandle::new(&chip, input_lines, Self::input_settings()?)?;

        Ok(Self { outputs, inputs })
    }

    fn open_chip(path: &str) -> Result<Chip, AppError> {
        let p = PathBuf::from(path);
        Chip::open(&p).map_err(|e| AppError::Gpio(format!("open chip {path}: {e}")))
    }

    fn output_settings() -> Result<line::Settings, AppError> {
        let mut ls =
            line::Settings::new().map_err(|e| AppError::Gpio(format!("libgpiod settings: {e}")))?;
        ls.set_direction(line::Direction::Output)
            .map_err(|e| AppError::Gpio(format!("set direction: {e}")))?;
        ls.set_drive(line::Drive::PushPull)
            .map_err(|e| AppError::Gpio(format!("set drive: {e}")))?;
        ls.set_output_value(line::Value::InActive)
            .map_err(|e| AppError::Gpio(format!("set output value: {e}")))?;
        Ok(ls)
    }

    fn input_settings() -> Result<line::Settings, AppError> {
        let mut ls =
            line::Settings::new().map_err(|e| AppError::Gpio(format!("libgpiod settings: {e}")))?;
        ls.set_direction(line::Direction::Input)
            .map_err(|e| AppError::Gpio(format!("set direction: {e}")))?;
        ls.set_bias(Some(line::Bias::PullUp))
            .map_err(|e| AppError::Gpio(format!("set bias: {e}")))?;
        Ok(ls)
    }
}

impl GpioBackend for LibgpiodBackend {
    fn write_output(&self, index: u8, level: Level) -> Result<(), AppError> {
        let offset = self.outputs.offset(index)?;
        let value = match level {
            Level::High => line::Value::Active,
            Level::Low => line::Value::InActive,
        };

        self.outputs
            .request
            .lock()
            .set_value(offset, value)
            .map_err(|e| AppError::Gpio(format!("set value: {e}")))?;
        Ok(())
    }

    fn read_input(&self, index: u8) -> Result<Level, AppError> {
        let offset = self.inputs.offset(index)?;

        let value = self
            .inputs
            .request
            .lock()
            .value(offset)
            .map_err(|e| AppError::Gpio(format!("get value: {e}")))?;
        Ok(match value {
            line::Value::InActive => Level::Low,
            line::Value::Active => Level::High,
        })
    }
}
