use std::{fs, ops::RangeInclusive, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// indices 0 and 1 are reserved
pub const MIN_OUTPUT: u8 = 2;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub unix_socket: Option<String>,
    pub host: Option<String>,
    pub path: String,
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum RelayCount {
    Two,
    Four,
    Eight,
}

impl RelayCount {
    pub fn get(self) -> u8 {
        match self {
            RelayCount::Two => 2,
            RelayCount::Four => 4,
            RelayCount::Eight => 8,
        }
    }

    pub fn max_output(self) -> u8 {
        self.get() + 1
    }
}

impl TryFrom<u8> for RelayCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(RelayCount::Two),
            4 => Ok(RelayCount::Four),
            8 => Ok(RelayCount::Eight),
            n => Err(format!("relay_count expected to be 2, 4 or 8, got {n}")),
        }
    }
}

impl From<RelayCount> for u8 {
    fn from(count: RelayCount) -> Self {
        count.get()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct InputRange {
    pub min: u8,
    pub max: u8,
}

impl InputRange {
    pub fn contains(&self, index: i32) -> bool {
        index >= i32::from(self.min) && index <= i32::from(self.max)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GpioConfig {
    pub chip: String,
    #[serde(default)]
    pub output_line_offset: u32,
    #[serde(default)]
    pub input_line_offset: u32,
}

impl GpioConfig {
    pub fn output_line(&self, index: u8) -> u32 {
        self.output_line_offset + u32::from(index)
    }

    pub fn input_line(&self, index: u8) -> u32 {
        self.input_line_offset + u32::from(index)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub relay_count: RelayCount,
    pub inputs: InputRange,
    #[serde(default)]
    pub default_on: Vec<u8>,
    pub gpio: GpioConfig,
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, AppError> {
        let config: AppConfig = serde_json::from_str(contents)
            .map_err(|e| AppError::Config(format!("Invalid config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn max_output(&self) -> u8 {
        self.relay_count.max_output()
    }

    pub fn output_indices(&self) -> RangeInclusive<u8> {
        MIN_OUTPUT..=self.max_output()
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.inputs.min > self.inputs.max {
            return Err(AppError::Config(format!(
                "input range {}..={} is empty",
                self.inputs.min, self.inputs.max
            )));
        }
        let max = self.max_output();
        if let Some(bad) = self
            .default_on
            .iter()
            .find(|i| !(MIN_OUTPUT..=max).contains(*i))
        {
            return Err(AppError::Config(format!(
                "default_on output {bad} outside {MIN_OUTPUT}..={max}"
            )));
        }

        let outputs = self.gpio.output_line(MIN_OUTPUT)..=self.gpio.output_line(max);
        let inputs = self.gpio.input_line(self.inputs.min)..=self.gpio.input_line(self.inputs.max);
        if outputs.start() <= inputs.end() && inputs.start() <= outputs.end() {
            return Err(AppError::Config(format!(
                "output lines {outputs:?} overlap input lines {inputs:?} on {}",
                self.gpio.chip
            )));
        }
        Ok(())
    }
}
