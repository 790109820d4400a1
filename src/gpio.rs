use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(on: bool) -> Self {
        if on { Level::High } else { Level::Low }
    }
}

pub trait GpioBackend: Send + Sync {
    fn write_output(&self, index: u8, level: Level) -> Result<(), AppError>;
    fn read_input(&self, index: u8) -> Result<Level, AppError>;
}
