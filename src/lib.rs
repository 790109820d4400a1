pub mod backend;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gpio;
pub mod outputs;
pub mod parse;
pub mod routes;
pub mod scheduler;
pub mod timeout;

pub use config::{AppConfig, GpioConfig, HttpConfig, InputRange, MIN_OUTPUT, RelayCount};
pub use dispatch::{Command, Controller, Primitive, Reply};
pub use error::AppError;
pub use gpio::{GpioBackend, Level};
pub use outputs::{OutputBank, OutputIndex, OutputStatus};
pub use routes::AppState;
pub use timeout::{TICK_MS, TimeoutEntry};

#[cfg(feature = "hardware-gpio")]
pub use backend::LibgpiodBackend;
pub use backend::MockGpioBackend;
