use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::dispatch::Controller;
use crate::gpio::GpioBackend;
use crate::timeout::TICK_MS;

pub fn spawn_tick_task<B: GpioBackend + 'static>(controller: Arc<Controller<B>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(TICK_MS as u64));
        // catch up after a stall so timers track wall-clock time
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        // first tick completes immediately
        ticker.tick().await;
        debug!("timeout scheduler started, period {TICK_MS} ms");

        loop {
            ticker.tick().await;
            controller.tick();
        }
    })
}
