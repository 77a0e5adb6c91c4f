//! Simulated Grove-kit board driver.
//!
//! Stands in for the physical driver layer during development and testing:
//! series sensors are sampled on an interval, actuators track their level and
//! honor the auto-revert `duration` option, and discrete inputs surface as
//! board events. Mirrors the board contract exactly: one `Ready` event after
//! initialization, then `Sensor` events for the lifetime of the process.

use super::{BoardEvent, CommandOptions, HardwareBridge, Reading, ReadingValue, SensorStatus};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

const ADC_MAX: f64 = 1023.0;
const ROTARY_FULL_ANGLE: f64 = 300.0;

const SERIES_SENSORS: [&str; 4] = ["sound", "light", "rotary", "temperature"];
const ACTUATORS: [&str; 3] = ["buzzer", "led", "relay"];
const EVENT_INPUTS: [&str; 2] = ["button", "touch"];

/// Ticks between simulated button press/release cycles.
const BUTTON_EVENT_EVERY: u64 = 15;

struct BoardInner {
    cells: Mutex<HashMap<String, Reading>>,
    /// Pending auto-revert tasks, one slot per actuator. Rescheduling aborts
    /// the previous task before spawning the replacement.
    revert_timers: Mutex<HashMap<String, JoinHandle<()>>>,
    events: mpsc::Sender<BoardEvent>,
}

impl BoardInner {
    fn set_level(&self, actuator: &str, level: f64) {
        let mut cells = self.cells.lock();
        cells.insert(
            actuator.to_string(),
            Reading {
                value: Some(ReadingValue::Number(level)),
                status: SensorStatus::On,
                time: Utc::now(),
            },
        );
    }
}

/// In-process board driver implementing [`HardwareBridge`].
///
/// Cloning is cheap and shares the underlying board state.
#[derive(Clone)]
pub struct SimulatedBoard {
    inner: Arc<BoardInner>,
}

impl SimulatedBoard {
    /// Create the board and the event channel the gateway will consume.
    pub fn new() -> (Self, mpsc::Receiver<BoardEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let board = Self {
            inner: Arc::new(BoardInner {
                cells: Mutex::new(HashMap::new()),
                revert_timers: Mutex::new(HashMap::new()),
                events: tx,
            }),
        };
        (board, rx)
    }

    /// Initialize the sensor cells, emit `Ready`, then sample the series
    /// sensors on the given interval for the lifetime of the process.
    pub fn start(&self, sample_interval: Duration) -> JoinHandle<()> {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            {
                let mut cells = inner.cells.lock();
                let now = Utc::now();
                for name in SERIES_SENSORS.iter().chain(EVENT_INPUTS.iter()) {
                    cells.insert(
                        (*name).to_string(),
                        Reading {
                            value: None,
                            status: SensorStatus::On,
                            time: now,
                        },
                    );
                }
            }
            for name in ACTUATORS {
                inner.set_level(name, 0.0);
            }

            info!("[Board] ready");
            if inner.events.send(BoardEvent::Ready).await.is_err() {
                return;
            }

            let mut ticker = interval(sample_interval);
            let mut tick: u64 = 0;
            loop {
                ticker.tick().await;
                tick += 1;
                sample_series(&inner);

                // Simulate the occasional button press so the event path is
                // exercised without physical hardware.
                if tick % BUTTON_EVENT_EVERY == 0 {
                    for level in [1.0, 0.0] {
                        debug!("[Board] button event value={}", level);
                        let event = BoardEvent::Sensor {
                            name: "button".to_string(),
                            value: ReadingValue::Number(level),
                        };
                        if inner.events.send(event).await.is_err() {
                            return;
                        }
                    }
                }
            }
        })
    }

    /// Raise a discrete input event, as a physical press would.
    pub async fn inject_event(&self, name: &str, value: ReadingValue) {
        let event = BoardEvent::Sensor {
            name: name.to_string(),
            value,
        };
        let _ = self.inner.events.send(event).await;
    }
}

fn sample_series(inner: &Arc<BoardInner>) {
    let (sound, light, rotary_raw, celsius) = {
        let mut rng = rand::thread_rng();
        (
            rng.gen_range(0.0..ADC_MAX),
            rng.gen_range(0.0..ADC_MAX),
            rng.gen_range(0.0..ADC_MAX),
            rng.gen_range(18.0..28.0f64),
        )
    };

    let rotary_angle = (rotary_raw * ROTARY_FULL_ANGLE / ADC_MAX).round();

    let mut cells = inner.cells.lock();
    let now = Utc::now();
    let mut store = |name: &str, value: ReadingValue| {
        cells.insert(
            name.to_string(),
            Reading {
                value: Some(value),
                status: SensorStatus::On,
                time: now,
            },
        );
    };
    store("sound", ReadingValue::Number(sound.round()));
    store("light", ReadingValue::Number(light.round()));
    store("rotary", ReadingValue::Number(rotary_angle));
    // The temperature sensor reports a pre-formatted decimal string
    store("temperature", ReadingValue::Text(format!("{celsius:.2}")));
}

#[async_trait]
impl HardwareBridge for SimulatedBoard {
    async fn get_data(&self, name: &str) -> Option<Reading> {
        let reading = self.inner.cells.lock().get(name).cloned();
        debug!(
            "[Board] getData name={} found={}",
            name,
            reading.is_some()
        );
        reading
    }

    async fn do_command(&self, actuator: &str, cmd: &str, options: &CommandOptions) {
        if !ACTUATORS.contains(&actuator) || !matches!(cmd, "on" | "off") {
            error!(
                "[Board] unknown command actuator={} cmd={} options={:?}",
                actuator, cmd, options
            );
            return;
        }

        match cmd {
            "on" => {
                self.inner.set_level(actuator, 1.0);
                if let Some(duration) = options.duration {
                    let mut timers = self.inner.revert_timers.lock();
                    if let Some(pending) = timers.remove(actuator) {
                        pending.abort();
                    }
                    let inner = self.inner.clone();
                    let name = actuator.to_string();
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(duration)).await;
                        debug!("[Board] auto-revert actuator={}", name);
                        inner.set_level(&name, 0.0);
                    });
                    timers.insert(actuator.to_string(), handle);
                }
            }
            "off" => self.inner.set_level(actuator, 0.0),
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn level_of(board: &SimulatedBoard, actuator: &str) -> f64 {
        match board.get_data(actuator).await.unwrap().value.unwrap() {
            ReadingValue::Number(n) => n,
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_data_unknown_before_start() {
        let (board, _rx) = SimulatedBoard::new();
        assert!(board.get_data("light").await.is_none());
        assert!(board.get_data("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_command_switches_actuator() {
        let (board, _rx) = SimulatedBoard::new();
        board
            .do_command("led", "on", &CommandOptions::default())
            .await;
        assert_eq!(level_of(&board, "led").await, 1.0);

        board
            .do_command("led", "off", &CommandOptions::default())
            .await;
        assert_eq!(level_of(&board, "led").await, 0.0);
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let (board, _rx) = SimulatedBoard::new();
        board
            .do_command("led", "blink", &CommandOptions::default())
            .await;
        board
            .do_command("antenna", "on", &CommandOptions::default())
            .await;
        assert!(board.get_data("led").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_revert_after_duration() {
        let (board, _rx) = SimulatedBoard::new();
        let options = CommandOptions {
            duration: Some(500),
        };
        board.do_command("led", "on", &options).await;
        assert_eq!(level_of(&board, "led").await, 1.0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(level_of(&board, "led").await, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_command_reschedules_revert() {
        let (board, _rx) = SimulatedBoard::new();
        let options = CommandOptions {
            duration: Some(500),
        };
        board.do_command("led", "on", &options).await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Second command within the window: the pending revert is cancelled,
        // a single new one runs 500ms after this call.
        board.do_command("led", "on", &options).await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(level_of(&board, "led").await, 1.0);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(level_of(&board, "led").await, 0.0);
    }

    #[tokio::test]
    async fn test_ready_emitted_once_on_start() {
        let (board, mut rx) = SimulatedBoard::new();
        let task = board.start(Duration::from_secs(3600));
        assert_eq!(rx.recv().await, Some(BoardEvent::Ready));
        assert!(board.get_data("light").await.is_some());
        task.abort();
    }

    #[tokio::test]
    async fn test_injected_event_reaches_channel() {
        let (board, mut rx) = SimulatedBoard::new();
        board.inject_event("touch", ReadingValue::Number(1.0)).await;
        assert_eq!(
            rx.recv().await,
            Some(BoardEvent::Sensor {
                name: "touch".to_string(),
                value: ReadingValue::Number(1.0),
            })
        );
    }
}
