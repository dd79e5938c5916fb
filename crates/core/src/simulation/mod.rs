//! Run lifecycle and the scheduling loop
//!
//! `SimulationClock` owns the single mutable `SimulationState` of a run. User
//! actions (add fire, change weather, start, stop, repeat, clear) and clock
//! ticks are the only transitions; a tick replaces the state wholesale.
//!
//! ```text
//! stopped ──start / repeat──► running ──tick × (duration - 1)──► running
//!    ▲                           │                                  │
//!    └──────── stop (manual) ◄───┘            auto-stop tick ◄──────┘
//! ```

pub mod record;

pub use record::{Coordinates, RecordContext, RecordWeather, SeedConfiguration, SeedFire, SimulationRecord};

use crate::config::{ClockConfig, EngineConfig, SimulationConfig};
use crate::core_types::fire_point::{FireId, FirePoint};
use crate::core_types::geo::{geo_point, GeoPoint};
use crate::core_types::weather::WeatherState;
use crate::error::SimulationError;
use crate::mitigation::{Advisory, MitigationAdvisor};
use crate::risk::weather_risk;
use crate::spread::FireSpreadEngine;
use crate::volunteers::estimate_volunteers;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClockEvent {
    /// Elapsed time reached the auto-stop duration
    AutoStop,
    /// Stopped by the user before the auto-stop duration
    ManualStop,
}

/// Everything a run needs between ticks
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Live population, active and retired
    pub fires: Vec<FirePoint>,
    /// Seed points as placed, before merging or spreading
    pub initial_fires: Vec<FirePoint>,
    pub weather: WeatherState,
    /// Ticks since the run started
    pub elapsed: u32,
    pub running: bool,
    pub auto_stop_duration: u32,
    next_fire_id: u64,
}

impl SimulationState {
    /// An empty, stopped state
    pub fn new(weather: WeatherState, auto_stop_duration: u32) -> Self {
        Self {
            fires: Vec::new(),
            initial_fires: Vec::new(),
            weather,
            elapsed: 0,
            running: false,
            auto_stop_duration,
            next_fire_id: 0,
        }
    }

    /// Number of fronts that are still active
    pub fn active_count(&self) -> usize {
        self.fires.iter().filter(|fire| fire.active).count()
    }

    fn allocate_id(&mut self) -> FireId {
        let id = FireId::seed(self.next_fire_id);
        self.next_fire_id += 1;
        id
    }
}

/// Derived figures, recomputed from the population and weather
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetrics {
    pub population: usize,
    pub active_count: usize,
    /// Weather fire risk in `[0, 100]`
    pub fire_risk: u32,
    pub volunteers: u32,
    pub advisories: Vec<Advisory>,
}

/// What one clock tick did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// Zero-based index of the tick
    pub tick: u64,
    /// Elapsed ticks after this one
    pub elapsed: u32,
    pub metrics: RunMetrics,
    /// Set on the tick that stopped the run
    pub event: Option<ClockEvent>,
}

/// Drives a run: owns the state, the spread engine and the advisor
#[derive(Debug)]
pub struct SimulationClock {
    state: SimulationState,
    engine: FireSpreadEngine,
    advisor: MitigationAdvisor,
    clock_config: ClockConfig,
}

impl SimulationClock {
    /// Create a stopped clock with default weather and no fires.
    ///
    /// `seed` fixes the spread jitter, so two clocks built with the same
    /// config and seed replay identically.
    ///
    /// # Errors
    /// Returns `SimulationError::InvalidConfig` if either config section is
    /// out of range.
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, SimulationError> {
        config.simulation.validate()?;
        config.clock.validate()?;

        info!(
            "Creating simulation clock: max {} fronts, merge distance {}, tick {} ms, auto-stop after {} ticks",
            config.simulation.max_active_fires,
            config.simulation.merge_distance,
            config.clock.tick_interval_ms,
            config.clock.auto_stop_duration
        );

        Ok(Self {
            state: SimulationState::new(WeatherState::default(), config.clock.auto_stop_duration),
            advisor: MitigationAdvisor::new(config.simulation.clone()),
            engine: FireSpreadEngine::new(config.simulation, seed),
            clock_config: config.clock,
        })
    }

    /// Current state
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Owned copy of the current state, for later `restore`
    pub fn snapshot(&self) -> SimulationState {
        self.state.clone()
    }

    /// Run configuration
    pub fn config(&self) -> &SimulationConfig {
        self.engine.config()
    }

    /// Loop pacing
    pub fn clock_config(&self) -> &ClockConfig {
        &self.clock_config
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Place a fire at `position` with intensity 1, heading with the wind.
    ///
    /// The new front joins the population (which is then merged) and the
    /// seed list.
    ///
    /// # Errors
    /// Rejected with `Running` while the clock runs and with `FireCapReached`
    /// once the population reaches twice `max_active_fires`.
    pub fn add_fire(&mut self, position: GeoPoint) -> Result<FireId, SimulationError> {
        if self.state.running {
            warn!("Rejected fire at ({:.4}, {:.4}): simulation is running", position.x, position.y);
            return Err(SimulationError::Running { operation: "add fires" });
        }

        let cap = self.config().admission_cap();
        if self.state.fires.len() >= cap {
            warn!("Rejected fire at ({:.4}, {:.4}): {} point limit reached", position.x, position.y, cap);
            return Err(SimulationError::FireCapReached { cap });
        }

        let id = self.state.allocate_id();
        let direction = self.state.weather.wind_direction.normalized();
        let fire = FirePoint::new(id.clone(), position, 1.0, direction);

        let mut fires = std::mem::take(&mut self.state.fires);
        fires.push(fire.clone());
        self.state.fires = self.engine.merger().merge(fires);
        self.state.initial_fires.push(fire);

        info!(
            "Added fire {} at ({:.4}, {:.4}); population {}",
            id,
            position.x,
            position.y,
            self.state.fires.len()
        );
        Ok(id)
    }

    /// Replace the weather.
    ///
    /// # Errors
    /// Rejected with `Running` while the clock runs.
    pub fn set_weather(&mut self, weather: WeatherState) -> Result<(), SimulationError> {
        if self.state.running {
            warn!("Rejected weather change: simulation is running");
            return Err(SimulationError::Running { operation: "change the weather" });
        }
        debug!("Weather set to {:?}", weather);
        self.state.weather = weather;
        Ok(())
    }

    /// Start a run from the current population.
    ///
    /// Resets elapsed time and the auto-stop duration. Starting a running
    /// clock does nothing.
    ///
    /// # Errors
    /// Rejected with `NoFires` when there is nothing to simulate; the state is
    /// left unchanged.
    pub fn start(&mut self) -> Result<(), SimulationError> {
        if self.state.running {
            return Ok(());
        }
        if self.state.fires.is_empty() {
            warn!("Rejected start: no fire points placed");
            return Err(SimulationError::NoFires);
        }

        self.state.elapsed = 0;
        self.state.auto_stop_duration = self.clock_config.auto_stop_duration;
        self.state.running = true;
        info!(
            "Simulation started with {} fronts, auto-stop after {} ticks",
            self.state.fires.len(),
            self.state.auto_stop_duration
        );
        Ok(())
    }

    /// Stop before the auto-stop duration. Returns `None` if the clock was
    /// not running.
    pub fn stop(&mut self) -> Option<ClockEvent> {
        if !self.state.running {
            return None;
        }
        self.state.running = false;
        info!("Simulation stopped manually after {} ticks", self.state.elapsed);
        Some(ClockEvent::ManualStop)
    }

    /// Advance one tick. Returns `None` if the clock is not running.
    ///
    /// The tick that reaches the auto-stop duration stops the run without
    /// advancing the fires.
    pub fn tick(&mut self) -> Option<TickReport> {
        if !self.state.running {
            return None;
        }

        let tick = u64::from(self.state.elapsed);
        let elapsed = self.state.elapsed + 1;
        let auto_stop = self.state.auto_stop_duration;

        let (next, event) = if elapsed >= auto_stop {
            let state = SimulationState {
                elapsed: elapsed.min(auto_stop),
                running: false,
                ..self.state.clone()
            };
            (state, Some(ClockEvent::AutoStop))
        } else {
            let fires = self.engine.advance(&self.state.fires, &self.state.weather, tick);
            let state = SimulationState {
                fires,
                elapsed,
                ..self.state.clone()
            };
            (state, None)
        };
        self.state = next;

        let metrics = self.metrics();
        if event.is_some() {
            info!(
                "Simulation auto-stopped after {} ticks with {} fronts ({} active)",
                self.state.elapsed, metrics.population, metrics.active_count
            );
        } else {
            debug!(
                "Tick {} done: {} fronts, {} active, {} volunteers",
                tick, metrics.population, metrics.active_count, metrics.volunteers
            );
        }

        Some(TickReport {
            tick,
            elapsed: self.state.elapsed,
            metrics,
            event,
        })
    }

    /// Restart from a seed configuration.
    ///
    /// Weather and seed points are replaced, fires get fresh ids, elapsed time
    /// resets and the run starts with the seed's duration as auto-stop.
    ///
    /// # Errors
    /// Rejected with `NoFires` when the seed has no points and with
    /// `InvalidConfig` when its duration is zero.
    pub fn repeat(&mut self, seed: SeedConfiguration) -> Result<(), SimulationError> {
        if seed.initial_fires.is_empty() {
            warn!("Rejected repeat: seed configuration has no fire points");
            return Err(SimulationError::NoFires);
        }
        if seed.duration == 0 {
            warn!("Rejected repeat: auto-stop duration is zero");
            return Err(SimulationError::InvalidConfig {
                field: "duration",
                reason: "must be at least 1 tick".to_owned(),
            });
        }

        let mut state = SimulationState::new(seed.weather, seed.duration);
        let direction = seed.weather.wind_direction.normalized();
        for point in seed.initial_fires {
            let id = state.allocate_id();
            state
                .initial_fires
                .push(FirePoint::new(id, geo_point(point.lat, point.lng), point.intensity, direction));
        }
        state.fires = state.initial_fires.clone();
        state.running = true;
        self.state = state;

        info!(
            "Repeating run with {} seed fronts for {} ticks",
            self.state.fires.len(),
            self.state.auto_stop_duration
        );
        Ok(())
    }

    /// Remove every fire and seed point and stop the clock. Weather is kept.
    pub fn clear(&mut self) {
        self.state = SimulationState::new(self.state.weather, self.clock_config.auto_stop_duration);
        info!("Simulation cleared");
    }

    /// Put back a state taken with `snapshot`.
    ///
    /// # Errors
    /// Rejected with `Running` while the clock runs.
    pub fn restore(&mut self, state: SimulationState) -> Result<(), SimulationError> {
        if self.state.running {
            warn!("Rejected restore: simulation is running");
            return Err(SimulationError::Running { operation: "restore a snapshot" });
        }
        self.state = state;
        Ok(())
    }

    /// Risk, volunteer estimate and advisories for the current state
    pub fn metrics(&self) -> RunMetrics {
        let fires = &self.state.fires;
        RunMetrics {
            population: fires.len(),
            active_count: self.state.active_count(),
            fire_risk: weather_risk(&self.state.weather),
            volunteers: estimate_volunteers(fires, self.config()),
            advisories: self.advisor.advise(fires, &self.state.weather),
        }
    }

    /// Seed configuration of the current run, as `repeat` takes it
    pub fn seed_configuration(&self) -> SeedConfiguration {
        SeedConfiguration {
            weather: self.state.weather,
            initial_fires: self.state.initial_fires.iter().map(SeedFire::from).collect(),
            duration: self.state.auto_stop_duration,
        }
    }

    /// Capture a run record from the current state.
    ///
    /// # Errors
    /// Rejected with `NoFires` when no seed points were placed.
    pub fn record(&self, context: &RecordContext) -> Result<SimulationRecord, SimulationError> {
        SimulationRecord::capture(&self.state, &self.metrics(), context, chrono::Utc::now())
    }

    /// Tick once per configured interval until the run stops.
    ///
    /// `hook` sees every report; returning `Break` stops the run manually
    /// before the next tick. Returns the event that ended the run, or `None`
    /// if the clock was not running.
    pub fn run_realtime<F>(&mut self, hook: F) -> Option<ClockEvent>
    where
        F: FnMut(&TickReport) -> ControlFlow<()>,
    {
        self.run_with_interval(self.clock_config.tick_interval(), hook)
    }

    /// Tick back to back, without waiting, until the run stops.
    pub fn run_to_completion<F>(&mut self, hook: F) -> Option<ClockEvent>
    where
        F: FnMut(&TickReport) -> ControlFlow<()>,
    {
        self.run_with_interval(Duration::ZERO, hook)
    }

    fn run_with_interval<F>(&mut self, interval: Duration, mut hook: F) -> Option<ClockEvent>
    where
        F: FnMut(&TickReport) -> ControlFlow<()>,
    {
        while self.state.running {
            if !interval.is_zero() {
                thread::sleep(interval);
            }
            let report = self.tick()?;
            let flow = hook(&report);
            if report.event.is_some() {
                return report.event;
            }
            if flow.is_break() {
                return self.stop();
            }
        }
        None
    }
}
