use std::convert::Infallible;
use iced::subscription::{self, Subscription};
use futures::{future, StreamExt, SinkExt};
use futures::channel::mpsc::{channel, Sender};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;
use tokio::time::{interval, Duration};

use crate::belt::constants::{COMMAND_QUEUE_SIZE, EVENT_QUEUE_SIZE, FULL_CIRCLE, INTENSITY_MAX, INTENSITY_MIN};
use crate::belt::types::{BeltCommand, BeltConnectionState, BeltEvent, NavigationState, PowerStatus, VibrationSignal};
use crate::config::types::SimulatorConfig;

/// Output of the simulator subscription.
#[derive(Debug, Clone)]
pub enum SimulatorEvent {
    /// The simulator accepts commands on this sender from now on.
    Ready(Sender<BeltCommand>),
    Belt(BeltEvent),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveNavigation {
    signal: Option<VibrationSignal>,
    direction: i32,
    magnetic_bearing: bool,
}

/// A belt that lives in memory. Commands and simulation steps return the
/// events a real belt would report for them.
#[derive(Debug)]
pub struct SimulatedBelt {
    config: SimulatorConfig,
    connection: BeltConnectionState,
    // the current scan only reports belts, it does not connect
    scan_only: bool,
    connected_steps: u32,
    mode: NavigationState,
    navigation: Option<ActiveNavigation>,
    intensity: u8,
    heading: i32,
    accuracy_signal: bool,
    battery_level: f64,
    power: PowerStatus,
}

impl SimulatedBelt {
    pub fn new(mut config: SimulatorConfig) -> Self {
        config.sanitize();

        SimulatedBelt {
            connection: BeltConnectionState::Disconnected,
            scan_only: false,
            connected_steps: 0,
            mode: NavigationState::Stopped,
            navigation: None,
            intensity: config.default_intensity,
            heading: 0,
            accuracy_signal: config.accuracy_signal_enabled,
            battery_level: config.initial_battery_level,
            power: config.power_status,
            config,
        }
    }

    pub fn connection(&self) -> BeltConnectionState {
        self.connection
    }

    pub fn navigation_state(&self) -> NavigationState {
        self.mode
    }

    pub fn heading(&self) -> i32 {
        self.heading
    }

    fn set_connection(&mut self, state: BeltConnectionState) -> Vec<BeltEvent> {
        info!("Simulated belt: {}", state);
        self.connection = state;
        vec![BeltEvent::ConnectionStateChanged(state)]
    }

    fn set_mode(&mut self, mode: NavigationState) -> Vec<BeltEvent> {
        if self.mode == mode {
            return vec![];
        }
        info!("Simulated belt navigation: {}", mode);
        self.mode = mode;
        vec![BeltEvent::NavigationStateChanged(mode)]
    }

    fn battery_event(&self) -> BeltEvent {
        BeltEvent::BatteryStatusChanged { level: self.battery_level, power: self.power }
    }

    fn complete_connection(&mut self) -> Vec<BeltEvent> {
        self.connected_steps = 0;
        self.mode = NavigationState::Stopped;
        self.navigation = None;

        let mut events = self.set_connection(BeltConnectionState::Connected);
        events.push(BeltEvent::DefaultIntensityChanged(i32::from(self.intensity)));
        events.push(BeltEvent::CompassAccuracySignalChanged(self.accuracy_signal));
        events.push(BeltEvent::HeadingChanged { heading: self.heading, accurate: true });
        events.push(self.battery_event());
        events.push(BeltEvent::NavigationStateChanged(self.mode));
        events
    }

    fn step_connected(&mut self) -> Vec<BeltEvent> {
        self.connected_steps += 1;

        if let Some(limit) = self.config.drop_connection_after_steps {
            if self.connected_steps >= limit {
                warn!("Simulated belt: dropping the connection");
                self.mode = NavigationState::Stopped;
                self.navigation = None;
                let mut events = vec![BeltEvent::ConnectionLost];
                events.append(&mut self.set_connection(BeltConnectionState::Reconnecting));
                return events;
            }
        }

        let mut events = Vec::new();

        if self.config.heading_step != 0 {
            self.heading = (self.heading + self.config.heading_step).rem_euclid(FULL_CIRCLE);
            events.push(BeltEvent::HeadingChanged { heading: self.heading, accurate: true });
        }

        let previous_percentage = self.battery_level.round();
        match self.power {
            PowerStatus::OnBattery => {
                self.battery_level = (self.battery_level - self.config.battery_drain_per_step).max(0.0);
            },
            PowerStatus::Charging => {
                self.battery_level = (self.battery_level + self.config.battery_drain_per_step).min(100.0);
                if self.battery_level >= 100.0 {
                    self.power = PowerStatus::ExternalPower;
                    events.push(self.battery_event());
                    return events;
                }
            },
            PowerStatus::ExternalPower | PowerStatus::Unknown => {},
        }
        if previous_percentage != self.battery_level.round() {
            events.push(self.battery_event());
        }

        events
    }

    fn start_scan(&mut self, scan_only: bool) -> Vec<BeltEvent> {
        if self.connection != BeltConnectionState::Disconnected {
            debug!("Simulated belt: already {}, ignoring the scan", self.connection);
            return vec![];
        }
        self.scan_only = scan_only;
        self.set_connection(BeltConnectionState::Scanning)
    }

    fn advertised_belts(&self) -> &[String] {
        if self.config.belt_present { &self.config.belt_names } else { &[] }
    }

    fn finish_scan(&mut self) -> Vec<BeltEvent> {
        let found = self.advertised_belts().to_vec();
        let mut events: Vec<BeltEvent> = found.iter()
            .map(|name| BeltEvent::BeltFound { name: name.clone() })
            .collect();

        if found.is_empty() {
            info!("Simulated belt: no belt found");
            events.push(BeltEvent::NoBeltFound);
            events.append(&mut self.set_connection(BeltConnectionState::Disconnected));
        } else if self.scan_only {
            info!("Simulated belt: scan finished, {} belt(s) found", found.len());
            events.append(&mut self.set_connection(BeltConnectionState::Disconnected));
        } else {
            info!("Simulated belt: connecting to {}", found[0]);
            events.append(&mut self.set_connection(BeltConnectionState::Connecting));
        }
        events
    }

    /// Advances the simulation by one step.
    pub fn advance(&mut self) -> Vec<BeltEvent> {
        match self.connection {
            BeltConnectionState::Disconnected => vec![],
            BeltConnectionState::Scanning => self.finish_scan(),
            BeltConnectionState::Connecting => self.set_connection(BeltConnectionState::DiscoveringServices),
            BeltConnectionState::DiscoveringServices => self.set_connection(BeltConnectionState::Handshake),
            BeltConnectionState::Handshake | BeltConnectionState::Reconnecting => self.complete_connection(),
            BeltConnectionState::Connected => self.step_connected(),
        }
    }

    pub fn handle_command(&mut self, command: BeltCommand) -> Vec<BeltEvent> {
        match command {
            BeltCommand::Scan => return self.start_scan(true),
            BeltCommand::Connect => return self.start_scan(false),
            BeltCommand::ConnectTo { name } => {
                if self.connection != BeltConnectionState::Disconnected {
                    debug!("Simulated belt: already {}, ignoring connect to {}", self.connection, name);
                    return vec![];
                }
                if !self.advertised_belts().contains(&name) {
                    warn!("Simulated belt: {} is not in range", name);
                    return vec![BeltEvent::ConnectionFailed];
                }
                info!("Simulated belt: connecting to {}", name);
                return self.set_connection(BeltConnectionState::Connecting);
            },
            BeltCommand::Disconnect => {
                if self.connection == BeltConnectionState::Disconnected {
                    return vec![];
                }
                self.mode = NavigationState::Stopped;
                self.navigation = None;
                return self.set_connection(BeltConnectionState::Disconnected);
            },
            _ => {},
        }

        if self.connection != BeltConnectionState::Connected {
            warn!("Simulated belt: ignoring {:?}, not connected", command);
            return vec![];
        }

        match command {
            BeltCommand::StartNavigation { signal, direction, magnetic_bearing } => {
                self.navigation = Some(ActiveNavigation { signal, direction, magnetic_bearing });
                info!("Simulated belt: navigating with {:?} towards {}° (magnetic bearing: {})", signal, direction, magnetic_bearing);
                self.set_mode(NavigationState::Running)
            },
            BeltCommand::UpdateNavigation { signal, direction, magnetic_bearing } => {
                if self.mode != NavigationState::Stopped {
                    self.navigation = Some(ActiveNavigation { signal, direction, magnetic_bearing });
                    debug!("Simulated belt: navigation direction now {}°", direction);
                }
                vec![]
            },
            BeltCommand::PauseNavigation => {
                if self.mode != NavigationState::Running {
                    return vec![];
                }
                self.set_mode(NavigationState::Paused)
            },
            BeltCommand::StopNavigation => {
                self.navigation = None;
                self.set_mode(NavigationState::Stopped)
            },
            BeltCommand::SetDefaultIntensity(intensity) => {
                self.intensity = intensity.clamp(INTENSITY_MIN, INTENSITY_MAX);
                vec![BeltEvent::DefaultIntensityChanged(i32::from(self.intensity))]
            },
            BeltCommand::TriggerNotification { kind, direction } => {
                if self.mode == NavigationState::Paused {
                    warn!("Simulated belt: notifications are not played while paused");
                } else {
                    info!("Simulated belt: notification {:?} at {}°", kind, direction);
                }
                vec![]
            },
            BeltCommand::TriggerWarning(severity) => {
                if self.mode == NavigationState::Paused {
                    warn!("Simulated belt: warnings are not played while paused");
                } else {
                    info!("Simulated belt: {:?} warning", severity);
                }
                vec![]
            },
            BeltCommand::RequestAccuracySignal { enable, persistent } => {
                info!("Simulated belt: accuracy signal enabled={} persistent={}", enable, persistent);
                self.accuracy_signal = enable;
                vec![BeltEvent::CompassAccuracySignalChanged(enable)]
            },
            BeltCommand::RequestBatterySignal => {
                info!("Simulated belt: battery signal at {:.0}%", self.battery_level);
                vec![]
            },
            BeltCommand::Scan | BeltCommand::Connect | BeltCommand::ConnectTo { .. } | BeltCommand::Disconnect => vec![],
        }
    }
}

async fn forward(output: &mut Sender<SimulatorEvent>, events: Vec<BeltEvent>) {
    for event in events {
        if let Err(err) = output.send(SimulatorEvent::Belt(event)).await {
            warn!("Failed to forward belt event: {:?}", err);
        }
    }
}

async fn run_simulator(cancel: CancellationToken, config: SimulatorConfig, mut output: Sender<SimulatorEvent>) -> Infallible {
    let (command_sender, mut command_receiver) = channel::<BeltCommand>(COMMAND_QUEUE_SIZE);
    let mut steps = interval(Duration::from_millis(config.step_interval_ms.max(10)));
    let mut belt = SimulatedBelt::new(config);

    if let Err(err) = output.send(SimulatorEvent::Ready(command_sender)).await {
        warn!("Failed to hand out the belt command channel: {:?}", err);
    }

    'mainloop: loop {
        let events = tokio::select! {
            _ = cancel.cancelled() => {
                break 'mainloop;
            },
            Some(command) = command_receiver.next() => {
                debug!("Simulated belt received {:?}", command);
                belt.handle_command(command)
            },
            _ = steps.tick() => belt.advance(),
        };

        forward(&mut output, events).await;
    }

    info!("Simulated belt shutting down");
    let events = belt.handle_command(BeltCommand::Disconnect);
    forward(&mut output, events).await;

    // note: subscription::channel expects the future to never resolve
    future::pending().await
}

pub fn belt_subscription(cancel: CancellationToken, config: SimulatorConfig) -> Subscription<SimulatorEvent> {
    struct Simulator;

    subscription::channel(
        std::any::TypeId::of::<Simulator>(),
        EVENT_QUEUE_SIZE,
        move |output| {
            let cancel2 = cancel.clone();
            let config2 = config.clone();

            async move {
                run_simulator(cancel2, config2, output).await
            }
        },
    )
}
