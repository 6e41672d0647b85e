//! Keeps the UI consistent with what the belt has actually confirmed.
//!
//! User actions are checked against the last confirmed belt state before a
//! command is issued; confirmed values are only written from belt events.
//! Every operation returns the [`Regions`] of the UI that need redrawing, so a
//! repeated event that changes nothing returns an empty set.

use log::{debug, info, warn};

use crate::belt::collaborator::BeltCollaborator;
use crate::belt::constants::{ADVISORY_TICKS, INTENSITY_MAX, INTENSITY_MIN};
use crate::belt::types::{BeltConnectionState, BeltEvent, NavigationState, NotificationKind, PowerStatus, VibrationSignal, WarningSeverity};
use crate::error::BeltError;

pub mod preconditions;
pub mod render;
pub mod state;

pub use preconditions::Rejection;
use state::{all_regions, normalize_direction, regions, Advisory, BeltState, NavigationRequest, Pending, Region, Regions};

fn clamp_intensity(value: i32) -> u8 {
    // lossless after the clamp
    value.clamp(i32::from(INTENSITY_MIN), i32::from(INTENSITY_MAX)) as u8
}

fn connection_dependent_regions() -> Regions {
    let mut changed = all_regions();
    changed.shift_remove(&Region::Advisory);
    changed
}

pub struct Reconciler<B> {
    belt: B,
    state: BeltState,
}

impl<B: BeltCollaborator> Reconciler<B> {
    pub fn new(belt: B) -> Self {
        Reconciler { belt, state: BeltState::default() }
    }

    pub fn state(&self) -> &BeltState {
        &self.state
    }

    pub fn belt(&self) -> &B {
        &self.belt
    }

    pub fn belt_mut(&mut self) -> &mut B {
        &mut self.belt
    }

    fn advise(&mut self, message: impl Into<String>) -> Regions {
        let message = message.into();

        if let Some(advisory) = self.state.advisory.as_mut() {
            if advisory.message == message {
                // same text, keep it up a little longer
                advisory.ticks_left = ADVISORY_TICKS;
                return Regions::new();
            }
        }

        self.state.advisory = Some(Advisory::new(message));
        regions(&[Region::Advisory])
    }

    fn reject(&mut self, rejection: Rejection) -> Regions {
        info!("Ignoring user action: {}", rejection);
        self.advise(rejection.to_string())
    }

    fn command_failed(&mut self, err: BeltError) -> Regions {
        warn!("Belt command was not sent: {}", err);
        self.advise(err.to_string())
    }

    // ---- user actions ----

    pub fn on_connect_requested(&mut self) -> Regions {
        if let Err(rejection) = self.state.check_connect() {
            return self.reject(rejection);
        }

        debug!("Requesting belt connection");
        if let Err(err) = self.belt.connect() {
            return self.command_failed(err);
        }

        self.state.pending_connect = Some(Pending::new(()));
        regions(&[Region::Connection])
    }

    /// Searches for belts in range. Found belts are collected from [`BeltEvent::BeltFound`].
    pub fn on_scan_requested(&mut self) -> Regions {
        if let Err(rejection) = self.state.check_connect() {
            return self.reject(rejection);
        }

        debug!("Requesting belt scan");
        if let Err(err) = self.belt.scan() {
            return self.command_failed(err);
        }

        self.state.pending_scan = Some(Pending::new(()));
        regions(&[Region::Connection])
    }

    pub fn on_connect_to_requested(&mut self, name: &str) -> Regions {
        if let Err(rejection) = self.state.check_connect_to(name) {
            return self.reject(rejection);
        }

        debug!("Requesting connection to {}", name);
        if let Err(err) = self.belt.connect_to(name) {
            return self.command_failed(err);
        }

        self.state.pending_connect = Some(Pending::new(()));
        regions(&[Region::Connection])
    }

    pub fn on_disconnect_requested(&mut self) -> Regions {
        if let Err(rejection) = self.state.check_disconnect() {
            return self.reject(rejection);
        }

        debug!("Requesting belt disconnection");
        if let Err(err) = self.belt.disconnect() {
            return self.command_failed(err);
        }

        // the UI changes once the belt reports the disconnection
        Regions::new()
    }

    /// Slider moved; only the local label follows.
    pub fn on_intensity_changed(&mut self, value: i32) -> Regions {
        let value = clamp_intensity(value);
        if self.state.intensity_gesture == Some(value) {
            return Regions::new();
        }

        self.state.intensity_gesture = Some(value);
        regions(&[Region::Intensity])
    }

    /// Slider released, inside or outside of its bounds.
    pub fn on_intensity_commit(&mut self, value: i32) -> Regions {
        if self.state.intensity_gesture.take().is_none() {
            debug!("Intensity release without an active gesture");
            return Regions::new();
        }

        let mut changed = regions(&[Region::Intensity]);

        if let Err(rejection) = self.state.check_connected() {
            changed.extend(self.reject(rejection));
            return changed;
        }

        let value = clamp_intensity(value);
        debug!("Requesting default intensity {}", value);
        if let Err(err) = self.belt.set_default_intensity(value) {
            changed.extend(self.command_failed(err));
            return changed;
        }

        self.state.pending_intensity = Some(Pending::new(value));
        changed
    }

    pub fn on_signal_type_selected(&mut self, signal: Option<VibrationSignal>) -> Regions {
        if let Err(rejection) = BeltState::check_navigation_signal(signal) {
            return self.reject(rejection);
        }
        if self.state.selected_signal == signal {
            return Regions::new();
        }

        self.state.selected_signal = signal;
        regions(&[Region::Navigation])
    }

    pub fn on_start_navigation_requested(&mut self) -> Regions {
        if let Err(rejection) = self.state.check_start_navigation() {
            return self.reject(rejection);
        }

        let direction = self.state.navigation_direction;
        debug!("Requesting navigation start towards {}°", direction);
        if let Err(err) = self.belt.start_navigation(self.state.selected_signal, direction, self.state.magnetic_bearing) {
            return self.command_failed(err);
        }

        self.state.sent_direction = Some(direction);
        self.state.pending_navigation = Some(Pending::new(NavigationRequest::Start));
        regions(&[Region::Navigation])
    }

    pub fn on_pause_navigation_requested(&mut self) -> Regions {
        if let Err(rejection) = self.state.check_pause_navigation() {
            return self.reject(rejection);
        }

        debug!("Requesting navigation pause");
        if let Err(err) = self.belt.pause_navigation() {
            return self.command_failed(err);
        }

        self.state.pending_navigation = Some(Pending::new(NavigationRequest::Pause));
        regions(&[Region::Navigation])
    }

    pub fn on_stop_navigation_requested(&mut self) -> Regions {
        if let Err(rejection) = self.state.check_stop_navigation() {
            return self.reject(rejection);
        }
        self.send_stop()
    }

    fn send_stop(&mut self) -> Regions {
        debug!("Requesting navigation stop");
        if let Err(err) = self.belt.stop_navigation() {
            return self.command_failed(err);
        }

        self.state.pending_navigation = Some(Pending::new(NavigationRequest::Stop));
        regions(&[Region::Navigation])
    }

    /// Sends the current direction if the belt is navigating towards another one.
    fn stream_direction(&mut self) -> Regions {
        let direction = self.state.navigation_direction;
        let stopping = matches!(self.state.pending_navigation, Some(Pending { value: NavigationRequest::Stop, .. }));
        if !self.state.is_connected()
            || self.state.navigation != NavigationState::Running
            || stopping
            || self.state.sent_direction == Some(direction)
        {
            return Regions::new();
        }

        if let Err(err) = self.belt.update_navigation(self.state.selected_signal, direction, self.state.magnetic_bearing) {
            return self.command_failed(err);
        }

        self.state.sent_direction = Some(direction);
        Regions::new()
    }

    pub fn on_navigation_direction_changed(&mut self, angle: i32) -> Regions {
        let direction = normalize_direction(angle);
        if self.state.navigation_direction == direction {
            return Regions::new();
        }

        self.state.navigation_direction = direction;
        let mut changed = regions(&[Region::Navigation]);
        changed.extend(self.stream_direction());
        changed
    }

    /// Applies to direction commands issued from now on.
    pub fn on_magnetic_bearing_toggled(&mut self, enabled: bool) -> Regions {
        if self.state.magnetic_bearing == enabled {
            return Regions::new();
        }

        self.state.magnetic_bearing = enabled;
        regions(&[Region::Navigation])
    }

    pub fn on_notification_direction_changed(&mut self, angle: i32) -> Regions {
        let direction = normalize_direction(angle);
        if self.state.notification_direction == direction {
            return Regions::new();
        }

        self.state.notification_direction = direction;
        regions(&[Region::Notification])
    }

    fn notify(&mut self, kind: NotificationKind, direction: i32) -> Regions {
        if let Err(rejection) = self.state.check_connected() {
            return self.reject(rejection);
        }

        debug!("Requesting {:?} notification at {}°", kind, direction);
        if let Err(err) = self.belt.trigger_notification(kind, direction) {
            return self.command_failed(err);
        }
        Regions::new()
    }

    pub fn on_bearing_notification_requested(&mut self) -> Regions {
        self.notify(NotificationKind::MagneticBearing, self.state.notification_direction)
    }

    pub fn on_direction_notification_requested(&mut self) -> Regions {
        self.notify(NotificationKind::Relative, self.state.notification_direction)
    }

    /// Plays the destination-reached signal, and stops the navigation if asked to.
    pub fn on_destination_reached_requested(&mut self, stop_navigation: bool) -> Regions {
        let mut changed = self.notify(NotificationKind::DestinationReached, self.state.navigation_direction);

        if stop_navigation && self.state.check_stop_navigation().is_ok() {
            changed.extend(self.send_stop());
        }
        changed
    }

    pub fn on_warning_requested(&mut self, severity: WarningSeverity) -> Regions {
        if let Err(rejection) = self.state.check_connected() {
            return self.reject(rejection);
        }

        debug!("Requesting {:?} warning", severity);
        if let Err(err) = self.belt.trigger_warning(severity) {
            return self.command_failed(err);
        }
        Regions::new()
    }

    pub fn on_battery_signal_requested(&mut self) -> Regions {
        if let Err(rejection) = self.state.check_connected() {
            return self.reject(rejection);
        }

        debug!("Requesting battery signal");
        if let Err(err) = self.belt.request_battery_signal() {
            return self.command_failed(err);
        }
        Regions::new()
    }

    /// Flips the belt's compass accuracy signal. The button follows once the belt confirms.
    pub fn on_accuracy_signal_toggle_requested(&mut self, persistent: bool) -> Regions {
        let enabled = match self.state.check_accuracy_signal_toggle() {
            Ok(enabled) => enabled,
            Err(rejection) => return self.reject(rejection),
        };

        debug!("Requesting accuracy signal enabled={} persistent={}", !enabled, persistent);
        if let Err(err) = self.belt.request_accuracy_signal(!enabled, persistent) {
            return self.command_failed(err);
        }
        Regions::new()
    }

    pub fn on_advisory_dismissed(&mut self) -> Regions {
        match self.state.advisory.take() {
            Some(_) => regions(&[Region::Advisory]),
            None => Regions::new(),
        }
    }

    /// Ages pending commands and the advisory. Called periodically.
    pub fn on_tick(&mut self) -> Regions {
        let mut changed = Regions::new();
        let mut expired = false;

        if let Some(advisory) = self.state.advisory.as_mut() {
            advisory.ticks_left = advisory.ticks_left.saturating_sub(1);
            if advisory.ticks_left == 0 {
                self.state.advisory = None;
                changed.insert(Region::Advisory);
            }
        }

        if let Some(pending) = self.state.pending_scan.as_mut() {
            if pending.tick() {
                self.state.pending_scan = None;
                changed.insert(Region::Connection);
                expired = true;
            }
        }
        if let Some(pending) = self.state.pending_connect.as_mut() {
            if pending.tick() {
                self.state.pending_connect = None;
                changed.insert(Region::Connection);
                expired = true;
            }
        }
        if let Some(pending) = self.state.pending_navigation.as_mut() {
            if pending.tick() {
                self.state.pending_navigation = None;
                changed.insert(Region::Navigation);
                expired = true;
            }
        }
        if let Some(pending) = self.state.pending_intensity.as_mut() {
            if pending.tick() {
                self.state.pending_intensity = None;
                changed.insert(Region::Intensity);
                expired = true;
            }
        }

        if expired {
            warn!("The belt did not confirm a command in time");
            changed.extend(self.advise("The belt did not confirm the last command"));
        }

        changed
    }

    // ---- belt events ----

    pub fn apply(&mut self, event: BeltEvent) -> Regions {
        match event {
            BeltEvent::ConnectionStateChanged(state) => self.on_connection_state_changed(state),
            BeltEvent::BeltFound { name } => self.on_belt_found(name),
            BeltEvent::HeadingChanged { heading, accurate } => self.on_heading_changed(heading, accurate),
            BeltEvent::OrientationAccuracyChanged(accurate) => self.on_orientation_accuracy_changed(accurate),
            BeltEvent::BatteryStatusChanged { level, power } => self.on_battery_status_changed(level, power),
            BeltEvent::NavigationStateChanged(state) => self.on_navigation_state_changed(state),
            BeltEvent::DefaultIntensityChanged(intensity) => self.on_default_intensity_changed(intensity),
            BeltEvent::CompassAccuracySignalChanged(enabled) => self.on_compass_accuracy_signal_changed(enabled),
            BeltEvent::HomeButtonPressed { navigating } => {
                info!("Home button pressed (navigating: {})", navigating);
                self.advise("Home button pressed!")
            },
            BeltEvent::ConnectionLost => self.on_connection_lost(),
            BeltEvent::ConnectionFailed => self.on_connection_attempt_failed("Connection failed!"),
            BeltEvent::NoBeltFound => self.on_connection_attempt_failed("No belt found!"),
            BeltEvent::BluetoothUnavailable => self.on_connection_attempt_failed("No Bluetooth available!"),
            BeltEvent::BluetoothPoweredOff => self.on_connection_attempt_failed("Please turn on Bluetooth!"),
        }
    }

    fn tear_down(&mut self) {
        self.state.reset_belt_data();
        self.state.clear_pending();
    }

    pub fn on_connection_state_changed(&mut self, new_state: BeltConnectionState) -> Regions {
        let previous = self.state.connection;
        let mut changed = Regions::new();

        if new_state != BeltConnectionState::Disconnected {
            let scan = self.state.pending_scan.take();
            let connect = self.state.pending_connect.take();
            if scan.is_some() || connect.is_some() {
                changed.insert(Region::Connection);
            }
        }
        if previous == new_state {
            return changed;
        }

        info!("Belt connection: {} -> {}", previous, new_state);
        self.state.connection = new_state;

        if new_state == BeltConnectionState::Scanning {
            self.state.found_belts.clear();
        }

        if new_state == BeltConnectionState::Disconnected {
            self.tear_down();
        } else if previous == BeltConnectionState::Disconnected {
            // fresh connection attempt
            self.state.reset_belt_data();
        } else if previous == BeltConnectionState::Connected {
            // commands in flight will not be confirmed by this connection
            self.state.clear_pending();
        }

        connection_dependent_regions()
    }

    pub fn on_connection_lost(&mut self) -> Regions {
        warn!("Belt connection lost");
        let mut changed = self.advise("Connection lost!");

        if self.state.connection != BeltConnectionState::Disconnected {
            self.state.connection = BeltConnectionState::Disconnected;
            self.tear_down();
            changed.extend(connection_dependent_regions());
        }
        changed
    }

    fn on_connection_attempt_failed(&mut self, message: &'static str) -> Regions {
        warn!("Connection attempt failed: {}", message);
        let mut changed = self.advise(message);

        let scan = self.state.pending_scan.take();
        let connect = self.state.pending_connect.take();
        if scan.is_some() || connect.is_some() {
            changed.insert(Region::Connection);
        }
        changed
    }

    pub fn on_belt_found(&mut self, name: String) -> Regions {
        if self.state.connection != BeltConnectionState::Scanning {
            debug!("Ignoring belt {} reported outside of a scan", name);
            return Regions::new();
        }
        if self.state.found_belts.contains(&name) {
            return Regions::new();
        }

        info!("Found belt {}", name);
        self.state.found_belts.push(name);
        regions(&[Region::Connection])
    }

    fn ignore_while_disconnected(&self, what: &str) -> bool {
        if self.state.connection == BeltConnectionState::Disconnected {
            debug!("Ignoring {} while disconnected", what);
            return true;
        }
        false
    }

    pub fn on_heading_changed(&mut self, heading: i32, accurate: bool) -> Regions {
        if self.ignore_while_disconnected("heading") {
            return Regions::new();
        }

        // normalized into [0, 360), so it fits
        let heading = normalize_direction(heading) as u16;
        if self.state.heading == Some(heading) && self.state.orientation_accurate == Some(accurate) {
            return Regions::new();
        }

        self.state.heading = Some(heading);
        self.state.orientation_accurate = Some(accurate);
        regions(&[Region::Orientation])
    }

    pub fn on_orientation_accuracy_changed(&mut self, accurate: bool) -> Regions {
        if self.ignore_while_disconnected("orientation accuracy") {
            return Regions::new();
        }
        if self.state.orientation_accurate == Some(accurate) {
            return Regions::new();
        }

        self.state.orientation_accurate = Some(accurate);
        regions(&[Region::Orientation])
    }

    pub fn on_battery_status_changed(&mut self, level: f64, power: PowerStatus) -> Regions {
        if self.ignore_while_disconnected("battery status") {
            return Regions::new();
        }

        let level = if level.is_finite() {
            // within u8 range after the clamp
            Some(level.clamp(0.0, 100.0).round() as u8)
        } else {
            warn!("Ignoring battery level {}", level);
            self.state.battery_level
        };

        if self.state.battery_level == level && self.state.power_status == Some(power) {
            return Regions::new();
        }

        self.state.battery_level = level;
        self.state.power_status = Some(power);
        regions(&[Region::Battery])
    }

    pub fn on_navigation_state_changed(&mut self, new_state: NavigationState) -> Regions {
        if !self.state.is_connected() && new_state != NavigationState::Stopped {
            warn!("Ignoring navigation state {} without a connected belt", new_state);
            return Regions::new();
        }

        let mut changed = Regions::new();
        let mut confirmed_start = false;

        if let Some(pending) = self.state.pending_navigation {
            if pending.value.target() == new_state {
                self.state.pending_navigation = None;
                confirmed_start = pending.value == NavigationRequest::Start;
                changed.insert(Region::Navigation);
            }
        }

        if self.state.navigation != new_state {
            info!("Navigation: {} -> {}", self.state.navigation, new_state);
            self.state.navigation = new_state;
            changed.insert(Region::Navigation);
        }

        match new_state {
            // only a start from this session has a direction to catch up on
            NavigationState::Running if confirmed_start => changed.extend(self.stream_direction()),
            NavigationState::Running => {},
            NavigationState::Stopped => self.state.sent_direction = None,
            NavigationState::Paused => {},
        }

        changed
    }

    pub fn on_default_intensity_changed(&mut self, intensity: i32) -> Regions {
        if self.ignore_while_disconnected("default intensity") {
            return Regions::new();
        }

        let intensity = clamp_intensity(intensity);
        let mut changed = Regions::new();

        // the belt may have adjusted the requested value, any report settles it
        if self.state.pending_intensity.take().is_some() {
            changed.insert(Region::Intensity);
        }
        if self.state.default_intensity != Some(intensity) {
            self.state.default_intensity = Some(intensity);
            changed.insert(Region::Intensity);
        }
        changed
    }

    pub fn on_compass_accuracy_signal_changed(&mut self, enabled: bool) -> Regions {
        if self.ignore_while_disconnected("accuracy signal state") {
            return Regions::new();
        }
        if self.state.accuracy_signal_enabled == Some(enabled) {
            return Regions::new();
        }

        self.state.accuracy_signal_enabled = Some(enabled);
        regions(&[Region::Orientation])
    }
}
