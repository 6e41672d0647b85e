use belt_navigator::belt::collaborator::{BeltCollaborator, ChannelBelt};
use belt_navigator::belt::constants::{ADVISORY_TICKS, PENDING_TIMEOUT_TICKS};
use belt_navigator::belt::simulator::SimulatedBelt;
use belt_navigator::belt::types::{
    BeltCommand, BeltConnectionState, BeltEvent, NavigationState, NotificationKind, PowerStatus, VibrationSignal,
};
use belt_navigator::config::types::SimulatorConfig;
use belt_navigator::error::BeltError;
use belt_navigator::reconciler::Reconciler;
use belt_navigator::reconciler::render::Rendering;
use belt_navigator::reconciler::state::Regions;

/// Remembers every command; fails all of them while `failure` is set.
#[derive(Default)]
struct RecordingBelt {
    commands: Vec<BeltCommand>,
    failure: Option<BeltError>,
}

impl BeltCollaborator for RecordingBelt {
    fn send(&mut self, command: BeltCommand) -> Result<(), BeltError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.commands.push(command);
        Ok(())
    }
}

/// Keeps a rendering up to date the way the application does, and checks after
/// every step that refreshing only the returned regions gives the same result
/// as projecting the whole state.
struct Harness<B> {
    reconciler: Reconciler<B>,
    rendering: Rendering,
}

impl<B: BeltCollaborator> Harness<B> {
    fn new(belt: B) -> Self {
        let reconciler = Reconciler::new(belt);
        let rendering = Rendering::project(reconciler.state());
        Harness { reconciler, rendering }
    }

    fn step(&mut self, action: impl FnOnce(&mut Reconciler<B>) -> Regions) -> Regions {
        let changed = action(&mut self.reconciler);
        self.rendering.refresh(self.reconciler.state(), &changed);
        assert_eq!(self.rendering, Rendering::project(self.reconciler.state()), "regions {:?} missed a change", changed);
        changed
    }

    fn event(&mut self, event: BeltEvent) -> Regions {
        self.step(|reconciler| reconciler.apply(event))
    }
}

impl Harness<RecordingBelt> {
    fn commands(&self) -> &[BeltCommand] {
        &self.reconciler.belt().commands
    }

    fn connected() -> Self {
        let mut harness = Harness::new(RecordingBelt::default());
        harness.step(|r| r.on_connect_requested());
        harness.event(BeltEvent::ConnectionStateChanged(BeltConnectionState::Connected));
        harness.event(BeltEvent::DefaultIntensityChanged(50));
        harness.event(BeltEvent::NavigationStateChanged(NavigationState::Stopped));
        harness
    }

    fn running() -> Self {
        let mut harness = Harness::connected();
        harness.step(|r| r.on_start_navigation_requested());
        harness.event(BeltEvent::NavigationStateChanged(NavigationState::Running));
        harness
    }
}

#[test]
fn connect_then_navigate() {
    let mut harness = Harness::new(RecordingBelt::default());

    harness.step(|r| r.on_connect_requested());
    assert_eq!(harness.rendering.connection.label, "Connecting…");
    assert!(!harness.rendering.connection.connect_enabled);

    harness.event(BeltEvent::ConnectionStateChanged(BeltConnectionState::Connected));
    assert_eq!(harness.rendering.connection.label, "Connected");
    assert!(harness.rendering.connection.disconnect_enabled);
    assert!(harness.rendering.navigation.start_enabled);

    harness.step(|r| r.on_signal_type_selected(Some(VibrationSignal::TurnOngoing)));
    harness.step(|r| r.on_navigation_direction_changed(45));
    harness.step(|r| r.on_start_navigation_requested());
    assert_eq!(harness.rendering.navigation.state_label, "Starting…");

    harness.event(BeltEvent::NavigationStateChanged(NavigationState::Running));
    let navigation = &harness.rendering.navigation;
    assert_eq!(navigation.state_label, "Navigating");
    assert!(!navigation.start_enabled);
    assert!(navigation.pause_enabled);
    assert!(navigation.stop_enabled);

    assert_eq!(harness.commands(), &[
        BeltCommand::Connect,
        BeltCommand::StartNavigation {
            signal: Some(VibrationSignal::TurnOngoing),
            direction: 45,
            magnetic_bearing: false,
        },
    ]);
}

#[test]
fn start_while_disconnected_sends_nothing() {
    let mut harness = Harness::new(RecordingBelt::default());

    for state in [BeltConnectionState::Disconnected, BeltConnectionState::Handshake, BeltConnectionState::Reconnecting] {
        harness.event(BeltEvent::ConnectionStateChanged(state));
        harness.step(|r| r.on_start_navigation_requested());
        harness.step(|r| r.on_pause_navigation_requested());
        harness.step(|r| r.on_stop_navigation_requested());
    }

    assert!(harness.commands().is_empty());
    assert_eq!(harness.rendering.advisory.as_deref(), Some("No belt is connected"));
}

#[test]
fn repeated_events_change_nothing() {
    let mut harness = Harness::running();

    let events = [
        BeltEvent::ConnectionStateChanged(BeltConnectionState::Connected),
        BeltEvent::HeadingChanged { heading: 93, accurate: true },
        BeltEvent::OrientationAccuracyChanged(true),
        BeltEvent::BatteryStatusChanged { level: 71.6, power: PowerStatus::OnBattery },
        BeltEvent::NavigationStateChanged(NavigationState::Running),
        BeltEvent::DefaultIntensityChanged(50),
        BeltEvent::CompassAccuracySignalChanged(false),
    ];
    for event in events.iter().cloned() {
        harness.event(event);
    }

    let once = harness.rendering.clone();
    let commands = harness.commands().len();

    for _ in 0..3 {
        for event in events.iter().cloned() {
            assert!(harness.event(event).is_empty());
        }
    }
    assert_eq!(harness.rendering, once);
    assert_eq!(harness.commands().len(), commands);
}

#[test]
fn one_intensity_command_per_gesture() {
    let mut harness = Harness::connected();

    for value in [10, 20, 30] {
        harness.step(|r| r.on_intensity_changed(value));
        assert_eq!(harness.rendering.intensity.label, format!("{}%", value));
    }
    // the release happened outside of the slider
    harness.step(|r| r.on_intensity_commit(30));
    // some platforms report a second release
    harness.step(|r| r.on_intensity_commit(30));

    let intensity_commands: Vec<_> = harness.commands().iter()
        .filter(|command| matches!(command, BeltCommand::SetDefaultIntensity(_)))
        .collect();
    assert_eq!(intensity_commands, vec![&BeltCommand::SetDefaultIntensity(30)]);
    assert_eq!(harness.rendering.intensity.label, "30%");

    harness.event(BeltEvent::DefaultIntensityChanged(30));
    assert_eq!(harness.reconciler.state().pending_intensity, None);
    assert_eq!(harness.rendering.intensity.label, "30%");
}

#[test]
fn out_of_range_intensity_is_clamped() {
    let mut harness = Harness::connected();

    harness.step(|r| r.on_intensity_changed(140));
    harness.step(|r| r.on_intensity_commit(140));

    assert_eq!(harness.commands().last(), Some(&BeltCommand::SetDefaultIntensity(100)));
}

#[test]
fn connection_loss_while_navigating_stops_everything() {
    for loss in [BeltEvent::ConnectionStateChanged(BeltConnectionState::Disconnected), BeltEvent::ConnectionLost] {
        let mut harness = Harness::running();

        harness.event(loss);

        let state = harness.reconciler.state();
        assert_eq!(state.navigation, NavigationState::Stopped);
        assert_eq!(state.connection, BeltConnectionState::Disconnected);

        let navigation = &harness.rendering.navigation;
        assert_eq!(navigation.state_label, "Stopped");
        assert!(!navigation.start_enabled);
        assert!(!navigation.pause_enabled);
        assert!(!navigation.stop_enabled);
        assert!(!harness.rendering.intensity.enabled);
        assert_eq!(harness.rendering.intensity.label, "-");
        assert!(harness.rendering.connection.connect_enabled);
    }
}

#[test]
fn stop_while_start_is_pending() {
    let mut harness = Harness::connected();

    harness.step(|r| r.on_start_navigation_requested());
    assert!(harness.rendering.navigation.stop_enabled);

    harness.step(|r| r.on_stop_navigation_requested());
    assert_eq!(harness.rendering.navigation.state_label, "Stopping…");

    // the belt confirms the start before it handles the stop
    harness.event(BeltEvent::NavigationStateChanged(NavigationState::Running));
    assert_eq!(harness.rendering.navigation.state_label, "Stopping…");
    harness.step(|r| r.on_navigation_direction_changed(90));

    harness.event(BeltEvent::NavigationStateChanged(NavigationState::Stopped));
    assert_eq!(harness.rendering.navigation.state_label, "Stopped");
    assert!(harness.rendering.navigation.start_enabled);

    // no direction update for a navigation that is being stopped
    assert_eq!(harness.commands().len(), 3);
    assert_eq!(harness.commands()[2], BeltCommand::StopNavigation);
}

#[test]
fn direction_changes_follow_a_running_navigation() {
    let mut harness = Harness::running();
    harness.step(|r| r.on_magnetic_bearing_toggled(true));
    harness.step(|r| r.on_navigation_direction_changed(-30));

    assert_eq!(harness.rendering.navigation.direction_label, "330°");
    assert_eq!(harness.commands().last(), Some(&BeltCommand::UpdateNavigation {
        signal: Some(VibrationSignal::Navigation),
        direction: 330,
        magnetic_bearing: true,
    }));

    // unchanged direction, nothing new to send
    let sent = harness.commands().len();
    harness.step(|r| r.on_navigation_direction_changed(330));
    assert_eq!(harness.commands().len(), sent);

    harness.step(|r| r.on_pause_navigation_requested());
    harness.event(BeltEvent::NavigationStateChanged(NavigationState::Paused));
    harness.step(|r| r.on_navigation_direction_changed(10));
    assert_eq!(harness.commands().last(), Some(&BeltCommand::PauseNavigation));
}

#[test]
fn navigation_started_by_the_belt_gets_no_direction() {
    let mut harness = Harness::connected();

    harness.step(|r| r.on_navigation_direction_changed(90));
    harness.event(BeltEvent::NavigationStateChanged(NavigationState::Running));
    assert_eq!(harness.rendering.navigation.state_label, "Navigating");

    // a repeated report after a reconnect is not a start either
    harness.event(BeltEvent::NavigationStateChanged(NavigationState::Paused));
    harness.event(BeltEvent::NavigationStateChanged(NavigationState::Running));

    assert_eq!(harness.commands(), &[BeltCommand::Connect]);
}

#[test]
fn direction_changed_during_start_is_sent_on_confirmation() {
    let mut harness = Harness::connected();

    harness.step(|r| r.on_start_navigation_requested());
    harness.step(|r| r.on_navigation_direction_changed(45));
    assert_eq!(harness.commands().len(), 2);

    harness.event(BeltEvent::NavigationStateChanged(NavigationState::Running));
    assert_eq!(harness.commands().last(), Some(&BeltCommand::UpdateNavigation {
        signal: Some(VibrationSignal::Navigation),
        direction: 45,
        magnetic_bearing: false,
    }));
}

#[test]
fn gesture_in_progress_is_dropped_on_connection_loss() {
    let mut harness = Harness::connected();

    harness.step(|r| r.on_intensity_changed(20));
    assert_eq!(harness.rendering.intensity.label, "20%");

    harness.event(BeltEvent::ConnectionLost);
    harness.step(|r| r.on_intensity_commit(20));

    assert!(!harness.commands().iter().any(|command| matches!(command, BeltCommand::SetDefaultIntensity(_))));
    assert_eq!(harness.reconciler.state().intensity_gesture, None);
    assert!(!harness.rendering.intensity.enabled);
    assert_eq!(harness.rendering.intensity.label, "-");
}

#[test]
fn unconfirmed_commands_expire() {
    let mut harness = Harness::connected();

    harness.step(|r| r.on_start_navigation_requested());
    for _ in 1..PENDING_TIMEOUT_TICKS {
        harness.step(|r| r.on_tick());
        assert_eq!(harness.rendering.navigation.state_label, "Starting…");
    }

    harness.step(|r| r.on_tick());
    assert_eq!(harness.rendering.navigation.state_label, "Stopped");
    assert!(harness.rendering.navigation.start_enabled);
    assert_eq!(harness.rendering.advisory.as_deref(), Some("The belt did not confirm the last command"));

    for _ in 0..ADVISORY_TICKS {
        harness.step(|r| r.on_tick());
    }
    assert_eq!(harness.rendering.advisory, None);
}

#[test]
fn send_failure_leaves_nothing_pending() {
    let mut harness = Harness::connected();
    harness.reconciler.belt_mut().failure = Some(BeltError::QueueFull);

    harness.step(|r| r.on_start_navigation_requested());

    assert_eq!(harness.reconciler.state().pending_navigation, None);
    assert_eq!(harness.rendering.navigation.state_label, "Stopped");
    assert!(harness.rendering.navigation.start_enabled);
    assert_eq!(harness.rendering.advisory.as_deref(), Some("Too many belt commands are waiting, please retry"));
}

#[test]
fn detached_channel_reports_not_ready() {
    let mut harness = Harness::new(ChannelBelt::new());

    harness.step(|r| r.on_connect_requested());

    assert_eq!(harness.reconciler.state().pending_connect, None);
    assert_eq!(harness.rendering.connection.label, "Disconnected");
    assert_eq!(harness.rendering.advisory.as_deref(), Some("The belt is not available yet"));
}

#[test]
fn data_is_ignored_while_disconnected() {
    let mut harness = Harness::new(RecordingBelt::default());
    let initial = harness.rendering.clone();

    harness.event(BeltEvent::HeadingChanged { heading: 10, accurate: true });
    harness.event(BeltEvent::BatteryStatusChanged { level: 50.0, power: PowerStatus::Charging });
    harness.event(BeltEvent::DefaultIntensityChanged(20));
    harness.event(BeltEvent::NavigationStateChanged(NavigationState::Running));
    harness.event(BeltEvent::CompassAccuracySignalChanged(true));

    assert_eq!(harness.rendering, initial);
}

#[test]
fn failed_connection_attempts_are_advised() {
    let mut harness = Harness::new(RecordingBelt::default());

    harness.step(|r| r.on_connect_requested());
    harness.event(BeltEvent::BluetoothPoweredOff);

    assert_eq!(harness.rendering.advisory.as_deref(), Some("Please turn on Bluetooth!"));
    assert_eq!(harness.rendering.connection.label, "Disconnected");
    assert!(harness.rendering.connection.connect_enabled);

    harness.step(|r| r.on_advisory_dismissed());
    assert_eq!(harness.rendering.advisory, None);
}

#[test]
fn accuracy_signal_waits_for_the_belt() {
    let mut harness = Harness::connected();
    assert!(!harness.rendering.orientation.accuracy_signal_enabled);

    harness.event(BeltEvent::CompassAccuracySignalChanged(true));
    assert_eq!(harness.rendering.orientation.accuracy_signal_title, "Disable accuracy signal");

    harness.step(|r| r.on_accuracy_signal_toggle_requested(false));
    assert_eq!(harness.commands().last(), Some(&BeltCommand::RequestAccuracySignal { enable: false, persistent: false }));
    assert_eq!(harness.rendering.orientation.accuracy_signal_title, "Disable accuracy signal");

    harness.event(BeltEvent::CompassAccuracySignalChanged(false));
    assert_eq!(harness.rendering.orientation.accuracy_signal_title, "Enable accuracy signal");
}

#[test]
fn destination_reached_stops_the_navigation() {
    let mut harness = Harness::running();
    harness.step(|r| r.on_destination_reached_requested(true));

    let commands = harness.commands();
    assert_eq!(commands[commands.len() - 2], BeltCommand::TriggerNotification {
        kind: NotificationKind::DestinationReached,
        direction: 0,
    });
    assert_eq!(commands[commands.len() - 1], BeltCommand::StopNavigation);
    assert_eq!(harness.rendering.navigation.state_label, "Stopping…");
}

/// Passes commands to a simulated belt and its events back to the reconciler.
fn pump(harness: &mut Harness<RecordingBelt>, belt: &mut SimulatedBelt) {
    loop {
        let commands: Vec<_> = harness.reconciler.belt_mut().commands.drain(..).collect();
        if commands.is_empty() {
            break;
        }
        for command in commands {
            for event in belt.handle_command(command) {
                harness.event(event);
            }
        }
    }
}

fn advance(harness: &mut Harness<RecordingBelt>, belt: &mut SimulatedBelt) {
    for event in belt.advance() {
        harness.event(event);
    }
    pump(harness, belt);
}

#[test]
fn drives_a_simulated_belt() {
    let config = SimulatorConfig { drop_connection_after_steps: Some(6), ..SimulatorConfig::default() };
    let mut belt = SimulatedBelt::new(config);
    let mut harness = Harness::new(RecordingBelt::default());

    harness.step(|r| r.on_connect_requested());
    pump(&mut harness, &mut belt);
    assert_eq!(harness.rendering.connection.label, "Scanning");

    for _ in 0..4 {
        advance(&mut harness, &mut belt);
    }
    assert_eq!(harness.rendering.connection.label, "Connected");
    assert_eq!(harness.rendering.intensity.label, "50%");
    assert_eq!(harness.rendering.battery.battery_label, "80%");
    assert_eq!(harness.rendering.orientation.accuracy_signal_title, "Disable accuracy signal");

    harness.step(|r| r.on_start_navigation_requested());
    pump(&mut harness, &mut belt);
    assert_eq!(harness.rendering.navigation.state_label, "Navigating");
    assert_eq!(belt.navigation_state(), NavigationState::Running);

    harness.step(|r| r.on_intensity_changed(75));
    harness.step(|r| r.on_intensity_commit(75));
    pump(&mut harness, &mut belt);
    assert_eq!(harness.reconciler.state().default_intensity, Some(75));

    // the simulated belt drops the connection and reconnects on the next step
    for _ in 0..6 {
        advance(&mut harness, &mut belt);
    }
    assert_eq!(harness.rendering.connection.label, "Reconnecting");
    assert_eq!(harness.rendering.navigation.state_label, "Stopped");
    assert_eq!(harness.rendering.advisory.as_deref(), Some("Connection lost!"));

    advance(&mut harness, &mut belt);
    assert_eq!(harness.rendering.connection.label, "Connected");
    assert_eq!(harness.rendering.intensity.label, "75%");

    harness.step(|r| r.on_disconnect_requested());
    pump(&mut harness, &mut belt);
    assert_eq!(harness.rendering.connection.label, "Disconnected");
}

#[test]
fn scan_then_pick_a_belt() {
    let mut belt = SimulatedBelt::new(SimulatorConfig::default());
    let mut harness = Harness::new(RecordingBelt::default());

    harness.step(|r| r.on_scan_requested());
    assert_eq!(harness.rendering.connection.label, "Scanning…");
    assert!(!harness.rendering.connection.connect_enabled);
    pump(&mut harness, &mut belt);
    assert_eq!(harness.rendering.connection.label, "Scanning");

    advance(&mut harness, &mut belt);
    assert_eq!(harness.rendering.connection.label, "Disconnected");
    assert_eq!(harness.rendering.connection.found_belts, vec!["naviGuertel 4B1F", "naviGuertel 7C02"]);
    assert!(harness.rendering.connection.connect_to_enabled);

    harness.step(|r| r.on_connect_to_requested("elsewhere"));
    assert_eq!(
        harness.rendering.advisory.as_deref(),
        Some("No belt named \"elsewhere\" was found, please scan again"),
    );
    assert!(harness.reconciler.belt().commands.is_empty());

    harness.step(|r| r.on_connect_to_requested("naviGuertel 7C02"));
    assert_eq!(harness.rendering.connection.label, "Connecting…");
    pump(&mut harness, &mut belt);
    for _ in 0..3 {
        advance(&mut harness, &mut belt);
    }
    assert_eq!(harness.rendering.connection.label, "Connected");
    assert!(!harness.rendering.connection.connect_to_enabled);

    harness.step(|r| r.on_disconnect_requested());
    pump(&mut harness, &mut belt);
    assert!(harness.rendering.connection.connect_to_enabled);

    // a new scan starts from an empty list
    harness.step(|r| r.on_scan_requested());
    pump(&mut harness, &mut belt);
    assert!(harness.rendering.connection.found_belts.is_empty());
}
