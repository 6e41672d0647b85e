//! Pure projection of a [`BeltState`] onto what the controls should display.

use crate::belt::constants::INTENSITY_PLACEHOLDER;
use crate::belt::types::{BeltConnectionState, VibrationSignal};
use crate::reconciler::state::{BeltState, NavigationRequest, Region, Regions};

const UNKNOWN: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionPanel {
    pub label: String,
    pub scan_enabled: bool,
    pub connect_enabled: bool,
    pub disconnect_enabled: bool,
    pub found_belts: Vec<String>,
    pub connect_to_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityPanel {
    pub label: String,
    pub slider_value: u8,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientationPanel {
    pub heading_label: String,
    pub accurate_label: String,
    pub accuracy_signal_title: String,
    pub accuracy_signal_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryPanel {
    pub power_label: String,
    pub battery_label: String,
    pub battery_signal_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPanel {
    pub direction: i32,
    pub direction_label: String,
    pub magnetic_bearing: bool,
    pub signal: Option<VibrationSignal>,
    pub signal_label: String,
    pub state_label: String,
    pub start_enabled: bool,
    pub pause_enabled: bool,
    pub stop_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPanel {
    pub direction: i32,
    pub direction_label: String,
    pub bearing_enabled: bool,
    pub direction_enabled: bool,
    pub warning_enabled: bool,
    pub critical_warning_enabled: bool,
    pub destination_reached_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    pub connection: ConnectionPanel,
    pub intensity: IntensityPanel,
    pub orientation: OrientationPanel,
    pub battery: BatteryPanel,
    pub navigation: NavigationPanel,
    pub notification: NotificationPanel,
    pub advisory: Option<String>,
}

pub fn signal_label(signal: Option<VibrationSignal>) -> String {
    match signal {
        None => "No vibration".to_string(),
        Some(signal) if signal.is_repeated() => signal.to_string(),
        Some(_) => "Illegal signal type".to_string(),
    }
}

fn degrees_label(value: i32) -> String {
    format!("{}°", value)
}

fn percent_label(value: Option<u8>) -> String {
    match value {
        None => UNKNOWN.to_string(),
        Some(value) => format!("{}%", value),
    }
}

pub fn connection_panel(state: &BeltState) -> ConnectionPanel {
    let waiting = state.connection == BeltConnectionState::Disconnected;
    let label = if waiting && state.pending_connect.is_some() {
        "Connecting…".to_string()
    } else if waiting && state.pending_scan.is_some() {
        "Scanning…".to_string()
    } else {
        state.connection.to_string()
    };
    let can_connect = state.check_connect().is_ok();

    ConnectionPanel {
        label,
        scan_enabled: can_connect,
        connect_enabled: can_connect,
        // a disconnect is not offered in the middle of a handshake
        disconnect_enabled: matches!(state.connection, BeltConnectionState::Connected | BeltConnectionState::Reconnecting),
        found_belts: state.found_belts.clone(),
        connect_to_enabled: can_connect && !state.found_belts.is_empty(),
    }
}

pub fn intensity_panel(state: &BeltState) -> IntensityPanel {
    let shown = state.intensity_gesture
        .or(state.pending_intensity.map(|pending| pending.value))
        .or(state.default_intensity);

    IntensityPanel {
        label: percent_label(shown),
        slider_value: shown.unwrap_or(INTENSITY_PLACEHOLDER),
        enabled: state.is_connected() && state.default_intensity.is_some(),
    }
}

pub fn orientation_panel(state: &BeltState) -> OrientationPanel {
    let heading_label = match state.heading {
        None => UNKNOWN.to_string(),
        Some(heading) => format!("{}°", heading),
    };

    let accurate_label = match state.orientation_accurate {
        None => UNKNOWN,
        Some(true) => "Yes",
        Some(false) => "No",
    };

    let accuracy_signal_title = match state.accuracy_signal_enabled {
        None => "Unknown accuracy signal state",
        Some(true) => "Disable accuracy signal",
        Some(false) => "Enable accuracy signal",
    };

    OrientationPanel {
        heading_label,
        accurate_label: accurate_label.to_string(),
        accuracy_signal_title: accuracy_signal_title.to_string(),
        accuracy_signal_enabled: state.check_accuracy_signal_toggle().is_ok(),
    }
}

pub fn battery_panel(state: &BeltState) -> BatteryPanel {
    BatteryPanel {
        power_label: match state.power_status {
            None => UNKNOWN.to_string(),
            Some(status) => status.to_string(),
        },
        battery_label: percent_label(state.battery_level),
        battery_signal_enabled: state.is_connected(),
    }
}

pub fn navigation_panel(state: &BeltState) -> NavigationPanel {
    let state_label = match state.pending_navigation.map(|pending| pending.value) {
        Some(NavigationRequest::Start) => "Starting…".to_string(),
        Some(NavigationRequest::Pause) => "Pausing…".to_string(),
        Some(NavigationRequest::Stop) => "Stopping…".to_string(),
        None => state.navigation.to_string(),
    };

    NavigationPanel {
        direction: state.navigation_direction,
        direction_label: degrees_label(state.navigation_direction),
        magnetic_bearing: state.magnetic_bearing,
        signal: state.selected_signal,
        signal_label: signal_label(state.selected_signal),
        state_label,
        start_enabled: state.check_start_navigation().is_ok(),
        pause_enabled: state.check_pause_navigation().is_ok(),
        stop_enabled: state.check_stop_navigation().is_ok(),
    }
}

pub fn notification_panel(state: &BeltState) -> NotificationPanel {
    let connected = state.is_connected();

    NotificationPanel {
        direction: state.notification_direction,
        direction_label: degrees_label(state.notification_direction),
        bearing_enabled: connected,
        direction_enabled: connected,
        warning_enabled: connected,
        critical_warning_enabled: connected,
        destination_reached_enabled: connected,
    }
}

impl Rendering {
    pub fn project(state: &BeltState) -> Self {
        Rendering {
            connection: connection_panel(state),
            intensity: intensity_panel(state),
            orientation: orientation_panel(state),
            battery: battery_panel(state),
            navigation: navigation_panel(state),
            notification: notification_panel(state),
            advisory: state.advisory.as_ref().map(|advisory| advisory.message.clone()),
        }
    }

    /// Recomputes only the given regions.
    pub fn refresh(&mut self, state: &BeltState, regions: &Regions) {
        for region in regions {
            match region {
                Region::Connection => self.connection = connection_panel(state),
                Region::Intensity => self.intensity = intensity_panel(state),
                Region::Orientation => self.orientation = orientation_panel(state),
                Region::Battery => self.battery = battery_panel(state),
                Region::Navigation => self.navigation = navigation_panel(state),
                Region::Notification => self.notification = notification_panel(state),
                Region::Advisory => {
                    self.advisory = state.advisory.as_ref().map(|advisory| advisory.message.clone());
                },
            }
        }
    }
}
