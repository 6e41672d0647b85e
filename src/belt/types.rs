use serde::{Deserialize, Serialize};
use enum_iterator::{all, Sequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence)]
pub enum BeltConnectionState {
    Disconnected,
    Scanning,
    Connecting,
    DiscoveringServices,
    Handshake,
    Reconnecting,
    Connected,
}

impl BeltConnectionState {
    /// True for every phase of a connection attempt that has not completed yet.
    pub fn is_connecting(&self) -> bool {
        matches!(
            self,
            BeltConnectionState::Scanning
                | BeltConnectionState::Connecting
                | BeltConnectionState::DiscoveringServices
                | BeltConnectionState::Handshake
                | BeltConnectionState::Reconnecting
        )
    }
}

impl std::fmt::Display for BeltConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            BeltConnectionState::Disconnected => "Disconnected",
            BeltConnectionState::Scanning => "Scanning",
            BeltConnectionState::Connecting => "Connecting",
            BeltConnectionState::DiscoveringServices => "Discovering services",
            BeltConnectionState::Handshake => "Handshake",
            BeltConnectionState::Reconnecting => "Reconnecting",
            BeltConnectionState::Connected => "Connected",
        };

        write!(f, "{}", result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence)]
pub enum NavigationState {
    Stopped,
    Running,
    Paused,
}

impl std::fmt::Display for NavigationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            NavigationState::Stopped => "Stopped",
            NavigationState::Running => "Navigating",
            NavigationState::Paused => "Paused",
        };

        write!(f, "{}", result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerStatus {
    Unknown,
    OnBattery,
    Charging,
    ExternalPower,
}

impl std::fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            PowerStatus::Unknown => "Unknown",
            PowerStatus::OnBattery => "On battery",
            PowerStatus::Charging => "Charging",
            PowerStatus::ExternalPower => "External power supply",
        };

        write!(f, "{}", result)
    }
}

/// Predefined vibration signals of the belt.
///
/// A signal is either repeated until replaced, or played once. Only repeated
/// signals can carry a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum VibrationSignal {
    Continuous,
    Navigation,
    ApproachingDestination,
    TurnOngoing,
    DirectionNotification,
    NextWaypointLongDistance,
    NextWaypointMediumDistance,
    NextWaypointShortDistance,
    NextWaypointAreaReached,
    DestinationReachedRepeated,
    DestinationReachedSingle,
    OperationWarning,
    CriticalWarning,
    BatteryLevel,
}

impl VibrationSignal {
    pub fn is_repeated(&self) -> bool {
        matches!(
            self,
            VibrationSignal::Continuous
                | VibrationSignal::Navigation
                | VibrationSignal::ApproachingDestination
                | VibrationSignal::TurnOngoing
                | VibrationSignal::NextWaypointLongDistance
                | VibrationSignal::NextWaypointMediumDistance
                | VibrationSignal::NextWaypointShortDistance
                | VibrationSignal::NextWaypointAreaReached
                | VibrationSignal::DestinationReachedRepeated
        )
    }

    pub fn is_directional(&self) -> bool {
        matches!(
            self,
            VibrationSignal::Continuous
                | VibrationSignal::Navigation
                | VibrationSignal::ApproachingDestination
                | VibrationSignal::TurnOngoing
                | VibrationSignal::DirectionNotification
                | VibrationSignal::NextWaypointLongDistance
                | VibrationSignal::NextWaypointMediumDistance
                | VibrationSignal::NextWaypointShortDistance
                | VibrationSignal::NextWaypointAreaReached
        )
    }

    /// Signals that may be selected for a navigation, in display order.
    pub fn navigation_signals() -> Vec<VibrationSignal> {
        all::<VibrationSignal>()
            .filter(VibrationSignal::is_repeated)
            .collect::<Vec<_>>()
    }
}

impl std::fmt::Display for VibrationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            VibrationSignal::Continuous => "Continuous",
            VibrationSignal::Navigation => "Navigation signal",
            VibrationSignal::ApproachingDestination => "Approaching destination",
            VibrationSignal::TurnOngoing => "Ongoing turn",
            VibrationSignal::DirectionNotification => "Direction notification",
            VibrationSignal::NextWaypointLongDistance => "Next waypoint at long distance",
            VibrationSignal::NextWaypointMediumDistance => "Next waypoint at medium distance",
            VibrationSignal::NextWaypointShortDistance => "Next waypoint at short distance",
            VibrationSignal::NextWaypointAreaReached => "Waypoint area reached",
            VibrationSignal::DestinationReachedRepeated => "Destination reached",
            VibrationSignal::DestinationReachedSingle => "Destination reached (once)",
            VibrationSignal::OperationWarning => "Operation warning",
            VibrationSignal::CriticalWarning => "Critical warning",
            VibrationSignal::BatteryLevel => "Battery level",
        };

        write!(f, "{}", result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Direction is a magnetic bearing, 0 is north.
    MagneticBearing,
    /// Direction is relative to the belt, 0 is the front.
    Relative,
    DestinationReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Normal,
    Critical,
}

/// Commands understood by the belt collaborator. The outcome of every command
/// is reported asynchronously through [`BeltEvent`]s, if at all.
#[derive(Debug, Clone, PartialEq)]
pub enum BeltCommand {
    /// Search for advertising belts without connecting.
    Scan,
    /// Search and connect to the first belt found.
    Connect,
    /// Connect to a belt found by an earlier scan.
    ConnectTo {
        name: String,
    },
    Disconnect,
    StartNavigation {
        signal: Option<VibrationSignal>,
        direction: i32,
        magnetic_bearing: bool,
    },
    UpdateNavigation {
        signal: Option<VibrationSignal>,
        direction: i32,
        magnetic_bearing: bool,
    },
    PauseNavigation,
    StopNavigation,
    SetDefaultIntensity(u8),
    TriggerNotification {
        kind: NotificationKind,
        direction: i32,
    },
    TriggerWarning(WarningSeverity),
    RequestAccuracySignal {
        enable: bool,
        persistent: bool,
    },
    RequestBatterySignal,
}

/// Events emitted by the belt collaborator. They may arrive in any order and
/// may repeat a value that was already reported.
#[derive(Debug, Clone, PartialEq)]
pub enum BeltEvent {
    ConnectionStateChanged(BeltConnectionState),
    BeltFound {
        name: String,
    },
    HeadingChanged {
        heading: i32,
        accurate: bool,
    },
    OrientationAccuracyChanged(bool),
    BatteryStatusChanged {
        level: f64,
        power: PowerStatus,
    },
    NavigationStateChanged(NavigationState),
    DefaultIntensityChanged(i32),
    CompassAccuracySignalChanged(bool),
    HomeButtonPressed {
        navigating: bool,
    },
    ConnectionLost,
    ConnectionFailed,
    NoBeltFound,
    BluetoothUnavailable,
    BluetoothPoweredOff,
}
