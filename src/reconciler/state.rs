use indexmap::IndexSet;

use crate::belt::constants::{ADVISORY_TICKS, FULL_CIRCLE, PENDING_TIMEOUT_TICKS};
use crate::belt::types::{BeltConnectionState, NavigationState, PowerStatus, VibrationSignal};

/// A part of the UI that is refreshed as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Connection,
    Intensity,
    Orientation,
    Battery,
    Navigation,
    Notification,
    Advisory,
}

pub const ALL_REGIONS: [Region; 7] = [
    Region::Connection,
    Region::Intensity,
    Region::Orientation,
    Region::Battery,
    Region::Navigation,
    Region::Notification,
    Region::Advisory,
];

/// Regions whose rendering changed. Empty means nothing visible changed.
pub type Regions = IndexSet<Region>;

pub fn regions(list: &[Region]) -> Regions {
    list.iter().copied().collect()
}

pub fn all_regions() -> Regions {
    regions(&ALL_REGIONS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationRequest {
    Start,
    Pause,
    Stop,
}

impl NavigationRequest {
    /// The navigation state that confirms this request.
    pub fn target(&self) -> NavigationState {
        match self {
            NavigationRequest::Start => NavigationState::Running,
            NavigationRequest::Pause => NavigationState::Paused,
            NavigationRequest::Stop => NavigationState::Stopped,
        }
    }
}

/// Something sent to the belt that the belt has not confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending<T> {
    pub value: T,
    pub ticks: u32,
}

impl<T> Pending<T> {
    pub fn new(value: T) -> Self {
        Pending { value, ticks: 0 }
    }

    /// Ages the item by one tick, returns true once it has waited too long.
    pub fn tick(&mut self) -> bool {
        self.ticks += 1;
        self.ticks >= PENDING_TIMEOUT_TICKS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub message: String,
    pub ticks_left: u32,
}

impl Advisory {
    pub fn new(message: impl Into<String>) -> Self {
        Advisory { message: message.into(), ticks_left: ADVISORY_TICKS }
    }
}

/// Last known state of the belt plus the local values of the controls.
///
/// Fields in the "confirmed" group are only ever written from belt events.
#[derive(Debug, Clone, PartialEq)]
pub struct BeltState {
    // confirmed by the belt
    pub connection: BeltConnectionState,
    pub navigation: NavigationState,
    pub default_intensity: Option<u8>,
    pub heading: Option<u16>,
    pub orientation_accurate: Option<bool>,
    pub accuracy_signal_enabled: Option<bool>,
    pub power_status: Option<PowerStatus>,
    pub battery_level: Option<u8>,
    /// Belts reported by the latest scan, in discovery order.
    pub found_belts: Vec<String>,

    // local to this session
    pub selected_signal: Option<VibrationSignal>,
    pub navigation_direction: i32,
    pub magnetic_bearing: bool,
    pub notification_direction: i32,
    pub intensity_gesture: Option<u8>,
    /// Direction the belt was last told to navigate towards.
    pub sent_direction: Option<i32>,

    // waiting for the belt
    pub pending_scan: Option<Pending<()>>,
    pub pending_connect: Option<Pending<()>>,
    pub pending_navigation: Option<Pending<NavigationRequest>>,
    pub pending_intensity: Option<Pending<u8>>,

    pub advisory: Option<Advisory>,
}

impl BeltState {
    pub fn is_connected(&self) -> bool {
        self.connection == BeltConnectionState::Connected
    }

    /// Forgets everything the belt reported about itself.
    pub fn reset_belt_data(&mut self) {
        self.navigation = NavigationState::Stopped;
        self.default_intensity = None;
        self.heading = None;
        self.orientation_accurate = None;
        self.accuracy_signal_enabled = None;
        self.power_status = None;
        self.battery_level = None;
    }

    pub fn clear_pending(&mut self) {
        self.pending_scan = None;
        self.pending_connect = None;
        self.pending_navigation = None;
        self.pending_intensity = None;
        self.intensity_gesture = None;
        self.sent_direction = None;
    }
}

impl Default for BeltState {
    fn default() -> Self {
        BeltState {
            connection: BeltConnectionState::Disconnected,
            navigation: NavigationState::Stopped,
            default_intensity: None,
            heading: None,
            orientation_accurate: None,
            accuracy_signal_enabled: None,
            power_status: None,
            battery_level: None,
            found_belts: Vec::new(),

            selected_signal: Some(VibrationSignal::Navigation),
            navigation_direction: 0,
            magnetic_bearing: false,
            notification_direction: 0,
            intensity_gesture: None,
            sent_direction: None,

            pending_scan: None,
            pending_connect: None,
            pending_navigation: None,
            pending_intensity: None,

            advisory: None,
        }
    }
}

pub fn normalize_direction(angle: i32) -> i32 {
    angle.rem_euclid(FULL_CIRCLE)
}
