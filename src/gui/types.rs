use iced::{Event};

use crate::belt::simulator::SimulatorEvent;
use crate::belt::types::{VibrationSignal, WarningSeverity};
use crate::config::types::Config;

/// Entry of the signal type pick list. `None` navigates without vibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalChoice(pub Option<VibrationSignal>);

impl SignalChoice {
    pub fn all() -> Vec<SignalChoice> {
        let mut choices = vec![SignalChoice(None)];
        choices.extend(VibrationSignal::navigation_signals().into_iter().map(|signal| SignalChoice(Some(signal))));
        choices
    }
}

impl std::fmt::Display for SignalChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            None => write!(f, "No vibration"),
            Some(signal) => write!(f, "{}", signal),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    EventOccurred(Event),
    Tick,
    ConfigLoadComplete((Config, Option<String>)),
    NoticeConfirmed,
    Simulator(SimulatorEvent),

    Scan,
    Connect,
    ConnectTo(String),
    Disconnect,
    IntensityChanged(i32),
    IntensityReleased,
    SignalSelected(SignalChoice),
    StartNavigation,
    PauseNavigation,
    StopNavigation,
    NavigationDirectionChanged(i32),
    MagneticBearingToggled(bool),
    NotificationDirectionChanged(i32),
    BearingNotification,
    DirectionNotification,
    Warning(WarningSeverity),
    BatterySignal,
    AccuracySignalToggle,
    PersistAccuracySignalToggled(bool),
    DestinationReached,
    AdvisoryDismissed,
}
