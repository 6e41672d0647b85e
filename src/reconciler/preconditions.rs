use thiserror::Error;

use crate::belt::types::{BeltConnectionState, NavigationState, VibrationSignal};
use crate::reconciler::state::{BeltState, NavigationRequest};

/// A user action that is not valid in the current state. Shown to the user as
/// an advisory; nothing is sent to the belt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Already connecting to a belt")]
    AlreadyConnecting,

    #[error("Already searching for belts")]
    AlreadyScanning,

    #[error("No belt named \"{0}\" was found, please scan again")]
    UnknownBelt(String),

    #[error("A belt is already connected")]
    AlreadyConnected,

    #[error("No belt is connected")]
    NotConnected,

    #[error("The navigation is already running")]
    AlreadyNavigating,

    #[error("Waiting for the belt to confirm the last navigation request")]
    NavigationPending,

    #[error("The navigation is not running")]
    NotNavigating,

    #[error("The navigation is already stopped")]
    AlreadyStopped,

    #[error("\"{0}\" cannot be used as a navigation signal")]
    NotANavigationSignal(VibrationSignal),

    #[error("The state of the accuracy signal is unknown")]
    AccuracySignalUnknown,
}

impl BeltState {
    pub fn check_connect(&self) -> Result<(), Rejection> {
        if self.pending_connect.is_some() {
            return Err(Rejection::AlreadyConnecting);
        }
        if self.pending_scan.is_some() {
            return Err(Rejection::AlreadyScanning);
        }

        match self.connection {
            BeltConnectionState::Disconnected => Ok(()),
            BeltConnectionState::Connected => Err(Rejection::AlreadyConnected),
            _ => Err(Rejection::AlreadyConnecting),
        }
    }

    pub fn check_connect_to(&self, name: &str) -> Result<(), Rejection> {
        self.check_connect()?;

        if !self.found_belts.iter().any(|found| found == name) {
            return Err(Rejection::UnknownBelt(name.to_string()));
        }
        Ok(())
    }

    pub fn check_disconnect(&self) -> Result<(), Rejection> {
        match self.connection {
            BeltConnectionState::Disconnected => Err(Rejection::NotConnected),
            _ => Ok(()),
        }
    }

    pub fn check_connected(&self) -> Result<(), Rejection> {
        if self.is_connected() { Ok(()) } else { Err(Rejection::NotConnected) }
    }

    pub fn check_start_navigation(&self) -> Result<(), Rejection> {
        self.check_connected()?;

        if self.pending_navigation.is_some() {
            return Err(Rejection::NavigationPending);
        }
        if self.navigation == NavigationState::Running {
            return Err(Rejection::AlreadyNavigating);
        }
        Ok(())
    }

    pub fn check_pause_navigation(&self) -> Result<(), Rejection> {
        self.check_connected()?;

        if self.pending_navigation.is_some() {
            return Err(Rejection::NavigationPending);
        }
        if self.navigation != NavigationState::Running {
            return Err(Rejection::NotNavigating);
        }
        Ok(())
    }

    /// Stop is also accepted while a start or pause is still unconfirmed.
    pub fn check_stop_navigation(&self) -> Result<(), Rejection> {
        self.check_connected()?;

        match self.pending_navigation.map(|pending| pending.value) {
            Some(NavigationRequest::Stop) => Err(Rejection::NavigationPending),
            Some(NavigationRequest::Start) | Some(NavigationRequest::Pause) => Ok(()),
            None => match self.navigation {
                NavigationState::Stopped => Err(Rejection::AlreadyStopped),
                NavigationState::Running | NavigationState::Paused => Ok(()),
            },
        }
    }

    pub fn check_navigation_signal(signal: Option<VibrationSignal>) -> Result<(), Rejection> {
        match signal {
            Some(signal) if !signal.is_repeated() => Err(Rejection::NotANavigationSignal(signal)),
            _ => Ok(()),
        }
    }

    pub fn check_accuracy_signal_toggle(&self) -> Result<bool, Rejection> {
        self.check_connected()?;
        self.accuracy_signal_enabled.ok_or(Rejection::AccuracySignalUnknown)
    }
}
