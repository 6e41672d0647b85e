use futures::channel::mpsc::Sender;
use log::{debug, warn};

use crate::belt::types::{BeltCommand, NotificationKind, VibrationSignal, WarningSeverity};
use crate::error::BeltError;

/// The command set of a belt. Every command is fire-and-forget: `Ok` only means
/// the command was handed over, the outcome arrives later as a `BeltEvent`.
pub trait BeltCollaborator {
    fn send(&mut self, command: BeltCommand) -> Result<(), BeltError>;

    fn scan(&mut self) -> Result<(), BeltError> {
        self.send(BeltCommand::Scan)
    }

    fn connect(&mut self) -> Result<(), BeltError> {
        self.send(BeltCommand::Connect)
    }

    fn connect_to(&mut self, name: &str) -> Result<(), BeltError> {
        self.send(BeltCommand::ConnectTo { name: name.to_string() })
    }

    fn disconnect(&mut self) -> Result<(), BeltError> {
        self.send(BeltCommand::Disconnect)
    }

    fn start_navigation(&mut self, signal: Option<VibrationSignal>, direction: i32, magnetic_bearing: bool) -> Result<(), BeltError> {
        self.send(BeltCommand::StartNavigation { signal, direction, magnetic_bearing })
    }

    fn update_navigation(&mut self, signal: Option<VibrationSignal>, direction: i32, magnetic_bearing: bool) -> Result<(), BeltError> {
        self.send(BeltCommand::UpdateNavigation { signal, direction, magnetic_bearing })
    }

    fn pause_navigation(&mut self) -> Result<(), BeltError> {
        self.send(BeltCommand::PauseNavigation)
    }

    fn stop_navigation(&mut self) -> Result<(), BeltError> {
        self.send(BeltCommand::StopNavigation)
    }

    fn set_default_intensity(&mut self, intensity: u8) -> Result<(), BeltError> {
        self.send(BeltCommand::SetDefaultIntensity(intensity))
    }

    fn trigger_notification(&mut self, kind: NotificationKind, direction: i32) -> Result<(), BeltError> {
        self.send(BeltCommand::TriggerNotification { kind, direction })
    }

    fn trigger_warning(&mut self, severity: WarningSeverity) -> Result<(), BeltError> {
        self.send(BeltCommand::TriggerWarning(severity))
    }

    fn request_accuracy_signal(&mut self, enable: bool, persistent: bool) -> Result<(), BeltError> {
        self.send(BeltCommand::RequestAccuracySignal { enable, persistent })
    }

    fn request_battery_signal(&mut self) -> Result<(), BeltError> {
        self.send(BeltCommand::RequestBatterySignal)
    }
}

/// Queues commands onto the channel of a belt task. Until the task has handed
/// out its sender, every command fails with [`BeltError::NotReady`].
#[derive(Debug, Default)]
pub struct ChannelBelt {
    sender: Option<Sender<BeltCommand>>,
}

impl ChannelBelt {
    pub fn new() -> Self {
        ChannelBelt { sender: None }
    }

    pub fn attach(&mut self, sender: Sender<BeltCommand>) {
        debug!("Belt command channel attached");
        self.sender = Some(sender);
    }

    pub fn is_attached(&self) -> bool {
        self.sender.is_some()
    }
}

impl BeltCollaborator for ChannelBelt {
    fn send(&mut self, command: BeltCommand) -> Result<(), BeltError> {
        let sender = self.sender.as_mut().ok_or(BeltError::NotReady)?;

        match sender.try_send(command) {
            Ok(()) => Ok(()),
            Err(err) if err.is_full() => {
                warn!("Belt command queue is full, dropping {:?}", err.into_inner());
                Err(BeltError::QueueFull)
            },
            Err(err) => {
                warn!("Belt command channel is closed, dropping {:?}", err.into_inner());
                Err(BeltError::Closed)
            },
        }
    }
}
