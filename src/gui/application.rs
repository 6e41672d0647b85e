use std::path::PathBuf;
use iced::{Alignment, Application, Command, Element, Length, Settings, Size, Subscription, window};
use iced::event::{self, Event};
use iced::time::{every as iced_time_every};
use iced::theme::{self, Theme};
use iced::widget::{
    Column, PickList, button, column, container, horizontal_rule, row, slider, text, toggler,
};
use std::time::{Duration};
use log::{debug, error, info};
use tokio_util::sync::{CancellationToken};

use crate::belt::collaborator::ChannelBelt;
use crate::belt::constants::{INTENSITY_MAX, INTENSITY_MIN};
use crate::belt::simulator::{belt_subscription, SimulatorEvent};
use crate::belt::types::WarningSeverity;
use crate::config::io::{ConfigIO};
use crate::config::types::{Config, SimulatorConfig};
use crate::error::AppRunError;
use crate::gui::style::{AdvisoryStyleSheet};
use crate::gui::types::{Message, SignalChoice};
use crate::reconciler::Reconciler;
use crate::reconciler::render::Rendering;
use crate::reconciler::state::Regions;

// a button that is greyed out unless enabled
fn action<'a>(label: impl ToString, enabled: bool, message: Message) -> Element<'a, Message> {
    button(text(label))
        .on_press_maybe(enabled.then_some(message))
        .into()
}

pub struct ApplicationFlags {
    config_io: ConfigIO,
}

pub struct BeltNavigatorApplication {
    // this token is cancelled upon exit
    app_cancel: CancellationToken,

    // messages that the user must click away
    notices: Vec<String>,

    config_io: ConfigIO,
    // the simulated belt starts once the config has been read
    simulator_config: Option<SimulatorConfig>,

    reconciler: Reconciler<ChannelBelt>,
    rendering: Rendering,
    persist_accuracy_signal: bool,
}

impl BeltNavigatorApplication {
    fn before_close(&mut self) {
        self.app_cancel.cancel();
    }

    fn load_config(&self) -> Command<Message> {
        let config_io = self.config_io.clone();

        let fut = async move {
            match config_io.read().await {
                Ok(Some(config)) => (config, None),
                Ok(None) => {
                    // this is probably the first start of the app
                    info!("Config file is empty, writing defaults");
                    let config = Config::default();
                    let error_message = match config_io.save(config.clone()).await {
                        Ok(_) => None,
                        Err(err) => {
                            error!("Failed to save config: {:?}", &err);
                            Some(format!("Failed to save config: {}", &err))
                        },
                    };
                    (config, error_message)
                },
                Err(err) => {
                    let mut error_message: Option<String> = None;

                    if err.is_file_not_found_error() {
                        info!("Config file not found, using defaults");
                    } else {
                        error!("Failed to load config: {:?}", &err);
                        error_message = Some(format!("Failed to load config: {}", &err));
                    }
                    (Config::default(), error_message)
                },
            }
        };

        Command::perform(fut, Message::ConfigLoadComplete)
    }

    fn refresh(&mut self, changed: Regions) {
        if changed.is_empty() {
            return;
        }

        debug!("Refreshing {:?}", changed);
        self.rendering.refresh(self.reconciler.state(), &changed);
    }
}

impl Application for BeltNavigatorApplication {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ApplicationFlags;

    fn new(flags: ApplicationFlags) -> (BeltNavigatorApplication, Command<Self::Message>) {
        let reconciler = Reconciler::new(ChannelBelt::new());
        let rendering = Rendering::project(reconciler.state());

        let app = BeltNavigatorApplication {
            app_cancel: CancellationToken::new(),
            notices: Vec::new(),
            config_io: flags.config_io,
            simulator_config: None,
            reconciler,
            rendering,
            persist_accuracy_signal: false,
        };

        let command = app.load_config();
        (app, command)
    }

    fn title(&self) -> String {
        String::from(concat!("Belt Navigator ", env!("CARGO_PKG_VERSION")))
    }

    fn update(&mut self, message: Message) -> Command<Self::Message> {
        let changed = match message {
            Message::ConfigLoadComplete((config, error_message)) => {
                info!("Config load complete");
                self.simulator_config = Some(config.simulator);
                if let Some(error_message) = error_message {
                    self.notices.push(error_message);
                }
                Regions::new()
            },
            Message::NoticeConfirmed => {
                if !self.notices.is_empty() {
                    self.notices.remove(0);
                }
                Regions::new()
            },
            Message::EventOccurred(Event::Window(id, window::Event::CloseRequested)) => {
                info!("Close requested");
                self.before_close();
                return window::close(id);
            },
            Message::EventOccurred(_) => Regions::new(),
            Message::Tick => self.reconciler.on_tick(),

            Message::Simulator(SimulatorEvent::Ready(sender)) => {
                info!("Belt is ready for commands");
                self.reconciler.belt_mut().attach(sender);
                Regions::new()
            },
            Message::Simulator(SimulatorEvent::Belt(event)) => self.reconciler.apply(event),

            Message::Scan => self.reconciler.on_scan_requested(),
            Message::Connect => self.reconciler.on_connect_requested(),
            Message::ConnectTo(name) => self.reconciler.on_connect_to_requested(&name),
            Message::Disconnect => self.reconciler.on_disconnect_requested(),
            Message::IntensityChanged(value) => {
                if self.rendering.intensity.enabled {
                    self.reconciler.on_intensity_changed(value)
                } else {
                    Regions::new()
                }
            },
            Message::IntensityReleased => match self.reconciler.state().intensity_gesture {
                Some(value) => self.reconciler.on_intensity_commit(i32::from(value)),
                None => Regions::new(),
            },
            Message::SignalSelected(SignalChoice(signal)) => self.reconciler.on_signal_type_selected(signal),
            Message::StartNavigation => self.reconciler.on_start_navigation_requested(),
            Message::PauseNavigation => self.reconciler.on_pause_navigation_requested(),
            Message::StopNavigation => self.reconciler.on_stop_navigation_requested(),
            Message::NavigationDirectionChanged(angle) => self.reconciler.on_navigation_direction_changed(angle),
            Message::MagneticBearingToggled(enabled) => self.reconciler.on_magnetic_bearing_toggled(enabled),
            Message::NotificationDirectionChanged(angle) => self.reconciler.on_notification_direction_changed(angle),
            Message::BearingNotification => self.reconciler.on_bearing_notification_requested(),
            Message::DirectionNotification => self.reconciler.on_direction_notification_requested(),
            Message::Warning(severity) => self.reconciler.on_warning_requested(severity),
            Message::BatterySignal => self.reconciler.on_battery_signal_requested(),
            Message::AccuracySignalToggle => {
                self.reconciler.on_accuracy_signal_toggle_requested(self.persist_accuracy_signal)
            },
            Message::PersistAccuracySignalToggled(persist) => {
                self.persist_accuracy_signal = persist;
                Regions::new()
            },
            Message::DestinationReached => self.reconciler.on_destination_reached_requested(true),
            Message::AdvisoryDismissed => self.reconciler.on_advisory_dismissed(),
        };

        self.refresh(changed);
        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            event::listen().map(Message::EventOccurred),
            iced_time_every(Duration::from_secs(1)).map(|_| Message::Tick),
        ];

        if let Some(config) = &self.simulator_config {
            subscriptions.push(
                belt_subscription(self.app_cancel.clone(), config.clone()).map(Message::Simulator)
            );
        }

        Subscription::batch(subscriptions)
    }

    fn view(&self) -> Element<Message> {
        if let Some(notice) = self.notices.first() {
            return container(
                column![
                    text(notice),

                    button(text("Okay"))
                        .on_press(Message::NoticeConfirmed),

                ].align_items(Alignment::Center).spacing(20),
            )
            .width(Length::Fill)
            .padding(20)
            .into()
        }

        let r = &self.rendering;

        let mut connection = Column::new()
            .push(
                row![
                    text(&r.connection.label).width(Length::Fill),
                    action("Scan", r.connection.scan_enabled, Message::Scan),
                    action("Connect", r.connection.connect_enabled, Message::Connect),
                    action("Disconnect", r.connection.disconnect_enabled, Message::Disconnect),
                ].align_items(Alignment::Center).spacing(10)
            )
            .spacing(10);

        if r.connection.connect_to_enabled {
            connection = connection.push(
                row![
                    text(format!("{} belt(s) found", r.connection.found_belts.len())).width(Length::Fill),
                    PickList::new(
                        r.connection.found_belts.clone(),
                        None::<String>,
                        Message::ConnectTo,
                    ).placeholder("Choose a belt").width(280),
                ].align_items(Alignment::Center).spacing(10)
            );
        }

        let intensity = row![
            text("Default intensity").width(150),
            slider(
                i32::from(INTENSITY_MIN)..=i32::from(INTENSITY_MAX),
                i32::from(r.intensity.slider_value),
                Message::IntensityChanged,
            ).on_release(Message::IntensityReleased),
            text(&r.intensity.label).width(50),
        ]
            .align_items(Alignment::Center)
            .spacing(10);

        let orientation = row![
            text(format!("Heading: {}", r.orientation.heading_label)).width(120),
            text(format!("Accurate: {}", r.orientation.accurate_label)).width(Length::Fill),
            toggler(
                Some("Save on belt".to_string()),
                self.persist_accuracy_signal,
                Message::PersistAccuracySignalToggled,
            ).width(140),
            action(
                &r.orientation.accuracy_signal_title,
                r.orientation.accuracy_signal_enabled,
                Message::AccuracySignalToggle,
            ),
        ]
            .align_items(Alignment::Center)
            .spacing(10);

        let battery = row![
            text(format!("Power: {}", r.battery.power_label)).width(Length::Fill),
            text(format!("Battery: {}", r.battery.battery_label)).width(120),
            action("Battery signal", r.battery.battery_signal_enabled, Message::BatterySignal),
        ]
            .align_items(Alignment::Center)
            .spacing(10);

        let navigation = column![
            row![
                text("Direction").width(150),
                slider(0..=359, r.navigation.direction, Message::NavigationDirectionChanged),
                text(&r.navigation.direction_label).width(50),
            ].align_items(Alignment::Center).spacing(10),

            row![
                PickList::new(
                    SignalChoice::all(),
                    Some(SignalChoice(r.navigation.signal)),
                    Message::SignalSelected,
                ).width(280),
                toggler(
                    Some("Magnetic bearing".to_string()),
                    r.navigation.magnetic_bearing,
                    Message::MagneticBearingToggled,
                ),
            ].align_items(Alignment::Center).spacing(20),

            row![
                text(&r.navigation.state_label).width(Length::Fill),
                action("Start", r.navigation.start_enabled, Message::StartNavigation),
                action("Pause", r.navigation.pause_enabled, Message::PauseNavigation),
                action("Stop", r.navigation.stop_enabled, Message::StopNavigation),
            ].align_items(Alignment::Center).spacing(10),
        ]
            .spacing(10);

        let notification = column![
            row![
                text("Notification").width(150),
                slider(0..=359, r.notification.direction, Message::NotificationDirectionChanged),
                text(&r.notification.direction_label).width(50),
            ].align_items(Alignment::Center).spacing(10),

            row![
                action("Bearing", r.notification.bearing_enabled, Message::BearingNotification),
                action("Direction", r.notification.direction_enabled, Message::DirectionNotification),
                action("Warning", r.notification.warning_enabled, Message::Warning(WarningSeverity::Normal)),
                action("Critical warning", r.notification.critical_warning_enabled, Message::Warning(WarningSeverity::Critical)),
                action("Destination reached", r.notification.destination_reached_enabled, Message::DestinationReached),
            ].spacing(10),
        ]
            .spacing(10);

        let mut content = Column::new().spacing(20).width(Length::Fill);

        if let Some(advisory) = &r.advisory {
            content = content.push(
                container(
                    row![
                        text(advisory).width(Length::Fill),
                        button(text("Dismiss"))
                            .style(theme::Button::Secondary)
                            .on_press(Message::AdvisoryDismissed),
                    ].align_items(Alignment::Center).spacing(10),
                )
                .padding(10)
                .width(Length::Fill)
                .style(theme::Container::Custom(Box::new(AdvisoryStyleSheet))),
            );
        }

        content = content
            .push(connection)
            .push(horizontal_rule(10))
            .push(intensity)
            .push(orientation)
            .push(battery)
            .push(horizontal_rule(10))
            .push(navigation)
            .push(horizontal_rule(10))
            .push(notification);

        container(content)
            .width(Length::Fill)
            .padding(20)
            .into()
    }
}

pub fn run_application(config_path: Option<PathBuf>) -> Result<(), AppRunError> {
    let config_io = ConfigIO::new_sync(config_path)?;
    // only one instance may use a config file at a time
    let mut config_locker = config_io.locker()?;
    let _lock_guard = config_locker.lock()?;

    let flags = ApplicationFlags { config_io };
    let mut settings = Settings::with_flags(flags);

    // handle exits ourselves (Event::CloseRequested)
    settings.id = Some("belt-navigator".to_string());
    settings.window.exit_on_close_request = false;
    settings.window.size = Size::new(720.0, 640.0);

    // this function will call process::exit() unless there was a startup error
    BeltNavigatorApplication::run(settings)?;
    Ok(())
}
