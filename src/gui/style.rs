use iced::{Background, Border, Color, Shadow, Theme};
use iced::widget::container::{StyleSheet, Appearance};

/// Banner behind advisory messages.
pub struct AdvisoryStyleSheet;

impl StyleSheet for AdvisoryStyleSheet {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> Appearance {
        Appearance {
            text_color: Some(Color::BLACK),
            background: Some(Background::Color(Color::from_rgb8(0xff, 0xe0, 0x8a))),
            border: Border {
                color: Color::from_rgb8(0xd9, 0xa4, 0x1e),
                width: 1.0,
                radius: 4.0.into(),
            },
            shadow: Shadow::default(),
        }
    }
}
