/// User interface views
///
/// - gallery.rs: artwork grid with per-card image navigation
/// - form.rs: the Add Art form
/// - about.rs: artist bio
pub mod about;
pub mod form;
pub mod gallery;

use iced::widget::{button, column, row, text, Space};
use iced::{Alignment, Color, Element, Length};

use crate::config::ARTIST;
use crate::{Banner, Layout, Message};

impl Banner {
    fn color(&self) -> Color {
        match self {
            Banner::Success(_) => Color::from_rgb8(0x45, 0xa0, 0x49),
            Banner::Advisory(_) => Color::from_rgb8(0xf3, 0x9c, 0x12),
            Banner::Error(_) => Color::from_rgb8(0xe7, 0x4c, 0x3c),
        }
    }

    fn message(&self) -> &str {
        match self {
            Banner::Success(message) | Banner::Advisory(message) | Banner::Error(message) => message,
        }
    }
}

/// Title bar with the layout switches
pub fn header<'a>(layout: Layout) -> Element<'a, Message> {
    let switch = |label: &'a str, target: Layout| {
        // The active layout's button is disabled
        button(label).on_press_maybe((layout != target).then_some(Message::ShowLayout(target)))
    };

    column![
        text(format!("{} Portfolio", ARTIST.name)).size(40),
        row![
            text("A collection of art works"),
            switch("Art", Layout::Art),
            switch("About", Layout::About),
        ]
        .spacing(10)
        .align_y(Alignment::Center),
    ]
    .spacing(8)
    .padding(20)
    .into()
}

/// Copyright line and the link to the submission form
pub fn footer<'a>(year: i32) -> Element<'a, Message> {
    row![
        text(format!("© {year} {} Portfolio. All rights reserved.", ARTIST.name)).size(12),
        Space::with_width(Length::Fill),
        button("Add New Art").on_press(Message::ShowLayout(Layout::AddArt)),
    ]
    .padding(20)
    .align_y(Alignment::Center)
    .into()
}

/// Outcome and advisory messages, newest last
pub fn banners(banners: &[Banner]) -> Element<'_, Message> {
    if banners.is_empty() {
        return Space::with_height(Length::Shrink).into();
    }

    let lines = column(
        banners
            .iter()
            .map(|banner| text(banner.message()).color(banner.color()).into()),
    )
    .spacing(4);

    row![
        lines,
        Space::with_width(Length::Fill),
        button("Dismiss").on_press(Message::DismissBanners),
    ]
    .padding([0, 20])
    .align_y(Alignment::Center)
    .into()
}
