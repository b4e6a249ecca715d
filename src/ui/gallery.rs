use iced::widget::{button, column, container, image, row, text};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;
use std::collections::HashMap;

use crate::gallery::loader::LoadState;
use crate::state::data::Artwork;
use crate::state::navigation::ImageCursor;
use crate::Message;

/// Width (and image height) of one gallery card
const CARD_WIDTH: f32 = 280.0;

/// Decoded image handles for each artwork, keyed by artwork id
pub type Previews = HashMap<String, Vec<image::Handle>>;

/// Build the gallery grid for the current load state
pub fn view<'a>(
    state: &'a LoadState,
    previews: &'a Previews,
    cursors: &'a HashMap<String, ImageCursor>,
) -> Element<'a, Message> {
    match state {
        LoadState::Loading => centered(text("Loading artworks...").size(18)),
        LoadState::Empty => centered(text("No artworks yet.").size(18)),
        LoadState::Ready(artworks) => {
            let cards: Vec<Element<'a, Message>> = artworks
                .iter()
                .map(|artwork| {
                    let cursor = cursors.get(&artwork.id).copied().unwrap_or_default();
                    card(artwork, previews.get(&artwork.id), cursor)
                })
                .collect();

            container(Wrap::with_elements(cards).spacing(20.0).line_spacing(20.0))
                .padding(20)
                .width(Length::Fill)
                .into()
        }
    }
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fixed(240.0))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(240.0))
        .into()
}

/// One artwork: current image, image navigation, and metadata
fn card<'a>(
    artwork: &'a Artwork,
    handles: Option<&'a Vec<image::Handle>>,
    cursor: ImageCursor,
) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match handles.and_then(|h| h.get(cursor.index())) {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_WIDTH))
            .into(),
        // Placeholder for records without a usable image
        None => container(text("No image"))
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_WIDTH))
            .center_x(Length::Fixed(CARD_WIDTH))
            .center_y(Length::Fixed(CARD_WIDTH))
            .into(),
    };

    let mut content = column![picture].spacing(8).width(Length::Fixed(CARD_WIDTH));

    if cursor.len() > 1 {
        content = content.push(
            row![
                button("<").on_press(Message::PreviousImage(artwork.id.clone())),
                text(format!("{} / {}", cursor.index() + 1, cursor.len())),
                button(">").on_press(Message::NextImage(artwork.id.clone())),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        );
    }

    content = content
        .push(text(&artwork.title).size(20))
        .push(text(artwork.year.to_string()).size(14));

    if !artwork.description.is_empty() {
        content = content.push(text(&artwork.description).size(14));
    }

    if let Some(link) = &artwork.link {
        content = content.push(text(link).size(12));
    }

    content.into()
}
