use iced::widget::{button, column, text, Column};
use iced::Element;

use crate::config::ARTIST;
use crate::{Layout, Message};

/// The artist's bio page
pub fn view<'a>() -> Element<'a, Message> {
    let bio = Column::with_children(ARTIST.bio.iter().map(|paragraph| text(*paragraph).into()))
        .spacing(12);

    column![
        text("About").size(32),
        text(ARTIST.name).size(24),
        text(ARTIST.title),
        bio,
        text(ARTIST.specialization),
        text(ARTIST.location),
        text(format!("Contact: {}", ARTIST.contact_email)),
        text(format!("{} {}", ARTIST.reviews_text, ARTIST.reviews_page)),
        button("Back to Main Page").on_press(Message::ShowLayout(Layout::Art)),
    ]
    .spacing(10)
    .padding(40)
    .max_width(720.0)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_carries_full_bio() {
        assert_eq!(ARTIST.bio.len(), 3);
        assert!(ARTIST.bio.iter().all(|paragraph| !paragraph.contains("  ")));
        assert!(ARTIST.specialization.starts_with("Specializing in"));
    }
}
