use iced::widget::{button, column, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::config;
use crate::submit::validation::{ArtworkForm, ImageFile};
use crate::Message;

/// Form fields exactly as typed
#[derive(Debug, Clone)]
pub struct FormState {
    pub title: String,
    pub description: String,
    pub year: String,
    pub link: String,
    pub images: Vec<ImageFile>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            year: config::current_year().to_string(),
            link: String::new(),
            images: Vec::new(),
        }
    }
}

impl FormState {
    /// Convert to submission input. An unparseable year becomes 0 and is
    /// rejected by validation like any other out-of-range year.
    pub fn to_form(&self) -> ArtworkForm {
        ArtworkForm {
            title: self.title.clone(),
            description: self.description.clone(),
            year: self.year.trim().parse().unwrap_or(0),
            link: Some(self.link.clone()).filter(|link| !link.trim().is_empty()),
            images: self.images.clone(),
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{} KB", bytes.div_ceil(1024))
    }
}

/// Build the Add Art form
pub fn view(form: &FormState, submitting: bool) -> Element<'_, Message> {
    let picked = column(form.images.iter().enumerate().map(|(index, image)| {
        row![
            text(&image.file_name),
            text(format_size(image.size)).size(12),
            button("Remove").on_press_maybe((!submitting).then_some(Message::RemoveImage(index))),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
    }))
    .spacing(6);

    let submit_label = if submitting { "Submitting..." } else { "Submit Artwork" };

    column![
        text("Add New Artwork").size(32),
        text("Use the form below to add a new piece to your portfolio."),
        text("Artwork Title"),
        text_input("Enter the title of your artwork", &form.title)
            .on_input(Message::TitleChanged)
            .padding(8),
        text("Description"),
        text_input(
            "Describe your artwork, techniques used, inspiration, etc.",
            &form.description
        )
        .on_input(Message::DescriptionChanged)
        .padding(8),
        text("Year Created"),
        text_input("Year", &form.year)
            .on_input(Message::YearChanged)
            .padding(8)
            .width(Length::Fixed(120.0)),
        text("Link (optional)"),
        text_input("https://", &form.link)
            .on_input(Message::LinkChanged)
            .padding(8),
        text("Upload Images"),
        button("Choose files").on_press_maybe((!submitting).then_some(Message::PickImages)),
        picked,
        row![
            button(submit_label)
                .on_press_maybe((!submitting).then_some(Message::Submit))
                .padding(10),
            button("Back to Main Page")
                .on_press(Message::ShowLayout(crate::Layout::Art))
                .padding(10),
        ]
        .spacing(12),
    ]
    .spacing(10)
    .padding(40)
    .max_width(720.0)
    .into()
}
