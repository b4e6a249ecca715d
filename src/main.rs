use iced::widget::{column, image, scrollable};
use iced::{Element, Length, Task, Theme};
use rfd::FileDialog;
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod gallery;
mod state;
mod submit;
mod ui;

use config::PortfolioConfig;
use error::SubmitError;
use gallery::loader::{load_shared, GalleryLoader, LoadOutcome, LoadState};
use state::data::Artwork;
use state::navigation::ImageCursor;
use state::store::CollectionStore;
use submit::coordinator::{SubmissionCoordinator, SubmissionReport};
use submit::dispatch::GitHubDispatcher;
use submit::encode::decode_data_uri;
use submit::validation::{validate, ImageFile};
use ui::form::FormState;
use ui::gallery::Previews;

/// Which page is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Art,
    About,
    AddArt,
}

/// A message shown above the current page
#[derive(Debug, Clone)]
pub enum Banner {
    Success(String),
    Advisory(String),
    Error(String),
}

/// Main application state
struct Portfolio {
    layout: Layout,
    /// What the gallery renders
    gallery: LoadState,
    /// Decoded image handles, rebuilt whenever the collection changes
    previews: Previews,
    /// Current image of each card, keyed by artwork id
    cursors: HashMap<String, ImageCursor>,
    form: FormState,
    /// True while a submission is running; disables the submit button
    submitting: bool,
    banners: Vec<Banner>,
    coordinator: SubmissionCoordinator,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    ShowLayout(Layout),
    /// Startup tier resolution finished
    GalleryLoaded(LoadOutcome),
    /// A submission published a new collection
    CollectionUpdated(Vec<Artwork>),
    NextImage(String),
    PreviousImage(String),
    TitleChanged(String),
    DescriptionChanged(String),
    YearChanged(String),
    LinkChanged(String),
    PickImages,
    RemoveImage(usize),
    Submit,
    SubmitFinished(Result<SubmissionReport, SubmitError>),
    DismissBanners,
}

impl Portfolio {
    /// Wire the tiers together, start loading, and subscribe to updates
    fn new(config: PortfolioConfig, store: CollectionStore) -> (Self, Task<Message>) {
        let dispatcher = Arc::new(GitHubDispatcher::new(&config));
        let coordinator = SubmissionCoordinator::new(store.clone(), dispatcher);
        let loader = Arc::new(GalleryLoader::standard(&config, store.clone()));

        if config.github_token.is_none() {
            tracing::info!("no dispatch token configured, submissions stay local");
        }

        // Lives as long as the window: every publish lands here
        let updates = store.subscribe();
        let notifications = iced::futures::stream::unfold(updates, |mut receiver| async move {
            receiver.recv().await.map(|artworks| (artworks, receiver))
        });

        let portfolio = Portfolio {
            layout: Layout::Art,
            gallery: LoadState::Loading,
            previews: HashMap::new(),
            cursors: HashMap::new(),
            form: FormState::default(),
            submitting: false,
            banners: Vec::new(),
            coordinator,
        };

        (
            portfolio,
            Task::batch([
                Task::perform(load_shared(loader), Message::GalleryLoaded),
                Task::run(notifications, Message::CollectionUpdated),
            ]),
        )
    }

    fn title(&self) -> String {
        format!("{} Portfolio", config::ARTIST.name)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ShowLayout(layout) => {
                self.layout = layout;
                Task::none()
            }
            Message::GalleryLoaded(outcome) => {
                // A notification that arrived first is newer than any tier
                if self.gallery != LoadState::Loading {
                    tracing::debug!(tier = ?outcome.tier, "gallery already updated, dropping load result");
                    return Task::none();
                }
                match outcome.tier {
                    Some(tier) => tracing::debug!(%tier, "showing collection"),
                    None => tracing::debug!("showing empty gallery"),
                }
                self.show(outcome.state);
                Task::none()
            }
            Message::CollectionUpdated(artworks) => {
                let mut gallery = std::mem::replace(&mut self.gallery, LoadState::Loading);
                gallery.apply_notification(artworks);
                self.show(gallery);
                Task::none()
            }
            Message::NextImage(id) => {
                if let Some(cursor) = self.cursors.get_mut(&id) {
                    cursor.next();
                }
                Task::none()
            }
            Message::PreviousImage(id) => {
                if let Some(cursor) = self.cursors.get_mut(&id) {
                    cursor.previous();
                }
                Task::none()
            }
            Message::TitleChanged(title) => {
                self.form.title = title;
                Task::none()
            }
            Message::DescriptionChanged(description) => {
                self.form.description = description;
                Task::none()
            }
            Message::YearChanged(year) => {
                self.form.year = year;
                Task::none()
            }
            Message::LinkChanged(link) => {
                self.form.link = link;
                Task::none()
            }
            Message::PickImages => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Select Artwork Images")
                    .add_filter("Images", &["jpg", "jpeg", "png", "gif", "webp"])
                    .add_filter("All files", &["*"])
                    .pick_files();

                for path in picked.unwrap_or_default() {
                    match ImageFile::from_path(path.clone()) {
                        Ok(file) => self.form.images.push(file),
                        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not read picked file"),
                    }
                }
                Task::none()
            }
            Message::RemoveImage(index) => {
                if index < self.form.images.len() {
                    self.form.images.remove(index);
                }
                Task::none()
            }
            Message::Submit => {
                if self.submitting || self.coordinator.is_busy() {
                    return Task::none();
                }

                let form = self.form.to_form();

                // Rule violations are reported before any work starts
                if let Err(e) = validate(&form, config::current_year()) {
                    self.banners = vec![Banner::Error(e.to_string())];
                    return Task::none();
                }

                self.submitting = true;
                self.banners.clear();

                let coordinator = self.coordinator.clone();
                Task::perform(
                    async move { coordinator.submit(form).await },
                    Message::SubmitFinished,
                )
            }
            Message::SubmitFinished(result) => {
                self.submitting = false;
                match result {
                    Ok(report) => {
                        tracing::info!(
                            total = report.collection.len(),
                            notified = report.notified,
                            "submission finished"
                        );
                        self.banners = vec![Banner::Success(report.success_message())];
                        if let Some(advisory) = report.advisory() {
                            self.banners.push(Banner::Advisory(advisory.to_string()));
                        }
                        self.form = FormState::default();
                        // Back to the gallery, which already has the new artwork
                        self.layout = Layout::Art;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "submission failed");
                        self.banners = vec![Banner::Error(e.to_string())];
                    }
                }
                Task::none()
            }
            Message::DismissBanners => {
                self.banners.clear();
                Task::none()
            }
        }
    }

    /// Swap in a new gallery state and rebuild the decoded previews.
    /// Cards whose image count is unchanged keep their position.
    fn show(&mut self, gallery: LoadState) {
        let mut previews = HashMap::new();
        let mut cursors = HashMap::new();

        for artwork in gallery.artworks() {
            let handles: Vec<image::Handle> = artwork
                .image_sources()
                .into_iter()
                .filter_map(decode_data_uri)
                .map(image::Handle::from_bytes)
                .collect();

            if handles.len() < artwork.image_count() {
                tracing::warn!(id = %artwork.id, "some images could not be decoded");
            }

            let cursor = self
                .cursors
                .get(&artwork.id)
                .filter(|cursor| cursor.len() == handles.len())
                .copied()
                .unwrap_or_else(|| ImageCursor::new(handles.len()));

            cursors.insert(artwork.id.clone(), cursor);
            previews.insert(artwork.id.clone(), handles);
        }

        self.previews = previews;
        self.cursors = cursors;
        self.gallery = gallery;
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let page = match self.layout {
            Layout::Art => ui::gallery::view(&self.gallery, &self.previews, &self.cursors),
            Layout::About => ui::about::view(),
            Layout::AddArt => ui::form::view(&self.form, self.submitting),
        };

        column![
            ui::header(self.layout),
            ui::banners(&self.banners),
            scrollable(page).height(Length::Fill),
            ui::footer(config::current_year()),
        ]
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = PortfolioConfig::from_env()?;
    init_tracing(config.log_json);
    tracing::info!(?config, "starting portfolio");

    let store = CollectionStore::open(config.db_path())?;
    tracing::debug!(path = %store.path().display(), "collection store ready");

    iced::application(Portfolio::title, Portfolio::update, Portfolio::view)
        .theme(Portfolio::theme)
        .centered()
        .run_with(move || Portfolio::new(config, store))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::probe::Tier;
    use crate::state::data::fixtures::artwork;

    fn portfolio(dir: &tempfile::TempDir) -> Portfolio {
        let data_dir = dir.path().to_string_lossy().to_string();
        let config = PortfolioConfig::from_lookup(|name| {
            (name == "PORTFOLIO_DATA_DIR").then(|| data_dir.clone())
        })
        .unwrap();
        let store = CollectionStore::open(config.db_path()).unwrap();
        let (portfolio, _task) = Portfolio::new(config, store);
        portfolio
    }

    fn titles(portfolio: &Portfolio) -> Vec<&str> {
        portfolio
            .gallery
            .artworks()
            .iter()
            .map(|artwork| artwork.title.as_str())
            .collect()
    }

    #[test]
    fn test_load_result_shown_while_loading() {
        let dir = tempfile::tempdir().unwrap();
        let mut portfolio = portfolio(&dir);

        let _ = portfolio.update(Message::GalleryLoaded(LoadOutcome {
            tier: Some(Tier::StaticAsset),
            state: LoadState::Ready(vec![artwork("Published")]),
        }));

        assert_eq!(titles(&portfolio), ["Published"]);
        assert_eq!(portfolio.cursors.len(), 1);
    }

    #[test]
    fn test_late_load_does_not_replace_newer_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut portfolio = portfolio(&dir);
        let published = artwork("Published");

        let _ = portfolio.update(Message::CollectionUpdated(vec![
            published.clone(),
            artwork("Just submitted"),
        ]));
        let _ = portfolio.update(Message::GalleryLoaded(LoadOutcome {
            tier: Some(Tier::StaticAsset),
            state: LoadState::Ready(vec![published]),
        }));

        assert_eq!(titles(&portfolio), ["Published", "Just submitted"]);
    }

    #[test]
    fn test_late_empty_load_does_not_clear_gallery() {
        let dir = tempfile::tempdir().unwrap();
        let mut portfolio = portfolio(&dir);

        let _ = portfolio.update(Message::CollectionUpdated(vec![artwork("Only one")]));
        let _ = portfolio.update(Message::GalleryLoaded(LoadOutcome {
            tier: None,
            state: LoadState::Empty,
        }));

        assert_eq!(titles(&portfolio), ["Only one"]);
    }
}
