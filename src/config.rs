/// Application configuration
///
/// Form limits and the artist profile are compile-time constants. Everything
/// that varies per deployment (dispatch credential, repository coordinates,
/// where the static asset lives, where the local cache is stored) is read
/// from `PORTFOLIO_*` environment variables at startup.

use chrono::Datelike;
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::ConfigError;

// ========== Form validation ==========

pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
/// Earliest year an artwork may be dated
pub const MIN_YEAR: i32 = 2000;
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
/// 5 MiB per image
pub const MAX_IMAGE_SIZE: u64 = 5 * 1024 * 1024;

/// Upper bound for the year field
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

// ========== Artist profile ==========

/// Text shown on the About page
#[derive(Debug, Clone, Copy)]
pub struct ArtistProfile {
    pub name: &'static str,
    pub title: &'static str,
    pub location: &'static str,
    pub contact_email: &'static str,
    pub reviews_text: &'static str,
    pub reviews_page: &'static str,
    pub specialization: &'static str,
    /// Bio paragraphs, in display order
    pub bio: &'static [&'static str],
}

pub const ARTIST: ArtistProfile = ArtistProfile {
    name: "Zuzanna Stępska",
    title: "Contemporary Artist",
    location: "Based in Poznań, Poland",
    contact_email: "some.email@something.com",
    reviews_text: "Read my reviews at",
    reviews_page: "some_reviewsPage.com",
    specialization: "Specializing in acrylic painting, digital illustration, and mixed media",
    bio: &[
        "Welcome to my artistic journey. I am a passionate visual artist based in Vienna, \
         exploring the boundaries between traditional techniques and digital innovation. \
         My work seeks to capture the ephemeral moments of beauty in everyday life and \
         transform them into lasting impressions.",
        "After graduating from the Vienna Academy of Fine Arts in 2022, I've dedicated \
         myself to creating pieces that reflect both inner emotions and outer experiences. \
         I draw inspiration from urban landscapes, natural phenomena, and human connections.",
        "My artistic philosophy centers on the belief that art should evoke feelings, spark \
         conversations, and sometimes challenge perspectives. Each piece in my portfolio \
         represents a chapter in my ongoing exploration of color, form, and meaning.",
    ],
};

// ========== Deployment ==========

pub const DEFAULT_REPO_OWNER: &str = "JNeubau";
pub const DEFAULT_REPO_NAME: &str = "PortfolioPageProject";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Where the static collection asset is fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// Fetched over HTTP(S) on every load
    Remote(String),
    /// Read from disk on every load
    File(PathBuf),
}

impl AssetSource {
    /// Anything with an http(s) scheme is remote, everything else is a path
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("https://") || raw.starts_with("http://") {
            AssetSource::Remote(raw.to_string())
        } else {
            AssetSource::File(PathBuf::from(raw))
        }
    }

    /// The committed `data.json` on the default branch of the repository
    pub fn repository_default(owner: &str, repo: &str) -> Self {
        AssetSource::Remote(format!(
            "https://raw.githubusercontent.com/{owner}/{repo}/main/src/assets/data.json"
        ))
    }
}

/// Runtime configuration resolved from the environment
#[derive(Clone)]
pub struct PortfolioConfig {
    /// Dispatch credential. `None` means local-only persistence.
    pub github_token: Option<String>,
    pub repo_owner: String,
    pub repo_name: String,
    pub github_api: String,
    pub static_asset: AssetSource,
    /// Directory holding the local cache database
    pub data_dir: PathBuf,
    /// Emit JSON log lines instead of the human-readable format
    pub log_json: bool,
}

impl PortfolioConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let repo_owner = get("PORTFOLIO_REPO_OWNER").unwrap_or_else(|| DEFAULT_REPO_OWNER.to_string());
        let repo_name = get("PORTFOLIO_REPO_NAME").unwrap_or_else(|| DEFAULT_REPO_NAME.to_string());
        let github_api = get("PORTFOLIO_GITHUB_API")
            .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string())
            .trim_end_matches('/')
            .to_string();

        let static_asset = get("PORTFOLIO_STATIC_ASSET")
            .map(|raw| AssetSource::parse(&raw))
            .unwrap_or_else(|| AssetSource::repository_default(&repo_owner, &repo_name));

        let data_dir = match get("PORTFOLIO_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let mut path = dirs::data_dir()
                    .or_else(dirs::home_dir)
                    .ok_or(ConfigError::NoDataDir)?;
                path.push("portfolio");
                path
            }
        };

        let log_json = matches!(
            get("PORTFOLIO_LOG_JSON").as_deref(),
            Some("1" | "true" | "yes")
        );

        Ok(Self {
            // The token is not trimmed here: stray whitespace makes it malformed
            github_token: lookup("PORTFOLIO_GITHUB_TOKEN").filter(|t| !t.is_empty()),
            repo_owner,
            repo_name,
            github_api,
            static_asset,
            data_dir,
            log_json,
        })
    }

    /// Path of the local cache database
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("portfolio.db")
    }

    /// `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }

    /// The repository-dispatch resource for the configured repository
    pub fn dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/dispatches",
            self.github_api, self.repo_owner, self.repo_name
        )
    }
}

// Keep the credential out of logs
impl fmt::Debug for PortfolioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortfolioConfig")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("repo_owner", &self.repo_owner)
            .field("repo_name", &self.repo_name)
            .field("github_api", &self.github_api)
            .field("static_asset", &self.static_asset)
            .field("data_dir", &self.data_dir)
            .field("log_json", &self.log_json)
            .finish()
    }
}
