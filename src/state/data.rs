/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the storage tiers, the dispatch payload and the UI layer.
/// All of them serialize to the camelCase JSON used by `data.json`.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-local suffix so two artworks created in the same millisecond differ
static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// One encoded image attached to an artwork
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtworkImage {
    /// Self-contained data URI (`data:image/png;base64,...`)
    pub data: String,
    /// File name as picked by the user
    pub name: String,
}

/// A single portfolio entry
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    /// Opaque identifier assigned at creation
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Written as a number, but older records carry it as a string
    #[serde(deserialize_with = "year_from_number_or_text")]
    pub year: i32,
    /// Ordered image sequence
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ArtworkImage>,
    /// Legacy records hold one data URI here and no `images`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Records committed without a timestamp read as the Unix epoch
    #[serde(default)]
    pub date_created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Artwork {
    /// Create a new artwork stamped with a fresh id and the current time
    pub fn new(
        title: String,
        description: String,
        year: i32,
        images: Vec<ArtworkImage>,
        link: Option<String>,
    ) -> Self {
        let date_created = Utc::now();
        let sequence = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);

        Self {
            id: format!("{}-{}", date_created.timestamp_millis(), sequence),
            title,
            description,
            year,
            images,
            image: None,
            date_created,
            link,
        }
    }

    /// Data URIs of every image, normalizing the legacy single-image shape
    pub fn image_sources(&self) -> Vec<&str> {
        if self.images.is_empty() {
            self.image.as_deref().into_iter().collect()
        } else {
            self.images.iter().map(|image| image.data.as_str()).collect()
        }
    }

    /// Number of images, counting a legacy image as one
    pub fn image_count(&self) -> usize {
        if self.images.is_empty() {
            usize::from(self.image.is_some())
        } else {
            self.images.len()
        }
    }
}

fn year_from_number_or_text<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Number(i32),
        Text(String),
    }

    match Year::deserialize(deserializer)? {
        Year::Number(year) => Ok(year),
        Year::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid year {text:?}"))),
    }
}

/// The `{ "artworks": [...] }` envelope shared by every tier
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtworkCollection {
    #[serde(default)]
    pub artworks: Vec<Artwork>,
}

impl ArtworkCollection {
    pub fn new(artworks: Vec<Artwork>) -> Self {
        Self { artworks }
    }

    /// Convert to JSON string for storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON bytes (asset file, HTTP body or cache entry)
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A one-image artwork with a recognizable title
    pub fn artwork(title: &str) -> Artwork {
        Artwork::new(
            title.to_string(),
            format!("{title} description"),
            2024,
            vec![ArtworkImage {
                data: "data:image/png;base64,iVBORw0KGgo=".to_string(),
                name: format!("{title}.png"),
            }],
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_within_process() {
        let a = fixtures::artwork("First");
        let b = fixtures::artwork("Second");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serializes_camel_case() {
        let artwork = fixtures::artwork("Sunrise");
        let json = serde_json::to_value(&artwork).unwrap();

        assert!(json.get("dateCreated").is_some());
        assert!(json.get("date_created").is_none());
        // Absent optional fields stay out of the payload
        assert!(json.get("image").is_none());
        assert!(json.get("link").is_none());
        assert_eq!(json["images"][0]["name"], "Sunrise.png");
    }

    #[test]
    fn test_legacy_single_image_record() {
        let json = r#"{
            "artworks": [{
                "id": "1700000000000",
                "title": "Old piece",
                "year": 2021,
                "image": "data:image/jpeg;base64,/9j/4AAQ",
                "dateCreated": "2023-11-14T22:13:20Z"
            }]
        }"#;

        let collection = ArtworkCollection::from_slice(json.as_bytes()).unwrap();
        let artwork = &collection.artworks[0];

        assert_eq!(artwork.description, "");
        assert_eq!(artwork.image_count(), 1);
        assert_eq!(artwork.image_sources(), vec!["data:image/jpeg;base64,/9j/4AAQ"]);
    }

    #[test]
    fn test_text_year_and_missing_timestamp_accepted() {
        let json = r#"{
            "artworks": [{
                "id": "1",
                "title": "Typed in the form",
                "year": " 2024 "
            }]
        }"#;

        let collection = ArtworkCollection::from_slice(json.as_bytes()).unwrap();
        let artwork = &collection.artworks[0];

        assert_eq!(artwork.year, 2024);
        assert_eq!(artwork.date_created, DateTime::<Utc>::default());
    }

    #[test]
    fn test_unparseable_year_rejected() {
        let json = r#"{ "artworks": [{ "id": "1", "title": "Someday", "year": "soon" }] }"#;
        assert!(ArtworkCollection::from_slice(json.as_bytes()).is_err());
    }

    #[test]
    fn test_images_take_precedence_over_legacy_field() {
        let mut artwork = fixtures::artwork("Both");
        artwork.image = Some("data:image/gif;base64,R0lG".to_string());

        assert_eq!(artwork.image_count(), 1);
        assert_eq!(artwork.image_sources(), vec!["data:image/png;base64,iVBORw0KGgo="]);
    }

    #[test]
    fn test_imageless_record_has_no_sources() {
        let mut artwork = fixtures::artwork("Placeholder");
        artwork.images.clear();

        assert_eq!(artwork.image_count(), 0);
        assert!(artwork.image_sources().is_empty());
    }
}
