use serde::Serialize;

/// Title shown when a player reports none.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Artist shown when a player reports none.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// MPRIS metadata key for the track title.
pub const TITLE_KEY: &str = "xesam:title";

/// MPRIS metadata key for the track artist(s).
pub const ARTIST_KEY: &str = "xesam:artist";

/// MPRIS metadata key for the artwork location.
pub const ART_URL_KEY: &str = "mpris:artUrl";

/// A single loosely-typed value taken from a player's metadata map.
///
/// Players are free to put anything under any key, so values arrive in
/// whatever shape the player chose and are only interpreted during
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// String or object path
    Text(String),

    /// Any integer width
    Integer(i64),

    /// Double
    Float(f64),

    /// Boolean
    Boolean(bool),

    /// Array of values, in the order the player sent them
    List(Vec<MetadataValue>),

    /// Anything else (dicts, structs, file descriptors)
    Unsupported,
}

impl MetadataValue {
    /// Coerce the value to display text.
    ///
    /// Empty strings, zero numbers, `false` and empty lists count as absent.
    /// Lists are joined with ", " after coercing each element; elements that
    /// coerce to nothing are skipped.
    pub fn coerce_text(&self) -> Option<String> {
        let text = match self {
            Self::Text(text) => text.clone(),
            Self::Integer(0) | Self::Boolean(false) | Self::Unsupported => return None,
            Self::Integer(number) => number.to_string(),
            Self::Float(number) if *number == 0.0 || number.is_nan() => return None,
            Self::Float(number) => number.to_string(),
            Self::Boolean(true) => "true".to_string(),
            Self::List(items) => items
                .iter()
                .filter_map(Self::coerce_text)
                .collect::<Vec<_>>()
                .join(", "),
        };

        if text.is_empty() { None } else { Some(text) }
    }
}

impl From<&str> for MetadataValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<T: Into<MetadataValue>> From<Vec<T>> for MetadataValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// The subset of a player's metadata map the display cares about.
///
/// Every field is optional; a player may omit any key or fill it with an
/// unexpected type. Nothing here is trusted until [`Track::normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    /// Value under `xesam:title`
    pub title: Option<MetadataValue>,

    /// Value under `xesam:artist`
    pub artist: Option<MetadataValue>,

    /// Value under `mpris:artUrl`
    pub art_url: Option<MetadataValue>,
}

impl RawMetadata {
    /// Build raw metadata from `(key, value)` pairs, ignoring unknown keys.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, MetadataValue)>,
        K: AsRef<str>,
    {
        let mut raw = Self::default();

        for (key, value) in entries {
            match key.as_ref() {
                TITLE_KEY => raw.title = Some(value),
                ARTIST_KEY => raw.artist = Some(value),
                ART_URL_KEY => raw.art_url = Some(value),
                _ => {}
            }
        }

        raw
    }
}

/// Display-ready track information.
///
/// Title and artist are never empty; artwork is either a location or absent
/// and the display decides what to show without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Track title
    pub title: String,

    /// Track artist(s), joined with ", "
    pub artist: String,

    /// Artwork path or URI
    pub art_url: Option<String>,
}

impl Track {
    /// Normalize raw metadata into a track. Total: never fails.
    pub fn normalize(raw: &RawMetadata) -> Self {
        Self {
            title: raw
                .title
                .as_ref()
                .and_then(MetadataValue::coerce_text)
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: raw
                .artist
                .as_ref()
                .and_then(MetadataValue::coerce_text)
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            art_url: raw.art_url.as_ref().and_then(MetadataValue::coerce_text),
        }
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::normalize(&RawMetadata::default())
    }
}

impl From<&RawMetadata> for Track {
    fn from(raw: &RawMetadata) -> Self {
        Self::normalize(raw)
    }
}
