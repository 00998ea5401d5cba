//! Content types and their per-type settings.
//!
//! Each zone shows one kind of content.  The kind decides which settings make
//! sense: a video zone has `autoplay`/`loop`/`mute`, a clock zone has a format,
//! a timezone and so on.  [`ContentSettings`] is a tagged union with one
//! variant per [`ContentType`], so a clock zone can never carry video
//! settings.
//!
//! # Registry
//!
//! [`defaults_for`] is the registry: it returns the correctly tagged default
//! settings for a content type.  It is pure lookup data.
//!
//! # Merging
//!
//! Settings-panel edits arrive as a [`SettingsPatch`]: a content type plus a
//! JSON object of the keys that changed.  A patch only merges into the variant
//! of the same type.  Keys present in the patch overwrite, absent keys are kept,
//! and a key whose value does not parse is skipped on its own without
//! discarding the rest of the patch.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::units::CssLength;

/// The kind of content a zone displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Video,
    Image,
    Text,
    Webpage,
    Playlist,
    Ticker,
    Clock,
    Weather,
    QrCode,
    Logo,
}

impl ContentType {
    pub const ALL: [ContentType; 10] = [
        ContentType::Video,
        ContentType::Image,
        ContentType::Text,
        ContentType::Webpage,
        ContentType::Playlist,
        ContentType::Ticker,
        ContentType::Clock,
        ContentType::Weather,
        ContentType::QrCode,
        ContentType::Logo,
    ];

    /// Wire tag, e.g. `"qr_code"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Image => "image",
            ContentType::Text => "text",
            ContentType::Webpage => "webpage",
            ContentType::Playlist => "playlist",
            ContentType::Ticker => "ticker",
            ContentType::Clock => "clock",
            ContentType::Weather => "weather",
            ContentType::QrCode => "qr_code",
            ContentType::Logo => "logo",
        }
    }

    /// Human-readable label used for default zone names.
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Video => "Video",
            ContentType::Image => "Image",
            ContentType::Text => "Text",
            ContentType::Webpage => "Webpage",
            ContentType::Playlist => "Playlist",
            ContentType::Ticker => "Ticker",
            ContentType::Clock => "Clock",
            ContentType::Weather => "Weather",
            ContentType::QrCode => "QR Code",
            ContentType::Logo => "Logo",
        }
    }

    pub fn parse(tag: &str) -> Option<ContentType> {
        ContentType::ALL.into_iter().find(|t| t.as_str() == tag.trim())
    }
}

// ── Per-type settings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSettings {
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub mute: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self { autoplay: true, looping: true, mute: false }
    }
}

/// How an image is fitted into its zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageScale {
    Cover,
    Contain,
    Fill,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSettings {
    pub scale: ImageScale,
    /// Seconds the image stays on screen.
    pub duration: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self { scale: ImageScale::Cover, duration: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSettings {
    pub text: String,
    pub font_size: CssLength,
    pub font_family: String,
    pub color: String,
    pub background_color: String,
    pub text_align: TextAlign,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: CssLength::px(24.0),
            font_family: "Arial".to_string(),
            color: "#ffffff".to_string(),
            background_color: "transparent".to_string(),
            text_align: TextAlign::Center,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebpageSettings {
    pub url: String,
    /// Reload period in seconds; `0` never reloads.
    pub refresh_interval: u32,
    /// Page zoom in percent.
    pub zoom: u32,
}

impl Default for WebpageSettings {
    fn default() -> Self {
        Self { url: String::new(), refresh_interval: 0, zoom: 100 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    None,
    Fade,
    Slide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSettings {
    pub shuffle: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub transition: Transition,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self { shuffle: false, looping: true, transition: Transition::Fade }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerSettings {
    pub text: String,
    /// Scroll speed in pixels per second.
    pub speed: u32,
    pub direction: ScrollDirection,
    pub font_size: CssLength,
    pub color: String,
    pub background_color: String,
}

impl Default for TickerSettings {
    fn default() -> Self {
        Self {
            text: String::new(),
            speed: 50,
            direction: ScrollDirection::Left,
            font_size: CssLength::px(20.0),
            color: "#ffffff".to_string(),
            background_color: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockFormat {
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockStyle {
    Digital,
    Analog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockSettings {
    pub format: ClockFormat,
    /// IANA timezone name, or `"local"` for the player's own clock.
    pub timezone: String,
    pub style: ClockStyle,
    pub show_seconds: bool,
    pub show_date: bool,
    pub time_size: CssLength,
    pub date_size: CssLength,
    pub color: String,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            format: ClockFormat::TwentyFourHour,
            timezone: "local".to_string(),
            style: ClockStyle::Digital,
            show_seconds: true,
            show_date: true,
            time_size: CssLength::rem(2.0),
            date_size: CssLength::rem(1.0),
            color: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSettings {
    pub location: String,
    pub units: TemperatureUnit,
    pub show_forecast: bool,
    /// Refresh period in minutes.
    pub refresh_interval: u32,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            location: String::new(),
            units: TemperatureUnit::Celsius,
            show_forecast: false,
            refresh_interval: 30,
        }
    }
}

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeSettings {
    pub data: String,
    pub foreground: String,
    pub background: String,
    pub error_correction: ErrorCorrection,
}

impl Default for QrCodeSettings {
    fn default() -> Self {
        Self {
            data: String::new(),
            foreground: "#000000".to_string(),
            background: "#ffffff".to_string(),
            error_correction: ErrorCorrection::M,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoSettings {
    pub scale: ImageScale,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for LogoSettings {
    fn default() -> Self {
        Self { scale: ImageScale::Contain, opacity: 1.0 }
    }
}

// ── Tagged union ──────────────────────────────────────────────────────────────

/// Settings of a zone, tagged by content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSettings {
    Video(VideoSettings),
    Image(ImageSettings),
    Text(TextSettings),
    Webpage(WebpageSettings),
    Playlist(PlaylistSettings),
    Ticker(TickerSettings),
    Clock(ClockSettings),
    Weather(WeatherSettings),
    QrCode(QrCodeSettings),
    Logo(LogoSettings),
}

/// Returns the default settings registered for `content_type`.
pub fn defaults_for(content_type: ContentType) -> ContentSettings {
    match content_type {
        ContentType::Video => ContentSettings::Video(VideoSettings::default()),
        ContentType::Image => ContentSettings::Image(ImageSettings::default()),
        ContentType::Text => ContentSettings::Text(TextSettings::default()),
        ContentType::Webpage => ContentSettings::Webpage(WebpageSettings::default()),
        ContentType::Playlist => ContentSettings::Playlist(PlaylistSettings::default()),
        ContentType::Ticker => ContentSettings::Ticker(TickerSettings::default()),
        ContentType::Clock => ContentSettings::Clock(ClockSettings::default()),
        ContentType::Weather => ContentSettings::Weather(WeatherSettings::default()),
        ContentType::QrCode => ContentSettings::QrCode(QrCodeSettings::default()),
        ContentType::Logo => ContentSettings::Logo(LogoSettings::default()),
    }
}

/// A partial settings edit for one content type.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsPatch {
    pub content_type: ContentType,
    pub values: Map<String, Value>,
}

impl SettingsPatch {
    pub fn new(content_type: ContentType, values: Map<String, Value>) -> Self {
        Self { content_type, values }
    }

    /// Builds a patch from any JSON value; non-objects yield an empty patch.
    pub fn from_value(content_type: ContentType, value: Value) -> Self {
        let values = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { content_type, values }
    }
}

impl ContentSettings {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentSettings::Video(_) => ContentType::Video,
            ContentSettings::Image(_) => ContentType::Image,
            ContentSettings::Text(_) => ContentType::Text,
            ContentSettings::Webpage(_) => ContentType::Webpage,
            ContentSettings::Playlist(_) => ContentType::Playlist,
            ContentSettings::Ticker(_) => ContentType::Ticker,
            ContentSettings::Clock(_) => ContentType::Clock,
            ContentSettings::Weather(_) => ContentType::Weather,
            ContentSettings::QrCode(_) => ContentType::QrCode,
            ContentSettings::Logo(_) => ContentType::Logo,
        }
    }

    /// Builds settings for `content_type` from a persisted JSON object.
    ///
    /// Starts from the registry defaults and merges whatever keys of `raw`
    /// parse, so a partial or partly corrupt record still loads.
    pub fn from_wire(content_type: ContentType, raw: &Value) -> Self {
        let mut settings = defaults_for(content_type);
        if let Value::Object(values) = raw {
            settings.merge_values(values);
        }
        settings
    }

    /// Renders the settings as the JSON object stored on the wire.
    pub fn to_wire(&self) -> Value {
        let rendered = match self {
            ContentSettings::Video(s) => serde_json::to_value(s),
            ContentSettings::Image(s) => serde_json::to_value(s),
            ContentSettings::Text(s) => serde_json::to_value(s),
            ContentSettings::Webpage(s) => serde_json::to_value(s),
            ContentSettings::Playlist(s) => serde_json::to_value(s),
            ContentSettings::Ticker(s) => serde_json::to_value(s),
            ContentSettings::Clock(s) => serde_json::to_value(s),
            ContentSettings::Weather(s) => serde_json::to_value(s),
            ContentSettings::QrCode(s) => serde_json::to_value(s),
            ContentSettings::Logo(s) => serde_json::to_value(s),
        };
        rendered.unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Merges `patch` into these settings.
    ///
    /// Returns the number of keys applied.  A patch for a different content
    /// type applies nothing.
    pub fn apply_patch(&mut self, patch: &SettingsPatch) -> usize {
        if patch.content_type != self.content_type() {
            debug!(
                "ignoring {} settings patch for a {} zone",
                patch.content_type.as_str(),
                self.content_type().as_str()
            );
            return 0;
        }
        self.merge_values(&patch.values)
    }

    fn merge_values(&mut self, values: &Map<String, Value>) -> usize {
        let applied = match self {
            ContentSettings::Video(s) => merge_fields(s, values),
            ContentSettings::Image(s) => merge_fields(s, values),
            ContentSettings::Text(s) => merge_fields(s, values),
            ContentSettings::Webpage(s) => merge_fields(s, values),
            ContentSettings::Playlist(s) => merge_fields(s, values),
            ContentSettings::Ticker(s) => merge_fields(s, values),
            ContentSettings::Clock(s) => merge_fields(s, values),
            ContentSettings::Weather(s) => merge_fields(s, values),
            ContentSettings::QrCode(s) => merge_fields(s, values),
            ContentSettings::Logo(s) => merge_fields(s, values),
        };
        self.normalize();
        applied
    }

    /// Pulls numeric fields back into their meaningful ranges.
    fn normalize(&mut self) {
        match self {
            ContentSettings::Logo(s) => {
                s.opacity = if s.opacity.is_finite() { s.opacity.clamp(0.0, 1.0) } else { 1.0 };
            }
            ContentSettings::Webpage(s) => s.zoom = s.zoom.clamp(10, 500),
            ContentSettings::Image(s) => s.duration = s.duration.max(1),
            _ => {}
        }
    }
}

/// Shallow-merges `values` into `current`, one key at a time.
///
/// The struct is rendered to a JSON object, each known key is swapped in and
/// the result re-parsed; a key whose value does not parse is rolled back.
fn merge_fields<T>(current: &mut T, values: &Map<String, Value>) -> usize
where
    T: Serialize + DeserializeOwned,
{
    let mut base = match serde_json::to_value(&*current) {
        Ok(Value::Object(map)) => map,
        _ => return 0,
    };

    let mut applied = 0;
    for (key, value) in values {
        let Some(previous) = base.get(key).cloned() else {
            debug!("ignoring unknown settings key {key:?}");
            continue;
        };
        base.insert(key.clone(), value.clone());
        match serde_json::from_value::<T>(Value::Object(base.clone())) {
            Ok(_) => applied += 1,
            Err(e) => {
                debug!("rejecting settings value for {key:?}: {e}");
                base.insert(key.clone(), previous);
            }
        }
    }

    if applied > 0 {
        if let Ok(merged) = serde_json::from_value(Value::Object(base)) {
            *current = merged;
        }
    }
    applied
}

// ── Tests ─────────────────────────────────────────────────────────────────────
