use serde::{Deserialize, Serialize};

/// One submission from the input form. Transient.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkRequest {
    #[serde(rename = "url")]
    pub raw_url: String,
    #[serde(default, rename = "alias")]
    pub custom_alias: Option<String>,
}

/// A shortened link. Replaced wholesale on every successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub code: String,
    pub short_url: String,
    pub qr_image_url: String,
    pub original_url: String,
}

/// Click count attributed to a single country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryClicks {
    pub name: String,
    pub clicks: u32,
}

/// Click count attributed to a single device class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceClicks {
    #[serde(rename = "type")]
    pub device_type: String,
    pub clicks: u32,
}

/// Simulated analytics shown to premium sessions.
///
/// `total_clicks` is drawn independently of the breakdowns, so it need not
/// equal either sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_clicks: u32,
    pub countries: Vec<CountryClicks>,
    pub devices: Vec<DeviceClicks>,
}

/// What the presentation layer needs to save the QR image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrDownload {
    pub href: String,
    pub filename: &'static str,
}

/// Everything a backend produces for one accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    pub link: ShortLink,
    pub analytics: Option<AnalyticsSnapshot>,
}
