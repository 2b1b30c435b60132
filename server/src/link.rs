use crate::models::ShortLink;

pub const DEFAULT_SHORT_BASE: &str = "https://short.ly";
pub const DEFAULT_QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const DEFAULT_QR_SIZE: u32 = 200;

/// Builds the public short URL and its QR image reference from a code.
#[derive(Debug, Clone)]
pub struct LinkAssembler {
    /// Short-domain prefix without a trailing slash, e.g. "https://short.ly".
    short_base: String,
    qr_endpoint: String,
    qr_size: u32,
}

impl LinkAssembler {
    pub fn new(short_base: &str, qr_endpoint: &str, qr_size: u32) -> Self {
        Self {
            short_base: short_base.trim_end_matches('/').to_owned(),
            qr_endpoint: qr_endpoint.to_owned(),
            qr_size,
        }
    }

    /// Pure: the same `(code, original_url)` always yields the same link.
    pub fn assemble(&self, code: &str, original_url: &str) -> ShortLink {
        let short_url = format!("{}/{}", self.short_base, code);
        let qr_image_url = self.qr_reference(&short_url);

        ShortLink {
            code: code.to_owned(),
            short_url,
            qr_image_url,
            original_url: original_url.to_owned(),
        }
    }

    /// `<endpoint>?size=<n>x<n>&data=<percent-encoded target>`. Only a
    /// reference is produced; fetching the image is the caller's job.
    pub fn qr_reference(&self, target: &str) -> String {
        format!(
            "{}?size={size}x{size}&data={}",
            self.qr_endpoint,
            urlencoding::encode(target),
            size = self.qr_size,
        )
    }
}

impl Default for LinkAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_BASE, DEFAULT_QR_ENDPOINT, DEFAULT_QR_SIZE)
    }
}
