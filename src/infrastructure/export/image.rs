//! Image references inside submissions
//!
//! Detection of image URLs, the HTTP fetcher and conversion of the fetched
//! bytes into an embeddable JPEG.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, Rgb, RgbImage};
use tracing::debug;
use url::Url;

use crate::domain::export::{ExportError, ImageFetcher};

use super::pdf::PdfImage;

/// Raster extensions treated as embeddable images
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Quality of the JPEG embedded in documents
const JPEG_QUALITY: u8 = 90;

/// A field value recognised as a link to an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub url: String,
    pub extension: String,
}

/// Classify a normalized field value
///
/// An image reference is an absolute http(s) URL with a host whose path
/// ends in one of [`IMAGE_EXTENSIONS`], compared case-insensitively.
pub fn image_reference(value: &str) -> Option<ImageReference> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return None;
    }

    let url = Url::parse(value).ok()?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return None;
    }

    let file_name = url.path_segments()?.next_back()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();

    IMAGE_EXTENSIONS
        .contains(&extension.as_str())
        .then(|| ImageReference {
            url: value.to_string(),
            extension,
        })
}

/// Decode a staged image file and re-encode it as a baseline RGB JPEG
///
/// Transparent pixels are composited onto white.
pub fn load_embeddable(path: &Path, url: &str) -> Result<PdfImage, ExportError> {
    let decoded = ImageReader::open(path)
        .map_err(|e| ExportError::filesystem(format!("cannot read staged image: {}", e)))?
        .with_guessed_format()
        .map_err(|e| ExportError::filesystem(format!("cannot read staged image: {}", e)))?
        .decode()
        .map_err(|e| ExportError::unsupported_image(url, e.to_string()))?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let rgb = RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let alpha = u16::from(a);
            ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    });

    let mut data = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ExportError::unsupported_image(url, e.to_string()))?;

    debug!(url, width, height, "Prepared image for embedding");

    Ok(PdfImage {
        width,
        height,
        data: data.into_inner(),
    })
}

/// Real image fetcher using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestImageFetcher {
    client: reqwest::Client,
}

impl ReqwestImageFetcher {
    /// Fetcher with an optional overall request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self, ExportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ExportError::render(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for ReqwestImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, ExportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExportError::upstream_fetch(url, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::upstream_fetch(url, format!("HTTP {}", status)));
        }

        response
            .bytes()
            .await
            .map_err(|e| ExportError::upstream_fetch(url, format!("body read failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 128]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_image_reference_extensions() {
        let reference = image_reference("https://example.com/photo.JPG").unwrap();
        assert_eq!(reference.extension, "jpg");

        assert!(image_reference("https://example.com/a/b.jpeg").is_some());
        assert!(image_reference("http://example.com/scan.png?v=2").is_some());
        assert!(image_reference("https://example.com/photo.gif").is_none());
        assert!(image_reference("https://example.com/photo.png.txt").is_none());
    }

    #[test]
    fn test_image_reference_requires_absolute_url() {
        assert!(image_reference("photo.jpg").is_none());
        assert!(image_reference("/uploads/photo.jpg").is_none());
        assert!(image_reference("ftp://example.com/photo.jpg").is_none());
        assert!(image_reference("https://example.com/my photo.jpg").is_none());
        assert!(image_reference("https://example.com/").is_none());
        assert!(image_reference("").is_none());
    }

    #[test]
    fn test_load_embeddable_converts_png() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pdfimg_test.png");
        std::fs::write(&file, png_bytes(8, 4)).unwrap();

        let image = load_embeddable(&file, "https://example.com/a.png").unwrap();

        assert_eq!((image.width, image.height), (8, 4));
        assert_eq!(&image.data[..2], &[0xff, 0xd8]);
    }

    #[test]
    fn test_load_embeddable_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pdfimg_bad.jpg");
        std::fs::write(&file, b"<html>not an image</html>").unwrap();

        let err = load_embeddable(&file, "https://example.com/bad.jpg").unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedImage { .. }));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(2, 2)))
            .mount(&server)
            .await;

        let fetcher = ReqwestImageFetcher::new(None).unwrap();
        let bytes = fetcher
            .fetch(&format!("{}/photo.png", server.uri()))
            .await
            .unwrap();

        assert_eq!(bytes.as_ref(), png_bytes(2, 2).as_slice());
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = ReqwestImageFetcher::new(Some(Duration::from_secs(5))).unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing.png", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::UpstreamFetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_error_fails() {
        let fetcher = ReqwestImageFetcher::new(Some(Duration::from_secs(2))).unwrap();
        let err = fetcher
            .fetch("http://127.0.0.1:1/photo.png")
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::UpstreamFetch { .. }));
    }
}
