//! Product image uploads to the configured blob store.
//!
//! The store is an external collaborator with a trivial contract: PUT the
//! bytes to `{store_url}/products/{id}.{ext}`, then serve them from the
//! public base URL. Validation happens here, before any network I/O.

use reqwest::StatusCode;
use secrecy::ExposeSecret;

use orchard_core::ProductId;

use crate::config::BlobStoreConfig;

/// Largest accepted product image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Errors from image validation or the blob store.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The image part was missing or had zero bytes.
    #[error("image file is empty")]
    EmptyFile,

    /// The part's content type is not `image/*`.
    #[error("file is not an image: {0}")]
    NotAnImage(String),

    /// The image exceeds [`MAX_IMAGE_BYTES`].
    #[error("image exceeds {MAX_IMAGE_BYTES} bytes")]
    TooLarge,

    /// The blob store request failed outright.
    #[error("blob store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The blob store answered with a non-success status.
    #[error("blob store returned {0}")]
    Rejected(StatusCode),
}

/// An image received from a multipart request.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Validate and wrap an uploaded part.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::EmptyFile`], [`UploadError::NotAnImage`] or
    /// [`UploadError::TooLarge`] per the checks the admin product endpoints
    /// enforce.
    pub fn validate(content_type: Option<&str>, bytes: Vec<u8>) -> Result<Self, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::EmptyFile);
        }

        let content_type = content_type.unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(UploadError::NotAnImage(content_type.to_owned()));
        }

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge);
        }

        Ok(Self {
            content_type: content_type.to_owned(),
            bytes,
        })
    }

    /// File extension derived from the content type's subtype.
    #[must_use]
    pub fn extension(&self) -> &str {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/svg+xml" => "svg",
            other => other.strip_prefix("image/").unwrap_or("bin"),
        }
    }
}

/// Client for the product-image blob store.
#[derive(Debug, Clone)]
pub struct UploadService {
    client: reqwest::Client,
    config: BlobStoreConfig,
}

impl UploadService {
    /// Create an upload service from the blob store configuration.
    #[must_use]
    pub fn new(config: BlobStoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// PUT a validated image to the store, returning its public URL.
    ///
    /// The object key embeds the product id, so re-uploading for the same
    /// product overwrites the previous image in place.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Http`] on transport failure and
    /// [`UploadError::Rejected`] when the store answers non-2xx.
    pub async fn upload_product_image(
        &self,
        product_id: ProductId,
        image: &ImageFile,
    ) -> Result<String, UploadError> {
        let key = format!("products/{product_id}.{}", image.extension());

        let store_url = join_url(&self.config.store_url, &key);
        let mut request = self
            .client
            .put(store_url)
            .header(reqwest::header::CONTENT_TYPE, &image.content_type)
            .body(image.bytes.clone());

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(UploadError::Rejected(response.status()));
        }

        Ok(join_url(&self.config.public_url, &key))
    }
}

/// Join a key onto a base URL without doubling slashes.
fn join_url(base: &url::Url, key: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    format!("{base}/{key}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_file() {
        assert!(matches!(
            ImageFile::validate(Some("image/png"), vec![]),
            Err(UploadError::EmptyFile)
        ));
    }

    #[test]
    fn test_rejects_non_image() {
        assert!(matches!(
            ImageFile::validate(Some("application/pdf"), vec![1, 2, 3]),
            Err(UploadError::NotAnImage(_))
        ));
        assert!(matches!(
            ImageFile::validate(None, vec![1, 2, 3]),
            Err(UploadError::NotAnImage(_))
        ));
    }

    #[test]
    fn test_rejects_oversized() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            ImageFile::validate(Some("image/png"), bytes),
            Err(UploadError::TooLarge)
        ));
    }

    #[test]
    fn test_accepts_image_at_limit() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES];
        assert!(ImageFile::validate(Some("image/png"), bytes).is_ok());
    }

    #[test]
    fn test_extension_mapping() {
        let jpeg = ImageFile::validate(Some("image/jpeg"), vec![1]).unwrap();
        assert_eq!(jpeg.extension(), "jpg");

        let png = ImageFile::validate(Some("image/png"), vec![1]).unwrap();
        assert_eq!(png.extension(), "png");

        let webp = ImageFile::validate(Some("image/webp"), vec![1]).unwrap();
        assert_eq!(webp.extension(), "webp");
    }

    #[test]
    fn test_join_url_no_double_slash() {
        let base = url::Url::parse("https://blobs.internal/orchard/").unwrap();
        assert_eq!(
            join_url(&base, "products/x.png"),
            "https://blobs.internal/orchard/products/x.png"
        );
    }
}
