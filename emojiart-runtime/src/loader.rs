//! Where background image bytes come from.

use async_trait::async_trait;
use emojiart_core::{Background, BackgroundImage, ImageSource};
use reqwest::Client;
use url::Url;

use crate::decode::decode_background_blocking;
use crate::error::{FetchError, FetchResult};

/// Fetches the encoded bytes of a remote image.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Fetch the bytes at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes could not be retrieved.
    async fn fetch(&self, url: &Url) -> FetchResult<Vec<u8>>;
}

/// Loads images over HTTP(S) with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: Client,
}

impl HttpImageLoader {
    /// Create a loader with its own client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("emojiart/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Create a loader sharing an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn fetch(&self, url: &Url) -> FetchResult<Vec<u8>> {
        tracing::debug!(%url, "fetching background image");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(bytes.to_vec())
    }
}

/// Produce the decoded image for a background.
///
/// Remote backgrounds are fetched through `loader`; inline ones are decoded
/// directly. Failures are logged and reported as `None`.
pub async fn load_background<L>(loader: &L, background: &Background) -> Option<BackgroundImage>
where
    L: ImageLoader + ?Sized,
{
    let result = match background {
        Background::Blank => return None,
        Background::Url(url) => match loader.fetch(url).await {
            Ok(bytes) => decode_background_blocking(bytes).await,
            Err(e) => Err(e),
        },
        Background::ImageData(bytes) => decode_background_blocking(bytes.clone()).await,
    };
    match result {
        Ok(image) => Some(image),
        Err(e) => {
            if let Some(source) = ImageSource::of(background) {
                tracing::warn!(%source, "failed to load background: {e}");
            }
            None
        }
    }
}
