//! Content Collaborators
//!
//! Interfaces for getting analyzable text out of a page or an image. The
//! page round trip is a request/response message pair over a channel;
//! extraction and OCR are pluggable.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;
use undoctrinator_core::remove_extra_whitespaces;

use crate::utils::error::{AppError, AppResult};

/// Bound on one page-content round trip.
pub const PAGE_CONTENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Messages exchanged with the page context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentMessage {
    GetPageContent,
    PageContent { contents: String },
}

/// Something that can hand back the raw markup of the current page.
#[async_trait]
pub trait PageContentSource: Send + Sync {
    async fn fetch_page_content(&self, timeout: Duration) -> AppResult<String>;
}

/// Markup to plain text.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, markup: &str) -> AppResult<String>;
}

/// Image to text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> AppResult<String>;
}

/// `PageContentSource` over a pair of mpsc channels.
pub struct PageContentChannel {
    requests: mpsc::Sender<ContentMessage>,
    responses: Mutex<mpsc::Receiver<ContentMessage>>,
}

impl PageContentChannel {
    pub fn new(
        requests: mpsc::Sender<ContentMessage>,
        responses: mpsc::Receiver<ContentMessage>,
    ) -> Self {
        Self {
            requests,
            responses: Mutex::new(responses),
        }
    }

    /// Channel answered by a background task that always replies with
    /// `contents`.
    pub fn serve(contents: String) -> Self {
        let (request_tx, mut request_rx) = mpsc::channel(4);
        let (response_tx, response_rx) = mpsc::channel(4);

        tokio::spawn(async move {
            while let Some(message) = request_rx.recv().await {
                if message != ContentMessage::GetPageContent {
                    continue;
                }
                let reply = ContentMessage::PageContent {
                    contents: contents.clone(),
                };
                if response_tx.send(reply).await.is_err() {
                    break;
                }
            }
        });

        Self::new(request_tx, response_rx)
    }
}

#[async_trait]
impl PageContentSource for PageContentChannel {
    async fn fetch_page_content(&self, timeout: Duration) -> AppResult<String> {
        let mut responses = self.responses.lock().await;

        self.requests
            .send(ContentMessage::GetPageContent)
            .await
            .map_err(|_| AppError::content("Page content channel is closed"))?;

        let wait = async {
            while let Some(message) = responses.recv().await {
                match message {
                    ContentMessage::PageContent { contents } => return Ok(contents),
                    other => debug!(?other, "Ignoring unexpected page message"),
                }
            }
            Err(AppError::content("Page content channel is closed"))
        };

        tokio::time::timeout(timeout, wait).await.map_err(|_| {
            AppError::timeout(format!(
                "No page content received within {}s",
                timeout.as_secs_f64()
            ))
        })?
    }
}

/// HTML to normalized text via `htmd`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlContentExtractor;

impl ContentExtractor for HtmlContentExtractor {
    fn extract(&self, markup: &str) -> AppResult<String> {
        let text = htmd::convert(markup)
            .map_err(|e| AppError::content(format!("Failed to extract page text: {}", e)))?;
        Ok(remove_extra_whitespaces(&text))
    }
}
