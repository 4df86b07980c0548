//! External capture driver.
//!
//! Each PDF request gets its own [`CaptureSession`] over a fresh page. The
//! session navigates, waits a bounded time for the readiness marker, prints,
//! and closes the page. A marker that never shows up is a warning on the
//! outcome, not an error.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::READINESS_MARKER_ID;
use crate::error::{Error, Result};

/// What to load into the capture page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DocumentRef {
    /// A page reachable by URL
    Url(String),
    /// A complete HTML page, loaded directly
    Html(String),
}

/// Output paper size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// ISO A4 (210 × 297 mm)
    #[default]
    A4,
    /// US Letter (8.5 × 11 in)
    Letter,
    /// Any size, in millimetres
    Custom {
        /// Width in millimetres
        width_mm: f64,
        /// Height in millimetres
        height_mm: f64,
    },
}

impl PageSize {
    /// Width and height in millimetres.
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    /// Top margin
    pub top: f64,
    /// Right margin
    pub right: f64,
    /// Bottom margin
    pub bottom: f64,
    /// Left margin
    pub left: f64,
}

impl Margins {
    /// No margins; the page CSS owns all spacing.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Print directive handed to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfRequest {
    /// Paper size
    pub page_size: PageSize,

    /// Page margins
    pub margins: Margins,

    /// Include background colours and images
    pub print_background: bool,
}

impl Default for PdfRequest {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margins: Margins::zero(),
            print_background: true,
        }
    }
}

impl PdfRequest {
    /// Create an A4 request with zero margins and backgrounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the paper size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Include or drop background graphics.
    pub fn with_background(mut self, print_background: bool) -> Self {
        self.print_background = print_background;
        self
    }
}

/// Timing of the marker wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// Upper bound on the marker wait
    pub marker_timeout_ms: u64,

    /// Delay between marker probes
    pub poll_interval_ms: u64,

    /// Marker element identifier
    pub marker_id: String,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            marker_timeout_ms: 15_000,
            poll_interval_ms: 250,
            marker_id: READINESS_MARKER_ID.to_string(),
        }
    }
}

impl CaptureOptions {
    /// Create capture options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the marker timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.marker_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis().max(1) as u64;
        self
    }

    /// Marker timeout as a duration.
    pub fn marker_timeout(&self) -> Duration {
        Duration::from_millis(self.marker_timeout_ms)
    }

    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// How the marker wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    /// The marker appeared
    Ready,
    /// The wait hit its bound; the capture is best-effort
    TimedOut,
}

/// A produced PDF and how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureOutcome {
    /// PDF bytes
    #[serde(skip)]
    pub pdf: Vec<u8>,

    /// Marker wait result
    pub readiness: Readiness,

    /// Time spent waiting for the marker
    pub waited: Duration,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Non-fatal problems met on the way
    pub warnings: Vec<String>,
}

impl CaptureOutcome {
    /// Whether the page signalled readiness before capture.
    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }
}

/// One browser page, as the driver sees it.
#[async_trait]
pub trait BrowserPage: Send {
    /// Load the target and wait for the load event.
    async fn navigate(&mut self, target: &DocumentRef) -> Result<()>;

    /// Whether an element with this id exists.
    async fn marker_present(&mut self, id: &str) -> Result<bool>;

    /// Print the page to PDF.
    async fn print_pdf(&mut self, request: &PdfRequest) -> Result<Vec<u8>>;

    /// Dispose of the page.
    async fn close(&mut self) -> Result<()>;
}

/// A browser able to open independent pages.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Page type produced by this browser.
    type Page: BrowserPage;

    /// Open a fresh page.
    async fn new_page(&self) -> Result<Self::Page>;
}

/// A single capture attempt, owning its page.
pub struct CaptureSession<P: BrowserPage> {
    page: P,
    target: DocumentRef,
    options: CaptureOptions,
}

impl<P: BrowserPage> CaptureSession<P> {
    /// Create a session over an open page.
    pub fn new(page: P, target: DocumentRef, options: CaptureOptions) -> Self {
        Self {
            page,
            target,
            options,
        }
    }

    /// Navigate, wait for readiness, and print. The page is closed whatever
    /// the result.
    pub async fn snapshot(mut self, request: &PdfRequest) -> Result<CaptureOutcome> {
        let started_at = Utc::now();
        let result = self.attempt(request).await;

        if let Err(e) = self.page.close().await {
            log::warn!("failed to close capture page: {}", e);
        }

        let (pdf, readiness, waited, warnings) = result?;
        Ok(CaptureOutcome {
            pdf,
            readiness,
            waited,
            started_at,
            warnings,
        })
    }

    async fn attempt(
        &mut self,
        request: &PdfRequest,
    ) -> Result<(Vec<u8>, Readiness, Duration, Vec<String>)> {
        let mut warnings = Vec::new();

        self.page.navigate(&self.target).await?;

        let start = Instant::now();
        let readiness = self.wait_for_marker().await;
        let waited = start.elapsed();

        if readiness == Readiness::TimedOut {
            let message = format!(
                "readiness marker '{}' not seen within {} ms; capturing anyway",
                self.options.marker_id, self.options.marker_timeout_ms
            );
            log::warn!("{}", message);
            warnings.push(message);
        }

        let pdf = match self.page.print_pdf(request).await {
            Ok(pdf) => pdf,
            Err(e) => return Err(Error::Capture(format!("print failed: {}", e))),
        };
        if pdf.is_empty() {
            return Err(Error::Capture("browser returned an empty PDF".to_string()));
        }

        Ok((pdf, readiness, waited, warnings))
    }

    async fn wait_for_marker(&mut self) -> Readiness {
        let id = self.options.marker_id.clone();
        let interval = self.options.poll_interval();
        let page = &mut self.page;

        let poll = async move {
            loop {
                match page.marker_present(&id).await {
                    Ok(true) => return,
                    Ok(false) => {}
                    Err(e) => log::debug!("marker probe failed: {}", e),
                }
                tokio::time::sleep(interval).await;
            }
        };

        match tokio::time::timeout(self.options.marker_timeout(), poll).await {
            Ok(()) => Readiness::Ready,
            Err(_) => Readiness::TimedOut,
        }
    }
}

/// Opens one session per request against a shared browser.
pub struct CaptureDriver<B: Browser> {
    browser: B,
    options: CaptureOptions,
}

impl<B: Browser> CaptureDriver<B> {
    /// Create a driver with default options.
    pub fn new(browser: B) -> Self {
        Self::with_options(browser, CaptureOptions::default())
    }

    /// Create a driver with custom options.
    pub fn with_options(browser: B, options: CaptureOptions) -> Self {
        Self { browser, options }
    }

    /// Driver options.
    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Capture a document as PDF.
    pub async fn capture(&self, target: DocumentRef, request: &PdfRequest) -> Result<CaptureOutcome> {
        let page = self.browser.new_page().await?;
        let outcome = CaptureSession::new(page, target, self.options.clone())
            .snapshot(request)
            .await?;

        log::info!(
            "captured {} bytes of PDF ({:?} after {} ms)",
            outcome.pdf.len(),
            outcome.readiness,
            outcome.waited.as_millis()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = PdfRequest::default();
        assert_eq!(request.page_size, PageSize::A4);
        assert_eq!(request.margins, Margins::zero());
        assert!(request.print_background);
    }

    #[test]
    fn test_page_dimensions() {
        assert_eq!(PageSize::A4.dimensions_mm(), (210.0, 297.0));
        let custom = PageSize::Custom {
            width_mm: 100.0,
            height_mm: 150.0,
        };
        assert_eq!(custom.dimensions_mm(), (100.0, 150.0));
    }

    #[test]
    fn test_capture_options() {
        let options = CaptureOptions::new()
            .with_timeout(Duration::from_secs(2))
            .with_poll_interval(Duration::ZERO);
        assert_eq!(options.marker_timeout(), Duration::from_secs(2));
        assert_eq!(options.poll_interval(), Duration::from_millis(1));
        assert_eq!(options.marker_id, READINESS_MARKER_ID);
    }
}
