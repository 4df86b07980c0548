//! Print-capture readiness protocol.
//!
//! Two parties cooperate per page load. The in-page [`agent`] opens
//! disclosures, waits for layout, math and images, then inserts a marker
//! element once. The external [`driver`] (feature `async`) waits a bounded
//! time for that marker and prints the page either way.

pub mod agent;
#[cfg(feature = "async")]
pub mod driver;

pub use agent::{
    agent_script, AgentOptions, AgentState, PageEnvironment, ReadinessAgent, AGENT_SCRIPT,
    READINESS_MARKER_ID,
};
#[cfg(feature = "async")]
pub use driver::{
    Browser, BrowserPage, CaptureDriver, CaptureOptions, CaptureOutcome, CaptureSession,
    DocumentRef, Margins, PageSize, PdfRequest, Readiness,
};
