//! In-page readiness agent.
//!
//! The page shell installs [`AGENT_SCRIPT`], which runs once on full page
//! load and inserts a marker element when rendering has settled.
//! [`ReadinessAgent`] runs the same one-shot sequence against any
//! [`PageEnvironment`], which lets the sequence be driven and tested without
//! a browser.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifier of the element that signals a fully rendered page.
pub const READINESS_MARKER_ID: &str = "lessonmark-render-ready";

/// Agent script template.
///
/// `__MARKER_ID__`, `__SETTLE_MS__` and `__FINAL_MS__` are substituted by
/// [`agent_script`].
pub const AGENT_SCRIPT: &str = r#"(function () {
  var MARKER_ID = "__MARKER_ID__";
  var SETTLE_MS = __SETTLE_MS__;
  var FINAL_MS = __FINAL_MS__;
  var started = false;

  function delay(ms) {
    return new Promise(function (resolve) { setTimeout(resolve, ms); });
  }

  function openDisclosures() {
    document.querySelectorAll("details:not([open])").forEach(function (el) {
      el.open = true;
      el.dispatchEvent(new Event("toggle"));
    });
  }

  function mathDone() {
    var engine = window.MathJax;
    if (!engine || !engine.startup || !engine.startup.promise) {
      return Promise.resolve();
    }
    return engine.startup.promise.then(function () {
      return engine.typesetPromise ? engine.typesetPromise() : undefined;
    }).catch(function () {});
  }

  function imagesDone() {
    var pending = Array.prototype.map.call(document.images, function (img) {
      if (img.complete) { return Promise.resolve(); }
      return new Promise(function (resolve) {
        img.addEventListener("load", resolve, { once: true });
        img.addEventListener("error", resolve, { once: true });
      });
    });
    return Promise.all(pending);
  }

  function insertMarker() {
    if (document.getElementById(MARKER_ID)) { return; }
    var marker = document.createElement("div");
    marker.id = MARKER_ID;
    marker.style.display = "none";
    document.body.appendChild(marker);
  }

  function run() {
    if (started) { return; }
    started = true;
    openDisclosures();
    delay(SETTLE_MS)
      .then(mathDone)
      .then(imagesDone)
      .then(function () { return delay(FINAL_MS); })
      .then(insertMarker);
  }

  if (document.readyState === "complete") {
    run();
  } else {
    window.addEventListener("load", run, { once: true });
  }
})();
"#;

/// Timing and naming of the readiness agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOptions {
    /// Delay after opening disclosures, for first-pass layout
    pub settle_delay_ms: u64,

    /// Delay after every image settled, before the marker goes in
    pub final_delay_ms: u64,

    /// Marker element identifier
    pub marker_id: String,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            settle_delay_ms: 300,
            final_delay_ms: 200,
            marker_id: READINESS_MARKER_ID.to_string(),
        }
    }
}

impl AgentOptions {
    /// Create agent options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the settle delay.
    pub fn with_settle_delay(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Set the final delay.
    pub fn with_final_delay(mut self, ms: u64) -> Self {
        self.final_delay_ms = ms;
        self
    }

    /// Set the marker identifier.
    pub fn with_marker_id(mut self, id: impl Into<String>) -> Self {
        self.marker_id = id.into();
        self
    }

    /// Settle delay as a duration.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Final delay as a duration.
    pub fn final_delay(&self) -> Duration {
        Duration::from_millis(self.final_delay_ms)
    }
}

/// The agent script with the options substituted in.
pub fn agent_script(options: &AgentOptions) -> String {
    let marker_id: String = options
        .marker_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    AGENT_SCRIPT
        .replace("__MARKER_ID__", &marker_id)
        .replace("__SETTLE_MS__", &options.settle_delay_ms.to_string())
        .replace("__FINAL_MS__", &options.final_delay_ms.to_string())
}

/// Progress of the readiness sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentState {
    /// Not started
    Idle,
    /// Every disclosure element is open
    DisclosuresOpened,
    /// The settle delay elapsed
    Settled,
    /// The math engine finished, or none was active
    MathTypeset,
    /// Every image loaded or failed
    ImagesSettled,
    /// The final delay elapsed and the marker is present
    Ready,
}

/// What the agent needs from a page.
pub trait PageEnvironment {
    /// Open every collapsible element, firing its state-change notification.
    /// Returns how many were opened.
    fn open_disclosures(&mut self) -> usize;

    /// Let time pass.
    fn wait(&mut self, duration: Duration);

    /// Whether a client-side math engine is active on the page.
    fn math_engine_active(&self) -> bool;

    /// Block until the math engine reports completion.
    fn await_math(&mut self);

    /// Block until every image has loaded or failed.
    fn await_images(&mut self);

    /// Whether an element with this id exists.
    fn marker_present(&self, id: &str) -> bool;

    /// Insert an element with this id.
    fn insert_marker(&mut self, id: &str);
}

/// One-shot readiness sequence for a single page load.
#[derive(Debug, Clone)]
pub struct ReadinessAgent {
    options: AgentOptions,
    state: AgentState,
}

impl ReadinessAgent {
    /// Create an idle agent.
    pub fn new(options: AgentOptions) -> Self {
        Self {
            options,
            state: AgentState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Whether the sequence already ran.
    pub fn is_done(&self) -> bool {
        self.state == AgentState::Ready
    }

    /// Run the sequence. Only the first call on an agent does anything.
    pub fn run<E: PageEnvironment + ?Sized>(&mut self, page: &mut E) -> AgentState {
        if self.state != AgentState::Idle {
            return self.state;
        }

        let opened = page.open_disclosures();
        self.state = AgentState::DisclosuresOpened;
        log::debug!("readiness agent: opened {} disclosures", opened);

        page.wait(self.options.settle_delay());
        self.state = AgentState::Settled;

        if page.math_engine_active() {
            page.await_math();
        }
        self.state = AgentState::MathTypeset;

        page.await_images();
        self.state = AgentState::ImagesSettled;

        page.wait(self.options.final_delay());
        if !page.marker_present(&self.options.marker_id) {
            page.insert_marker(&self.options.marker_id);
        }
        self.state = AgentState::Ready;
        self.state
    }
}

impl Default for ReadinessAgent {
    fn default() -> Self {
        Self::new(AgentOptions::default())
    }
}
