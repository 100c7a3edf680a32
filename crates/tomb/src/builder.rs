//! # Tomb Configuration
//!
//! [`TombBuilder`] collects the few knobs a tomb has before it starts tracking tasks.

use crate::tomb::Tomb;
use tokio::runtime::Handle;

const DEFAULT_NAME: &str = "tomb";

/// Builder for [`Tomb`].
///
/// ```rust
/// use tomb::{Phase, Tomb};
///
/// let tomb = Tomb::builder().name("ingest").build();
/// assert_eq!(tomb.name(), "ingest");
/// assert_eq!(tomb.phase(), Phase::Running);
/// ```
#[derive(Debug, Default)]
pub struct TombBuilder {
    name: Option<String>,
    handle: Option<Handle>,
}

impl TombBuilder {
    /// Name attached to every log event emitted by the tomb.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Runtime that tracked tasks are spawned on.
    ///
    /// Without a handle, tasks go to the runtime that is current when `go` is called.
    pub fn handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn build(self) -> Tomb {
        let name = self.name.unwrap_or_else(|| DEFAULT_NAME.to_string());
        Tomb::from_parts(name, self.handle)
    }
}
