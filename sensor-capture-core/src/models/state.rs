use std::fmt;

/// Lifecycle state machine.
///
/// State transitions:
/// ```text
/// idle → acquiring → waiting_for_authorization → capturing → stopping → idle
///            ↓                    ↓                   ↓
///          failed ──────────────────────────────────────────────────→ idle
/// ```
///
/// `Failed` is transient: the controller always releases and returns to
/// `Idle`, from where a new start trigger retries the whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Acquiring,
    WaitingForAuthorization,
    Capturing,
    Stopping,
    Failed,
}

impl LifecycleState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a stop trigger has anything to stop.
    pub fn is_stoppable(&self) -> bool {
        matches!(self, Self::WaitingForAuthorization | Self::Capturing)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::WaitingForAuthorization => "waiting_for_authorization",
            Self::Capturing => "capturing",
            Self::Stopping => "stopping",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
