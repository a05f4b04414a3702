use crate::models::error::SessionError;
use crate::models::session_report::SessionReport;
use crate::models::state::LifecycleState;

/// Event delegate for lifecycle notifications.
///
/// All methods are called from the controller thread while a session runs,
/// so implementations must return quickly and never block on the
/// controller itself.
pub trait LifecycleDelegate: Send + Sync {
    /// Called after every state transition.
    fn on_state_changed(&self, state: LifecycleState);

    /// Called once per chunk delivered to the sink, with its hex preview.
    fn on_chunk_captured(&self, sequence: u64, preview: &str);

    /// Called when a session error occurs, before the release.
    fn on_error(&self, error: &SessionError);

    /// Called after release, once per session.
    fn on_session_finished(&self, report: &SessionReport);
}
