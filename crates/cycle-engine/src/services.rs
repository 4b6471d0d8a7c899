use std::sync::Arc;

use crate::deps::{CandidateSupply, EventMonitor, KeyProbe, OverlayRenderer, Workspace};

/// Groups the controller's long-lived collaborators to keep construction
/// sites explicit.
#[derive(Clone)]
pub struct Services {
    /// Group configuration and live candidates.
    pub supply: Arc<dyn CandidateSupply>,
    /// Focus and activation.
    pub workspace: Arc<dyn Workspace>,
    /// Overlay drawing.
    pub renderer: Arc<dyn OverlayRenderer>,
    /// Hardware key state.
    pub keys: Arc<dyn KeyProbe>,
    /// Release and hold monitors.
    pub monitor: Arc<dyn EventMonitor>,
}
