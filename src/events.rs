use std::fmt;

use crate::connection::RequestId;
use crate::data::types::{CurveData, TimelineData};
use crate::view::ActiveTab;

/// Identity of one mounted visualization instance. Data fetched for an
/// older mount is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MountId(pub u64);

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mount-{}", self.0)
    }
}

/// Events delivered to the main app loop, from background tasks and from
/// components.
#[derive(Debug)]
pub enum AppEvent {
    // Connection
    ContractLoaded(RequestId),

    // Visualization data
    TimelineLoaded { mount: MountId, data: TimelineData },
    CurveLoaded { mount: MountId, data: CurveData },
    VisualizationFailed { mount: MountId, message: String },

    // Input
    SelectTab(ActiveTab),
    SubmitAddress(String),

    // Failures delegated to the host
    HostError(String),
}
