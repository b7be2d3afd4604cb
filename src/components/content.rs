//! The content pane: mounts one visualization per active tab and isolates
//! its failures from the rest of the component.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use thiserror::Error;
use tracing::{debug, warn};

use crate::components::bonding_curve::BondingCurveChart;
use crate::components::timeline::Timeline;
use crate::connection::FailureReason;
use crate::data::types::{CurveData, TimelineData};
use crate::data::{VisualizationContext, VisualizationService};
use crate::events::{AppEvent, MountId};
use crate::view::{ActiveTab, ErrorRoute, ErrorRouter};

#[derive(Debug, Error)]
pub enum VisualizationError {
    #[error("failed to load {view} data: {message}")]
    Fetch { view: &'static str, message: String },

    #[error("{view} received data it cannot display")]
    UnexpectedData { view: &'static str },

    #[error("cannot render {view}: {message}")]
    Render { view: &'static str, message: String },
}

#[derive(Debug)]
pub enum VisualizationPayload {
    Timeline(TimelineData),
    Curve(CurveData),
}

/// A chart mounted in the content pane. Implementations only read the
/// handles in their context; they never reconnect.
pub trait Visualization {
    fn name(&self) -> &'static str;

    /// Kick off the data fetch for this mount.
    fn load(&self, mount: MountId, service: &VisualizationService);

    fn on_data(&mut self, payload: VisualizationPayload) -> Result<(), VisualizationError>;

    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent>;

    fn render(&mut self, frame: &mut Frame, area: Rect) -> Result<(), VisualizationError>;
}

fn create(tab: ActiveTab, ctx: &VisualizationContext) -> Box<dyn Visualization> {
    match tab {
        ActiveTab::Timeline => Box::new(Timeline::new(ctx.clone())),
        ActiveTab::BondingCurve => Box::new(BondingCurveChart::new(ctx.clone())),
    }
}

struct Mounted {
    id: MountId,
    tab: ActiveTab,
    view: Box<dyn Visualization>,
}

pub struct ContentPane {
    next_id: u64,
    mounted: Option<Mounted>,
    caught: Option<ErrorRoute>,
}

impl ContentPane {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            mounted: None,
            caught: None,
        }
    }

    /// Mount a fresh instance for `tab`, dropping whatever was mounted.
    pub fn mount(
        &mut self,
        tab: ActiveTab,
        ctx: &VisualizationContext,
        service: &VisualizationService,
    ) -> MountId {
        self.next_id += 1;
        let id = MountId(self.next_id);
        let view = create(tab, ctx);
        view.load(id, service);
        debug!(mount = %id, %tab, "visualization mounted");

        self.mounted = Some(Mounted { id, tab, view });
        self.caught = None;
        id
    }

    pub fn unmount(&mut self) {
        self.mounted = None;
        self.caught = None;
    }

    pub fn mounted(&self) -> Option<(MountId, ActiveTab)> {
        self.mounted.as_ref().map(|m| (m.id, m.tab))
    }

    /// Routing outcome of a failure caught from the mounted visualization.
    pub fn caught(&self) -> Option<&ErrorRoute> {
        self.caught.as_ref()
    }

    /// Hand data to the mounted visualization. Returns false when `mount`
    /// is no longer mounted and the data was dropped.
    pub fn deliver(
        &mut self,
        mount: MountId,
        payload: VisualizationPayload,
        router: &ErrorRouter,
    ) -> bool {
        let Some(mounted) = self.mounted.as_mut().filter(|m| m.id == mount) else {
            debug!(%mount, "dropping data for unmounted visualization");
            return false;
        };
        if let Err(err) = mounted.view.on_data(payload) {
            self.catch(err, router);
        }
        true
    }

    /// Record a fetch failure reported for `mount`.
    pub fn fail(&mut self, mount: MountId, message: String, router: &ErrorRouter) -> bool {
        let Some(mounted) = self.mounted.as_ref().filter(|m| m.id == mount) else {
            return false;
        };
        let err = VisualizationError::Fetch {
            view: mounted.view.name(),
            message,
        };
        self.catch(err, router);
        true
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        if self.caught.is_some() {
            return None;
        }
        self.mounted.as_mut()?.view.handle_key(key)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, router: &ErrorRouter) {
        if self.caught.is_some() {
            return;
        }
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        if let Err(err) = mounted.view.render(frame, area) {
            self.catch(err, router);
        }
    }

    fn catch(&mut self, err: VisualizationError, router: &ErrorRouter) {
        // Only the first failure of a mount is routed.
        if self.caught.is_some() {
            return;
        }
        warn!(error = %err, "visualization failed");
        let reason = FailureReason::Unexpected(err.to_string());
        self.caught = Some(router.route(&reason));
    }
}
