use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::components::address_bar::AddressBar;
use crate::components::content::{ContentPane, VisualizationPayload};
use crate::components::error_panel::ErrorPanel;
use crate::components::header::Header;
use crate::components::help::HelpOverlay;
use crate::components::loader::Loader;
use crate::components::status_bar::StatusBar;
use crate::components::Component;
use crate::config::Config;
use crate::connection::{ConnectionSession, ConnectionState, ConnectionUpdate};
use crate::data::{VisualizationContext, VisualizationService};
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;
use crate::view::{self, ActiveTab, ErrorRoute, ErrorRouter, Pane, ViewModel};

/// Presentation settings taken from the command line.
#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    pub default_tab: ActiveTab,
    pub height: u16,
    pub tick_rate: Duration,
}

impl From<&Config> for AppOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_tab: config.default_tab,
            height: config.height,
            tick_rate: Duration::from_millis(config.tick_rate_ms),
        }
    }
}

pub struct App {
    // Connection
    session: ConnectionSession,
    conn_rx: mpsc::UnboundedReceiver<ConnectionUpdate>,
    router: ErrorRouter,
    /// Routing outcome of the current connection failure, decided once per failure.
    routed_error: Option<ErrorRoute>,

    // Components
    header: Header,
    content: ContentPane,
    loader: Loader,
    error_panel: ErrorPanel,
    address_bar: AddressBar,
    status_bar: StatusBar,
    help: HelpOverlay,

    // Data
    service: VisualizationService,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    active_tab: ActiveTab,
    height: u16,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(
        session: ConnectionSession,
        conn_rx: mpsc::UnboundedReceiver<ConnectionUpdate>,
        service: VisualizationService,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        router: ErrorRouter,
        options: AppOptions,
    ) -> Self {
        let contract_name = session.request().artifact.name.clone();
        let address = session.request().address.clone();
        Self {
            session,
            conn_rx,
            router,
            routed_error: None,
            header: Header::new(options.default_tab, contract_name),
            content: ContentPane::new(),
            loader: Loader::new(options.height),
            error_panel: ErrorPanel::new(options.height),
            address_bar: AddressBar::new(),
            status_bar: StatusBar::new(address),
            help: HelpOverlay::new(),
            service,
            event_rx,
            active_tab: options.default_tab,
            height: options.height,
            should_quit: false,
            tick_rate: options.tick_rate,
        }
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        self.session.mount();
        self.on_state_changed();

        let mut interval = tokio::time::interval(self.tick_rate);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    self.loader.tick();
                    terminal.draw(|frame| self.render(frame))?;
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(update) = self.conn_rx.recv() => {
                    self.handle_connection_update(update);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // Layout: header (1) | content (fill) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let routed = self.routed_error.as_ref().or(self.content.caught());
        let model = view::select_view(self.session.state(), self.active_tab, routed);

        self.header.show_tabs = matches!(model, ViewModel::Tabs { .. });
        self.header.render(frame, chunks[0]);

        match model {
            ViewModel::Loading => self.loader.render(frame, chunks[1]),
            ViewModel::Tabs { pane, .. } => match pane {
                Pane::Visualization(_) => self.content.render(frame, chunks[1], &self.router),
                Pane::Error(message) => self.error_panel.render(frame, chunks[1], &message),
                Pane::Hidden => {}
            },
        }

        self.status_bar.render(frame, chunks[2]);

        // Overlays
        self.address_bar.render(frame, area);
        self.help.render(frame, area);
    }

    fn handle_terminal_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        // Only handle key press events (not release/repeat) for cross-platform compat
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.help.handle_key(key) {
            return;
        }

        if self.address_bar.active {
            if let Some(address) = self.address_bar.handle_key(key) {
                self.handle_app_event(AppEvent::SubmitAddress(address));
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('a') | KeyCode::Char('/') => {
                self.address_bar.activate(&self.session.request().address);
                return;
            }
            KeyCode::Char('?') => {
                self.help.toggle();
                return;
            }
            _ => {}
        }

        // The tab strip is hidden while loading, so tab keys do nothing then.
        if self.session.state().is_loading() {
            return;
        }

        let app_event = self
            .header
            .handle_key(key)
            .or_else(|| self.content.handle_key(key));
        if let Some(event) = app_event {
            self.handle_app_event(event);
        }
    }

    fn handle_connection_update(&mut self, update: ConnectionUpdate) {
        if self.session.apply(update) {
            self.on_state_changed();
        }
    }

    /// Bring the components in line with the session's current state.
    fn on_state_changed(&mut self) {
        let state = self.session.state();
        self.status_bar.state_label = state.label();

        match state {
            ConnectionState::Loading => {
                self.routed_error = None;
                self.status_bar.error_message = None;
                self.status_bar.loaded_at = None;
                self.content.unmount();
            }
            ConnectionState::Ready(_) => {
                self.routed_error = None;
                self.mount_visualization();
            }
            ConnectionState::Failed(reason) => {
                let reason = reason.clone();
                self.content.unmount();
                self.routed_error = Some(self.router.route(&reason));
            }
        }
    }

    fn mount_visualization(&mut self) {
        let Some(ready) = self.session.state().ready() else {
            return;
        };
        let ctx = VisualizationContext {
            provider: Arc::clone(&ready.provider),
            contract: Arc::clone(&ready.contract),
            contract_address: self.session.request().address.clone(),
            height: self.height,
        };
        self.content.mount(self.active_tab, &ctx, &self.service);
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ContractLoaded(request) => {
                if self.session.current_request() == Some(request) {
                    info!(%request, "contract loaded");
                    self.status_bar.loaded_at = Some(utils::now_hms());
                }
            }
            AppEvent::TimelineLoaded { mount, data } => {
                self.content
                    .deliver(mount, VisualizationPayload::Timeline(data), &self.router);
            }
            AppEvent::CurveLoaded { mount, data } => {
                self.content
                    .deliver(mount, VisualizationPayload::Curve(data), &self.router);
            }
            AppEvent::VisualizationFailed { mount, message } => {
                self.content.fail(mount, message, &self.router);
            }
            AppEvent::SelectTab(tab) => {
                let tab = view::select_tab(self.active_tab, tab);
                if tab == self.active_tab {
                    return;
                }
                debug!(%tab, "tab selected");
                self.active_tab = tab;
                self.header.active = tab;
                // Switching tabs reuses the current connection.
                self.mount_visualization();
            }
            AppEvent::SubmitAddress(address) => {
                if self.session.set_address(address.clone()).is_some() {
                    self.status_bar.address = address;
                    self.on_state_changed();
                }
            }
            AppEvent::HostError(message) => {
                self.status_bar.error_message = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crossterm::event::KeyEvent;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::connection::{ConnectionManager, ConnectionRequest};
    use crate::data::artifact::ContractArtifact;
    use crate::data::testing::{
        MockAccessor, MockProvider, other_address, sample_abi_json, sample_address,
    };
    use crate::data::VisualizationSettings;

    struct Harness {
        app: App,
        loaded: Arc<Mutex<usize>>,
    }

    fn harness(provider: MockProvider, address: &str, router: ErrorRouter) -> Harness {
        let (conn_tx, conn_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let loaded = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&loaded);
        let manager = ConnectionManager::new(
            Arc::new(MockAccessor::new(provider)),
            Duration::from_millis(200),
            conn_tx,
        )
        .with_on_loaded(Arc::new(move |_| *counter.lock().unwrap() += 1));
        let artifact = Arc::new(ContractArtifact::from_json(&sample_abi_json()).unwrap());
        let session = ConnectionSession::new(
            manager,
            ConnectionRequest {
                address: address.to_string(),
                artifact,
            },
        );
        let service = VisualizationService::new(VisualizationSettings::default(), event_tx);
        let app = App::new(
            session,
            conn_rx,
            service,
            event_rx,
            router,
            AppOptions {
                default_tab: ActiveTab::Timeline,
                height: 200,
                tick_rate: Duration::from_millis(100),
            },
        );
        Harness { app, loaded }
    }

    impl Harness {
        fn mount(&mut self) {
            self.app.session.mount();
            self.app.on_state_changed();
        }

        /// Drain connection updates until the session leaves `Loading`.
        async fn settle(&mut self) {
            while self.app.session.state().is_loading() {
                let update = self.app.conn_rx.recv().await.unwrap();
                self.app.handle_connection_update(update);
            }
        }

        fn draw(&mut self) -> String {
            let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
            terminal.draw(|frame| self.app.render(frame)).unwrap();
            terminal
                .backend()
                .buffer()
                .content()
                .iter()
                .map(|cell| cell.symbol())
                .collect()
        }
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_loading_hides_tabs() {
        let mut h = harness(MockProvider::deployed(), &sample_address().to_string(), ErrorRouter::internal());
        h.mount();

        let screen = h.draw();
        assert!(screen.contains("Connecting to contract..."));
        assert!(!screen.contains("Timeline [1]"));
    }

    #[tokio::test]
    async fn test_ready_mounts_default_tab() {
        let mut h = harness(MockProvider::deployed(), &sample_address().to_string(), ErrorRouter::internal());
        h.mount();
        h.settle().await;

        assert!(h.app.session.state().ready().is_some());
        assert_eq!(h.app.content.mounted().map(|(_, tab)| tab), Some(ActiveTab::Timeline));
        assert_eq!(*h.loaded.lock().unwrap(), 1);
        assert!(h.draw().contains("Timeline [1]"));
    }

    #[tokio::test]
    async fn test_invalid_address_shows_error_panel() {
        let mut h = harness(MockProvider::deployed(), "not-an-address", ErrorRouter::internal());
        h.mount();
        h.settle().await;

        assert_eq!(h.app.routed_error, Some(ErrorRoute::Internal("Invalid address".to_string())));
        assert!(h.draw().contains("Invalid address"));
        assert_eq!(*h.loaded.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delegated_failure_hides_pane() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let router = ErrorRouter::delegating(Box::new(move |m: &str| {
            sink.lock().unwrap().push(m.to_string());
        }));
        let mut h = harness(MockProvider::empty(), &sample_address().to_string(), router);
        h.mount();
        h.settle().await;

        assert_eq!(h.app.routed_error, Some(ErrorRoute::Delegated));
        assert_eq!(*seen.lock().unwrap(), vec!["Invalid contract".to_string()]);
        assert!(!h.draw().contains("Invalid contract"));
    }

    #[tokio::test]
    async fn test_tab_switch_remounts_without_reacquiring() {
        let mut h = harness(MockProvider::deployed(), &sample_address().to_string(), ErrorRouter::internal());
        h.mount();
        h.settle().await;
        let request = h.app.session.current_request();
        let (first_mount, _) = h.app.content.mounted().unwrap();

        h.app.handle_terminal_event(press(KeyCode::Char('2')));

        let (second_mount, tab) = h.app.content.mounted().unwrap();
        assert_eq!(tab, ActiveTab::BondingCurve);
        assert_ne!(first_mount, second_mount);
        assert_eq!(h.app.session.current_request(), request);
    }

    #[tokio::test]
    async fn test_tab_keys_ignored_while_loading() {
        let mut h = harness(MockProvider::deployed(), &sample_address().to_string(), ErrorRouter::internal());
        h.mount();

        h.app.handle_terminal_event(press(KeyCode::Char('2')));

        assert_eq!(h.app.active_tab, ActiveTab::Timeline);
    }

    #[tokio::test]
    async fn test_new_address_clears_previous_error() {
        let mut h = harness(MockProvider::deployed(), "bogus", ErrorRouter::internal());
        h.mount();
        h.settle().await;
        assert!(h.app.routed_error.is_some());

        h.app
            .handle_app_event(AppEvent::SubmitAddress(sample_address().to_string()));
        assert!(h.app.routed_error.is_none());
        assert!(h.app.session.state().is_loading());

        h.settle().await;
        assert!(h.app.session.state().ready().is_some());
        assert_eq!(h.app.status_bar.address, sample_address().to_string());
    }

    #[tokio::test]
    async fn test_loaded_notice_for_superseded_request_is_ignored() {
        let mut h = harness(MockProvider::deployed(), &sample_address().to_string(), ErrorRouter::internal());
        h.mount();
        h.settle().await;
        let first = h.app.session.current_request().unwrap();

        h.app
            .handle_app_event(AppEvent::SubmitAddress(other_address().to_string()));
        h.app.handle_app_event(AppEvent::ContractLoaded(first));
        assert!(h.app.status_bar.loaded_at.is_none());

        let second = h.app.session.current_request().unwrap();
        h.app.handle_app_event(AppEvent::ContractLoaded(second));
        assert!(h.app.status_bar.loaded_at.is_some());
    }

    #[tokio::test]
    async fn test_host_error_reaches_status_bar() {
        let mut h = harness(MockProvider::deployed(), &sample_address().to_string(), ErrorRouter::internal());
        h.app
            .handle_app_event(AppEvent::HostError("Provider unreachable".to_string()));
        assert_eq!(
            h.app.status_bar.error_message.as_deref(),
            Some("Provider unreachable")
        );
    }
}
