//! Shell application wiring and event loop
//!
//! Control flow: single-instance gate → daemon locator feeds the supervisor →
//! supervisor watches stdout → readiness barrier joins daemon-ready with
//! splash-loaded → window controller navigates the single window to the
//! discovered origin. Everything runs on one event-loop task; the daemon's
//! stdio arrives through channels.

use std::path::PathBuf;

use tokio::sync::mpsc;

use wshell_core::prelude::*;
use wshell_core::{ApiOrigin, DaemonEvent};
use wshell_daemon::{
    DaemonInvocation, DaemonSupervisor, Platform, SupervisorConfig, SupervisorEvent,
    WalletApiClient,
};

use crate::barrier::ReadinessBarrier;
use crate::egress;
use crate::events::{ShellEvent, WindowEvent};
use crate::host::{SystemHost, WebPreferences, WindowConfig, WindowHost};
use crate::instance::{self, InstanceGate};
use crate::menu::{self, MenuAction};
use crate::navigation::NavigationPolicy;
use crate::settings::ShellSettings;
use crate::window::{ResourcePaths, WindowController};

/// Custom URI scheme the shell registers for wallet-payment links
pub const URL_SCHEME: &str = "walletd";

/// Fixed development server origin (overridable in settings)
pub const DEV_SERVER_URL: &str = "http://localhost:4200/";

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shell configuration resolved at startup
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub dev_mode: bool,
    pub invocation: DaemonInvocation,
    pub data_dir: PathBuf,
    pub resources_dir: PathBuf,
    pub settings: ShellSettings,
}

impl ShellConfig {
    /// Resolve from the executable's own location and the loaded settings.
    pub fn resolve(
        dev_mode: bool,
        daemon_override: Option<PathBuf>,
        settings: ShellSettings,
    ) -> Result<Self> {
        let shell_exe = std::env::current_exe()?;
        let invocation = match daemon_override {
            Some(executable) => DaemonInvocation::for_executable(executable),
            None => DaemonInvocation::resolve(Platform::current(), &shell_exe),
        };
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wallet-shell");
        let resources_dir = shell_exe
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("resources");

        Ok(Self {
            dev_mode,
            invocation,
            data_dir,
            resources_dir,
            settings,
        })
    }

    fn dev_origin(&self) -> Result<ApiOrigin> {
        let raw = self
            .settings
            .dev_server_url
            .as_deref()
            .unwrap_or(DEV_SERVER_URL);
        ApiOrigin::parse(raw)
    }
}

/// The assembled shell: supervisor, barrier and window controller behind one
/// event loop.
pub struct ShellApp<H: WindowHost> {
    config: ShellConfig,
    supervisor: DaemonSupervisor,
    barrier: ReadinessBarrier,
    window: WindowController<H>,
    api: WalletApiClient,
    event_tx: mpsc::Sender<ShellEvent>,
    wallets_folder: Option<String>,
    quit_requested: bool,
}

impl<H: WindowHost> ShellApp<H> {
    pub fn new(
        config: ShellConfig,
        host: H,
        event_tx: mpsc::Sender<ShellEvent>,
        daemon_tx: mpsc::Sender<DaemonEvent>,
    ) -> Result<Self> {
        let dev_origin = config.dev_origin()?;
        let supervisor = DaemonSupervisor::new(
            SupervisorConfig {
                invocation: config.invocation.clone(),
                dev_mode: config.dev_mode,
                dev_origin,
            },
            daemon_tx,
        );

        let resources = ResourcePaths::resolve(&config.resources_dir);
        let window_config = WindowConfig {
            width: config.settings.window.width,
            height: config.settings.window.height,
            background_color: config.settings.window.background_color.clone(),
            title: config.settings.window.title.clone(),
            // AppImage builds need the icon passed explicitly
            icon: matches!(Platform::current(), Platform::Linux)
                .then(|| resources.icon512.clone()),
            web_preferences: WebPreferences::locked_down(resources.preload.clone()),
        };
        let window = WindowController::new(
            host,
            window_config,
            resources,
            NavigationPolicy::new(config.dev_mode),
        );

        Ok(Self {
            config,
            supervisor,
            barrier: ReadinessBarrier::new(),
            window,
            api: WalletApiClient::new(),
            event_tx,
            wallets_folder: None,
            quit_requested: false,
        })
    }

    /// Initial startup: host-level hardening, splash window, daemon launch.
    pub fn start(&mut self) -> Result<()> {
        self.window
            .host_mut()
            .apply_host_rules(&egress::host_rules());
        self.window.host_mut().register_url_scheme(URL_SCHEME);
        // Host-process level; each created window strips its own copy too
        self.window.host_mut().strip_eval();

        if self.config.dev_mode {
            // There is no splash page in dev mode; satisfy that half of the
            // barrier up front so daemon readiness alone completes it.
            self.barrier.mark_splash_loaded();
        } else {
            self.window.create_window(None)?;
        }

        match self.supervisor.launch() {
            Ok(Some(notice)) => self.apply_supervisor_event(notice)?,
            Ok(None) => {}
            // The SpawnFailed event arriving through the daemon channel
            // drives the error view and the quit decision.
            Err(e) => error!("wallet daemon launch failed: {:?}", e),
        }
        Ok(())
    }

    /// Process one shell event. Returns `false` once the loop should stop.
    pub fn handle_event(&mut self, event: ShellEvent) -> Result<bool> {
        match event {
            ShellEvent::Daemon(daemon_event) => {
                if let Some(notice) = self.supervisor.handle_event(daemon_event) {
                    self.apply_supervisor_event(notice)?;
                }
            }
            ShellEvent::Window(WindowEvent::FinishedLoad) => {
                if self.window.handle_finished_load() {
                    if let Some(origin) = self.barrier.mark_splash_loaded() {
                        self.on_composite_ready(origin)?;
                    }
                }
            }
            ShellEvent::Window(WindowEvent::Closed) => {
                self.window.handle_closed();
                // Quit when all windows close, except where menu-bar-only
                // operation is the platform convention.
                if !cfg!(target_os = "macos") {
                    self.quit_requested = true;
                }
            }
            ShellEvent::Window(WindowEvent::Activated) => {
                self.window.handle_activated()?;
            }
            ShellEvent::SecondInstance => {
                self.window.focus_or_recreate()?;
            }
            ShellEvent::Menu(action) => {
                self.handle_menu(action)?;
            }
            ShellEvent::WalletFolderResolved(address) => {
                debug!("wallet folder reported by daemon: {}", address);
                self.wallets_folder = Some(address);
            }
            ShellEvent::Quit => {
                self.quit_requested = true;
            }
        }
        Ok(!self.quit_requested)
    }

    fn apply_supervisor_event(&mut self, notice: SupervisorEvent) -> Result<()> {
        match notice {
            SupervisorEvent::Ready { origin } => {
                if let Some(origin) = self.barrier.mark_daemon_ready(origin) {
                    self.on_composite_ready(origin)?;
                }
            }
            SupervisorEvent::Terminated { code } => {
                warn!("wallet daemon terminated (code {:?})", code);
                self.barrier.reset_daemon();
                self.window.show_error()?;
            }
            SupervisorEvent::SpawnFailed { reason } => {
                error!("wallet daemon could not be spawned: {}", reason);
                self.window.show_error()?;
                self.quit_requested = true;
            }
        }
        Ok(())
    }

    /// Both readiness signals have fired: point the window at the discovered
    /// origin (exactly once per daemon lifetime) and kick off the cosmetic
    /// wallet-folder lookup.
    fn on_composite_ready(&mut self, origin: ApiOrigin) -> Result<()> {
        info!("daemon and splash ready, navigating to {}", origin);
        self.window.navigate(origin.url().as_str())?;
        self.fetch_wallet_folder(origin);
        Ok(())
    }

    /// Best-effort wallets-folder lookup; failures are swallowed.
    fn fetch_wallet_folder(&self, origin: ApiOrigin) {
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            match api.wallet_folder(&origin).await {
                Ok(folder) => {
                    let _ = event_tx
                        .send(ShellEvent::WalletFolderResolved(folder.address))
                        .await;
                }
                Err(e) => debug!("wallet folder lookup failed (ignored): {:?}", e),
            }
        });
    }

    fn handle_menu(&mut self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::Quit => self.quit_requested = true,
            MenuAction::RevealWalletsFolder => {
                let path = menu::wallets_folder(self.wallets_folder.as_deref());
                self.window.host_mut().reveal_path(&path)?;
            }
            MenuAction::RevealLogsFolder => {
                let path = menu::logs_folder(self.wallets_folder.as_deref());
                self.window.host_mut().reveal_path(&path)?;
            }
            MenuAction::ToggleDevTools => self.window.host_mut().toggle_devtools(),
            action => debug!("menu role handled by the surface: {:?}", action),
        }
        Ok(())
    }

    /// Run until quit, then interrupt the daemon.
    pub async fn run_loop(&mut self, mut event_rx: mpsc::Receiver<ShellEvent>) -> Result<()> {
        while let Some(event) = event_rx.recv().await {
            if !self.handle_event(event)? {
                break;
            }
        }
        info!("shutting down, interrupting wallet daemon");
        self.supervisor.shutdown().await;
        Ok(())
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// The window controller (host access for menus and tests)
    pub fn window_mut(&mut self) -> &mut WindowController<H> {
        &mut self.window
    }
}

/// Full production entry: single-instance gate, system host, event loop.
pub async fn run(config: ShellConfig) -> Result<()> {
    let primary = match instance::acquire(&config.data_dir)? {
        InstanceGate::AlreadyRunning => {
            info!("another instance is already running; quitting");
            return Ok(());
        }
        InstanceGate::Primary(primary) => primary,
    };

    let (event_tx, event_rx) = mpsc::channel::<ShellEvent>(EVENT_CHANNEL_CAPACITY);
    let (daemon_tx, mut daemon_rx) = mpsc::channel::<DaemonEvent>(EVENT_CHANNEL_CAPACITY);

    // Second-instance pings become focus requests
    tokio::spawn(primary.serve(event_tx.clone()));

    // Merge daemon events into the shell stream
    let forward_tx = event_tx.clone();
    tokio::spawn(async move {
        while let Some(event) = daemon_rx.recv().await {
            if forward_tx.send(ShellEvent::Daemon(event)).await.is_err() {
                break;
            }
        }
    });

    let host = SystemHost::new(event_tx.clone());
    let mut app = ShellApp::new(config, host, event_tx, daemon_tx)?;
    app.start()?;
    app.run_loop(event_rx).await
}
