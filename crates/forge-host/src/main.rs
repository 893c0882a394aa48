//! forge-host: runs a `package.json` application in tao windows with wry
//! webviews, one [`forge_shell::Shell`] per window.

use anyhow::{anyhow, Context, Result};
use forge_shell::{BrowsingContext, Package, Shell, ShellConfig, ShellContext, MSG_ROUTING_NONE};
use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tao::event::Event;
use tao::event_loop::{ControlFlow, EventLoopBuilder};

mod assets;
mod backend;
mod dialogs;
mod menu;
mod router;

use backend::{Backend, HostEvent};
use dialogs::{RfdErrorReporter, RfdFileChooser};
use menu::AppMenu;
use router::Router;

struct Args {
    app_dir: PathBuf,
    dev: bool,
    /// Unrecognised arguments, reported once logging is up
    ignored: Vec<String>,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut args = args;
        let mut app_dir = PathBuf::from(".");
        let mut dev = false;
        let mut ignored = Vec::new();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--app-dir" => {
                    app_dir = PathBuf::from(
                        args.next()
                            .ok_or_else(|| anyhow!("--app-dir requires a path"))?,
                    );
                }
                "--dev" => dev = true,
                _ => ignored.push(arg),
            }
        }
        Ok(Self {
            app_dir,
            dev,
            ignored,
        })
    }
}

async fn load_config(app_dir: &Path) -> Result<ShellConfig> {
    let path = app_dir.join(ShellConfig::FILE_NAME);
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => ShellConfig::from_toml_str(&text)
            .with_context(|| format!("parsing {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ShellConfig::default()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

async fn load_package(app_dir: &Path) -> Result<Package> {
    let path = app_dir.join(Package::MANIFEST_FILE);
    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading manifest at {}", path.display()))?;
    Package::from_json(app_dir, &text).with_context(|| format!("parsing {}", path.display()))
}

fn init_tracing(config: &ShellConfig) {
    use tracing_subscriber::EnvFilter;
    let fallback = config.log_filter.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_env("FORGE_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse(env::args().skip(1))?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    let app_dir = args.app_dir.clone();
    let config = rt.block_on(load_config(&app_dir))?;
    init_tracing(&config);
    for arg in &args.ignored {
        tracing::debug!("Ignoring argument {}", arg);
    }
    let package = rt.block_on(load_package(&app_dir))?;
    tracing::info!("Starting app: {} ({})", package.name(), app_dir.display());
    if args.dev {
        tracing::info!("Running in dev mode");
    }

    let start_url = package.start_url();
    let missing_main = if start_url.starts_with("app://") {
        let main = app_dir.join(package.main());
        !rt.block_on(tokio::fs::try_exists(&main)).unwrap_or(false)
    } else {
        false
    };

    let event_loop = EventLoopBuilder::<HostEvent>::with_user_event().build();
    let backend = Rc::new(Backend::new(
        event_loop.create_proxy(),
        &app_dir,
        package.name(),
        args.dev,
    ));
    let context = ShellContext::builder(package, backend.clone(), backend.clone())
        .config(config)
        .file_chooser(Rc::new(RfdFileChooser))
        .critical_errors(Rc::new(RfdErrorReporter))
        .build();
    let mut shutdown = context
        .registry()
        .take_shutdown_receiver()
        .context("shutdown receiver already taken")?;

    let first = Shell::create(
        &context,
        BrowsingContext::default(),
        &start_url,
        None,
        MSG_ROUTING_NONE,
        None,
    )
    .context("creating the first window")?;
    if missing_main {
        first.print_critical_error(
            "Failed to load application",
            &format!("{} does not exist in {}", context.package().main(), app_dir.display()),
        );
    }
    drop(first);

    let menu = AppMenu::build().context("building the application menu")?;
    let proxy = event_loop.create_proxy();
    std::thread::spawn(move || {
        let receiver = muda::MenuEvent::receiver();
        while let Ok(event) = receiver.recv() {
            if proxy.send_event(HostEvent::Menu(event.id)).is_err() {
                break;
            }
        }
    });

    let mut router = Router::new(context, backend, menu);
    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(event) => router.user_event(event),
            Event::WindowEvent {
                window_id, event, ..
            } => router.window_event(window_id, &event),
            _ => {}
        }
        router.settle(target);

        if shutdown.try_recv().is_ok() {
            tracing::info!("All windows closed, exiting");
            *control_flow = ControlFlow::Exit;
        }
    })
}
