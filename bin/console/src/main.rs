//! Command-line console for the punchcard sign-in automation platform.
//!
//! Wires the access layers together: session store, request gateway,
//! resource APIs, and the route guard that fronts every authenticated
//! command. Views proper (tables, forms) live elsewhere; this binary is the
//! thinnest useful consumer of the API layer.

mod config;
mod notify;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use punchcard_access::{AccessContext, RedirectTarget, RouteGuard, SessionStore};
use punchcard_api::{
    AuthApi, LogKind, LogQuery, LogsApi, NodesApi, PageQuery, PluginsApi, TasksApi,
};
use punchcard_core::{NodeId, PluginId, TaskId};
use punchcard_gateway::{Gateway, GatewayConfig, GatewayError, HttpTransport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ConsoleConfig;
use crate::notify::ConsoleObserver;

#[derive(Parser)]
#[command(
    name = "punchcard",
    about = "Admin console for the punchcard sign-in automation platform",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in to the platform
    Login { username: String, password: String },
    /// Sign out and clear the local session
    Logout,
    /// Show the signed-in user's profile and grants
    Whoami,
    /// Worker node management
    #[command(subcommand)]
    Nodes(NodesCommand),
    /// Scheduled task management
    #[command(subcommand)]
    Tasks(TasksCommand),
    /// Plugin store and installed plugins
    #[command(subcommand)]
    Plugins(PluginsCommand),
    /// Log listings and export
    #[command(subcommand)]
    Logs(LogsCommand),
}

#[derive(Subcommand)]
enum NodesCommand {
    /// List registered nodes
    List,
    /// Show one node
    Show { id: String },
    /// Run a connectivity test against a node
    Test { id: String },
}

#[derive(Subcommand)]
enum TasksCommand {
    /// List tasks
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Show one task
    Show { id: String },
    /// Trigger an immediate execution
    Run { id: String },
    /// Suspend the task's schedule
    Pause { id: String },
    /// Resume a paused task
    Resume { id: String },
    /// Show the task's execution history
    History { id: String },
}

#[derive(Subcommand)]
enum PluginsCommand {
    /// List plugins available in the store
    Store,
    /// List installed plugins
    Installed,
    /// Install a plugin from the store
    Install { id: String },
    /// Uninstall a plugin
    Uninstall { id: String },
    /// Update an installed plugin
    Update { id: String },
}

#[derive(Subcommand)]
enum LogsCommand {
    /// List entries of a log stream
    List {
        #[arg(value_enum)]
        stream: LogStream,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Clear a log stream
    Clear {
        #[arg(value_enum)]
        stream: LogStream,
    },
    /// Export a log stream to a file
    Export {
        #[arg(value_enum)]
        stream: LogStream,
        /// Where to write the exported file
        #[arg(long, default_value = "logs-export.txt")]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogStream {
    System,
    Task,
    Node,
}

impl From<LogStream> for LogKind {
    fn from(stream: LogStream) -> Self {
        match stream {
            LogStream::System => LogKind::System,
            LogStream::Task => LogKind::Task,
            LogStream::Node => LogKind::Node,
        }
    }
}

/// Permission keys gating the console areas.
const PERM_NODES: &str = "nodes.view";
const PERM_TASKS: &str = "tasks.view";
const PERM_PLUGINS: &str = "plugins.view";
const PERM_LOGS: &str = "logs.view";

/// A command failure that has already been surfaced to the user, either as
/// an access-event notification or a guard navigation hint.
enum CommandFailure {
    Denied,
    Request,
}

impl From<GatewayError> for CommandFailure {
    fn from(_: GatewayError) -> Self {
        Self::Request
    }
}

struct Console {
    access: Arc<AccessContext>,
    auth: AuthApi,
    nodes: NodesApi,
    tasks: TasksApi,
    plugins: PluginsApi,
    logs: LogsApi,
}

impl Console {
    fn new(config: &ConsoleConfig) -> Self {
        let store = Arc::new(
            SessionStore::open(config.session_file()).expect("failed to open session store"),
        );
        let transport = Arc::new(HttpTransport::new().expect("failed to build the HTTP client"));
        let gateway = Arc::new(Gateway::new(
            GatewayConfig::new(config.api_base_url.clone(), config.store_base_url.clone()),
            store.clone(),
            transport,
            Arc::new(ConsoleObserver),
        ));
        let access = Arc::new(AccessContext::new(store));

        Self {
            access,
            auth: AuthApi::new(gateway.clone()),
            nodes: NodesApi::new(gateway.clone()),
            tasks: TasksApi::new(gateway.clone()),
            plugins: PluginsApi::new(gateway.clone()),
            logs: LogsApi::new(gateway),
        }
    }

    /// Evaluates the route guard for an authenticated command.
    ///
    /// Denied states print their navigation hint; any underlying request
    /// failure has already been surfaced by the observer.
    async fn guard(&self, required_permission: Option<&str>) -> Result<(), CommandFailure> {
        let mut guard = RouteGuard::new(self.access.clone());
        if let Some(key) = required_permission {
            guard = guard.with_required_permission(key);
        }
        match guard.evaluate(&self.auth).await.redirect() {
            None => Ok(()),
            Some(RedirectTarget::Login) => {
                eprintln!("not signed in; run `punchcard login <username> <password>`");
                Err(CommandFailure::Denied)
            }
            Some(RedirectTarget::Forbidden) => {
                eprintln!("you do not have permission for this area");
                Err(CommandFailure::Denied)
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ConsoleConfig::from_env().expect("failed to load configuration");
    tracing::debug!(api = %config.api_base_url, store = %config.store_base_url, "loaded configuration");
    let console = Console::new(&config);

    match run(&console, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandFailure::Denied | CommandFailure::Request) => ExitCode::FAILURE,
    }
}

async fn run(console: &Console, command: Command) -> Result<(), CommandFailure> {
    match command {
        Command::Login { username, password } => {
            let outcome = console
                .auth
                .login(&console.access, &username, &password)
                .await?;
            println!("signed in as {}", outcome.username);
            if let Some(reason) = outcome.profile_error {
                eprintln!("profile not loaded yet: {reason}");
            }
            Ok(())
        }
        Command::Logout => {
            console.auth.logout(&console.access);
            Ok(())
        }
        Command::Whoami => {
            console.guard(None).await?;
            match console.access.profile() {
                Some(profile) => {
                    println!("{} ({})", profile.nick_name, profile.username);
                    let role_set = console.access.roles();
                    let roles: Vec<&str> = role_set
                        .roles()
                        .iter()
                        .map(|role| role.role_key.as_str())
                        .collect();
                    println!("roles: {}", roles.join(", "));
                    println!(
                        "permissions: {}",
                        console.access.permissions().keys().join(", ")
                    );
                }
                None => {
                    let username = console
                        .access
                        .store()
                        .username()
                        .unwrap_or_else(|| "<unknown>".to_string());
                    println!("{username} (profile not loaded)");
                }
            }
            Ok(())
        }
        Command::Nodes(command) => {
            console.guard(Some(PERM_NODES)).await?;
            run_nodes(console, command).await
        }
        Command::Tasks(command) => {
            console.guard(Some(PERM_TASKS)).await?;
            run_tasks(console, command).await
        }
        Command::Plugins(command) => {
            console.guard(Some(PERM_PLUGINS)).await?;
            run_plugins(console, command).await
        }
        Command::Logs(command) => {
            console.guard(Some(PERM_LOGS)).await?;
            run_logs(console, command).await
        }
    }
}

async fn run_nodes(console: &Console, command: NodesCommand) -> Result<(), CommandFailure> {
    match command {
        NodesCommand::List => {
            let nodes = console.nodes.list().await?;
            for node in nodes {
                println!("{}  {}  {}  {:?}", node.id, node.name, node.ip, node.status);
            }
        }
        NodesCommand::Show { id } => {
            let node = console.nodes.get(&NodeId::new(id)).await?;
            println!("{node:#?}");
        }
        NodesCommand::Test { id } => {
            let report = console.nodes.test_connection(&NodeId::new(id)).await?;
            if report.reachable {
                match report.latency_ms {
                    Some(latency) => println!("reachable ({latency} ms)"),
                    None => println!("reachable"),
                }
            } else {
                println!(
                    "unreachable{}",
                    report.message.map(|m| format!(": {m}")).unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

async fn run_tasks(console: &Console, command: TasksCommand) -> Result<(), CommandFailure> {
    match command {
        TasksCommand::List { page, size } => {
            let mut query = PageQuery::new();
            if let Some(page) = page {
                query = query.with_page(page);
            }
            if let Some(size) = size {
                query = query.with_size(size);
            }
            let tasks = console.tasks.list(&query).await?;
            for task in tasks {
                println!("{}  {}  {}  {:?}", task.id, task.name, task.cron, task.status);
            }
        }
        TasksCommand::Show { id } => {
            let task = console.tasks.get(&TaskId::new(id)).await?;
            println!("{task:#?}");
        }
        TasksCommand::Run { id } => {
            console.tasks.execute(&TaskId::new(id)).await?;
            println!("execution triggered");
        }
        TasksCommand::Pause { id } => {
            console.tasks.pause(&TaskId::new(id)).await?;
            println!("task paused");
        }
        TasksCommand::Resume { id } => {
            console.tasks.resume(&TaskId::new(id)).await?;
            println!("task resumed");
        }
        TasksCommand::History { id } => {
            let runs = console.tasks.history(&TaskId::new(id)).await?;
            for run in runs {
                println!(
                    "{}  {:?}  {}",
                    run.id,
                    run.status,
                    run.message.unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

async fn run_plugins(console: &Console, command: PluginsCommand) -> Result<(), CommandFailure> {
    match command {
        PluginsCommand::Store => {
            let plugins = console.plugins.store_plugins(&PageQuery::new()).await?;
            for plugin in plugins {
                println!(
                    "{}  {}  {}{}",
                    plugin.id,
                    plugin.name,
                    plugin.version.unwrap_or_default(),
                    if plugin.installed { "  [installed]" } else { "" }
                );
            }
        }
        PluginsCommand::Installed => {
            let plugins = console.plugins.installed().await?;
            for plugin in plugins {
                println!(
                    "{}  {}  {}",
                    plugin.id,
                    plugin.name,
                    plugin.version.unwrap_or_default()
                );
            }
        }
        PluginsCommand::Install { id } => {
            console.plugins.install(&PluginId::new(id)).await?;
            println!("plugin installed");
        }
        PluginsCommand::Uninstall { id } => {
            console.plugins.uninstall(&PluginId::new(id)).await?;
            println!("plugin uninstalled");
        }
        PluginsCommand::Update { id } => {
            console.plugins.update_plugin(&PluginId::new(id)).await?;
            println!("plugin updated");
        }
    }
    Ok(())
}

async fn run_logs(console: &Console, command: LogsCommand) -> Result<(), CommandFailure> {
    match command {
        LogsCommand::List { stream, page, size } => {
            let mut query = LogQuery::new();
            if let Some(page) = page {
                query = query.with_page(page);
            }
            if let Some(size) = size {
                query = query.with_size(size);
            }
            let entries = console.logs.list(stream.into(), &query).await?;
            for entry in entries {
                println!(
                    "{}  {}  {}",
                    entry.time.to_rfc3339(),
                    entry.level.map(|level| level.as_str()).unwrap_or("-"),
                    entry.message
                );
            }
        }
        LogsCommand::Clear { stream } => {
            console.logs.clear(stream.into()).await?;
            println!("log stream cleared");
        }
        LogsCommand::Export { stream, output } => {
            let bytes = console.logs.export(stream.into(), &LogQuery::new()).await?;
            if let Err(err) = std::fs::write(&output, bytes) {
                eprintln!("failed to write {}: {err}", output.display());
                return Err(CommandFailure::Request);
            }
            println!("exported to {}", output.display());
        }
    }
    Ok(())
}
