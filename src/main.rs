//! plexconf - Plex server configuration CLI

use std::fmt::Display;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use plexconf::notify::ConsoleSink;
use plexconf::{
    ClientConfig, Collaborators, ConfigSession, Credentials, DiscoveredCandidate, JsonSettingsStore, Outcome, Paths,
    PlexHttpClient, RecordEdit, ServerRecord,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "plexconf")]
#[command(about = "Plex server configuration - discover, bind, probe, and persist Plex servers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured Plex servers
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an unconfigured placeholder server
    Add,

    /// Remove a configured server
    Remove {
        /// Server record id
        id: u32,
    },

    /// Edit connection fields of a server by hand
    Edit {
        /// Server record id
        id: u32,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        ip: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Connect over https
        #[arg(long, conflicts_with = "no_ssl")]
        ssl: bool,

        /// Connect over plain http
        #[arg(long)]
        no_ssl: bool,

        /// Plex auth token
        #[arg(long)]
        token: Option<String>,
    },

    /// List the servers a Plex account can access
    Discover {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Discover servers and bind one of them onto a server record
    Select {
        /// Server record id
        id: u32,

        /// Position of the discovered server (as printed by `discover`)
        #[arg(long)]
        candidate: usize,

        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,
    },

    /// Check that a server answers at its configured address
    Test {
        /// Server record id
        id: u32,
    },

    /// Reload the libraries of a server and choose which ones to enable
    Libraries {
        /// Server record id
        id: u32,

        /// Library key to enable (repeatable)
        #[arg(long)]
        enable: Vec<String>,
    },

    /// Show resolved paths (for debugging)
    Paths,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let paths = Paths::resolve();

    if let Commands::Paths = cli.command {
        println!("Settings file:   {}", paths.settings_file().display());
        println!("Settings exists: {}", paths.settings_file().exists());
        return;
    }

    let plex = match PlexHttpClient::new(ClientConfig::resolve()) {
        Ok(c) => Arc::new(c),
        Err(e) => exit_with(e),
    };
    let store = Arc::new(JsonSettingsStore::new(paths.settings_file()));
    let console = if wants_json(&cli.command) {
        ConsoleSink::stderr_only()
    } else {
        ConsoleSink::new()
    };
    let mut session = ConfigSession::new(Collaborators::with_plex_client(store, plex, Arc::new(console)));

    if let Err(e) = session.load().await {
        exit_with(e);
    }

    match cli.command {
        Commands::Paths => {}
        Commands::List { json } => {
            if json {
                match serde_json::to_string_pretty(session.settings()) {
                    Ok(output) => println!("{output}"),
                    Err(e) => exit_with(e),
                }
            } else if session.settings().servers.is_empty() {
                println!("No Plex servers configured. Add one with: plexconf add");
            } else {
                print_server_table(&session.settings().servers);
            }
        }
        Commands::Add => {
            let id = session.add_placeholder();
            save(&mut session).await;
            println!("Added server {}", id);
        }
        Commands::Remove { id } => {
            if session.remove_server(id).is_none() {
                exit_with(format!("Server not found: {}", id));
            }
            save(&mut session).await;
            println!("Removed server {}", id);
        }
        Commands::Edit {
            id,
            name,
            ip,
            port,
            ssl,
            no_ssl,
            token,
        } => {
            let edit = RecordEdit {
                name,
                ip,
                port,
                ssl: if ssl {
                    Some(true)
                } else if no_ssl {
                    Some(false)
                } else {
                    None
                },
                auth_token: token,
            };
            if edit.is_empty() {
                exit_with("Nothing to change");
            }
            if let Err(e) = session.update_server(id, edit) {
                exit_with(e);
            }
            save(&mut session).await;
        }
        Commands::Discover { username, password, json } => {
            session.set_credentials(Credentials::new(username, password));
            discover(&mut session).await;
            let servers = session.loaded_servers().unwrap_or_default();
            if json {
                match serde_json::to_string_pretty(servers) {
                    Ok(output) => println!("{output}"),
                    Err(e) => exit_with(e),
                }
            } else {
                print_candidate_table(servers);
            }
        }
        Commands::Select {
            id,
            candidate,
            username,
            password,
        } => {
            session.set_credentials(Credentials::new(username, password));
            discover(&mut session).await;
            if let Err(e) = session.select_server(candidate, id) {
                exit_with(e);
            }
            save(&mut session).await;
        }
        Commands::Test { id } => match session.test_server(id).await {
            Ok(Outcome::Applied(true)) => {}
            Ok(_) => std::process::exit(1),
            Err(e) => exit_with(e),
        },
        Commands::Libraries { id, enable } => {
            match session.load_libraries(id).await {
                Ok(Outcome::Applied(true)) => {}
                Ok(_) => std::process::exit(1),
                Err(e) => exit_with(e),
            }
            for key in &enable {
                if let Err(e) = session.set_library_enabled(id, key, true) {
                    exit_with(e);
                }
            }
            save(&mut session).await;
            if let Some(record) = session.record(id) {
                print_library_table(record);
            }
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("plexconf={}", default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// JSON output owns stdout; notifications go to stderr instead.
fn wants_json(command: &Commands) -> bool {
    matches!(command, Commands::List { json: true } | Commands::Discover { json: true, .. })
}

fn exit_with(e: impl Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

async fn discover(session: &mut ConfigSession) {
    if session.request_servers().await != Outcome::Applied(true) {
        std::process::exit(1);
    }
}

async fn save(session: &mut ConfigSession) {
    match session.save().await {
        Ok(Outcome::Applied(true)) => {}
        // The session already reported the failure.
        Ok(_) | Err(_) => std::process::exit(1),
    }
}

fn print_server_table(servers: &[ServerRecord]) {
    const INDENT: &str = "        ";

    for s in servers {
        let address = match (&s.ip, s.port) {
            (Some(ip), Some(port)) => format!("{}:{}", ip, port),
            (Some(ip), None) => ip.clone(),
            (None, _) => "not configured".to_string(),
        };
        let enabled: Vec<&str> = s
            .libraries
            .iter()
            .filter(|l| l.enabled)
            .map(|l| l.title.as_str())
            .collect();

        println!("{}", s.id);
        println!("{}Name:      {}", INDENT, s.name);
        println!("{}Address:   {}", INDENT, address);
        println!("{}SSL:       {}", INDENT, if s.ssl { "yes" } else { "no" });
        if let Some(m) = s.machine_identifier.as_deref().filter(|m| !m.is_empty()) {
            println!("{}Machine:   {}", INDENT, m);
        }
        if !s.libraries.is_empty() {
            println!("{}Libraries: {}/{} enabled", INDENT, enabled.len(), s.libraries.len());
        }
        println!();
    }
}

fn print_candidate_table(servers: &[DiscoveredCandidate]) {
    const INDENT: &str = "        ";

    for (i, s) in servers.iter().enumerate() {
        println!("[{}] {}", i, s.name);
        println!("{}Addresses: {}", INDENT, s.local_addresses);
        println!("{}Port:      {}", INDENT, s.port);
        println!("{}Scheme:    {}", INDENT, s.scheme);
        println!("{}Machine:   {}", INDENT, s.machine_identifier);
        println!();
    }
}

fn print_library_table(record: &ServerRecord) {
    println!("{:<8} {:<8} {}", "KEY", "ENABLED", "TITLE");
    println!("{}", "-".repeat(60));
    for l in &record.libraries {
        println!("{:<8} {:<8} {}", l.key, if l.enabled { "yes" } else { "no" }, l.title);
    }
}
