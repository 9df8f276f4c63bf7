use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use cadastro::api::{HttpUserApi, UserApi};
use cadastro::config::{self, DEFAULT_HOST, DEFAULT_PORT};
use cadastro::form::{FieldUpdate, FormDriver, FormEvent, FormState, Outcome, RecordForm};
use cadastro::models::{AppState, PermissionKey, UserRow, UserType};
use cadastro::routes::build_router;
use cadastro::utils::value_to_short_string;
use cadastro::validation::Field;

fn build_api(env_file: Option<&str>) -> HttpUserApi {
    config::load_env_file(env_file);
    let base_url = config::get_api_base_url();
    match HttpUserApi::new(base_url, config::get_api_timeout()) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(%e, "Failed to create HTTP client");
            eprintln!("{}: {}", yansi::Paint::red("Failed to create HTTP client"), e);
            process::exit(1);
        }
    }
}

async fn start_server(api: HttpUserApi, host: &str, port: u16, stylesheet: Option<String>) {
    let mut state = AppState::new(Arc::new(api.clone()), api.base_url());
    if let Some(path) = stylesheet {
        match std::fs::read_to_string(&path) {
            Ok(css) => {
                state.custom_css = Some(css);
                tracing::info!("Loaded custom stylesheet from {}", path);
            }
            Err(e) => {
                tracing::error!(%e, "Failed to read custom stylesheet");
                eprintln!("{} {}: {}", yansi::Paint::red("Failed to read custom stylesheet at"), path, e);
                process::exit(1);
            }
        }
    }

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            eprintln!("{}: {}", yansi::Paint::red("Invalid host/port format"), e);
            process::exit(1);
        }
    };
    let app = build_router(state);
    tracing::info!(%addr, api = api.base_url(), "Starting user admin server");
    println!(
        "{} {}",
        yansi::Paint::new("Web server running on").green(),
        yansi::Paint::new(format!("http://{}", addr)).cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(%e, "Server encountered an error while running");
                eprintln!("{}: {}", yansi::Paint::new("Server error").red(), e);
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}\n{}",
                yansi::Paint::new(format!("Failed to bind to {}", addr)).red(),
                e,
                yansi::Paint::new("Please stop any process using this port, or start the server with a different --port value.").yellow()
            );
            process::exit(1);
        }
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table
}

fn parse_permission(raw: &str) -> PermissionKey {
    match PermissionKey::from_str(raw) {
        Some(k) => k,
        None => {
            let valid: Vec<&str> = PermissionKey::all().iter().map(|k| k.as_str()).collect();
            eprintln!(
                "{} '{}'; {} {}",
                yansi::Paint::red("Unknown permission"),
                raw,
                yansi::Paint::yellow("expected one of"),
                valid.join(", ")
            );
            process::exit(2);
        }
    }
}

fn parse_user_type(raw: &str) -> FieldUpdate {
    if UserType::from_str(raw).is_none() && !raw.trim().is_empty() {
        let valid: Vec<&str> = UserType::all().iter().map(|t| t.as_str()).collect();
        eprintln!(
            "{} '{}'; {} {}",
            yansi::Paint::red("Unknown user type"),
            raw,
            yansi::Paint::yellow("expected one of"),
            valid.join(", ")
        );
        process::exit(2);
    }
    FieldUpdate::from_input(Field::UserType, raw.to_string())
}

/// Print the result of a submission and exit non-zero on failure.
fn report_submission(form: &RecordForm, outcome: &Outcome) {
    if form.state() == FormState::Saved {
        for notice in &outcome.notices {
            println!("{}", yansi::Paint::green(&notice.message));
        }
        return;
    }
    if !form.errors().is_empty() {
        eprintln!("{}", yansi::Paint::red("The record is not valid:").bold());
        for error in form.errors().iter() {
            eprintln!("  {}: {}", error.field().path(), error);
        }
    } else if let Some(message) = form.last_error() {
        eprintln!("{}", yansi::Paint::red(message));
    }
    process::exit(1);
}

#[derive(Parser)]
#[command(
    name = "cadastro",
    author,
    version,
    about = "User registry administration",
    long_about = r#"Cadastro - manage the user records kept by the registry backend.

Run the web interface, or create, edit and inspect users straight from the
terminal. Point it at the backend with API_BASE_URL (environment or .env file).

Examples:
  1) Run the web interface:
      cadastro serve --host 127.0.0.1 --port 8080
  2) Create a user:
      cadastro users create --name Ana --email ana@x.com --phone 111 \
        --organization Saude --user-type administrador --permission permission1
  3) Edit a user:
      cadastro users update 42 --phone 222 --revoke permission1
"#,
    after_help = "Use `cadastro <subcommand> --help` to get subcommand specific options and usage examples."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Disable request/response logging
    #[arg(long, global = true)]
    silent: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
        /// Path to a custom stylesheet to serve instead of the default
        #[arg(long)]
        stylesheet: Option<String>,
    },
    /// Validate configuration (env vars / backend reachability)
    #[command(
        about = "Validate configuration and ensure the backend answers.",
        long_about = "Check that API_BASE_URL is configured, then try to fetch the user list from the backend."
    )]
    CheckConfig {
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
    },
    /// Manage user records through the backend
    Users {
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
        #[command(subcommand)]
        sub: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    #[command(about = "List users", long_about = "Fetch every user record from the backend and print it as a table.")]
    List,
    #[command(about = "Show one user", long_about = "Fetch a single user record by id and print its fields.")]
    Show { id: String },
    #[command(
        about = "Create a user",
        long_about = "Validate the given fields and create a new user record. Every field is required; permissions default to not granted."
    )]
    Create {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        organization: String,
        /// administrador | usuario | outros
        #[arg(long, default_value = "")]
        user_type: String,
        /// Permission to grant (repeatable): permission1 | permission2 | permission3
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },
    #[command(
        about = "Update a user",
        long_about = "Load the user record, apply only the given changes, validate and save it."
    )]
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        user_type: Option<String>,
        /// Permission to grant (repeatable)
        #[arg(long)]
        grant: Vec<String>,
        /// Permission to revoke (repeatable)
        #[arg(long)]
        revoke: Vec<String>,
    },
}

async fn run_users(api: &dyn UserApi, sub: UserCommands) {
    let driver = FormDriver::new(api);
    match sub {
        UserCommands::List => match api.list_users().await {
            Ok(users) => {
                if users.is_empty() {
                    println!("(empty list)");
                    return;
                }
                let mut table = new_table();
                table.set_header(vec!["ID", "Name", "Email", "Phone", "Organization", "User type", "Permissions"]);
                for row in users.iter().map(UserRow::from) {
                    table.add_row(vec![
                        row.id,
                        row.name,
                        row.email,
                        row.phone,
                        row.organization,
                        row.user_type,
                        row.permissions,
                    ]);
                }
                println!("\n{table}\n");
            }
            Err(e) => {
                eprintln!("{}: {}", yansi::Paint::red("Failed to load users"), e);
                process::exit(1);
            }
        },
        UserCommands::Show { id } => match api.fetch_user(&id).await {
            Ok(user) => {
                let mut table = new_table();
                table.set_header(vec!["Field", "Value"]);
                if let Ok(serde_json::Value::Object(obj)) = serde_json::to_value(&user) {
                    for (k, v) in &obj {
                        table.add_row(vec![k.clone(), value_to_short_string(v)]);
                    }
                }
                println!("\n{table}\n");
            }
            Err(e) => {
                eprintln!("{} '{}': {}", yansi::Paint::red("Failed to load user"), id, e);
                process::exit(1);
            }
        },
        UserCommands::Create {
            name,
            email,
            phone,
            organization,
            user_type,
            permissions,
        } => {
            let mut updates = vec![
                FieldUpdate::Name(name),
                FieldUpdate::Email(email),
                FieldUpdate::Phone(phone),
                FieldUpdate::Organization(organization),
                parse_user_type(&user_type),
            ];
            for p in &permissions {
                updates.push(FieldUpdate::Permission(parse_permission(p), true));
            }
            let mut form = RecordForm::create();
            for update in updates {
                form.dispatch(FormEvent::Update(update));
            }
            let outcome = driver.send(&mut form, FormEvent::Submit).await;
            report_submission(&form, &outcome);
        }
        UserCommands::Update {
            id,
            name,
            email,
            phone,
            organization,
            user_type,
            grant,
            revoke,
        } => {
            let (mut form, fetch) = RecordForm::edit(id);
            let loaded = driver.run(&mut form, vec![fetch]).await;
            if form.state() != FormState::Ready {
                for notice in &loaded.notices {
                    eprintln!("{}", yansi::Paint::red(&notice.message));
                }
                process::exit(1);
            }
            let mut updates = Vec::new();
            updates.extend(name.map(FieldUpdate::Name));
            updates.extend(email.map(FieldUpdate::Email));
            updates.extend(phone.map(FieldUpdate::Phone));
            updates.extend(organization.map(FieldUpdate::Organization));
            updates.extend(user_type.as_deref().map(parse_user_type));
            updates.extend(grant.iter().map(|p| FieldUpdate::Permission(parse_permission(p), true)));
            updates.extend(revoke.iter().map(|p| FieldUpdate::Permission(parse_permission(p), false)));
            for update in updates {
                form.dispatch(FormEvent::Update(update));
            }
            let outcome = driver.send(&mut form, FormEvent::Submit).await;
            report_submission(&form, &outcome);
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    if cli.silent {
        cadastro::api::client::set_silent(true);
    }

    // Serve the web app when no command is given
    let command = cli.command.unwrap_or(Commands::Serve {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PORT,
        env_file: None,
        stylesheet: None,
    });

    match command {
        Commands::Serve {
            host,
            port,
            env_file,
            stylesheet,
        } => {
            let api = build_api(env_file.as_deref());
            start_server(api, &host, port, stylesheet).await;
        }
        Commands::CheckConfig { env_file } => {
            let api = build_api(env_file.as_deref());
            if !config::api_base_url_configured() {
                eprintln!(
                    "{} ({} {})",
                    yansi::Paint::new("API_BASE_URL is not configured").red(),
                    yansi::Paint::new("falling back to").yellow(),
                    api.base_url()
                );
            }
            match api.list_users().await {
                Ok(users) => {
                    println!(
                        "{} ({} users at {})",
                        yansi::Paint::new("Configuration looks valid").green(),
                        users.len(),
                        api.base_url()
                    );
                }
                Err(e) => {
                    eprintln!("{}: {}", yansi::Paint::new("Configuration appears invalid").red(), e);
                    process::exit(1);
                }
            }
        }
        Commands::Users { env_file, sub } => {
            let api = build_api(env_file.as_deref());
            run_users(&api, sub).await;
        }
    }
}
