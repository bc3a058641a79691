use clap::{Parser, Subcommand};
use cyclity::config::ConfigError;
use cyclity::guard::{GuardRefusal, LOGIN_PATH, REDIRECT_PARAM};
use cyclity::navigation::NavOutcome;
use cyclity::storage::FileMedium;
use cyclity::{
    Api, ClientConfig, Envelope, Location, NavigationGuard, Navigator, PersistentStore, Session, TransportError,
};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("{operation} failed with status {status}: {message}")]
    Failed { operation: &'static str, status: u16, message: String },
    #[error("navigation refused: {0}")]
    Refused(#[from] GuardRefusal),
    #[error("navigation did not settle; last redirect was {0}")]
    RedirectLoop(String),
    #[error("no route named `{0}`")]
    UnknownRoute(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "cyclity", about = "Cyclity session client")]
struct Cli {
    #[arg(long, env = "CYCLITY_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "CYCLITY_STORE_PATH", help = "Session file; defaults to the user data directory")]
    store_path: Option<String>,

    #[arg(long, default_value_t = false, help = "Keep the session in memory for this run only")]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a session token.
    Login {
        username: String,
        #[arg(long, env = "CYCLITY_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value_t = false, help = "Persist the token across runs")]
        keep: bool,
        #[arg(long, help = "Path to resume after login")]
        redirect: Option<String>,
    },
    Logout,
    Whoami,
    Register {
        email: String,
        username: String,
        #[arg(long, env = "CYCLITY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Activate {
        email: String,
        #[arg(long)]
        token: String,
    },
    ResendActivation {
        email: String,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        email: String,
        #[arg(long)]
        token: String,
        #[arg(long, env = "CYCLITY_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Print the Strava consent URL for the current user.
    LinkStrava,
    /// Ask the guard where a path, or a named route such as `Dashboard`,
    /// would lead.
    Navigate {
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = ClientConfig::from_vars(|key| match key {
        "CYCLITY_API_URL" => cli.api_url.clone(),
        "CYCLITY_STORE_PATH" => cli.store_path.clone(),
        _ => std::env::var(key).ok(),
    })?;
    debug!(api_url = %config.api_url, store = ?config.store_path, "config loaded");

    let store = open_store(&config, cli.ephemeral);
    let session = Session::restore(store);
    let api = Api::from_config(&config, session.clone())?;
    let mut navigator = Navigator::new(NavigationGuard::new(session));

    match cli.command {
        Command::Login { username, password, keep, redirect } => {
            let mut login = Location::new(LOGIN_PATH);
            if let Some(redirect) = redirect {
                login = login.with_query(REDIRECT_PARAM, redirect);
            }
            follow(navigator.push(login))?;
            report("authenticate", &api.authenticate(&username, &password, keep).await)?;
            follow(navigator.resume_after_login())
        }
        Command::Logout => follow(navigator.execute(api.logout())),
        Command::Whoami => report("get_current_user", &api.get_current_user().await),
        Command::Register { email, username, password } => {
            report("create_user", &api.create_user(&email, &username, &password).await)
        }
        Command::Activate { email, token } => report("activate", &api.activate(&email, &token).await),
        Command::ResendActivation { email } => {
            report("resend_activation", &api.resend_activation(&email).await)
        }
        Command::ForgotPassword { email } => report("forgot_password", &api.forgot_password(&email).await),
        Command::ResetPassword { email, token, new_password } => {
            report("reset_password", &api.reset_password(&email, &new_password, &token).await)
        }
        Command::LinkStrava => run_link_strava(&api, &mut navigator).await,
        Command::Navigate { target } => {
            let to = resolve_target(&navigator, &target)?;
            follow(navigator.push(to))
        }
    }
}

fn open_store(config: &ClientConfig, ephemeral: bool) -> PersistentStore {
    match &config.store_path {
        Some(path) if !ephemeral => PersistentStore::open(FileMedium::new(path.clone())),
        _ => PersistentStore::in_memory(),
    }
}

async fn run_link_strava(api: &Api, navigator: &mut Navigator) -> Result<(), CliError> {
    let user = api.get_current_user().await;
    let user = into_content("get_current_user", user)?;
    let link = into_content("link_external_provider", api.link_external_provider(&user.id.to_string()))?;
    follow(navigator.execute(link))
}

/// A leading `/` means a literal path; anything else is a route name.
fn resolve_target(navigator: &Navigator, target: &str) -> Result<Location, CliError> {
    if target.starts_with('/') {
        return Ok(Location::parse(target));
    }
    navigator
        .guard()
        .routes()
        .path_of(target)
        .map(|path| Location::new(&path))
        .ok_or_else(|| CliError::UnknownRoute(target.to_owned()))
}

fn into_content<T>(operation: &'static str, envelope: Envelope<T>) -> Result<T, CliError> {
    envelope.into_result().map_err(|(status, message)| CliError::Failed { operation, status, message })
}

fn report<T: Serialize>(operation: &'static str, envelope: &Envelope<T>) -> Result<(), CliError> {
    print_json(envelope)?;
    if envelope.success() {
        Ok(())
    } else {
        Err(CliError::Failed { operation, status: envelope.status(), message: envelope.message().to_owned() })
    }
}

fn follow(outcome: NavOutcome) -> Result<(), CliError> {
    match outcome {
        NavOutcome::Arrived(at) => {
            println!("{at}");
            Ok(())
        }
        NavOutcome::External(url) => {
            println!("{url}");
            Ok(())
        }
        NavOutcome::Cancelled(refusal) => Err(refusal.into()),
        NavOutcome::RedirectLoop(at) => Err(CliError::RedirectLoop(at.to_string())),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
