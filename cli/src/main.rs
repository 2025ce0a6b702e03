#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use client::net::meetings::{CreateMeetingData, MeetingsService, UpdateMeetingData};
use client::net::search::{DEFAULT_LIMIT, SearchFilters, SearchService};
use client::net::types::RegisterData;
use client::state::tokens::StoreError;
use client::util::nav::{Notice, NoticeLevel, Notifier};
use client::{ApiClient, ApiConfig, ApiError, FileTokenStore, Guard, GuardDecision, Session, SessionContext, TokenStore};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no token file; pass --token-file or set MEETSCRIBE_TOKEN_FILE or HOME")]
    NoTokenFile,
    #[error("not signed in; run `meetscribe login` first")]
    NotSignedIn,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "meetscribe", about = "Meetscribe API command-line client")]
struct Cli {
    /// Overrides MEETSCRIBE_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    #[arg(long, env = "MEETSCRIBE_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MEETSCRIBE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MEETSCRIBE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        organization: Option<String>,
    },
    Logout,
    Whoami,
    Meetings(MeetingsCommand),
    Search(SearchCommand),
    /// Show where the route guard would send a navigation to `path`.
    Guard {
        path: String,
        /// Also print the `Cookie` header the edge router would receive.
        #[arg(long)]
        show_cookie: bool,
    },
}

#[derive(Args, Debug)]
struct MeetingsCommand {
    #[command(subcommand)]
    command: MeetingsSubcommand,
}

#[derive(Subcommand, Debug)]
enum MeetingsSubcommand {
    List,
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        start_time: String,
        #[arg(long)]
        end_time: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start_time: Option<String>,
        #[arg(long)]
        end_time: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
    Join {
        id: String,
    },
    Leave {
        id: String,
    },
    Analytics {
        id: String,
    },
}

#[derive(Args, Debug)]
struct SearchCommand {
    #[command(subcommand)]
    command: SearchSubcommand,
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    #[arg(long = "meeting-id")]
    meeting_ids: Vec<String>,
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    to: Option<String>,
}

impl From<FilterArgs> for SearchFilters {
    fn from(args: FilterArgs) -> Self {
        Self { meeting_ids: args.meeting_ids, date_from: args.from, date_to: args.to }
    }
}

#[derive(Subcommand, Debug)]
enum SearchSubcommand {
    Fulltext {
        query: String,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[command(flatten)]
        filters: FilterArgs,
    },
    Semantic {
        query: String,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        #[command(flatten)]
        filters: FilterArgs,
    },
    Ask {
        meeting_id: String,
        question: String,
    },
}

/// Prints notices on stderr so stdout stays machine-readable.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => eprintln!("{}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let token_path = token_file(cli.token_file, std::env::var_os("HOME").map(PathBuf::from))?;
    tracing::debug!(path = %token_path.display(), "using token file");
    let tokens = Arc::new(FileTokenStore::open(token_path)?);

    if let Command::Guard { path, show_cookie } = &cli.command {
        print_guard(path, tokens.as_ref());
        if *show_cookie {
            println!("cookie: {}", tokens.cookie_header().unwrap_or_default());
        }
        return Ok(());
    }

    let mut config = ApiConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.base_url = url.trim_end_matches('/').to_owned();
    }
    let client = ApiClient::from_config(config, tokens.clone())?.with_notifier(Arc::new(StderrNotifier));
    let session = SessionContext::new(Arc::new(client));

    // Any command may have rotated or cleared tokens; a session that did not
    // reach disk is reported even when the command itself succeeded.
    let outcome = run_command(&session, cli.command).await;
    finish(outcome, tokens.save())
}

/// The command's own error wins; otherwise a failed token save is the result.
fn finish(outcome: Result<(), CliError>, saved: Result<(), StoreError>) -> Result<(), CliError> {
    outcome?;
    saved?;
    Ok(())
}

async fn run_command(session: &SessionContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            print_json(&user)
        }
        Command::Register { email, password, name, organization } => {
            let data = RegisterData { email, password, name, organization_name: organization };
            let user = session.register(&data).await?;
            print_json(&user)
        }
        Command::Logout => {
            session.logout().await;
            Ok(())
        }
        Command::Whoami => match session.start().await {
            Session::Authenticated(user) => print_json(&user),
            Session::Anonymous | Session::Loading => Err(CliError::NotSignedIn),
        },
        Command::Meetings(meetings) => run_meetings(session, meetings).await,
        Command::Search(search) => run_search(session, search).await,
        Command::Guard { .. } => Ok(()),
    }
}

async fn run_meetings(session: &SessionContext, meetings: MeetingsCommand) -> Result<(), CliError> {
    let service = MeetingsService::new(session.client().clone());
    match meetings.command {
        MeetingsSubcommand::List => print_json(&service.list().await?),
        MeetingsSubcommand::Get { id } => print_json(&service.get(&id).await?),
        MeetingsSubcommand::Create { title, start_time, end_time, description } => {
            let data = CreateMeetingData { title, start_time, end_time, description, ..CreateMeetingData::default() };
            print_json(&service.create(&data).await?)
        }
        MeetingsSubcommand::Update { id, title, start_time, end_time, description } => {
            let data = UpdateMeetingData { title, start_time, end_time, description, ..UpdateMeetingData::default() };
            print_json(&service.update(&id, &data).await?)
        }
        MeetingsSubcommand::Delete { id } => {
            service.delete(&id).await?;
            Ok(())
        }
        MeetingsSubcommand::Join { id } => print_json(&service.join(&id).await?),
        MeetingsSubcommand::Leave { id } => print_json(&service.leave(&id).await?),
        MeetingsSubcommand::Analytics { id } => print_json(&service.analytics(&id).await?),
    }
}

async fn run_search(session: &SessionContext, search: SearchCommand) -> Result<(), CliError> {
    let service = SearchService::new(session.client().clone());
    let results = match search.command {
        SearchSubcommand::Fulltext { query, limit, offset, filters } => {
            service.fulltext(&query, &filters.into(), limit, offset).await?
        }
        SearchSubcommand::Semantic { query, limit, filters } => service.semantic(&query, &filters.into(), limit).await?,
        SearchSubcommand::Ask { meeting_id, question } => service.ask(&meeting_id, &question).await?,
    };
    print_json(&results)
}

fn token_file(explicit: Option<PathBuf>, home: Option<PathBuf>) -> Result<PathBuf, CliError> {
    explicit
        .or_else(|| home.map(|home| home.join(".meetscribe").join("tokens")))
        .ok_or(CliError::NoTokenFile)
}

fn guard_line(path: &str, decision: GuardDecision) -> String {
    match decision {
        GuardDecision::Allow => format!("allow {path}"),
        GuardDecision::Redirect(to) => format!("redirect {path} -> {to}"),
    }
}

fn print_guard(path: &str, tokens: &dyn TokenStore) {
    println!("{}", guard_line(path, Guard::default().check(path, tokens)));
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
