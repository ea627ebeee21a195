use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use afroken::admin::{AdminClient, AdminError, JobFilter, NewHudumaCentre, NewService};
use afroken::catalogue::service_info;
use afroken::chat::{ChatSession, Resolver, SessionError};
use afroken::config::{self, ClientConfig, ConfigError};
use afroken::error::ErrorCode;
use afroken::feedback::FeedbackClient;
use afroken::metrics::{self, Aggregator, AggregatorSettings, DatasetError, dataset, export};
use afroken::types::{ChatResponse, FeedbackRequest, Language, Rating, Role, ServiceType, TimeRange, now_ms, now_timestamp};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Admin(e) => e.error_code(),
            Self::Dataset(e) => e.error_code(),
            Self::Session(e) => e.error_code(),
            Self::Io(_) => "E_IO",
            Self::InvalidJson(_) => "E_INVALID_JSON",
            Self::Usage(_) => "E_USAGE",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "afroken", about = "AfroKen citizen assistant client")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    #[arg(long, global = true, env = config::ENV_API_BASE_URL)]
    base_url: Option<String>,

    /// Answer from the local table without contacting the backend.
    #[arg(long, global = true)]
    mock: bool,

    #[arg(long, global = true, env = config::ENV_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: Option<String>,

    #[arg(long, global = true, env = config::ENV_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: Option<String>,
}

impl GlobalArgs {
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            config::ENV_API_BASE_URL => self.base_url.clone(),
            config::ENV_USE_MOCK if self.mock => Some("true".to_owned()),
            config::ENV_REQUEST_TIMEOUT_SECS => self.request_timeout_secs.clone(),
            config::ENV_CONNECT_TIMEOUT_SECS => self.connect_timeout_secs.clone(),
            _ => std::env::var(key).ok(),
        }
    }

    fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::from_lookup(|key| self.lookup(key))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask one question and print the answer.
    Chat {
        message: String,
        #[arg(long, default_value = "en")]
        lang: Language,
        #[arg(long)]
        service: Option<ServiceType>,
        /// Print the raw response as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Interactive session over stdin.
    Repl {
        #[arg(long, default_value = "en")]
        lang: Language,
        #[arg(long)]
        service: Option<ServiceType>,
    },
    /// Rate a bot answer.
    Feedback {
        #[arg(long)]
        chat_id: String,
        #[arg(long)]
        message_id: String,
        #[arg(long)]
        rating: Rating,
        #[arg(long)]
        comments: Option<String>,
    },
    /// Dashboard figures from the county dataset.
    Metrics(MetricsArgs),
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
struct MetricsArgs {
    #[arg(long)]
    county: Option<String>,
    #[arg(long, default_value = "30d")]
    range: TimeRange,
    /// Emit the dashboard CSV export instead of JSON.
    #[arg(long)]
    csv: bool,
    /// With `--csv`: write the export into this directory instead of stdout.
    #[arg(long, requires = "csv")]
    save: Option<PathBuf>,
    /// Replacement county dataset (JSON).
    #[arg(long)]
    counties: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    UploadPdf {
        path: PathBuf,
        #[arg(long)]
        category: Option<String>,
    },
    ScrapeUrl {
        url: String,
        #[arg(long)]
        category: Option<String>,
    },
    Jobs {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        job_type: Option<String>,
    },
    Job {
        job_id: String,
    },
    DeleteJob {
        job_id: String,
    },
    DeleteJobs {
        #[arg(required = true)]
        job_ids: Vec<String>,
    },
    Services,
    CreateService {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        logo: Option<PathBuf>,
    },
    Centres,
    CreateCentre {
        #[arg(long)]
        name: String,
        #[arg(long)]
        county: String,
        #[arg(long)]
        sub_county: Option<String>,
        #[arg(long)]
        town: Option<String>,
        #[arg(long)]
        latitude: Option<f64>,
        #[arg(long)]
        longitude: Option<f64>,
        #[arg(long)]
        contact_phone: Option<String>,
        #[arg(long)]
        contact_email: Option<String>,
    },
    /// Live chat metrics, falling back to local dashboard figures.
    Metrics,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.error_code());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.global.client_config()?;
    tracing::debug!(base_url = %config.api_base_url, mock = config.use_mock, "afroken: config loaded");

    match cli.command {
        Command::Chat { message, lang, service, json } => run_chat(&config, &message, lang, service, json).await,
        Command::Repl { lang, service } => run_repl(&config, lang, service).await,
        Command::Feedback { chat_id, message_id, rating, comments } => {
            let client = FeedbackClient::from_config(&config)?;
            let feedback = FeedbackRequest { chat_id, message_id, rating, comments };
            client.submit(&feedback).await;
            println!("ok");
            Ok(())
        }
        Command::Metrics(args) => run_metrics(args),
        Command::Admin(admin) => run_admin(&config, admin).await,
    }
}

// =============================================================================
// CHAT
// =============================================================================

async fn run_chat(
    config: &ClientConfig,
    message: &str,
    lang: Language,
    service: Option<ServiceType>,
    json: bool,
) -> Result<(), CliError> {
    if message.trim().is_empty() {
        return Err(CliError::Usage("message is empty".into()));
    }
    let resolver = Resolver::from_config(config)?;
    let response = resolver.resolve_message(message.trim(), lang, service).await;
    if json {
        print_json(&serde_json::to_value(&response)?)
    } else {
        print_response(&response);
        Ok(())
    }
}

fn print_response(response: &ChatResponse) {
    println!("{}", response.answer);
    if !response.citations.is_empty() {
        println!();
        println!("Sources:");
        for citation in &response.citations {
            println!("  - {} ({})", citation.title, citation.url);
        }
    }
    for action in response.actions.iter().flatten() {
        println!("[{:?}] {}", action.kind, action.label);
    }
}

fn print_suggestions(service: ServiceType) {
    let info = service_info(service);
    println!("{}: {}", service.display_name(), info.description);
    for example in info.examples {
        println!("  try: {example}");
    }
}

async fn run_repl(config: &ClientConfig, lang: Language, service: Option<ServiceType>) -> Result<(), CliError> {
    let resolver = Resolver::from_config(config)?;
    let feedback = FeedbackClient::from_config(config)?;
    let mut session = ChatSession::new(lang);
    session.set_service(service);
    session.open();

    println!("AfroKen assistant. Commands: /lang X, /service X|none, /rate helpful|not_helpful [comment], /clear, /quit");
    if let Some(service) = service {
        print_suggestions(service);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
            let rest = rest.trim();
            match name {
                "quit" | "exit" => break,
                "clear" => {
                    session.clear_messages();
                    println!("(cleared)");
                }
                "lang" => match rest.parse::<Language>() {
                    Ok(lang) => session.set_language(lang),
                    Err(e) => println!("{e}"),
                },
                "service" if rest.is_empty() || rest == "none" => session.set_service(None),
                "service" => match rest.parse::<ServiceType>() {
                    Ok(service) => {
                        session.set_service(Some(service));
                        print_suggestions(service);
                    }
                    Err(e) => println!("{e}"),
                },
                "rate" => rate_last_answer(&session, &feedback, rest).await,
                _ => println!("unknown command /{name}"),
            }
            continue;
        }

        let reply = session.send_message(&resolver, line).await?;
        if reply.role == Role::Bot {
            println!("{}", reply.text);
            for citation in reply.citations.iter().flatten() {
                println!("  - {} ({})", citation.title, citation.url);
            }
            for action in reply.actions.iter().flatten() {
                println!("[{:?}] {}", action.kind, action.label);
            }
        }
    }

    session.close();
    Ok(())
}

async fn rate_last_answer(session: &ChatSession, feedback: &FeedbackClient, args: &str) {
    let (rating, comment) = args.split_once(' ').unwrap_or((args, ""));
    let rating = match rating.parse::<Rating>() {
        Ok(rating) => rating,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    let Some(last) = session.last_bot_message() else {
        println!("nothing to rate yet");
        return;
    };
    match session.feedback_for(&last.id, rating, Some(comment.to_owned())) {
        Ok(request) => {
            feedback.submit(&request).await;
            println!("(thanks for the feedback)");
        }
        Err(e) => println!("{e}"),
    }
}

// =============================================================================
// METRICS
// =============================================================================

fn run_metrics(args: MetricsArgs) -> Result<(), CliError> {
    let county = args.county.as_deref().filter(|c| !c.eq_ignore_ascii_case("all"));
    let metrics = match &args.counties {
        Some(path) => {
            let counties = dataset::load_from_file(path)?;
            Aggregator::new(&counties, AggregatorSettings::default()).aggregate(county, args.range)
        }
        None => metrics::aggregate(county, args.range),
    };

    if args.csv {
        let generated_at = now_timestamp();
        match &args.save {
            Some(dir) => {
                let path = export::save_csv(dir, &metrics, args.range, county, &generated_at, now_ms())?;
                println!("{}", path.display());
            }
            None => println!("{}", export::to_csv(&metrics, args.range, county, &generated_at)),
        }
        Ok(())
    } else {
        print_json(&serde_json::to_value(&metrics)?)
    }
}

// =============================================================================
// ADMIN
// =============================================================================

async fn run_admin(config: &ClientConfig, admin: AdminCommand) -> Result<(), CliError> {
    let client = AdminClient::from_config(config)?;
    let json = match admin.command {
        AdminSubcommand::UploadPdf { path, category } => client.upload_pdf(&path, category.as_deref()).await?,
        AdminSubcommand::ScrapeUrl { url, category } => client.scrape_url(&url, category.as_deref()).await?,
        AdminSubcommand::Jobs { status, job_type } => client.list_jobs(&JobFilter { status, job_type }).await?,
        AdminSubcommand::Job { job_id } => client.job_status(&job_id).await?,
        AdminSubcommand::DeleteJob { job_id } => client.delete_job(&job_id).await?,
        AdminSubcommand::DeleteJobs { job_ids } => client.delete_jobs(&job_ids).await?,
        AdminSubcommand::Services => client.list_services().await?,
        AdminSubcommand::CreateService { title, description, category, logo } => {
            client
                .create_service(&NewService { title, description, category, logo })
                .await?
        }
        AdminSubcommand::Centres => client.list_huduma_centres().await?,
        AdminSubcommand::CreateCentre {
            name,
            county,
            sub_county,
            town,
            latitude,
            longitude,
            contact_phone,
            contact_email,
        } => {
            let centre =
                NewHudumaCentre { name, county, sub_county, town, latitude, longitude, contact_phone, contact_email };
            client.create_huduma_centre(&centre).await?
        }
        AdminSubcommand::Metrics => match client.chat_metrics().await {
            Some(json) => json,
            None => serde_json::to_value(metrics::aggregate(None, TimeRange::default()))?,
        },
    };
    print_json(&json)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
