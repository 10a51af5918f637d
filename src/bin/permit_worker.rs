//! Operator CLI driving the task pipeline and download tokens.
//!
//! Usage:
//!
//! ```text
//! permit-worker create-task --spec cn_1inch --source uploads/face.jpg --color white
//! permit-worker extend-background --task <id> --color blue
//! permit-worker extend-layout --task <id> --color white --kb 150
//! permit-worker show-task --task <id>
//! permit-worker create-token --task <id> --user <user> --ttl 600
//! permit-worker use-token --token <value>
//! ```
//!
//! Configuration comes from `PERMIT_*` variables. Without `POSTGRES_DSN` the
//! repositories live only for the duration of one invocation. Results are
//! printed as JSON on standard output.

use clap::{Args, Parser, Subcommand};
use permit::app::Application;
use permit::config::AppConfig;
use permit::task::domain::TaskId;
use permit::task::services::{CreateTaskRequest, ExtendLayoutRequest};
use permit::telemetry;
use permit::user::domain::UserId;
use serde::Serialize;
use std::error::Error;
use std::io::{self, Write};

/// ID-photo pipeline operator tool.
#[derive(Parser, Debug)]
#[command(name = "permit-worker")]
#[command(about = "Runs ID-photo pipeline operations against the configured backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Create a task and run the cutout and first variant
    CreateTask(CreateTaskArgs),

    /// Render the task on another background color
    ExtendBackground(ExtendBackgroundArgs),

    /// Compose a 6x4 inch print sheet
    ExtendLayout(ExtendLayoutArgs),

    /// Print a stored task
    ShowTask(TaskArgs),

    /// Issue a download token for a finished task
    CreateToken(CreateTokenArgs),

    /// Redeem a download token
    UseToken(UseTokenArgs),
}

#[derive(Args, Debug, Clone)]
struct CreateTaskArgs {
    /// Specification code, `passport` when omitted
    #[arg(long, default_value = "")]
    spec: String,

    /// Upload reference of the source photo
    #[arg(long)]
    source: String,

    /// Background color for the first variant
    #[arg(long, default_value = "")]
    color: String,

    /// Owning user id
    #[arg(long)]
    owner: Option<String>,

    /// Output width in pixels, 0 for the catalog value
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Output height in pixels, 0 for the catalog value
    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Output resolution, 0 for the catalog value
    #[arg(long, default_value_t = 0)]
    dpi: u32,
}

#[derive(Args, Debug, Clone)]
struct TaskArgs {
    /// Task identifier
    #[arg(long)]
    task: String,
}

#[derive(Args, Debug, Clone)]
struct ExtendBackgroundArgs {
    /// Task identifier
    #[arg(long)]
    task: String,

    /// Background color
    #[arg(long)]
    color: String,

    /// Output resolution, 0 for the task value
    #[arg(long, default_value_t = 0)]
    dpi: u32,
}

#[derive(Args, Debug, Clone)]
struct ExtendLayoutArgs {
    /// Task identifier
    #[arg(long)]
    task: String,

    /// Background color of the tiles
    #[arg(long, default_value = "")]
    color: String,

    /// Tile width in pixels, 0 for the task value
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Tile height in pixels, 0 for the task value
    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Sheet resolution, 0 for the task value
    #[arg(long, default_value_t = 0)]
    dpi: u32,

    /// Target file size in KB, 0 for default quality
    #[arg(long, default_value_t = 0)]
    kb: u32,
}

#[derive(Args, Debug, Clone)]
struct CreateTokenArgs {
    /// Task identifier
    #[arg(long)]
    task: String,

    /// Requesting user id
    #[arg(long)]
    user: String,

    /// Lifetime in seconds, non-positive for the default
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    ttl: i64,
}

#[derive(Args, Debug, Clone)]
struct UseTokenArgs {
    /// Token value
    #[arg(long)]
    token: String,
}

#[derive(Serialize)]
struct Reference {
    url: String,
}

fn emit(value: &impl Serialize) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    telemetry::init(&config.log_filter, config.log_json)?;
    let app = Application::build(&config)?;

    match cli.command {
        Command::CreateTask(args) => {
            let mut request = CreateTaskRequest::new(args.spec, args.source)
                .with_color(args.color)
                .with_dimensions(args.width, args.height)
                .with_dpi(args.dpi);
            if let Some(owner) = args.owner {
                request = request.with_owner(UserId::new(owner)?);
            }
            emit(&app.pipeline.create_task(request).await?)
        }
        Command::ExtendBackground(args) => {
            let task_id = TaskId::parse(&args.task)?;
            let url = app
                .pipeline
                .extend_background(task_id, &args.color, args.dpi)
                .await?;
            emit(&Reference { url })
        }
        Command::ExtendLayout(args) => {
            let request = ExtendLayoutRequest::new(TaskId::parse(&args.task)?)
                .with_color(args.color)
                .with_dimensions(args.width, args.height)
                .with_dpi(args.dpi)
                .with_target_kb(args.kb);
            let url = app.pipeline.extend_layout(request).await?;
            emit(&Reference { url })
        }
        Command::ShowTask(args) => {
            emit(&app.pipeline.find_task(TaskId::parse(&args.task)?).await?)
        }
        Command::CreateToken(args) => emit(
            &app.downloads
                .create_token(&args.task, &args.user, args.ttl)
                .await?,
        ),
        Command::UseToken(args) => emit(&app.downloads.use_token(&args.token).await?),
    }
}
