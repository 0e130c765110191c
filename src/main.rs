use anyhow::Result;
use bedrock_retail_assistant::app::{App, PlaygroundModel};
use bedrock_retail_assistant::image::ImageUpload;
use bedrock_retail_assistant::models::{Config, ModelResponse};
use bedrock_retail_assistant::prompts::{APP_INTRO, APP_TITLE};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "bedrock-retail-assistant")]
#[command(about = "Prompt Bedrock models and run a guarded retail assistant")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a prompt to a playground model without a guardrail.
    Chat {
        #[arg(long, value_enum, default_value_t = ModelChoice::Mistral)]
        model: ModelChoice,
        text: String,
    },
    /// Ask the retail assistant a single question.
    Ask {
        text: String,
        /// Attach a JPEG or PNG image to the question.
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// Print the Titan embedding of TEXT.
    Embed { text: String },
    /// Interactive retail assistant. Prefix a line with @PATH to attach an image.
    Shop,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelChoice {
    Mistral,
    Claude,
}

impl From<ModelChoice> for PlaygroundModel {
    fn from(choice: ModelChoice) -> Self {
        match choice {
            ModelChoice::Mistral => PlaygroundModel::Mistral,
            ModelChoice::Claude => PlaygroundModel::Claude,
        }
    }
}

/// Split an interactive line into an optional image path and the question.
fn parse_shop_line(line: &str) -> (Option<&Path>, &str) {
    let line = line.trim();
    match line.strip_prefix('@') {
        Some(rest) => {
            let (path, question) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            (Some(Path::new(path)), question.trim())
        }
        None => (None, line),
    }
}

fn print_response(response: &ModelResponse) {
    for text in response.output.texts() {
        println!("{}", text);
    }
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Chat { model, text } => {
            print_response(&app.chat(model.into(), &text).await?);
        }
        Command::Ask { text, image } => {
            let upload = image.as_deref().map(ImageUpload::from_path).transpose()?;
            print_response(&app.ask(&text, upload.as_ref()).await?);
        }
        Command::Embed { text } => {
            let embedding = app.embed(&text).await?;
            println!("{}", serde_json::to_string(&embedding.values)?);
        }
        Command::Shop => shop(app).await?,
    }
    Ok(())
}

async fn shop(app: &App) -> Result<()> {
    println!("{}\n{}", APP_TITLE, APP_INTRO);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let (image, question) = parse_shop_line(&line);
        let upload = match image.map(ImageUpload::from_path).transpose() {
            Ok(upload) => upload,
            Err(e) => {
                error!("Could not read image: {}", e);
                continue;
            }
        };

        match app.ask(question, upload.as_ref()).await {
            Ok(response) => print_response(&response),
            Err(e) => error!("Request failed: {}", e),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bedrock_retail_assistant=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let app = match Config::from_env().and_then(|config| App::new(&config)) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting bedrock-retail-assistant");

    if let Err(e) = run(&app, args.command).await {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
