use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;
use wayfarer_agents::TravelAgent;
use wayfarer_core::knowledge::lookup_destination;
use wayfarer_core::{
    compose_trip_plan, extract_intent, sanitize_message, validate_chat_request, ChatRequest,
    EntityBag,
};
use wayfarer_observability::{init_tracing, AppMetrics};
use wayfarer_providers::{build_http_client, ProviderRegistry, ProviderSettings};
use wayfarer_storage::{SessionContexts, Store};

#[derive(Debug, Parser)]
#[command(name = "wayfarer")]
#[command(about = "Wayfarer travel assistant CLI")]
struct Cli {
    /// Use mocked providers and synthetic weather; no network calls.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat keeping one session.
    Chat {
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Print the intent and entities extracted from a message.
    Extract { message: String },
    /// Print a day-by-day plan.
    Itinerary {
        #[arg(long)]
        destination: String,
        #[arg(long, default_value_t = 3)]
        days: u32,
        #[arg(long)]
        budget: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("wayfarer_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Chat { session_id } => {
            let agent = build_agent(cli.offline).await?;
            let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            run_chat(agent, session_id).await?;
        }
        Command::Extract { message } => {
            let intent = extract_intent(&sanitize_message(&message), None);
            println!("{}", serde_json::to_string_pretty(&intent)?);
        }
        Command::Itinerary {
            destination,
            days,
            budget,
        } => {
            let lower = destination.trim().to_lowercase();
            let entities = EntityBag {
                destination: Some(
                    lookup_destination(&lower)
                        .map(ToString::to_string)
                        .unwrap_or(lower),
                ),
                duration: Some(days),
                budget,
                ..EntityBag::default()
            };
            println!("{}", compose_trip_plan(&entities, budget.is_some()));
        }
    }

    Ok(())
}

async fn run_chat(agent: TravelAgent<Store>, session_id: String) -> Result<()> {
    println!("Wayfarer chat mode (session {}). type 'exit' to quit.", session_id);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let request = ChatRequest {
            message: Some(message.to_string()),
            session_id: Some(session_id.clone()),
        };
        let validated = match validate_chat_request(&request) {
            Ok(validated) => validated,
            Err(error) => {
                println!("\n{}\n", error);
                continue;
            }
        };

        let reply = agent.handle_chat(validated).await?;
        println!("\n{}\n", reply.response);
    }

    Ok(())
}

async fn build_agent(offline: bool) -> Result<TravelAgent<Store>> {
    let metrics = AppMetrics::shared();

    let registry = if offline {
        ProviderRegistry::offline()
    } else {
        let settings = ProviderSettings::from_env().context("invalid provider configuration")?;
        ProviderRegistry::from_settings(&settings, build_http_client()?)
    };

    let store = if let Ok(database_url) = env::var("WAYFARER_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    Ok(TravelAgent::new(
        registry,
        Arc::new(store),
        SessionContexts::new(),
        metrics,
    ))
}
