use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, LogFormat},
    server,
    types::{ActionPayload, ChatMessage, SuggestRequest, TripContext},
    TripPlanner,
};

/// CLI entry point for the wego-agent binary
pub async fn run() -> Result<()> {
    let matches = command().get_matches();
    let mut config = Config::from_env()?;
    init_tracing(&config);

    match matches.subcommand() {
        Some(("serve", args)) => {
            if let Some(host) = args.get_one::<String>("host") {
                config.host = host.clone();
            }
            if let Some(port) = args.get_one::<u16>("port") {
                config.port = *port;
            }
            server::serve(&config).await?;
        }
        Some(("ask", args)) => ask(&config, args).await?,
        Some(("classify", args)) => {
            let query = required(args, "query")?;
            let planner = TripPlanner::from_config(&config)?;
            let intent = planner.classifier().classify(query).await;
            println!("{intent}");
        }
        Some((other, _)) => anyhow::bail!("unknown subcommand `{other}`"),
        None => anyhow::bail!("a subcommand is required"),
    }

    Ok(())
}

fn command() -> Command {
    Command::new("wego-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Trip planning assistant: routes chat requests to LLM prompts and validates their JSON actions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Serve POST /api/ai/suggest over HTTP")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("Interface to bind (or set HOST)"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .value_parser(clap::value_parser!(u16))
                        .help("Port to listen on (or set PORT)"),
                ),
        )
        .subcommand(
            Command::new("ask")
                .about("Run one request through the planner and print the reply")
                .arg(
                    Arg::new("query")
                        .help("The chat message to send")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("trip")
                        .short('t')
                        .long("trip")
                        .value_name("FILE")
                        .help("JSON file holding the trip context"),
                )
                .arg(
                    Arg::new("history")
                        .long("history")
                        .value_name("FILE")
                        .help("JSON file holding the chat history"),
                )
                .arg(
                    Arg::new("plan")
                        .long("plan")
                        .action(ArgAction::SetTrue)
                        .help("Produce a full day-by-day plan instead of routing the query"),
                )
                .arg(
                    Arg::new("scope")
                        .short('s')
                        .long("scope")
                        .value_name("SCOPE")
                        .default_value("everything")
                        .help("What the full plan should cover"),
                ),
        )
        .subcommand(
            Command::new("classify")
                .about("Print the intent a query would be routed to")
                .arg(
                    Arg::new("query")
                        .help("The chat message to classify")
                        .required(true)
                        .index(1),
                ),
        )
}

async fn ask(config: &Config, args: &ArgMatches) -> Result<()> {
    let query = required(args, "query")?;

    let trip_context: TripContext = match args.get_one::<String>("trip") {
        Some(path) => read_json(path)?,
        None => TripContext::default(),
    };
    let chat_history: Vec<ChatMessage> = match args.get_one::<String>("history") {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let mut request = SuggestRequest::new(query, trip_context).with_history(chat_history);
    if args.get_flag("plan") {
        let scope = required(args, "scope")?;
        request = request.as_full_plan(scope);
    }

    info!(action = %request.action, "asking planner");
    let planner = TripPlanner::from_config(config)?;
    let reply = planner.handle(&request).await?;

    println!("{reply}");
    for payload in ActionPayload::extract_all(&reply) {
        println!("\n[{}] {}", payload.action(), summarize(&payload));
    }

    Ok(())
}

fn summarize(payload: &ActionPayload) -> String {
    match payload {
        ActionPayload::AddItems(add) => format!(
            "{} item(s), {:?}",
            add.items.len(),
            add.replacement_strategy
        ),
        ActionPayload::RemoveItems(remove) => format!("{} item(s)", remove.items.len()),
        ActionPayload::UpdateItems(update) => format!("{} update(s)", update.updates.len()),
        ActionPayload::SmartSchedule(schedule) => format!(
            "{} new, {} removed, {} rescheduled",
            schedule.new_items.len(),
            schedule.items_to_remove.len(),
            schedule.reschedule.len()
        ),
        ActionPayload::UpdatePreferences(update) => format!(
            "{} dietary, {} interests, {} constraints",
            update.preferences.dietary.len(),
            update.preferences.interests.len(),
            update.preferences.constraints.len()
        ),
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument `{name}`"))
}

fn read_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn test_ask_arguments() {
        let matches = command()
            .try_get_matches_from(["wego-agent", "ask", "plan day 2", "--plan", "--scope", "day 2"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "ask");
        assert_eq!(required(args, "query").unwrap(), "plan day 2");
        assert!(args.get_flag("plan"));
        assert_eq!(required(args, "scope").unwrap(), "day 2");
    }

    #[test]
    fn test_serve_port_is_numeric() {
        assert!(command()
            .try_get_matches_from(["wego-agent", "serve", "--port", "http"])
            .is_err());
    }
}
