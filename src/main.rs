use clap::Parser;
use colored::*;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use hossbot::cli::Args;
use hossbot::console::{self, Exit};
use hossbot::{ActiveEndpoint, ChatConfig, ChatSession, EndpointResolver, SessionId};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.default_log_filter());

    let config = args.resolve_config()?;
    let client = config.http_client();

    // Sends go to the tunnel until the probe says otherwise.
    let endpoint = ActiveEndpoint::new(config.tunnel_chat_url());
    let resolver = EndpointResolver::new(client.clone(), &config);
    tokio::spawn(resolver.resolve_into(endpoint.clone()));

    let session = ChatSession::new(client, endpoint, SessionId::generate());
    let renderer = tokio::spawn(console::render_events(
        session.subscribe(),
        config.bot_name.clone(),
        std::io::stdout(),
        std::io::stderr(),
    ));

    print_banner(&config);

    let input = BufReader::new(tokio::io::stdin());
    match console::run_input(input, &session, &mut std::io::stderr()).await? {
        // `/quit` leaves at once, abandoning replies still in flight.
        Exit::Quit => renderer.abort(),
        Exit::Eof => {
            // Every send has finished; dropping the last session handle closes
            // the event channel so the renderer drains and returns.
            drop(session);
            renderer.await?;
        }
    }
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_banner(config: &ChatConfig) {
    eprintln!("{}", format!("  {}: type a message and press Enter", config.bot_name).bright_cyan());
    eprintln!("{}", "  /help lists commands".bright_blue());
    eprintln!();
}
