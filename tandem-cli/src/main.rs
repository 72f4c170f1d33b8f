use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use std::time::Duration;
use tandem_core::{ClientMessage, ConnectionId, RoomId, ServerMessage};
use tandem_peer::{
    CallAgent, CallCommand, CallEnd, NegotiationConfig, NegotiationRole, NegotiationSession,
    PeerError, RtcTransport, SignalingClient, TransportConfig, DEFAULT_SETTLE_DELAY,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:5000/ws";
const TRANSPORT_EVENT_CAPACITY: usize = 64;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Host or join a two-party WebRTC call")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CallArgs {
    /// Signaling endpoint.
    #[arg(long, env = "TANDEM_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Display name shown to the other side.
    #[arg(long)]
    name: String,

    /// Milliseconds the host waits after a guest joins before offering.
    #[arg(long, default_value_t = DEFAULT_SETTLE_DELAY.as_millis() as u64)]
    settle_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a room and admit guests.
    Host {
        #[command(flatten)]
        call: CallArgs,

        /// Room id; a random one is generated when omitted.
        #[arg(long)]
        room: Option<String>,
    },
    /// Ask to join an existing room.
    Join {
        #[command(flatten)]
        call: CallArgs,

        #[arg(long)]
        room: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match Cli::parse().command {
        Commands::Host { call, room } => {
            let room = RoomId::from(room.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()));
            host(call, room).await
        }
        Commands::Join { call, room } => join(call, RoomId::from(room)).await,
    }
}

async fn host(args: CallArgs, room: RoomId) -> Result<()> {
    let mut client = connect(&args.server).await?;

    client
        .create_room(&room, &args.name)
        .await
        .context("Failed to create room")?;
    println!("{} {}", "🏠 Room created:".green().bold(), room.as_str().bold());
    println!("   Share it with: tandem join --room {}", room);

    run_call(client, args, room, NegotiationRole::Offerer).await
}

async fn join(args: CallArgs, room: RoomId) -> Result<()> {
    let mut client = connect(&args.server).await?;

    println!("{}", "⏳ Waiting for the host to let you in...".cyan());
    match client.request_join(&room, &args.name).await {
        Ok(()) => println!("{}", "✅ Admitted!".green().bold()),
        Err(PeerError::AdmissionRejected(_)) => {
            println!("{}", "🚫 The host declined your request.".red());
            return Ok(());
        }
        Err(PeerError::RoomNotFound(_)) => {
            println!("{} {}", "❓ No such room:".red(), room);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    run_call(client, args, room, NegotiationRole::Answerer).await
}

async fn connect(server: &str) -> Result<SignalingClient> {
    let client = SignalingClient::connect(server)
        .await
        .with_context(|| format!("Failed to connect to {server}"))?;
    println!(
        "{} {}",
        "🔌 Connected as".cyan(),
        client.socket_id().to_string().dimmed()
    );
    Ok(client)
}

async fn run_call(
    client: SignalingClient,
    args: CallArgs,
    room: RoomId,
    role: NegotiationRole,
) -> Result<()> {
    let transport_config = TransportConfig::from_announced(client.ice_servers().to_vec());
    let (outbound, signals) = client.into_channels();

    let (event_tx, events) = mpsc::channel(TRANSPORT_EVENT_CAPACITY);
    let transport = RtcTransport::new(transport_config, event_tx)
        .await
        .context("Failed to set up the media transport")?;

    let config = NegotiationConfig {
        settle_delay: Duration::from_millis(args.settle_ms),
        ..NegotiationConfig::default()
    };
    let session = NegotiationSession::new(
        room.clone(),
        args.name,
        role,
        config,
        Arc::new(transport),
        outbound.clone(),
    );

    let (notice_tx, mut notices) = mpsc::unbounded_channel();
    let (agent, commands) = CallAgent::new(session, signals, events);
    let mut call: JoinHandle<Result<CallEnd, PeerError>> =
        tokio::spawn(agent.with_notices(notice_tx).run());

    println!("{}", "📞 In call. Press Ctrl-C to hang up.".cyan());

    let end = loop {
        tokio::select! {
            result = &mut call => break result?,

            Some(notice) = notices.recv() => {
                on_notice(notice, &room, &outbound).await?;
            }

            _ = tokio::signal::ctrl_c() => {
                let _ = commands.send(CallCommand::Hangup);
            }
        }
    };

    match end {
        Ok(CallEnd::HungUp) => println!("{}", "👋 Hung up.".green()),
        Ok(CallEnd::PeerLeft { name }) => println!("{} {} left.", "👋".yellow(), name),
        Ok(CallEnd::HostLeft) => println!("{}", "👋 The host closed the room.".yellow()),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn on_notice(
    notice: ServerMessage,
    room: &RoomId,
    outbound: &mpsc::UnboundedSender<ClientMessage>,
) -> Result<()> {
    match notice {
        ServerMessage::JoinRequest {
            socket_id,
            name,
            room_id,
        } if room_id == *room => {
            let allow = ask_admission(socket_id, name).await?;
            let _ = outbound.send(ClientMessage::RespondToJoin {
                allow,
                to: socket_id,
                room_id,
            });
        }
        ServerMessage::ReceiveMessage { text, name } => {
            println!("{} {}", format!("[{name}]").bold(), text);
        }
        other => tracing::debug!("Ignoring {}", other.op()),
    }
    Ok(())
}

async fn ask_admission(requester: ConnectionId, name: String) -> Result<bool> {
    let allow = tokio::task::spawn_blocking(move || {
        Confirm::new()
            .with_prompt(format!("{} ({}) wants to join. Allow?", name, requester))
            .default(true)
            .interact()
    })
    .await??;
    Ok(allow)
}
