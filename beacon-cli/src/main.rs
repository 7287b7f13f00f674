use anyhow::{Context, Result, bail};
use beacon_client::{
    HttpRelay, MediaSession, SessionConfig, SessionEvent, SyntheticCapture, TransportConfig,
    WebRtcFactory,
};
use beacon_core::model::{IceServerConfig, Role, RoomId, UserId};
use beacon_server::{AppState, ServerConfig, serve};
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Room-scoped signaling relay and screen-share sessions")]
struct Cli {
    /// Relay server base url.
    #[arg(long, global = true, env = "BEACON_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Bearer token of an existing session (see `beacon session`).
    #[arg(long, global = true, env = "BEACON_TOKEN")]
    token: Option<String>,

    /// User id matching the token.
    #[arg(long, global = true, env = "BEACON_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: SocketAddr,

        /// STUN urls handed to clients; repeatable.
        #[arg(long = "stun")]
        stun: Vec<String>,
    },

    /// Create an identity and print the token to use with other commands.
    Session {
        #[arg(long)]
        name: String,
    },

    /// Create a room; the creator becomes its host.
    CreateRoom {
        name: String,

        #[arg(long)]
        max_participants: Option<u32>,
    },

    /// List the rooms you participate in.
    Rooms,

    /// Show one room with its participants.
    Room { room: String },

    /// Join a room as a viewer.
    Join { room: String },

    /// Leave a room.
    Leave {
        room: String,

        #[arg(long, short)]
        yes: bool,
    },

    /// Send a chat message.
    Send { room: String, text: String },

    /// Print the recent chat history of a room.
    Messages { room: String },

    /// Upload a file and share it in the room chat.
    SendFile { room: String, path: PathBuf },

    /// Host a media session in a room (synthetic screen feed).
    Share { room: String },

    /// View the host's media session in a room.
    Watch { room: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Serve { bind, stun } => run_server(*bind, stun).await,
        Commands::Session { name } => create_session(&cli.server, name).await,
        Commands::CreateRoom {
            name,
            max_participants,
        } => {
            let relay = relay_from(&cli)?;
            let details = relay.create_room(name, *max_participants).await?;
            println!(
                "{} {} ({})",
                "Room created:".green().bold(),
                details.room.name,
                details.room.id
            );
            Ok(())
        }
        Commands::Rooms => {
            let relay = relay_from(&cli)?;
            for room in relay.rooms().await? {
                let status = if room.is_active { "active" } else { "closed" };
                println!(
                    "{}  {}  {} as {}, {} connected",
                    room.id,
                    room.name.bold(),
                    status,
                    room.role.as_str().cyan(),
                    room.connected_count
                );
            }
            Ok(())
        }
        Commands::Room { room } => {
            let relay = relay_from(&cli)?;
            let details = relay.room_details(&room_id(room)?).await?;
            println!("{} ({})", details.room.name.bold(), details.room.id);
            for p in details.participants {
                let mark = if p.is_connected { "●".green() } else { "○".dimmed() };
                println!("  {mark} {} [{}]", p.display_name, p.role.as_str());
            }
            Ok(())
        }
        Commands::Join { room } => {
            let relay = relay_from(&cli)?;
            let details = relay.join_room(&room_id(room)?).await?;
            println!("{} {}", "Joined".green().bold(), details.room.name);
            Ok(())
        }
        Commands::Leave { room, yes } => {
            let relay = relay_from(&cli)?;
            if !yes
                && !dialoguer::Confirm::new()
                    .with_prompt(format!("Leave room {room}?"))
                    .interact()?
            {
                return Ok(());
            }
            relay.leave_room(&room_id(room)?).await?;
            println!("{}", "Left the room.".yellow());
            Ok(())
        }
        Commands::Send { room, text } => {
            let relay = relay_from(&cli)?;
            relay.send_text(&room_id(room)?, text).await?;
            Ok(())
        }
        Commands::Messages { room } => {
            let relay = relay_from(&cli)?;
            for msg in relay.messages(&room_id(room)?).await? {
                match msg.file_name {
                    Some(file) => println!(
                        "{}: {} {}",
                        msg.author_name.bold(),
                        "[file]".cyan(),
                        file
                    ),
                    None => println!("{}: {}", msg.author_name.bold(), msg.content),
                }
            }
            Ok(())
        }
        Commands::SendFile { room, path } => {
            let relay = relay_from(&cli)?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .context("file has no printable name")?;
            let data = std::fs::read(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let file_id = relay.upload_file(name, data.into()).await?;
            relay.send_file_message(&room_id(room)?, file_id).await?;
            println!("{} {name}", "Shared".green().bold());
            Ok(())
        }
        Commands::Share { room } => run_media(&cli, room, Role::Host).await,
        Commands::Watch { room } => run_media(&cli, room, Role::Viewer).await,
    }
}

async fn run_server(bind: SocketAddr, stun: &[String]) -> Result<()> {
    let mut config = ServerConfig {
        bind_addr: bind,
        ..Default::default()
    };
    if !stun.is_empty() {
        config.ice_servers = stun.iter().map(|url| IceServerConfig::stun(url)).collect();
    }

    println!("{}", "Starting beacon relay...".green().bold());
    let state = AppState::new(config.ice_servers.clone());
    serve(&config, state).await
}

async fn create_session(server: &str, name: &str) -> Result<()> {
    let relay = HttpRelay::create_session(server, name)
        .await
        .context("creating session")?;
    println!("{}", "Session created.".green().bold());
    println!("  export BEACON_TOKEN={}", relay.token());
    println!("  export BEACON_USER={}", relay.user_id());
    Ok(())
}

async fn run_media(cli: &Cli, room: &str, role: Role) -> Result<()> {
    let relay = relay_from(cli)?;
    let room = room_id(room)?;
    let details = relay.join_room(&room).await.context("joining room")?;

    let me = relay.user_id().clone();
    let membership = details
        .participants
        .iter()
        .find(|p| p.user_id == me)
        .context("joined room but not listed as participant")?;
    if membership.role != role {
        bail!(
            "you are a {} in this room, not a {}",
            membership.role.as_str(),
            role.as_str()
        );
    }

    let ice_servers = relay.ice_servers().await?;
    let config = SessionConfig {
        transport: TransportConfig { ice_servers },
        ..Default::default()
    };

    let session = MediaSession::new(
        Arc::new(relay.clone()),
        Arc::new(SyntheticCapture::new()),
        Arc::new(WebRtcFactory),
        config,
        room.clone(),
        me,
        role,
    );

    let mut events = session.start().await?;
    println!(
        "{} {} (ctrl-c to stop)",
        "Session started as".green().bold(),
        role.as_str().cyan()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    SessionEvent::StateChanged(state) => {
                        println!("  {} {state:?}", "state:".bold());
                    }
                    SessionEvent::RemoteTrack(track) => {
                        println!(
                            "  {} {} ({}) from stream {}",
                            "remote track:".bold(),
                            track.id,
                            track.kind,
                            track.stream_id
                        );
                    }
                    SessionEvent::Error(err) => {
                        println!("  {} {err}", "error:".red().bold());
                    }
                }
            }
        }
    }

    session.stop().await;
    relay.leave_room(&room).await?;
    println!("{}", "Session closed.".yellow());
    Ok(())
}

fn relay_from(cli: &Cli) -> Result<HttpRelay> {
    let (Some(token), Some(user)) = (&cli.token, &cli.user) else {
        bail!("no session; run `beacon session --name <you>` and export BEACON_TOKEN/BEACON_USER");
    };
    let user = UserId::from_str(user).context("BEACON_USER is not a valid user id")?;
    Ok(HttpRelay::with_token(&cli.server, token.clone(), user))
}

fn room_id(raw: &str) -> Result<RoomId> {
    RoomId::from_str(raw).context("not a valid room id")
}
