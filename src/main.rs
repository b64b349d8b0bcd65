#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]

use std::{io, path::Path, process};

use args::{
    Args, BanCommand, ChannelCommand, Command, ConfigCommand, MemberCommand, RoleCommand,
    ServerCommand,
};
use chrono_tz::Tz;
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Confirm, Password, Select};
use indicatif::ProgressBar;
use revolt_client::{
    auth::{authenticate, is_rejected_token},
    channel::{CreateChannel, EditChannel},
    config::{Config, ConfigError, TokenKind},
    member::{EditMember, FieldsMember},
    role::{CreateRole, EditRole},
    server::{CreateServer, EditServer, Server},
    ulid::{self, Ulid},
    Client,
};
use serde::Serialize;
use strum::{EnumProperty, IntoEnumIterator};
use terminal::{
    create_new_pb, format_timestamp, get_formatted_left_output, write_lines, OutputColor,
};
use tracing_subscriber::EnvFilter;

mod args;
mod terminal;

struct Context {
    client: Client,
    tz: Tz,
    json: bool,
}

impl Context {
    /// Prints `value` as JSON, or the given summary lines otherwise.
    fn emit<T: Serialize>(
        &self,
        pb: &ProgressBar,
        value: &T,
        summary: impl FnOnce() -> Vec<String>,
    ) -> Result<(), String> {
        if self.json {
            let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
            pb.suspend(|| println!("{json}"));
        } else {
            print_lines(pb, &summary())?;
        }
        Ok(())
    }

    async fn server(&self, pb: &ProgressBar, id: &str) -> Result<Server, String> {
        pb.set_message(format!(": server {id}"));
        let server = self
            .client
            .fetch_server(id)
            .await
            .map_err(|e| format!("Failed to fetch server {id}: {e}"))?;
        pb.println(format!(
            "{} server {}",
            get_formatted_left_output("Fetched", &OutputColor::Green),
            server.name
        ));
        pb.inc(1);
        Ok(server)
    }
}

/// Prints result lines on stdout, which stays visible when the progress
/// bar is hidden.
fn print_lines(pb: &ProgressBar, lines: &[String]) -> Result<(), String> {
    write_lines(pb, &mut io::stdout().lock(), lines).map_err(|e| e.to_string())
}

fn done(action: &str, what: impl std::fmt::Display) -> String {
    format!(
        "{} {what}",
        get_formatted_left_output(action, &OutputColor::Green)
    )
}

fn detail(label: &str, value: impl std::fmt::Display) -> String {
    format!(
        "{} {value}",
        get_formatted_left_output(label, &OutputColor::Cyan)
    )
}

/// Command-line flags are the last configuration layer.
fn apply_flags(config: &mut Config, args: &Args) {
    if let Some(api_url) = &args.api_url {
        config.api_url.clone_from(api_url);
    }
    if let Some(token_kind) = args.token_kind {
        config.token_kind = token_kind;
    }
    if let Some(tz) = &args.tz {
        config.timezone = Some(tz.clone());
    }
    if let Some(token) = &args.token {
        config.token = Some(token.clone());
    }
}

async fn start(pb: &ProgressBar) -> Result<(), String> {
    let start_time = std::time::Instant::now();
    let args = Args::parse();

    // The config commands must work even when the stored values are broken.
    if let Command::Config(command) = &args.command {
        pb.finish_and_clear();
        return run_config(command, &args);
    }

    let mut config = Config::load().map_err(|e| e.to_string())?;
    apply_flags(&mut config, &args);

    config.validate().map_err(|e| e.to_string())?;
    let tz = config.tz().map_err(|e| e.to_string())?;

    // Commands that never touch the network.
    match &args.command {
        Command::Decode { id } => {
            pb.finish_and_clear();
            let ulid: Ulid = id.parse().map_err(|e| format!("Invalid id {id}: {e}"))?;
            let created = ulid::creation_time(id).map_err(|e| e.to_string())?;
            println!("{}", detail("Timestamp", ulid.timestamp_ms()));
            println!("{}", detail("Created", format_timestamp(Some(created), tz)));
            println!("{}", detail("Random", format!("{:020X}", ulid.random())));
            return Ok(());
        }
        Command::Nonce { count } => {
            pb.finish_and_clear();
            for _ in 0..*count {
                println!("{}", ulid::nonce());
            }
            return Ok(());
        }
        _ => {}
    }

    let token = match config.token.clone() {
        Some(token) => token,
        None => pb.suspend(|| prompt_password_input("Enter token: ")),
    };

    pb.set_message(": token");
    let (client, me) = authenticate(&config, &token).await.map_err(|e| {
        if is_rejected_token(&e) {
            format!("Token was rejected: {e}")
        } else {
            e.to_string()
        }
    })?;
    pb.println(format!(
        "{} token for {}",
        get_formatted_left_output("Validated", &OutputColor::Green),
        me.tag()
    ));
    pb.inc(1);

    let ctx = Context {
        client,
        tz,
        json: args.json,
    };

    match args.command {
        Command::Whoami => ctx.emit(pb, &me, || {
            vec![
                detail("User", me.tag()),
                detail("Id", &me.id),
                detail("Name", me.display_name()),
                detail("Created", format_timestamp(me.created_at, ctx.tz)),
                detail("Bot", me.is_bot()),
            ]
        })?,
        Command::Server(command) => run_server(&ctx, pb, command).await?,
        Command::Channel(command) => run_channel(&ctx, pb, command).await?,
        Command::Member(command) => run_member(&ctx, pb, command).await?,
        Command::Ban(command) => run_ban(&ctx, pb, command).await?,
        Command::Role(command) => run_role(&ctx, pb, command).await?,
        Command::Decode { .. } | Command::Nonce { .. } | Command::Config(_) => {}
    }

    pb.finish_with_message(format!(
        " in {}s",
        (start_time.elapsed().as_secs_f32() * 10.0).round() / 10.0
    ));

    Ok(())
}

async fn run_server(ctx: &Context, pb: &ProgressBar, command: ServerCommand) -> Result<(), String> {
    match command {
        ServerCommand::Show(target) => {
            let server = ctx.server(pb, &target.server).await?;
            ctx.emit(pb, &server, || {
                vec![
                    detail("Name", &server.name),
                    detail("Id", &server.id),
                    detail("Owner", &server.owner_id),
                    detail("Created", format_timestamp(server.created_at, ctx.tz)),
                    detail("Channels", server.channel_ids.len()),
                    detail("Roles", server.roles.len()),
                ]
            })?;
        }
        ServerCommand::Create {
            name,
            description,
            nsfw,
        } => {
            let mut create = CreateServer::new(name).nsfw(nsfw);
            create.description = description;
            pb.set_message(format!(": creating {}", create.name));
            let server = ctx
                .client
                .create_server(&create)
                .await
                .map_err(|e| format!("Failed to create server: {e}"))?;
            ctx.emit(pb, &server, || vec![done("Created", format!("server {} ({})", server.name, server.id))])?;
        }
        ServerCommand::Edit {
            target,
            name,
            description,
            nsfw,
        } => {
            let server = ctx.server(pb, &target.server).await?;
            let edit = EditServer {
                name,
                description,
                nsfw,
                ..EditServer::default()
            };
            server
                .edit(&ctx.client, &edit)
                .await
                .map_err(|e| format!("Failed to edit server {}: {e}", server.name))?;
            print_lines(pb, &[done("Edited", format!("server {}", server.name))])?;
        }
        ServerCommand::Delete { target, yes } => {
            let server = ctx.server(pb, &target.server).await?;
            let confirmed = yes
                || pb.suspend(|| {
                    Confirm::with_theme(&ColorfulTheme::default())
                        .with_prompt(format!(
                            "Delete or leave {}? Owners delete, everyone else leaves",
                            server.name
                        ))
                        .default(false)
                        .interact()
                        .unwrap_or(false)
                });
            if !confirmed {
                print_lines(
                    pb,
                    &[format!(
                        "{} server {}",
                        get_formatted_left_output("Kept", &OutputColor::Yellow),
                        server.name
                    )],
                )?;
                return Ok(());
            }
            server
                .delete(&ctx.client)
                .await
                .map_err(|e| format!("Failed to delete server {}: {e}", server.name))?;
            print_lines(pb, &[done("Removed", format!("server {}", server.name))])?;
        }
    }
    Ok(())
}

async fn run_channel(
    ctx: &Context,
    pb: &ProgressBar,
    command: ChannelCommand,
) -> Result<(), String> {
    match command {
        ChannelCommand::Show { channel } => {
            let channel = ctx
                .client
                .fetch_channel(&channel)
                .await
                .map_err(|e| format!("Failed to fetch channel {channel}: {e}"))?;
            ctx.emit(pb, &channel, || {
                vec![
                    detail("Name", channel.name.as_deref().unwrap_or("-")),
                    detail("Id", &channel.id),
                    detail("Type", format!("{:?}", channel.channel_type)),
                    detail("Created", format_timestamp(channel.created_at, ctx.tz)),
                ]
            })?;
        }
        ChannelCommand::Create {
            target,
            name,
            kind,
            description,
            nsfw,
        } => {
            let server = ctx.server(pb, &target.server).await?;
            let mut create = CreateChannel::new(kind, name).nsfw(nsfw);
            create.description = description;
            let channel = server
                .create_channel(&ctx.client, &create)
                .await
                .map_err(|e| format!("Failed to create channel in {}: {e}", server.name))?;
            ctx.emit(pb, &channel, || {
                vec![done(
                    "Created",
                    format!(
                        "{kind} channel #{} ({})",
                        channel.name.as_deref().unwrap_or_default(),
                        channel.id
                    ),
                )]
            })?;
        }
        ChannelCommand::Edit {
            channel,
            name,
            description,
            nsfw,
        } => {
            let channel = ctx
                .client
                .fetch_channel(&channel)
                .await
                .map_err(|e| format!("Failed to fetch channel {channel}: {e}"))?;
            let edit = EditChannel {
                name,
                description,
                nsfw,
                ..EditChannel::default()
            };
            let edited = channel
                .edit(&ctx.client, &edit)
                .await
                .map_err(|e| format!("Failed to edit channel {}: {e}", channel.id))?;
            ctx.emit(pb, &edited, || vec![done("Edited", format!("channel {}", edited.id))])?;
        }
        ChannelCommand::Delete { channel } => {
            let channel = ctx
                .client
                .fetch_channel(&channel)
                .await
                .map_err(|e| format!("Failed to fetch channel {channel}: {e}"))?;
            channel
                .delete(&ctx.client)
                .await
                .map_err(|e| format!("Failed to delete channel {}: {e}", channel.id))?;
            print_lines(pb, &[done("Deleted", format!("channel {}", channel.id))])?;
        }
    }
    Ok(())
}

async fn run_member(ctx: &Context, pb: &ProgressBar, command: MemberCommand) -> Result<(), String> {
    match command {
        MemberCommand::List(target) => {
            let server = ctx.server(pb, &target.server).await?;
            pb.set_message(format!(": members of {}", server.name));
            let all = server
                .fetch_members(&ctx.client)
                .await
                .map_err(|e| format!("Failed to fetch members of {}: {e}", server.name))?;
            ctx.emit(pb, &all, || {
                all.iter()
                    .map(|(member, user)| {
                        format!(
                            "{} {} ({}), account created {}",
                            get_formatted_left_output("Member", &OutputColor::Cyan),
                            member.display_name(user),
                            user.id,
                            format_timestamp(user.created_at, ctx.tz)
                        )
                    })
                    .collect()
            })?;
        }
        MemberCommand::Show(target) => {
            let server = ctx.server(pb, &target.server).await?;
            let member = server
                .fetch_member(&ctx.client, &target.user)
                .await
                .map_err(|e| format!("Failed to fetch member {}: {e}", target.user))?;
            let user = member
                .fetch_user(&ctx.client)
                .await
                .map_err(|e| format!("Failed to fetch user {}: {e}", target.user))?;
            ctx.emit(pb, &member, || {
                vec![
                    detail("Name", member.display_name(&user)),
                    detail("User", user.tag()),
                    detail("Joined", format_timestamp(member.joined_at, ctx.tz)),
                    detail("Roles", member.roles.join(", ")),
                ]
            })?;
        }
        MemberCommand::Edit {
            target,
            nickname,
            clear_nickname,
            roles,
        } => {
            let server = ctx.server(pb, &target.server).await?;
            let member = server
                .fetch_member(&ctx.client, &target.user)
                .await
                .map_err(|e| format!("Failed to fetch member {}: {e}", target.user))?;
            let mut edit = EditMember {
                nickname,
                roles,
                ..EditMember::default()
            };
            if clear_nickname {
                edit = edit.remove(FieldsMember::Nickname);
            }
            let edited = member
                .edit(&ctx.client, &edit)
                .await
                .map_err(|e| format!("Failed to edit member {}: {e}", target.user))?;
            ctx.emit(pb, &edited, || vec![done("Edited", format!("member {}", edited.id))])?;
        }
        MemberCommand::Kick(target) => {
            let server = ctx.server(pb, &target.server).await?;
            server
                .kick(&ctx.client, &target.user)
                .await
                .map_err(|e| format!("Failed to kick {}: {e}", target.user))?;
            print_lines(pb, &[done("Kicked", format!("{} from {}", target.user, server.name))])?;
        }
    }
    Ok(())
}

async fn run_ban(ctx: &Context, pb: &ProgressBar, command: BanCommand) -> Result<(), String> {
    match command {
        BanCommand::List(target) => {
            let server = ctx.server(pb, &target.server).await?;
            let list = server
                .fetch_bans(&ctx.client)
                .await
                .map_err(|e| format!("Failed to fetch bans of {}: {e}", server.name))?;
            ctx.emit(pb, &list, || {
                list.bans
                    .iter()
                    .map(|ban| {
                        let name = list
                            .user(ban)
                            .map_or(ban.id.user.as_str(), |user| user.username.as_str());
                        format!(
                            "{} {name}: {}",
                            get_formatted_left_output("Banned", &OutputColor::Red),
                            ban.reason.as_deref().unwrap_or("no reason given")
                        )
                    })
                    .collect()
            })?;
        }
        BanCommand::Add { target, reason } => {
            let server = ctx.server(pb, &target.server).await?;
            server
                .ban(&ctx.client, &target.user, reason.as_deref())
                .await
                .map_err(|e| format!("Failed to ban {}: {e}", target.user))?;
            print_lines(pb, &[done("Banned", format!("{} from {}", target.user, server.name))])?;
        }
        BanCommand::Remove(target) => {
            let server = ctx.server(pb, &target.server).await?;
            server
                .unban(&ctx.client, &target.user)
                .await
                .map_err(|e| format!("Failed to unban {}: {e}", target.user))?;
            print_lines(pb, &[done("Unbanned", format!("{} in {}", target.user, server.name))])?;
        }
    }
    Ok(())
}

async fn run_role(ctx: &Context, pb: &ProgressBar, command: RoleCommand) -> Result<(), String> {
    match command {
        RoleCommand::Create { target, name, rank } => {
            let server = ctx.server(pb, &target.server).await?;
            let mut create = CreateRole::new(name);
            create.rank = rank;
            let created = server
                .create_role(&ctx.client, &create)
                .await
                .map_err(|e| format!("Failed to create role in {}: {e}", server.name))?;
            print_lines(
                pb,
                &[done(
                    "Created",
                    format!("role {} ({})", created.role.name, created.id),
                )],
            )?;
        }
        RoleCommand::Edit {
            target,
            role,
            name,
            colour,
            hoist,
            rank,
        } => {
            let server = ctx.server(pb, &target.server).await?;
            let edit = EditRole {
                name,
                colour,
                hoist,
                rank,
                ..EditRole::default()
            };
            server
                .edit_role(&ctx.client, &role, &edit)
                .await
                .map_err(|e| format!("Failed to edit role {role}: {e}"))?;
            print_lines(pb, &[done("Edited", format!("role {role}"))])?;
        }
        RoleCommand::Delete { target, role } => {
            let server = ctx.server(pb, &target.server).await?;
            server
                .delete_role(&ctx.client, &role)
                .await
                .map_err(|e| format!("Failed to delete role {role}: {e}"))?;
            print_lines(pb, &[done("Deleted", format!("role {role}"))])?;
        }
    }
    Ok(())
}

fn run_config(command: &ConfigCommand, args: &Args) -> Result<(), String> {
    let path = Config::default_path().map_err(|e| e.to_string())?;
    match command {
        ConfigCommand::Path => println!("{}", path.display()),
        ConfigCommand::Show => {
            let mut config = Config::load().map_err(|e| e.to_string())?;
            apply_flags(&mut config, args);
            if config.token.is_some() {
                config.token = Some("<hidden>".to_string());
            }
            let json = serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        ConfigCommand::SetToken => {
            // Start from the file alone so env overrides are not persisted.
            let mut stored = stored_config(&path)?;
            stored.token_kind = prompt_token_kind();
            stored.token = Some(prompt_password_input("Enter token: "));
            stored.save(&path).map_err(|e| e.to_string())?;
            println!(
                "{} token to {}",
                get_formatted_left_output("Saved", &OutputColor::Green),
                path.display()
            );
        }
    }
    Ok(())
}

/// The config file as stored, replaced by defaults when it cannot be parsed
/// so that saving over it repairs it.
fn stored_config(path: &Path) -> Result<Config, String> {
    match Config::from_file(path) {
        Ok(config) => Ok(config),
        Err(e @ ConfigError::Parse { .. }) => {
            tracing::warn!(error = %e, "replacing unreadable config file");
            Ok(Config::default())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn prompt_password_input(prompt: &str) -> String {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()
        .unwrap_or_default()
}

fn prompt_token_kind() -> TokenKind {
    let options = TokenKind::iter().collect::<Vec<_>>();
    let options_friendly = options
        .iter()
        .map(|option| option.get_str("Friendly").unwrap_or_default())
        .collect::<Vec<_>>();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select token kind")
        .default(0)
        .items(&options_friendly)
        .interact()
        .unwrap_or(0);

    options[selection]
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let pb = &create_new_pb(2, "Running");

    let result = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start runtime: {e}"))
        .and_then(|rt| rt.block_on(start(pb)));

    if let Err(e) = result {
        pb.abandon();

        eprintln!(
            "{} {}",
            get_formatted_left_output("Error", &OutputColor::Red),
            e
        );

        process::exit(1);
    }
}
