use clap::{Args as ClapArgs, Parser, Subcommand};
use revolt_client::{channel::ChannelKind, config::TokenKind};

#[derive(Parser, Debug)]
#[command(name = "revolt", version, about = "Manage Revolt servers from the terminal")]
pub struct Args {
    /// API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Token to authenticate with, prompted for when missing
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Kind of token (bot or user)
    #[arg(long, global = true)]
    pub token_kind: Option<TokenKind>,

    /// Time zone used to print timestamps, e.g. Europe/Berlin
    #[arg(long, global = true)]
    pub tz: Option<String>,

    /// Print raw JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the account the token belongs to
    Whoami,

    /// Print the creation time embedded in an id
    Decode { id: String },

    /// Generate fresh ids
    Nonce {
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },

    #[command(subcommand)]
    Server(ServerCommand),

    #[command(subcommand)]
    Channel(ChannelCommand),

    #[command(subcommand)]
    Member(MemberCommand),

    #[command(subcommand)]
    Ban(BanCommand),

    #[command(subcommand)]
    Role(RoleCommand),

    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(ClapArgs, Debug)]
pub struct ServerRef {
    /// Server id
    pub server: String,
}

#[derive(ClapArgs, Debug)]
pub struct MemberRef {
    /// Server id
    pub server: String,

    /// User id
    pub user: String,
}

#[derive(Subcommand, Debug)]
pub enum ServerCommand {
    Show(ServerRef),

    Create {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        nsfw: bool,
    },

    Edit {
        #[command(flatten)]
        target: ServerRef,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        nsfw: Option<bool>,
    },

    /// Delete the server if you own it, leave it otherwise
    Delete {
        #[command(flatten)]
        target: ServerRef,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChannelCommand {
    Show { channel: String },

    Create {
        #[command(flatten)]
        target: ServerRef,

        name: String,

        /// text or voice
        #[arg(short, long, default_value = "text")]
        kind: ChannelKind,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        nsfw: bool,
    },

    Edit {
        channel: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        nsfw: Option<bool>,
    },

    Delete { channel: String },
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    List(ServerRef),

    Show(MemberRef),

    Edit {
        #[command(flatten)]
        target: MemberRef,

        #[arg(long, conflicts_with = "clear_nickname")]
        nickname: Option<String>,

        #[arg(long)]
        clear_nickname: bool,

        /// Replace the member's roles
        #[arg(long = "role")]
        roles: Option<Vec<String>>,
    },

    Kick(MemberRef),
}

#[derive(Subcommand, Debug)]
pub enum BanCommand {
    List(ServerRef),

    Add {
        #[command(flatten)]
        target: MemberRef,

        #[arg(short, long)]
        reason: Option<String>,
    },

    Remove(MemberRef),
}

#[derive(Subcommand, Debug)]
pub enum RoleCommand {
    Create {
        #[command(flatten)]
        target: ServerRef,

        name: String,

        #[arg(long)]
        rank: Option<i64>,
    },

    Edit {
        #[command(flatten)]
        target: ServerRef,

        role: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        colour: Option<String>,

        #[arg(long)]
        hoist: Option<bool>,

        #[arg(long)]
        rank: Option<i64>,
    },

    Delete {
        #[command(flatten)]
        target: ServerRef,

        role: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print where the configuration file lives
    Path,

    /// Prompt for a token and store it
    SetToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn channel_kind_parses_from_flag() {
        let args = Args::parse_from([
            "revolt",
            "channel",
            "create",
            "01FHGJ3NPP7XANQQH8C2BE44ZY",
            "lounge",
            "--kind",
            "voice",
            "--token-kind",
            "user",
        ]);

        assert_eq!(args.token_kind, Some(TokenKind::User));
        match args.command {
            Command::Channel(ChannelCommand::Create { kind, name, .. }) => {
                assert_eq!(kind, ChannelKind::Voice);
                assert_eq!(name, "lounge");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
