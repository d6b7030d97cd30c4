//! Slash commands typed into the input line.

use std::path::PathBuf;

use pollroom_core::{ChannelId, MessageId};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/join <name>`
    Join {
        /// Channel name.
        channel_name: String,
    },
    /// `/create <name> [member,...]`
    Create {
        /// Channel name.
        name: String,
        /// Initial members.
        members: Vec<String>,
    },
    /// `/leave`: delete the active channel.
    Leave,
    /// `/switch <channel-id>`
    Switch {
        /// Channel to activate.
        channel_id: ChannelId,
    },
    /// `/rm <message-id>`
    Remove {
        /// Message to delete.
        message_id: MessageId,
    },
    /// `/image <path>`
    Image {
        /// File to attach.
        path: PathBuf,
    },
    /// `/voice <path>`
    Voice {
        /// File to attach.
        path: PathBuf,
    },
    /// `/watch <url>`
    Watch {
        /// Link to share.
        url: String,
    },
    /// `/meet <url>`
    Meet {
        /// Meeting URL.
        url: String,
    },
    /// `/open`: open the active meeting.
    Open,
    /// `/quit`
    Quit,
    /// Plain text to post.
    Message {
        /// Text as typed.
        text: String,
    },
    /// Unrecognized slash command.
    Unknown {
        /// Input as typed.
        input: String,
    },
    /// Recognized command with bad arguments.
    InvalidArgs {
        /// Command name without the slash.
        command: &'static str,
        /// What was wrong.
        error: String,
    },
}

/// Parse one input line. Anything not starting with `/` is a message.
pub fn parse(input: &str) -> Command {
    let Some(rest) = input.strip_prefix('/') else {
        return Command::Message { text: input.to_string() };
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let parsed = match name {
        "join" => required("join", args, "channel name").map(|channel_name| Command::Join { channel_name }),
        "create" => parse_create(args),
        "leave" => Ok(Command::Leave),
        "switch" => parse_id("switch", args).map(|channel_id| Command::Switch { channel_id }),
        "rm" => parse_id("rm", args).map(|message_id| Command::Remove { message_id }),
        "image" => {
            required("image", args, "file path").map(|path| Command::Image { path: path.into() })
        },
        "voice" => {
            required("voice", args, "file path").map(|path| Command::Voice { path: path.into() })
        },
        "watch" => required("watch", args, "url").map(|url| Command::Watch { url }),
        "meet" => required("meet", args, "url").map(|url| Command::Meet { url }),
        "open" => Ok(Command::Open),
        "quit" | "q" => Ok(Command::Quit),
        _ => Ok(Command::Unknown { input: input.to_string() }),
    };
    parsed.unwrap_or_else(|invalid| invalid)
}

fn parse_create(args: &str) -> Result<Command, Command> {
    let mut words = args.split(|c: char| c == ',' || c.is_whitespace()).filter(|w| !w.is_empty());
    let Some(name) = words.next() else {
        return Err(invalid("create", "missing channel name"));
    };
    Ok(Command::Create { name: name.to_string(), members: words.map(str::to_string).collect() })
}

fn required(command: &'static str, args: &str, what: &str) -> Result<String, Command> {
    if args.is_empty() {
        return Err(invalid(command, &format!("missing {what}")));
    }
    Ok(args.to_string())
}

fn parse_id(command: &'static str, args: &str) -> Result<u64, Command> {
    let raw = required(command, args, "id")?;
    raw.parse().map_err(|_| invalid(command, &format!("not a number: {raw}")))
}

fn invalid(command: &'static str, error: &str) -> Command {
    Command::InvalidArgs { command, error: error.to_string() }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn plain_text_is_message() {
        assert_eq!(parse("hello /join"), Command::Message { text: "hello /join".into() });
    }

    #[test]
    fn join_takes_rest_of_line() {
        assert_eq!(parse("/join  team chat "), Command::Join { channel_name: "team chat".into() });
    }

    #[test]
    fn create_with_members() {
        assert_eq!(parse("/create ops ana, bo"), Command::Create {
            name: "ops".into(),
            members: vec!["ana".into(), "bo".into()],
        });
    }

    #[test]
    fn missing_arguments() {
        assert!(matches!(parse("/join"), Command::InvalidArgs { command: "join", .. }));
        assert!(matches!(parse("/create"), Command::InvalidArgs { command: "create", .. }));
        assert!(matches!(parse("/meet "), Command::InvalidArgs { command: "meet", .. }));
    }

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(parse("/rm 42"), Command::Remove { message_id: 42 });
        assert!(matches!(parse("/switch abc"), Command::InvalidArgs { command: "switch", .. }));
    }

    #[test]
    fn attachments_keep_path() {
        assert_eq!(parse("/image /tmp/cat.png"), Command::Image {
            path: PathBuf::from("/tmp/cat.png")
        });
        assert_eq!(parse("/voice note.ogg"), Command::Voice { path: PathBuf::from("note.ogg") });
    }

    #[test]
    fn unknown_command() {
        assert_eq!(parse("/dance"), Command::Unknown { input: "/dance".into() });
    }

    proptest! {
        #[test]
        fn prop_non_slash_input_is_message(text in "[^/].*") {
            prop_assert_eq!(parse(&text), Command::Message { text: text.clone() });
        }
    }
}
