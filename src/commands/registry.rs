// src/commands/registry.rs

//! The closed command set.
//!
//! Dispatch walks [`COMMANDS`] in registration order and picks the first
//! entry whose token prefixes the message, so more specific tokens must be
//! registered ahead of shorter ones that share a prefix.

/// Every command the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Start,
    Stop,
    AddBlacklist,
    DelBlacklist,
    ListBlacklist,
    AddServer,
    DelServer,
    Status,
    SetWorld,
    SetInterval,
    SetSurgeThreshold,
    FuckYeah,
    Help,
}

/// One command's token, argument shape, and usage line.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub token: &'static str,
    pub takes_args: bool,
    pub usage: &'static str,
}

impl CommandSpec {
    /// Whether the message calls this command (prefix match).
    pub fn matches(&self, text: &str) -> bool {
        text.starts_with(self.token)
    }

    /// Whether the message asks for this command's help (`<token> /?`).
    pub fn is_help_request(&self, text: &str) -> bool {
        text.strip_prefix(self.token).is_some_and(|rest| rest == " /?")
    }

    /// Argument-shape check: with-args commands need `<token> <something>`,
    /// no-args commands need the bare token.
    pub fn is_valid(&self, text: &str) -> bool {
        if self.takes_args {
            text.strip_prefix(self.token)
                .is_some_and(|rest| rest.starts_with(' ') && rest.len() > 1)
        } else {
            text == self.token
        }
    }

    /// Everything after `<token> `. Callers check `is_valid` first.
    pub fn args<'a>(&self, text: &'a str) -> &'a str {
        &text[self.token.len() + 1..]
    }
}

/// All commands in registration order.
pub const COMMANDS: [CommandSpec; 13] = [
    CommandSpec {
        kind: CommandKind::Start,
        token: "/start",
        takes_args: false,
        usage: "/start : start the watch.",
    },
    CommandSpec {
        kind: CommandKind::Stop,
        token: "/stop",
        takes_args: false,
        usage: "/stop : stop the watch.",
    },
    CommandSpec {
        kind: CommandKind::AddBlacklist,
        token: "/add bl",
        takes_args: true,
        usage: "/add bl [player name] : add a player to the blacklist.",
    },
    CommandSpec {
        kind: CommandKind::DelBlacklist,
        token: "/dl bl",
        takes_args: true,
        usage: "/dl bl [player name] : remove a player from the blacklist.",
    },
    CommandSpec {
        kind: CommandKind::ListBlacklist,
        token: "/list bl",
        takes_args: false,
        usage: "/list bl : show the blacklist.",
    },
    CommandSpec {
        kind: CommandKind::AddServer,
        token: "/add server",
        takes_args: true,
        usage: "/add server [server name (A1-O15)] : create the report channel for a server.",
    },
    CommandSpec {
        kind: CommandKind::DelServer,
        token: "/del server",
        takes_args: true,
        usage: "/del server [server name (A1-O15)] : delete the report channel for a server.",
    },
    CommandSpec {
        kind: CommandKind::Status,
        token: "/status",
        takes_args: false,
        usage: "/status : show current settings and watch state.",
    },
    CommandSpec {
        kind: CommandKind::SetWorld,
        token: "/set world",
        takes_args: true,
        usage: "/set world [NA or EU] : set the watched world.",
    },
    CommandSpec {
        kind: CommandKind::SetInterval,
        token: "/set interval",
        takes_args: true,
        usage: "/set interval : set the polling interval in seconds.",
    },
    CommandSpec {
        kind: CommandKind::SetSurgeThreshold,
        token: "/set player_count",
        takes_args: true,
        usage: "/set player_count : set the population increase that triggers an alert.",
    },
    CommandSpec {
        kind: CommandKind::FuckYeah,
        token: "/fuck",
        takes_args: true,
        usage: "/fuck xxx : Fuck YEAH !!",
    },
    CommandSpec {
        kind: CommandKind::Help,
        token: "/?",
        takes_args: false,
        usage: "/? : show help. Type e.g. /start /? for one command's help.",
    },
];

/// First command whose token prefixes the message, if any.
pub fn find(text: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.matches(text))
}

/// The help command's own spec.
pub fn help_spec() -> &'static CommandSpec {
    COMMANDS
        .iter()
        .find(|spec| spec.kind == CommandKind::Help)
        .expect("help command is registered")
}

/// Global help: the help usage line first, then every other command's
/// usage line in registration order.
pub fn help_text() -> String {
    let mut lines = vec![help_spec().usage];
    lines.extend(
        COMMANDS
            .iter()
            .filter(|spec| spec.kind != CommandKind::Help)
            .map(|spec| spec.usage),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_picks_the_longest_registered_prefix() {
        assert_eq!(find("/status").unwrap().kind, CommandKind::Status);
        assert_eq!(find("/start").unwrap().kind, CommandKind::Start);
        assert_eq!(find("/add bl John").unwrap().kind, CommandKind::AddBlacklist);
        assert_eq!(find("/add server B7").unwrap().kind, CommandKind::AddServer);
        assert_eq!(find("/set world EU").unwrap().kind, CommandKind::SetWorld);
        assert_eq!(
            find("/set interval 60").unwrap().kind,
            CommandKind::SetInterval
        );
        assert_eq!(
            find("/set player_count 5").unwrap().kind,
            CommandKind::SetSurgeThreshold
        );
        assert_eq!(find("/?").unwrap().kind, CommandKind::Help);
        assert!(find("/xyz").is_none());
        assert!(find("status").is_none());
    }

    #[test]
    fn add_bl_prefix_swallows_similar_words() {
        // "/add blah" reaches the blacklist command and then fails its
        // argument-shape check.
        let spec = find("/add blah").unwrap();
        assert_eq!(spec.kind, CommandKind::AddBlacklist);
        assert!(!spec.is_valid("/add blah"));
    }

    #[test]
    fn args_shape_validation() {
        let spec = find("/add bl John").unwrap();
        assert!(spec.is_valid("/add bl John"));
        assert!(!spec.is_valid("/add bl"));
        assert!(!spec.is_valid("/add bl "));

        let status = find("/status").unwrap();
        assert!(status.is_valid("/status"));
        assert!(!status.is_valid("/status now"));
    }

    #[test]
    fn args_keep_everything_after_the_token() {
        let spec = find("/add bl John Smith").unwrap();
        assert_eq!(spec.args("/add bl John Smith"), "John Smith");

        let fuck = find("/fuck yeah").unwrap();
        assert_eq!(fuck.args("/fuck yeah"), "yeah");
    }

    #[test]
    fn per_command_help_detection() {
        let spec = find("/start /?").unwrap();
        assert_eq!(spec.kind, CommandKind::Start);
        assert!(spec.is_help_request("/start /?"));
        assert!(!spec.is_help_request("/start"));
        assert!(!spec.is_help_request("/start /? extra"));
    }

    #[test]
    fn help_text_lists_every_command_once() {
        let text = help_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), COMMANDS.len());
        assert!(lines[0].starts_with("/? :"));
        assert_eq!(lines[1], "/start : start the watch.");
        for spec in &COMMANDS {
            assert_eq!(lines.iter().filter(|l| **l == spec.usage).count(), 1);
        }
    }
}
