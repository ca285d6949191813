use std::str::FromStr;

use edu_core::protocol::FormRequest;
use edu_core::protocol::HttpMethod;
use edu_core::protocol::NotificationKind;
use strum::IntoEnumIterator;
use strum_macros::AsRefStr;
use strum_macros::EnumIter;
use strum_macros::EnumString;
use strum_macros::IntoStaticStr;

/// Label of the submit control for forms posted from the command line.
pub const SUBMIT_LABEL: &str = "Submit";

/// Commands that can be invoked by starting the input with a leading slash.
/// Anything else typed into the input is a search query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    // DO NOT ALPHA-SORT! Enum order is presentation order in the help line.
    Submit,
    Notify,
    Dismiss,
    Theme,
    Overlay,
    Login,
    Logout,
    Quit,
}

impl SlashCommand {
    /// User-visible description shown in the help line.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Submit => "submit a form: /submit <action> [METHOD] [key=value...]",
            SlashCommand::Notify => "show a notification: /notify <kind> <message>",
            SlashCommand::Dismiss => "dismiss the newest notification",
            SlashCommand::Theme => "switch between light and dark",
            SlashCommand::Overlay => "toggle the loading overlay: /overlay [message]",
            SlashCommand::Login => "start a session: /login <user> [token]",
            SlashCommand::Logout => "end the session",
            SlashCommand::Quit => "exit",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }

    pub fn requires_arguments(self) -> bool {
        matches!(
            self,
            SlashCommand::Submit | SlashCommand::Notify | SlashCommand::Login
        )
    }
}

/// Return all built-in commands in a Vec paired with their command string.
pub fn built_in_slash_commands() -> Vec<(&'static str, SlashCommand)> {
    SlashCommand::iter().map(|c| (c.command(), c)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessedCommand {
    /// A slash command and its raw argument string.
    Command(SlashCommand, String),
    /// Not a slash command: a search query.
    NotCommand(String),
    Error(String),
}

/// Classify a line entered in the input.
pub fn process_slash_command_message(message: &str) -> ProcessedCommand {
    let trimmed = message.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ProcessedCommand::NotCommand(message.to_string());
    };

    let (command_str, args) = match rest.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim().to_string()),
        None => (rest, String::new()),
    };

    match command_str.parse::<SlashCommand>() {
        Ok(command) if args.is_empty() && command.requires_arguments() => {
            ProcessedCommand::Error(format!("Usage: {}", command.description()))
        }
        Ok(command) => ProcessedCommand::Command(command, args),
        Err(_) => ProcessedCommand::Error(format!("Unknown command /{command_str}")),
    }
}

/// `<kind> <message>`; an unknown kind is part of the message and shows as info.
pub fn parse_notify_args(args: &str) -> (NotificationKind, String) {
    if let Some((first, rest)) = args.split_once(char::is_whitespace) {
        if let Ok(kind) = NotificationKind::from_str(first) {
            return (kind, rest.trim().to_string());
        }
    }
    (NotificationKind::Info, args.to_string())
}

/// `<action> [METHOD] [key=value...]`.
pub fn parse_submit_args(args: &str) -> Result<FormRequest, String> {
    let mut words = args.split_whitespace().peekable();
    let action = words
        .next()
        .ok_or_else(|| SlashCommand::Submit.description().to_string())?;

    let mut method = HttpMethod::default();
    if let Some(word) = words.peek() {
        if !word.contains('=') {
            method = HttpMethod::from_str(word).map_err(|_| format!("Unknown method {word}"))?;
            words.next();
        }
    }

    let mut fields = Vec::new();
    for word in words {
        let (key, value) = word
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got {word}"))?;
        fields.push((key.to_string(), value.to_string()));
    }

    Ok(FormRequest {
        action: Some(action.to_string()),
        method,
        fields,
        submit_label: SUBMIT_LABEL.to_string(),
    })
}
