//! Console input parsing
//!
//! INPUT ROUTING:
//! A) LOCAL: input starts with "/"
//!    - Handled by the console, never sent to the gateway
//!    - /connect [role], /disconnect, /role <role>, /help, /quit
//!
//! B) REMOTE: everything else
//!    - Sent verbatim (trimmed) as a raw command frame
//!    - The gateway's own vocabulary: status, help, users, clear, start <svc>, ...
//!
//! EXIT: /quit, /q, /exit work from any connection state. Ctrl+C exits immediately.

use std::time::Duration;

/// Parsed console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    None,
    Quit,                    // /quit, /q, /exit
    Help,                    // /help, /h
    Connect(Option<String>), // /connect [role]
    Disconnect,              // /disconnect, /dc
    Role(String),            // /role <role>
    Send(String),            // Default: remote command
}

/// Parse one line of console input
///
/// # Examples
/// ```
/// use chatops_console::ui::input::{parse_command, Command};
///
/// assert_eq!(parse_command("/quit"), Command::Quit);
/// assert_eq!(parse_command("/connect manager"), Command::Connect(Some("manager".to_string())));
/// assert_eq!(parse_command("status"), Command::Send("status".to_string()));
/// assert_eq!(parse_command("   "), Command::None);
/// ```
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::None;
    }

    if !input.starts_with('/') {
        return Command::Send(input.to_string());
    }

    let rest = &input[1..];
    if rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t') {
        return Command::None;
    }

    let parts: Vec<&str> = rest.splitn(2, |c: char| c == ' ' || c == '\t').collect();
    let arg = parts.get(1).map(|a| a.trim()).filter(|a| !a.is_empty());

    match parts[0] {
        "quit" | "q" | "exit" => match arg {
            None => Command::Quit,
            Some(_) => Command::None,
        },
        "help" | "h" => Command::Help,
        "connect" | "c" => Command::Connect(arg.map(str::to_string)),
        "disconnect" | "dc" => Command::Disconnect,
        "role" => match arg {
            Some(role) => Command::Role(role.to_string()),
            None => Command::None,
        },
        _ => Command::None,
    }
}

/// One-key gateway commands (the dashboard's quick-command buttons)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickCommand {
    Status,
    Help,
    Users,
    Clear,
}

impl QuickCommand {
    pub const ALL: [QuickCommand; 4] = [
        QuickCommand::Status,
        QuickCommand::Help,
        QuickCommand::Users,
        QuickCommand::Clear,
    ];

    /// Command text sent to the gateway
    pub fn command(&self) -> &'static str {
        match self {
            QuickCommand::Status => "status",
            QuickCommand::Help => "help",
            QuickCommand::Users => "users",
            QuickCommand::Clear => "clear",
        }
    }

    /// Function key bound to this command
    pub fn function_key(&self) -> u8 {
        match self {
            QuickCommand::Status => 2,
            QuickCommand::Help => 3,
            QuickCommand::Users => 4,
            QuickCommand::Clear => 5,
        }
    }

    pub fn from_function_key(n: u8) -> Option<QuickCommand> {
        QuickCommand::ALL.into_iter().find(|q| q.function_key() == n)
    }
}

/// Render help text shown in the transcript on /help
pub fn render_help(reconnect_delay: Duration) -> String {
    let mut help = format!(
        r#"ChatOps Console

CONSOLE COMMANDS (start with "/"):
    /connect [role]     Open the command channel (optionally as <role>)
    /disconnect         Close the command channel
    /role <role>        Switch role (reconnects after {:?} if connected)
    /help               Show this help message
    /quit, /q, /exit    Quit

GATEWAY COMMANDS (anything else is sent as typed):
    status, help, users, clear, start <svc>, stop <svc>, ...

KEYS:
    Up/Down, PageUp/PageDown, Home/End   Scroll transcript
    Esc                                  Clear input
    Ctrl+C                               Exit immediately
"#,
        reconnect_delay
    );
    for quick in QuickCommand::ALL {
        help.push_str(&format!(
            "    F{}                                   Send '{}'\n",
            quick.function_key(),
            quick.command()
        ));
    }
    help
}
