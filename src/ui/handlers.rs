//! Console command handlers
//!
//! Local commands act on the session directly; remote commands go through
//! `CommandSession::send`, which rejects them while not connected.

use crate::session::Role;
use crate::ui::input::{Command, QuickCommand};
use crate::ui::state::App;

/// Parse a role argument, logging the reason on failure
fn parse_role(app: &mut App, raw: &str) -> Option<Role> {
    match raw.parse::<Role>() {
        Ok(role) => Some(role),
        Err(e) => {
            app.log(format!("Error: {}", e));
            None
        }
    }
}

/// Route a parsed command
pub fn execute_command(app: &mut App, cmd: Command) {
    match cmd {
        Command::None => {}
        Command::Quit => {
            app.log("Exiting...");
            app.quit();
        }
        Command::Help => app.show_help(),
        Command::Connect(role) => {
            let role = match role {
                Some(raw) => match parse_role(app, &raw) {
                    Some(role) => role,
                    None => return,
                },
                None => app.session.role().clone(),
            };
            app.session.connect(role);
            app.scroll_to_end();
        }
        Command::Disconnect => app.session.disconnect(),
        Command::Role(raw) => {
            if let Some(role) = parse_role(app, &raw) {
                app.session.on_role_changed(role);
            }
        }
        Command::Send(text) => {
            app.session.send(&text);
            app.scroll_to_end();
        }
    }
}

/// Send a quick command
pub fn execute_quick(app: &mut App, quick: QuickCommand) {
    app.session.send(quick.command());
    app.scroll_to_end();
}
