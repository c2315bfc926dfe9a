//! Role-colored terminal echo of the conversation.
//!
//! Mirrors the runner's log stream on stderr with a human-readable rendering
//! of what is being said to and by the model: assistant text in green,
//! system/user context dimmed.

use console::style;

use crate::domain::models::{Role, Turn};

#[derive(Debug, Clone, Copy)]
pub struct Transcript {
    enabled: bool,
}

impl Transcript {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn turn(&self, turn: &Turn) {
        if !self.enabled {
            return;
        }
        let header = format!("[{}]", turn.role);
        match turn.role {
            Role::Assistant => {
                println!("{}\n{}", style(header).green().bold(), style(&turn.content).green());
            }
            Role::System | Role::User => {
                println!("{}\n{}", style(header).dim(), style(&turn.content).dim());
            }
        }
    }

    pub fn turns(&self, turns: &[Turn]) {
        for turn in turns {
            self.turn(turn);
        }
    }

    pub fn assistant(&self, content: &str) {
        self.turn(&Turn::assistant(content));
    }
}
