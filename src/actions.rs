/// Prefix fzf echoes in front of an action token instead of a session name
pub const ACTION_PREFIX: &str = "tk_act_";

/// Actions that can be requested from the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a session for the current directory
    New,
    /// Delete the highlighted session (stored and live)
    Delete,
    /// Pick a directory through zoxide
    Interactive,
    /// Persist the merged session list now
    Save,
    /// Back out of zoxide into the switcher
    Return,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::New,
        Action::Delete,
        Action::Interactive,
        Action::Save,
        Action::Return,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::New => "new",
            Action::Delete => "delete",
            Action::Interactive => "interactive",
            Action::Save => "save",
            Action::Return => "return",
        }
    }

    /// Token printed by the fzf binding, e.g. `tk_act_new`
    pub fn token(self) -> String {
        format!("{}{}", ACTION_PREFIX, self.name())
    }

    pub fn from_token(token: &str) -> Option<Action> {
        let name = token.strip_prefix(ACTION_PREFIX)?;
        Action::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// What the user chose in the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Session(String),
    Action { action: Action, arg: String },
    /// A directory returned by zoxide
    Path(String),
    Cancelled,
}

impl Selection {
    /// Interpret one line of fzf output
    pub fn parse(output: &str) -> Selection {
        let line = output.trim();
        if line.is_empty() {
            return Selection::Cancelled;
        }
        if line.starts_with(ACTION_PREFIX) {
            let (token, arg) = line.split_once(':').unwrap_or((line, ""));
            if let Some(action) = Action::from_token(token) {
                return Selection::Action {
                    action,
                    arg: arg.to_string(),
                };
            }
        }
        Selection::Session(line.to_string())
    }
}
