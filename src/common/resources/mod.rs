pub mod grid;
pub mod layout;
pub mod roster;
pub mod sprites;
pub mod turn;
pub mod visibility;

/// Who is playing on this client, and against whom once that is known.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Identity {
    pub username: String,
    pub opponent: Option<String>,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), opponent: None }
    }

    pub fn with_opponent(mut self, opponent: impl Into<String>) -> Self {
        self.opponent = Some(opponent.into());
        self
    }

    pub fn is_ally(&self, owner: &str) -> bool {
        self.username == owner
    }

    pub fn is_enemy(&self, owner: &str) -> bool {
        self.opponent.as_deref() == Some(owner)
    }
}
