use rand::Rng;
use sweephint_core::{GameStatus, SuggestionPlanner, VisibleGrid};

use crate::*;

/// Client side view of a remote game, fed with parsed responses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteSession {
    grid: Option<VisibleGrid>,
    status: GameStatus,
}

impl Default for RemoteSession {
    fn default() -> Self {
        Self {
            grid: None,
            status: GameStatus::Playing,
        }
    }
}

impl RemoteSession {
    pub fn grid(&self) -> Option<&VisibleGrid> {
        self.grid.as_ref()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Error responses leave the session untouched.
    pub fn apply(&mut self, response: &Response) {
        if let ResponseStatus::Error(message) = &response.status {
            log::warn!("{} failed: {message}", response.verb);
            return;
        }

        if response.verb == Verb::New {
            *self = Self::default();
        }
        if let Some(grid) = &response.grid {
            self.grid = Some(grid.clone());
        }
        if response.verb == Verb::Open {
            self.status = response.status.game_status();
        }
    }

    /// Next request to send, `None` once the game is over or no move is left.
    pub fn next_command<R: Rng>(
        &self,
        planner: &SuggestionPlanner,
        rng: &mut R,
    ) -> Option<Command> {
        if self.status.is_finished() {
            return None;
        }
        let Some(grid) = &self.grid else {
            return Some(Command::Map);
        };

        let (col, row) = planner.plan(grid).next_move(rng)?;
        log::debug!("opening ({col}, {row})");
        Some(Command::Open { col, row })
    }
}
