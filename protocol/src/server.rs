use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sweephint_core::{GameStatus, LayoutGenerator, PlayEngine, RandomLayoutGenerator};

use crate::*;

const NO_GAME_MESSAGE: &str = "No game in progress";

/// Answers protocol commands against a locally generated game.
///
/// Every `new` draws a fresh layout seed from the server's own generator, so a
/// whole session is reproducible from the seed given to [`ProtocolServer::new`].
#[derive(Clone, Debug)]
pub struct ProtocolServer {
    rng: SmallRng,
    engine: Option<PlayEngine>,
}

impl ProtocolServer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            engine: None,
        }
    }

    /// Current game, if `new` was received.
    pub fn engine(&self) -> Option<&PlayEngine> {
        self.engine.as_ref()
    }

    pub fn handle(&mut self, command: &Command) -> Response {
        let verb = command.verb();
        match *command {
            Command::New { level } => {
                let generator = RandomLayoutGenerator::new(self.rng.random());
                let layout = generator.generate(level.game_config());
                log::debug!(
                    "new level {level} game with {} mines",
                    layout.mine_count()
                );
                self.engine = Some(PlayEngine::new(layout));
                Response::new(verb, ResponseStatus::Ok)
            }
            Command::Open { col, row } => {
                let Some(engine) = &self.engine else {
                    return no_game(verb);
                };
                match engine.click((col, row)) {
                    Ok(next) => {
                        let status = match next.status() {
                            GameStatus::Playing => ResponseStatus::Ok,
                            GameStatus::Won => ResponseStatus::Win,
                            GameStatus::Lost => ResponseStatus::Lose,
                        };
                        let response =
                            Response::new(verb, status).with_grid(next.visible().clone());
                        self.engine = Some(next);
                        response
                    }
                    Err(err) => Response::new(verb, ResponseStatus::Error(err.to_string())),
                }
            }
            Command::Map => match &self.engine {
                Some(engine) => {
                    Response::new(verb, ResponseStatus::Empty).with_grid(engine.visible().clone())
                }
                None => no_game(verb),
            },
        }
    }

    /// Parses one command line and answers it.
    pub fn handle_line(&mut self, line: &str) -> Result<Response> {
        let command: Command = line.parse()?;
        log::trace!("received {command}");
        Ok(self.handle(&command))
    }
}

fn no_game(verb: Verb) -> Response {
    Response::new(verb, ResponseStatus::Error(NO_GAME_MESSAGE.to_owned()))
}
