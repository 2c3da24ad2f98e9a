//! Per-connection protocol driver.
//!
//! A session runs the login dialog and then the game over one stream.
//! Every phase sends a framed response, then blocks on the next non-blank
//! line; nothing is pipelined.

use crate::auth::{AuthState, Login};
use crate::game::{Game, GuessResult, MYSTERY_WORD};
use crate::protocol::{read_non_empty_line, Response};
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// How a phase (or the whole session) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Phase finished; move on to the next one
    Continue,
    /// Login attempts used up
    Exhausted,
    /// Client closed the stream
    Closed,
    /// Mystery word guessed
    Won,
}

/// One client connection and everything that lives as long as it does.
pub struct Session<S> {
    stream: BufReader<S>,
    response: Response,
    login: Login,
    closed: bool,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Session {
            stream: BufReader::new(stream),
            response: Response::new(),
            login: Login::new(),
            closed: false,
        }
    }

    /// Run the login dialog, then the game if login succeeded.
    ///
    /// Returns `Err` only for transport failures. The caller is expected to
    /// [`close`](Session::close) the session afterwards either way.
    pub async fn run(&mut self) -> io::Result<Outcome> {
        match self.authenticate().await? {
            Outcome::Continue => self.play(MYSTERY_WORD).await,
            outcome => Ok(outcome),
        }
    }

    async fn authenticate(&mut self) -> io::Result<Outcome> {
        loop {
            let state = self.login.state();
            self.response.lines(state.message());
            self.response.send(&mut self.stream).await?;

            match state {
                AuthState::Authenticated => {
                    info!("User authenticated");
                    return Ok(Outcome::Continue);
                }
                AuthState::Exhausted => {
                    warn!(attempts = self.login.attempts(), "Too many failed login attempts");
                    return Ok(Outcome::Exhausted);
                }
                _ => {}
            }

            let Some(input) = read_non_empty_line(&mut self.stream).await? else {
                return Ok(Outcome::Closed);
            };

            if state.is_password() {
                debug!(length = input.chars().count(), "Password received");
            } else {
                debug!(username = %input, length = input.chars().count(), "Username received");
            }

            self.login.submit(&input);
        }
    }

    async fn play(&mut self, word: &str) -> io::Result<Outcome> {
        let mut game = Game::new(word);

        loop {
            let Some(input) = read_non_empty_line(&mut self.stream).await? else {
                return Ok(Outcome::Closed);
            };
            debug!(guess = %input, length = input.chars().count(), "Guess received");

            let result = game.guess(&input);
            debug!(turns = game.turns(), ?result, "Guess scored");
            result.render(&mut self.response);
            self.response.send(&mut self.stream).await?;

            if let GuessResult::Won { turns } = result {
                info!(turns, "Mystery word guessed");
                return Ok(Outcome::Won);
            }
        }
    }

    /// Shut down the write side of the stream.
    ///
    /// Safe to call more than once; only the first call touches the stream.
    /// Failures are logged, not returned.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.stream.shutdown().await {
            error!(error = %e, "Error during disconnect");
        }
    }
}
