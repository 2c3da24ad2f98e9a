//! Login dialog for the fixed Wordnet account.
//!
//! Username and password are asked for in that order. Both share one
//! budget of failed attempts; the budget is never refunded, so a user who
//! spends four tries on the username gets one try at the password.

/// Account name accepted by the server (case-sensitive)
pub const USERNAME: &str = "Sammy";

/// Password for [`USERNAME`] (case-sensitive)
pub const PASSWORD: &str = "WOOF";

/// Failed attempts allowed across both prompts
pub const MAX_ATTEMPTS: u32 = 5;

/// Position in the login dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing sent yet; the greeting goes out with the first prompt
    AwaitingFirstUsername,
    /// Last username was wrong
    AwaitingUsername,
    /// Username accepted, password not asked for yet
    AwaitingFirstPassword,
    /// Last password was wrong
    AwaitingPassword,
    Authenticated,
    /// Attempt budget used up
    Exhausted,
}

impl AuthState {
    /// Lines the server sends on entering this state
    pub fn message(self) -> &'static [&'static str] {
        match self {
            AuthState::AwaitingFirstUsername => &["Welcome to Wordnet!", "Enter username:"],
            AuthState::AwaitingUsername => &["Username not recognised.", "Enter username:"],
            AuthState::AwaitingFirstPassword => &["Enter password:"],
            AuthState::AwaitingPassword => &["Password not recognised.", "Enter password:"],
            AuthState::Authenticated => &["Welcome Sammy!", "Guess the mystery six-letter word"],
            AuthState::Exhausted => &["Too many failed attempts. Goodbye!"],
        }
    }

    /// True while the dialog is asking for the password
    pub fn is_password(self) -> bool {
        matches!(
            self,
            AuthState::AwaitingFirstPassword | AuthState::AwaitingPassword
        )
    }
}

/// Login state for one connection.
#[derive(Debug)]
pub struct Login {
    state: AuthState,
    attempts: u32,
}

impl Login {
    pub fn new() -> Self {
        Login {
            state: AuthState::AwaitingFirstUsername,
            attempts: 0,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Failed attempts so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Apply one trimmed, non-empty line of client input.
    ///
    /// Input received after the dialog has finished is ignored.
    pub fn submit(&mut self, input: &str) -> AuthState {
        self.state = match self.state {
            AuthState::AwaitingFirstUsername | AuthState::AwaitingUsername => {
                if input == USERNAME {
                    AuthState::AwaitingFirstPassword
                } else {
                    self.fail(AuthState::AwaitingUsername)
                }
            }
            AuthState::AwaitingFirstPassword | AuthState::AwaitingPassword => {
                if input == PASSWORD {
                    AuthState::Authenticated
                } else {
                    self.fail(AuthState::AwaitingPassword)
                }
            }
            terminal => terminal,
        };
        self.state
    }

    /// Count a failed attempt and pick the retry state, unless the budget is spent
    fn fail(&mut self, retry: AuthState) -> AuthState {
        self.attempts += 1;
        if self.attempts >= MAX_ATTEMPTS {
            AuthState::Exhausted
        } else {
            retry
        }
    }
}

impl Default for Login {
    fn default() -> Self {
        Self::new()
    }
}
