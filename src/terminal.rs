use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use catalog::Confirm;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Shared line reader over stdin.
///
/// The browse session and the confirmation prompt both read from it, so
/// buffered input is never split between two readers.
pub struct Terminal {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Terminal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        })
    }

    /// Prints `prompt` and waits for one line. `None` on end of input.
    pub async fn read_line(&self, prompt: &str) -> Option<String> {
        {
            let mut out = std::io::stdout();
            let _ = write!(out, "{}", prompt);
            let _ = out.flush();
        }

        match self.lines.lock().await.next_line().await {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read from stdin: {}", e);
                None
            }
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

/// Confirmation prompt for terminal sessions.
///
/// Asks `[s/N]` on the terminal, where anything but a yes declines, or
/// answers yes on its own when the user passed `--yes`.
pub struct TerminalConfirm {
    terminal: Option<Arc<Terminal>>,
}

impl TerminalConfirm {
    pub fn ask(terminal: Arc<Terminal>) -> Self {
        Self {
            terminal: Some(terminal),
        }
    }

    pub fn assume_yes() -> Self {
        Self { terminal: None }
    }
}

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, message: &str) -> bool {
        let Some(terminal) = &self.terminal else {
            println!("{} [s/N] s", message);
            return true;
        };

        let answer = terminal.read_line(&format!("{} [s/N] ", message)).await;
        let accepted = answer.as_deref().is_some_and(is_affirmative);
        debug!("Confirmation '{}' answered: {}", message, accepted);
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_assume_yes_never_reads() {
        assert!(TerminalConfirm::assume_yes().confirm("¿Eliminar?").await);
    }

    #[test]
    fn test_affirmative_answers() {
        for answer in ["s", "S", "si", "Sí", " yes ", "y"] {
            assert!(is_affirmative(answer), "{answer:?} should accept");
        }
        for answer in ["", "n", "no", "sip", "cancelar"] {
            assert!(!is_affirmative(answer), "{answer:?} should decline");
        }
    }
}
