//! Spoken announcements through an external speech command

use std::{process::Stdio, sync::Mutex};

use tokio::process::{Child, Command};
use tracing::debug;

/// Speaks text by running a command such as `spd-say` or `espeak` with the
/// text appended as the final argument.
///
/// Only one utterance plays at a time: starting a new one kills the previous
/// child if it is still running.
#[derive(Debug)]
pub struct Speech {
    program: String,
    args: Vec<String>,
    current: Mutex<Option<Child>>,
}

impl Speech {
    /// Build from a shell-like command line, e.g. `"espeak -v en-us"`
    pub fn from_command_line(command: &str) -> Result<Self, String> {
        let mut words = shlex::split(command)
            .ok_or_else(|| format!("Failed to parse speech command: {}", command))?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| "Speech command is empty".to_string())?;

        Ok(Self {
            program,
            args: words.collect(),
            current: Mutex::new(None),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Start speaking `text`, cutting off any utterance still in progress.
    /// Must be called from within a tokio runtime.
    pub fn speak(&self, text: &str) -> Result<(), String> {
        let mut current = self
            .current
            .lock()
            .map_err(|e| format!("Failed to lock speech slot: {}", e))?;

        if let Some(mut previous) = current.take() {
            if let Ok(None) = previous.try_wait() {
                debug!("Cancelling previous utterance");
                if let Err(e) = previous.start_kill() {
                    debug!("Previous utterance already gone: {}", e);
                }
            }
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("Failed to execute {}: {}", self.program, e))?;

        *current = Some(child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_command_line_into_program_and_args() {
        let speech = Speech::from_command_line("espeak -v 'en-us' -s 160").unwrap();
        assert_eq!(speech.program(), "espeak");
        assert_eq!(speech.args(), ["-v", "en-us", "-s", "160"]);
    }

    #[test]
    fn rejects_empty_and_unbalanced_commands() {
        assert!(Speech::from_command_line("   ").is_err());
        assert!(Speech::from_command_line("say 'unterminated").is_err());
    }

    #[tokio::test]
    async fn missing_program_is_reported_not_panicked() {
        let speech = Speech::from_command_line("hiit-timer-no-such-speech-binary").unwrap();
        let err = speech.speak("Start").unwrap_err();
        assert!(err.contains("hiit-timer-no-such-speech-binary"));
    }
}
