// src/command/result.rs

use thiserror::Error;

/// A command that was required to succeed returned non-zero.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} failed with error code {return_code}", join_args(.command_line))]
pub struct CommandResultError {
    command_line: Vec<String>,
    return_code: i32,
}

impl CommandResultError {
    pub fn new(command_line: Vec<String>, return_code: i32) -> Self {
        Self {
            command_line,
            return_code,
        }
    }

    pub fn command_line(&self) -> &[String] {
        &self.command_line
    }

    pub fn return_code(&self) -> i32 {
        self.return_code
    }
}

/// Join an argv for humans, shell-quoting anything that needs it so the
/// result can be pasted into a shell.
pub fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    shell_words::join(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_arguments_are_joined_with_spaces() {
        assert_eq!(join_args(&["sudo", "mkdir", "-p", "/mnt/x"]), "sudo mkdir -p /mnt/x");
    }

    #[test]
    fn arguments_with_whitespace_or_specials_are_quoted() {
        let joined = join_args(&["echo", "hello world", "it's"]);
        assert_eq!(shell_words::split(&joined).unwrap(), vec!["echo", "hello world", "it's"]);
        assert!(joined.contains("'hello world'"));
    }

    #[test]
    fn message_names_command_and_code() {
        let err = CommandResultError::new(vec!["ls".into(), "/no such".into()], 2);
        assert_eq!(err.to_string(), "ls '/no such' failed with error code 2");
        assert_eq!(err.return_code(), 2);
    }
}
