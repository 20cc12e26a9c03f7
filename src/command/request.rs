// src/command/request.rs

use std::path::PathBuf;

/// Separator ending the transport ("out-of-band") options of an argv.
pub const OUT_OF_BAND_SEPARATOR: &str = "--";

/// One unit of work an uplink can perform against its node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    /// Run a command line on the node.
    Exec { args: Vec<String> },
    /// Copy a local file to `remote`, overwriting it.
    SyncTo { local: PathBuf, remote: String },
    /// Copy the contents of the remote directory `remote` into `local`.
    SyncFrom { remote: String, local: PathBuf },
}

impl CommandRequest {
    /// The command line as the caller expressed it.
    ///
    /// This is what error messages report, independent of how a particular
    /// uplink ends up running the request.
    pub fn command_line(&self) -> Vec<String> {
        match self {
            CommandRequest::Exec { args } => args.clone(),
            CommandRequest::SyncTo { local, remote } => vec![
                "syncTo".to_string(),
                local.display().to_string(),
                remote.clone(),
            ],
            CommandRequest::SyncFrom { remote, local } => vec![
                "syncFrom".to_string(),
                remote.clone(),
                local.display().to_string(),
            ],
        }
    }
}

/// Split `args` into transport options and the remote command line.
///
/// A leading run of `-`-prefixed tokens terminated by `--` (e.g.
/// `["-n", "--", "nohup", ...]`) is treated as options for the transport;
/// anything else is entirely remote command.
pub fn split_out_of_band(args: &[String]) -> (&[String], &[String]) {
    let separator = args.iter().position(|a| a == OUT_OF_BAND_SEPARATOR);
    match separator {
        Some(pos) if args[..pos].iter().all(|a| a.starts_with('-')) => {
            (&args[..pos], &args[pos + 1..])
        }
        _ => (&[], args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn leading_options_before_separator_are_out_of_band() {
        let args = argv(&["-n", "--", "nohup", "x", "&"]);
        let (oob, rest) = split_out_of_band(&args);
        assert_eq!(oob, &argv(&["-n"])[..]);
        assert_eq!(rest, &argv(&["nohup", "x", "&"])[..]);
    }

    #[test]
    fn separator_after_a_plain_word_belongs_to_the_command() {
        let args = argv(&["echo", "--", "hi"]);
        let (oob, rest) = split_out_of_band(&args);
        assert!(oob.is_empty());
        assert_eq!(rest, &args[..]);
    }

    #[test]
    fn sync_requests_describe_themselves() {
        let req = CommandRequest::SyncTo {
            local: PathBuf::from("/tmp/a.conf"),
            remote: "/mnt/a.conf".to_string(),
        };
        assert_eq!(req.command_line(), argv(&["syncTo", "/tmp/a.conf", "/mnt/a.conf"]));
    }
}
