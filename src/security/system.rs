use crate::error::ServerResult;
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Shell, file and log access.
///
/// Each function uses its string argument exactly as given: `run_command`
/// hands it to `sh -c`, `read_file` opens it as a path and `write_log`
/// appends it to the log.
pub struct SystemHelper;

impl SystemHelper {
    /// Runs `cmd` through `sh -c` and returns its stdout. A non-zero exit
    /// status is not an error; failing to spawn the shell is.
    pub fn run_command(cmd: &str) -> ServerResult<String> {
        debug!("running shell command: {}", cmd);
        let output = Command::new("sh").arg("-c").arg(cmd).output()?;
        if !output.status.success() {
            debug!("shell command exited with {}", output.status);
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn ping_host(hostname: &str) -> ServerResult<String> {
        Self::run_command(&format!("ping -c 1 {}", hostname))
    }

    pub fn read_file<P: AsRef<Path>>(path: P) -> ServerResult<String> {
        Ok(fs::read_to_string(path)?)
    }

    /// Appends `message` and a newline, creating the file if needed.
    pub fn write_log<P: AsRef<Path>>(path: P, message: &str) -> ServerResult<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        assert_eq!(SystemHelper::run_command("echo hello").unwrap(), "hello\n");
    }

    #[test]
    fn nonzero_exit_still_returns_output() {
        assert_eq!(SystemHelper::run_command("echo out; exit 3").unwrap(), "out\n");
    }

    #[test]
    fn command_string_is_interpreted_by_the_shell() {
        let out = SystemHelper::run_command(&format!("echo {}", "a; echo b")).unwrap();
        assert_eq!(out, "a\nb\n");
    }

    #[test]
    fn ping_host_argument_reaches_the_shell() {
        let out = SystemHelper::ping_host("; echo injected").unwrap();
        assert!(out.contains("injected"));
    }

    #[test]
    fn read_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        fs::write(&path, "quarterly").unwrap();

        assert_eq!(SystemHelper::read_file(&path).unwrap(), "quarterly");
        assert!(SystemHelper::read_file(dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn write_log_appends_lines_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        SystemHelper::write_log(&path, "login ok").unwrap();
        SystemHelper::write_log(&path, "user=x\nFAKE admin login").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "login ok\nuser=x\nFAKE admin login\n");
    }
}
