use std::process::Command;
use std::str::from_utf8;

const GIT_COMMAND: &str = "git";
const GIT_ARGS: [&str; 3] = ["log", "-1", "--format=%h %as"];

const DEFAULT_HASH: &str = "0000000";
const DEFAULT_DATE: &str = "0000-00-00";

fn main() {
    let (hash, date) = git_version().unwrap_or_else(|| {
        (DEFAULT_HASH.to_string(), DEFAULT_DATE.to_string())
    });
    println!("cargo:rustc-env=BUILD_HASH={hash}");
    println!("cargo:rustc-env=BUILD_DATE={date}");
    println!("cargo:rerun-if-changed=.git/HEAD");
}

/// Returns the abbreviated hash and date of the most recent commit, or `None` if git
/// is unavailable or the working directory is not a repository.
fn git_version() -> Option<(String, String)> {
    let command = format!("{GIT_COMMAND} {}", GIT_ARGS.join(" "));
    match Command::new(GIT_COMMAND).args(GIT_ARGS).output() {
        Ok(out) if out.status.success() => match from_utf8(&out.stdout) {
            Ok(s) => s
                .trim()
                .split_once(' ')
                .map(|(hash, date)| (hash.to_string(), date.to_string())),
            Err(e) => {
                eprintln!("[{command}]: error parsing UTF-8 output: {e}");
                None
            }
        },
        Ok(out) => {
            eprintln!("[{command}]: {}", out.status);
            None
        }
        Err(e) => {
            eprintln!("[{command}]: {e}");
            None
        }
    }
}
