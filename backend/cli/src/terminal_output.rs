//! Terminal output: colored notes and a download progress bar.

use addonforge_core::{InstallState, InstallStatus};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

const BAR_WIDTH: usize = 24;

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// `[#########---------------]  37%`
pub fn progress_bar(percent: u8) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

/// One line describing where an install is.
pub fn status_line(state: &InstallState) -> String {
    match state.status {
        InstallStatus::Downloading => {
            format!("{} downloading {}", state.addon_id, progress_bar(state.download_progress))
        }
        InstallStatus::Error => match state.error {
            Some(code) => format!("{} error ({:?})", state.addon_id, code),
            None => format!("{} error", state.addon_id),
        },
        status => format!("{} {}", state.addon_id, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addonforge_core::InstallErrorCode;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0), format!("[{}]   0%", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(250), progress_bar(100));
    }

    #[test]
    fn test_status_line() {
        let mut state = InstallState::new("ext-1");
        state.status = InstallStatus::Installed;
        assert_eq!(status_line(&state), "ext-1 installed");

        state.status = InstallStatus::Error;
        state.error = Some(InstallErrorCode::DownloadFailed);
        assert_eq!(status_line(&state), "ext-1 error (DownloadFailed)");
    }
}
