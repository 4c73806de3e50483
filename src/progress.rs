use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

fn styled(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Yellow braille spinner with the current message.
pub fn spinner_style() -> ProgressStyle {
    styled("\x1b[33m{spinner}\x1b[0m {wide_msg}").tick_strings(TICKS)
}

pub fn ok_style() -> ProgressStyle {
    styled("\x1b[32m✔\x1b[0m {wide_msg}")
}

pub fn err_style() -> ProgressStyle {
    styled("\x1b[31m✘\x1b[0m {wide_msg}")
}

/// Start a ticking spinner showing `msg`.
pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Finish `pb` with a check mark on `Ok`, a cross and the error on `Err`.
pub fn finish<T>(pb: &ProgressBar, done: impl Into<String>, res: &anyhow::Result<T>) {
    match res {
        Ok(_) => {
            pb.set_style(ok_style());
            pb.finish_with_message(done.into());
        }
        Err(e) => {
            pb.set_style(err_style());
            pb.finish_with_message(format!("{:#}", e));
        }
    }
}
