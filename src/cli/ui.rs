use colored::*;
use indicatif::{ ProgressBar, ProgressStyle };
use std::time::Duration;

use wfomc_sweep::{ ResultRecord, SweepError, SweepObserver };

/// Print a section header
pub fn print_header(title: &str) {
    let title = format!(" {} ", title);
    println!("\n{}\n", title.bold().white().on_blue());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "WARNING:".yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "SUCCESS:".green().bold(), message);
}

/// Print information
pub fn print_info(message: &str) {
    println!("{} {}", "INFO:".blue().bold(), message);
}

/// Print a formatted result
pub fn print_result(label: &str, value: &str) {
    println!("{}: {}", label.bold(), value);
}

pub fn spinner_with_message(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// One line per completed or failed unit on the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl SweepObserver for ConsoleObserver {
    fn on_completed(&self, property: &str, record: &ResultRecord) {
        println!(
            "{} {} n={} {} ({:.3}s)",
            "DONE".green().bold(),
            property.bold(),
            record.n,
            record.value,
            record.duration_secs
        );
    }

    fn on_failed(&self, property: &str, n: u64, error: &SweepError) {
        eprintln!("{} {} n={}: {}", "FAILED".red().bold(), property.bold(), n, error);
    }
}
