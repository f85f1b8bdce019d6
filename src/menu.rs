// src/menu.rs

//! Interactive mode menu.

use std::io::{self, BufRead, Write};

use tokio::sync::oneshot;
use tracing::debug;

use crate::config::LaunchConfig;
use crate::engine::Interrupt;
use crate::errors::Result;

pub fn print_header() {
    println!("{}", "=".repeat(60));
    println!("stackrun: application launcher");
    println!("{}", "=".repeat(60));
    println!();
}

pub fn print_menu(config: &LaunchConfig) {
    println!("Select a launch mode:");
    println!();
    println!("1. Web mode (recommended)");
    println!("   - Web server at {}", config.backend_url);
    println!("   - Frontend at {} (started separately)", config.frontend_url);
    println!();
    println!("2. Console mode");
    println!("   - Command-line interface");
    println!();
    println!("3. Recompile and run");
    println!("   - Clean and rebuild the whole project");
    println!();
    println!("4. Full (backend + frontend)");
    println!("   - Starts backend and frontend together");
    println!();
}

pub fn print_goodbye() {
    println!();
    println!("Goodbye!");
}

/// Ask the operator for a mode token.
///
/// Returns `None` when stdin is closed or the operator interrupts. Stdin is
/// read on a detached thread so a pending read never holds up shutdown.
pub async fn prompt_mode(interrupt: &mut Interrupt) -> Result<Option<String>> {
    print!("Enter your option (1-4) or press Enter for web mode: ");
    io::stdout().flush()?;

    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line).map(|n| (n, line));
        let _ = tx.send(read);
    });

    tokio::select! {
        read = rx => match read {
            Ok(Ok((0, _))) => {
                debug!("stdin closed at prompt");
                Ok(None)
            }
            Ok(Ok((_, line))) => Ok(Some(line.trim().to_string())),
            Ok(Err(e)) => Err(e.into()),
            // Reader thread went away without answering.
            Err(_) => Ok(None),
        },
        () = interrupt.interrupted() => Ok(None),
    }
}
