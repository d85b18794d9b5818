//! Feedback for state changes
//!
//! Toasts are printed to the terminal. XP awards ring the terminal bell and,
//! when enabled, raise a desktop notification.

use std::io::{self, Write};

use colored::*;
use notify_rust::Notification;
use todoquest_core::{Award, Notifier};

pub struct TerminalNotifier {
    desktop: bool,
    use_color: bool,
}

impl TerminalNotifier {
    pub fn new(desktop: bool, use_color: bool) -> Self {
        Self { desktop, use_color }
    }
}

impl Notifier for TerminalNotifier {
    fn xp_awarded(&self, award: &Award) {
        // Audible cue
        print!("\x07");
        if let Err(e) = io::stdout().flush() {
            tracing::debug!(error = %e, "failed to flush stdout");
        }

        for achievement in &award.newly_unlocked {
            let line = format!("Achievement unlocked: {}", achievement.title());
            if self.use_color {
                println!("{}", line.yellow().bold());
            } else {
                println!("{}", line);
            }
        }

        if !self.desktop {
            return;
        }
        if let Err(e) = Notification::new()
            .summary("Todo Quest")
            .body(&award.message())
            .appname("todoquest")
            .show()
        {
            tracing::debug!(error = %e, "desktop notification failed");
        }
    }

    fn toast(&self, message: &str) {
        if self.use_color {
            println!("{}", message.cyan());
        } else {
            println!("{}", message);
        }
    }
}
