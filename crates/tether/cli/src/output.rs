//! Output formatting utilities

use colored::*;
use tether_reconcile::Console;
use tether_types::ApiDescription;

/// Host console writing to the terminal
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn log(&self, message: &str) {
        println!("{} {}", "Tether:".yellow(), message);
    }

    fn print(&self, line: &str) {
        println!("{}", line);
    }

    fn print_websockets(&self, description: &ApiDescription) {
        println!("{}", "WebSockets:".yellow());
        println!("  {} {}", "Base URL:".yellow(), description.base_url);
        println!("{}", "  Routes:".yellow());
        for url in description.route_urls() {
            println!("    - {}", url);
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
