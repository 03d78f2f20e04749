//! CLI Events Command
//!
//! Lists the event types subscribed on every install, in registration order.

use addonforge_config::AddonForgeConfig;
use addonforge_core::InstallEventKind;

use crate::terminal_output::{supports_color, DIM, RESET};

pub fn run(config: &AddonForgeConfig) {
    let types = config.event_types();
    println!("\nSubscribed install events ({}):\n", types.len());
    for (i, event_type) in types.iter().enumerate() {
        let note = match event_type.parse::<InstallEventKind>() {
            Ok(kind) if kind.is_terminal() => "terminal",
            Ok(_) => "",
            Err(_) => "unrecognized",
        };
        if note.is_empty() {
            println!("  {:>2}. {event_type}", i + 1);
        } else if supports_color() {
            println!("  {:>2}. {event_type} {DIM}({note}){RESET}", i + 1);
        } else {
            println!("  {:>2}. {event_type} ({note})", i + 1);
        }
    }
    println!();
}
