//! Door State Machine
//!
//! This example walks a door through open, close and lock, with a listener
//! printing every move.
//!
//! Key concepts:
//! - Declarative wiring with the builder
//! - Synchronous listeners
//! - Advisory terminal states
//! - Recoverable invalid transitions
//!
//! Run with: RUST_LOG=labelwalk=debug cargo run --example door

use labelwalk::core::Named;
use labelwalk::machine::{ListenerError, StateMachine, StateMachineListener};
use labelwalk::StateMachineBuilder;
use std::sync::Arc;

struct Printer;

impl StateMachineListener for Printer {
    fn state_changed(&self, machine: &StateMachine) -> Result<(), ListenerError> {
        if let Ok(state) = machine.current_state() {
            println!("  -> {}", state.name());
        }
        Ok(())
    }

    fn terminal_state(&self, machine: &StateMachine) -> Result<(), ListenerError> {
        println!("  {} reached a terminal state", machine.name());
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("labelwalk=info".parse()?),
        )
        .init();

    println!("=== Door State Machine ===\n");

    let mut door = StateMachineBuilder::new("door")
        .states(["Open", "Closed", "Locked"])
        .transition("Closed", "open", "Open")
        .transition("Open", "close", "Closed")
        .transition("Closed", "lock", "Locked")
        .transition("Locked", "unlock", "Closed")
        .terminal("Locked")
        .start("Closed")
        .listener(Arc::new(Printer))
        .build()?;

    println!("Start: {}", door.current_state()?);
    let available: Vec<&str> = door
        .available_transitions()
        .into_iter()
        .map(|t| t.name())
        .collect();
    println!("Available: {}\n", available.join(", "));

    for label in ["open", "close", "lock"] {
        println!("{label}:");
        door.transition_named(label)?;
    }

    println!("\nopen (while locked):");
    if let Err(err) = door.transition_named("open") {
        println!("  rejected: {err}");
    }
    println!("  still {}", door.current_state()?);

    println!("\nunlock (terminal states are advisory):");
    door.transition_named("unlock")?;

    println!("\nVisited {} states", door.history().get_path().len());
    println!("\n=== Example Complete ===");
    Ok(())
}
