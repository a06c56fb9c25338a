//! Event loop driving a `SimulationMachine`
//!
//! One task owns the machine and is the only writer of the session state.
//! It waits on three sources (display commands, debounce deliveries and
//! scoring completions), applies each event through the machine, and then
//! publishes a fresh snapshot for readers.

use super::debounce::Fired;
use super::machine::{SimulationInbox, SimulationMachine};
use super::sequencer::Completion;
use super::state::SimulationState;
use crate::profile;
use crate::record::{EditValue, ObservationRecord};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

/// Snapshot shared with the display layer (read-only by convention)
pub type SharedSnapshot = Arc<RwLock<SimulationState>>;

/// Message sent from the display layer to the simulation task
#[derive(Debug, Clone)]
pub enum SimulationCommand {
    Edit { attribute: String, value: EditValue },
    Reset,
    Shutdown,
}

enum LoopEvent {
    Command(Option<SimulationCommand>),
    Fired(Fired<ObservationRecord>),
    Completed(Completion),
}

/// Background task applying commands, debounce deliveries and completions
///
/// Runs until a `Shutdown` command arrives or every command sender is dropped,
/// then tears the machine down and returns it.
pub async fn simulation_task(
    mut machine: SimulationMachine,
    mut inbox: SimulationInbox,
    mut commands: mpsc::Receiver<SimulationCommand>,
    snapshot: SharedSnapshot,
) -> SimulationMachine {
    log::info!("Simulation task started");
    machine.start();
    publish(&machine, &snapshot).await;

    loop {
        let event = tokio::select! {
            command = commands.recv() => LoopEvent::Command(command),
            Some(fired) = inbox.fired.recv() => LoopEvent::Fired(fired),
            Some(completion) = inbox.completions.recv() => LoopEvent::Completed(completion),
        };

        match event {
            LoopEvent::Command(Some(SimulationCommand::Edit { attribute, value })) => {
                machine.edit(&attribute, value);
            }
            LoopEvent::Command(Some(SimulationCommand::Reset)) => {
                machine.reset(profile::default_profile());
                machine.start();
            }
            LoopEvent::Command(Some(SimulationCommand::Shutdown)) | LoopEvent::Command(None) => {
                log::info!("Simulation task received shutdown signal");
                break;
            }
            LoopEvent::Fired(fired) => machine.on_debounce_fired(fired),
            LoopEvent::Completed(completion) => {
                machine.on_completion(completion);
            }
        }

        publish(&machine, &snapshot).await;
    }

    machine.teardown();
    log::info!("Simulation task stopped");
    machine
}

async fn publish(machine: &SimulationMachine, snapshot: &SharedSnapshot) {
    let mut guard = snapshot.write().await;
    if *guard != *machine.state() {
        *guard = machine.state().clone();
    }
}

/// Display-side handle to a running simulation task
#[derive(Clone)]
pub struct SimulationHandle {
    tx: mpsc::Sender<SimulationCommand>,
    snapshot: SharedSnapshot,
}

impl SimulationHandle {
    /// Spawn `simulation_task` for `machine` and return a handle plus its join handle
    pub fn spawn(
        machine: SimulationMachine,
        inbox: SimulationInbox,
        channel_buffer: usize,
    ) -> (Self, JoinHandle<SimulationMachine>) {
        let (tx, rx) = mpsc::channel(channel_buffer);
        let snapshot = Arc::new(RwLock::new(machine.state().clone()));

        let task_snapshot = snapshot.clone();
        let join = tokio::spawn(async move { simulation_task(machine, inbox, rx, task_snapshot).await });

        (Self { tx, snapshot }, join)
    }

    pub async fn edit(&self, attribute: &str, value: EditValue) {
        self.send(SimulationCommand::Edit {
            attribute: attribute.to_string(),
            value,
        })
        .await;
    }

    pub async fn reset(&self) {
        self.send(SimulationCommand::Reset).await;
    }

    pub async fn shutdown(&self) {
        self.send(SimulationCommand::Shutdown).await;
    }

    /// Latest published state
    pub async fn snapshot(&self) -> SimulationState {
        self.snapshot.read().await.clone()
    }

    pub fn shared_snapshot(&self) -> SharedSnapshot {
        self.snapshot.clone()
    }

    async fn send(&self, command: SimulationCommand) {
        if let Err(e) = self.tx.send(command).await {
            log::warn!("Failed to send command to simulation task: {}", e);
        }
    }
}
