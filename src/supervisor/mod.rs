// Tue Jan 20 2026 - Alex

//! The overlord: worker registry, round state machine and resurrection.

pub mod control;
pub mod error;
pub mod events;
pub mod overlord;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use control::{OsProcessControl, ProcessControl, WorkerExit};
pub use error::SupervisorError;
pub use events::{EventSource, SignalEvents, Wakeup};
pub use overlord::{Overlord, OverlordPhase};
pub use registry::{Liveness, RecordedPhase, ShutdownReport, WorkerDescriptor, WorkerRegistry};

use crate::config::Config;
use crate::signal::{self, SignalSet, INBOX};
use log::info;

/// Installs the overlord's handlers, spawns one worker per pattern and runs
/// rounds until a terminate notification arrives.
pub fn start(config: &Config) -> Result<ShutdownReport, SupervisorError> {
    signal::install_overlord_handlers()?;
    signal::block(&SignalSet::supervisor())?;
    INBOX.reset();

    let mut control = OsProcessControl::new(config.root.clone());
    let registry = WorkerRegistry::spawn_all(config.patterns.clone(), &mut control);
    info!(
        "overlord: supervising {} workers, round interval {}s",
        registry.len(),
        config.interval_secs
    );

    Overlord::new(registry, control, SignalEvents::new(), config.interval())
        .with_verbosity(config.verbosity)
        .run()
}
