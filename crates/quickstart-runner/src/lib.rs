pub mod command;
pub mod probe;
pub mod progress;
pub mod sequencer;

pub use command::ProcessRunner;
pub use probe::EnvironmentProbe;
pub use progress::{NoopReporter, TerminalReporter};
pub use sequencer::{Step, StepSequencer};
