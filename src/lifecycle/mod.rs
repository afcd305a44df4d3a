//! Process lifecycle: coordinated shutdown.

pub mod shutdown;

pub use shutdown::Shutdown;
