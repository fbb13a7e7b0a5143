// Observability: logging and user facing progress

pub mod logging;
pub mod reporter;

pub use logging::init_logging;
pub use reporter::ConsoleReporter;
