//! Command implementations, one module per subcommand.

pub mod fetch;
pub mod sync;
pub mod topics;
