//! Library side of the `healthviz` command-line tool.
//!
//! The binary only parses arguments and dispatches; formatting, table
//! rendering, the session script driver and logging setup live here so they
//! can be tested.

pub mod format;
pub mod logging;
pub mod script;
pub mod summary;
