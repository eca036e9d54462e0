//! I/O module
//!
//! Handles the replay tool's inputs and output.
//!
//! # Components
//!
//! - `script` - CSV replay script reader with iterator interface
//! - `members` - JSON member file loading
//! - `report` - JSON-lines invocation reports

pub mod members;
pub mod report;
pub mod script;

pub use members::{load_members, parse_members};
pub use report::{write_report, EventReport, InvocationReport};
pub use script::{ScriptReader, ScriptRow};
