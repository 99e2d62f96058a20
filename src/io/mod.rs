pub mod dot_writer;
pub use dot_writer::DotWriter;

pub mod instance_json;
pub use instance_json::{InstanceDescription, InstanceJsonReader, InstanceJsonWriter};

pub mod report;
pub use report::*;
