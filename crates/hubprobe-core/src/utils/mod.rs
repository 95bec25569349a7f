//! Small formatting and filename helpers shared by the analyzers.

pub mod format;
pub mod shard_filename;
