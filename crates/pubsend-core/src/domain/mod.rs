//! Domain model (topic paths, message batches, outcomes, errors).

pub mod errors;
pub mod ids;
pub mod message;
pub mod report;
pub mod topic;

pub use self::errors::{ErrorKind, PublishError};
pub use self::ids::ServerId;
pub use self::message::MessageBatch;
pub use self::report::PublishReport;
pub use self::topic::TopicPath;
