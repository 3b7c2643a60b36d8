mod capabilities;
mod filter;
mod reader;
mod record;

pub use capabilities::Capabilities;
pub use filter::{FilterError, SkipFilter};
pub use reader::{ReadStats, Snapshot, SnapshotError, SnapshotReader};
pub use record::{
    FileRecord, HASH_PLACEHOLDER, NANOSECOND_PRECISION_WIDTH, Precision, SECOND_PRECISION_WIDTH,
    truncate_timestamp,
};
