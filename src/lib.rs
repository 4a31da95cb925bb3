pub(crate) mod parser;
pub mod diff;
pub mod encoder;
pub mod feed;
pub mod reader;
pub mod types;

pub use diff::{DiffPair, DiffValue, DiffView, FieldKey, PositionMatchingPairs};
pub use encoder::VcfEncoder;
pub use feed::MultiSourceFeed;
pub use reader::VcfRecords;
