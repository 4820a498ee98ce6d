pub mod output;
pub mod pipeline;
pub mod stream;

pub use output::SharedResolution;
pub use pipeline::FramePipeline;
pub use stream::{SessionEnd, SessionSummary, StreamServer};
