pub mod export;
pub mod history;
pub mod pipeline;
pub mod studio;

pub use export::Exporter;
pub use history::{HistoryCache, HISTORY_CAPACITY, HISTORY_KEY};
pub use pipeline::EncodingPipeline;
pub use studio::{Studio, StudioState};
