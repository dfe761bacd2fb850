pub mod domain;
pub mod ports;

pub use domain::{
    ArtifactPair, Color, ColorParseError, Configuration, EncodeOptions, ErrorCorrectionLevel,
    HistoryEntry, LevelParseError, OutputFormat, RasterArtifact, VectorArtifact,
};
pub use ports::{ClipboardSink, EncodingService, FileSaveSink, KeyValueStore, PortError, PortResult};
