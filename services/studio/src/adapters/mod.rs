pub mod clipboard;
pub mod file_sink;
pub mod file_store;
pub mod memory_store;
pub mod qr_encoder;

pub use clipboard::SystemClipboard;
pub use file_sink::DirectoryFileSink;
pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
pub use qr_encoder::QrCodeEncoder;
