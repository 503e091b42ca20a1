pub mod gorilla;

mod chunk;

pub use chunk::MemChunk;
