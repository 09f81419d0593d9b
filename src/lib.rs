pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod memory;
pub mod page_table;
pub mod translation;
pub mod vm_manager;

// Re-export commonly used items for convenience
pub use config::{SimConfig, VictimScan};
pub use error::{Result, SimError};
pub use memory::{EvictionPolicy, Frame, FrameStore};
pub use page_table::{PageTable, Pte};
pub use translation::{AddressDecoder, DecodedAddress, FrameNumber, PageNumber, VirtualAddress};
pub use vm_manager::{AccessResult, MemoryManager, Stats};
