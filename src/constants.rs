pub const ADDRESS_BITS: u32 = 32;
pub const OFFSET_BITS: u32 = 12;
pub const FRAMES_IN_RAM: usize = 8;
pub const PAGES_IN_PROCESS: usize = 16;

pub const MAX_FRAMES: usize = 1 << 20;
pub const MAX_PAGES: usize = 1 << 20;

pub const COMMENT_MARKER: char = '#';
pub const PROMPT: &str = "> ";

// printed in dumps where no frame/page is mapped
pub const NO_SUCH_INDEX: u32 = 0xFFFFF;
