pub mod decode;
pub mod device;
pub mod disasm;
pub mod machine;
pub mod memory;
pub mod stack;
