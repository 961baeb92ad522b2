pub mod apis;
pub mod assembler;
pub mod config;
pub mod error;
pub mod families;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod storage;
pub mod types;
