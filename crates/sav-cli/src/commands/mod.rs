pub mod common;
pub mod config;
pub mod pool;
pub mod vgroup;
pub mod voter;
pub mod withdraw;
