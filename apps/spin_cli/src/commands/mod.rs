// apps/spin_cli/src/commands/mod.rs

//! CLI 子命令

pub mod list;
pub mod run;
pub mod validate;
