//! API Module
//!
//! Structure:
//! - commands.rs: Tauri commands called by the webview
//! - engine_status.rs: status payload types

pub mod commands;
pub mod engine_status;
