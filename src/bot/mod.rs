/// Bot command definitions and per-command handlers
pub mod commands;
/// Update dispatch tree, creation wizard, vote recording
pub mod handlers;
