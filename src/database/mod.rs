/// Connection management and backend selection
pub mod connection;
/// Poll, vote and delivery rows
pub mod models;
