//! IPC surface: protocol types and the Unix socket server

mod protocol;
mod server;

pub use protocol::{DaemonStatus, Notification, RecentFile, Request, Response};
pub use server::Server;
