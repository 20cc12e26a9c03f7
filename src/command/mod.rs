// src/command/mod.rs

//! Remote command execution substrate.
//!
//! - [`request`] describes what to do on a node (run argv, sync a file).
//! - [`uplink`] is the transport seam plus the builder/executable pair
//!   call sites use (`node.command().args(..).must_run()`).
//! - [`result`] holds [`CommandResultError`] and shell-quoted display.
//! - [`process`] spawns local processes and logs their output.
//! - [`local`] and [`ssh`] are the concrete uplinks.
//! - [`retry`] provides bounded polling (`wait_for`).
//! - [`lifecycle`] kills and probes daemon processes by class name.

pub mod lifecycle;
pub mod local;
pub mod process;
pub mod request;
pub mod result;
pub mod retry;
pub mod ssh;
pub mod uplink;

pub use lifecycle::{
    check_java_process_status_args, get_java_process_status, kill_java_process,
};
pub use local::LocalUplink;
pub use request::CommandRequest;
pub use result::{join_args, CommandResultError};
pub use retry::wait_for;
pub use ssh::SshUplink;
pub use uplink::{CommandBuilder, RemoteCommand, Uplink};
