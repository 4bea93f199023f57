//! Line-oriented text protocol for playing a remote game.
//!
//! The client sends one [`Command`] per line (`new <level>`, `open <col> <row>`,
//! `map`). Every [`Response`] starts with a `<verb>: <message>` status line,
//! optionally followed by one text row per board row.

pub use client::*;
pub use command::*;
pub use error::*;
pub use response::*;
pub use server::*;

mod client;
mod command;
mod error;
mod response;
mod server;
