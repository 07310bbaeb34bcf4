//! # GraphFlix client
//!
//! Command-line client for the GraphFlix movie platform. The interesting part
//! lives in [`auth`], the client-side session and two-factor state: login,
//! challenge countdown, credential persistence across runs, and bearer-token
//! injection on every outbound request. [`api`] is the thin HTTP surface over
//! the platform's auth endpoints; [`cli`] wires both to subcommands.

pub mod api;
pub mod auth;
pub mod cli;
