//! Persist, reconcile and restore tmux session topologies.

pub mod actions;
pub mod boot;
pub mod config;
pub mod daemon;
pub mod error;
pub mod handlers;
pub mod picker;
pub mod runner;
pub mod session;
pub mod tmux;
