//! cadence - focus timer with work, short break and long break sessions
//!
//! The session timer lives in [`timer`]: a pure state machine
//! ([`timer::TimerMachine`]) driven by a one-second ticker
//! ([`timer::SessionTimer`]). The terminal UI and the IPC server both talk
//! to it through [`controller::Controller`], which also owns the focus task
//! queue from [`tasks`].

pub mod app;
pub mod config;
pub mod controller;
pub mod ipc;
pub mod logging;
pub mod notify;
pub mod tasks;
pub mod timer;
pub mod ui;
