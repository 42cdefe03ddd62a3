//! Idempotent post-installation setup for a Linux desktop.
//!
//! Optional components (CLI tools, a boot theme, a shell prompt, keyboard
//! remapping, window-manager configuration, an auto-tiling helper, an SSH key
//! and an alternate kernel) are installed, probed and uninstalled through one
//! framework: every change is preceded by a state check, and every
//! overwritten file is backed up so uninstall can restore it.
//!
//! The public API is organised into four layers:
//!
//! - **[`resources`]**: idempotent `check + apply + remove` primitives (files, packages, services, ...)
//! - **[`backup`]**: timestamped backups taken before destructive writes
//! - **[`components`]**: the ordered registry of selectable components wired to resources
//! - **[`commands`]**: validation, preflight checks and the install/uninstall/status runs
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod backup;
pub mod cli;
pub mod commands;
pub mod components;
pub mod config;
pub mod environment;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod preflight;
pub mod resources;
pub mod system;
