//! External collaborators: package manager, service manager, bootloader.
//!
//! Each collaborator is a narrow trait so components can be exercised against
//! fakes; the production implementations shell out through an
//! [`Executor`](crate::exec::Executor).
pub mod bootloader;
pub mod packages;
pub mod services;
