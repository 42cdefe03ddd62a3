//! Idempotent resource primitives (check + apply + remove pattern).
pub mod boot_theme;
pub mod error;
pub mod file;
pub mod helpers;
pub mod line;
pub mod package;
pub mod service;
pub mod ssh_key;

use anyhow::Result;

use self::error::ResourceError;

/// State of a resource (file, package, service, etc.).
///
/// # Examples
///
/// ```
/// use postinstall_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let stale = ResourceState::Incorrect { current: "content differs".into() };
/// let skip = ResourceState::Invalid { reason: "source missing".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g. its source asset is missing).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying or removing a resource.
///
/// # Examples
///
/// ```
/// use postinstall_cli::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
/// let skipped = ResourceChange::Skipped { reason: "source missing".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created, updated, or removed.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Unified interface for resources that can be checked, applied, and removed.
///
/// # Examples
///
/// ```ignore
/// // All resources follow the same check-then-apply pattern:
/// let state = resource.current_state()?;
/// if resource.needs_change()? {
///     resource.apply()?;
/// }
/// ```
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Check the current state of the resource. Never mutates anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined due to I/O failures,
    /// permission issues, or other system errors.
    fn current_state(&self) -> Result<ResourceState>;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied.
    fn apply(&self) -> Result<ResourceChange>;

    /// Undo a previous [`apply`](Self::apply).
    ///
    /// Default implementation returns an error; override in resources that
    /// support removal.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be removed, or if removal is
    /// not supported for this resource type.
    fn remove(&self) -> Result<ResourceChange> {
        Err(ResourceError::UnsupportedOperation {
            operation: "remove".to_string(),
            resource: self.description(),
        }
        .into())
    }

    /// Whether uninstall may act on a resource found in `state`.
    ///
    /// Defaults to [`ResourceState::Correct`]. File targets override this to
    /// act whenever there is something to restore or delete.
    fn removable(&self, state: &ResourceState) -> bool {
        matches!(state, ResourceState::Correct)
    }

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

macro_rules! forward_resource {
    ($($wrapper:ty),+ $(,)?) => {
        $(
            impl<R: Resource + ?Sized> Resource for $wrapper {
                fn description(&self) -> String {
                    (**self).description()
                }

                fn current_state(&self) -> Result<ResourceState> {
                    (**self).current_state()
                }

                fn apply(&self) -> Result<ResourceChange> {
                    (**self).apply()
                }

                fn remove(&self) -> Result<ResourceChange> {
                    (**self).remove()
                }

                fn removable(&self, state: &ResourceState) -> bool {
                    (**self).removable(state)
                }
            }
        )+
    };
}

forward_resource!(&R, Box<R>);
