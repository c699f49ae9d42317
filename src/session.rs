//! Per-surface session identity with an explicit lifecycle.

use once_cell::unsync::OnceCell;
use uuid::Uuid;

/// Stable session identifier for one conversation surface.
///
/// Created lazily on first read, carried on every request, and cleared only
/// by an explicit reset. Passed into the controller rather than living in a
/// process-wide global.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    id: OnceCell<String>,
}

impl SessionIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously issued identifier.
    #[must_use]
    pub fn restore(id: impl Into<String>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(id.into());
        Self { id: cell }
    }

    /// The identifier, minted on first use.
    pub fn id(&self) -> &str {
        self.id.get_or_init(|| Uuid::new_v4().to_string())
    }

    /// Discard the identifier; the next read mints a fresh one.
    pub fn reset(&mut self) {
        self.id = OnceCell::new();
    }
}

#[cfg(test)]
mod tests {
    use super::SessionIdentity;

    #[test]
    fn identity_is_stable_until_reset() {
        let mut session = SessionIdentity::new();
        let first = session.id().to_string();
        assert_eq!(session.id(), first);

        session.reset();
        assert_ne!(session.id(), first);
    }

    #[test]
    fn restore_keeps_the_given_identifier() {
        let session = SessionIdentity::restore("surface-1");
        assert_eq!(session.id(), "surface-1");
    }
}
