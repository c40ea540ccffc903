/// Correlation state for one multi-turn conversation.
///
/// The identifier is only ever assigned by the backend through a `session`
/// event. Every call takes the session by `&mut`, so two in-flight queries
/// can never read and write the same conversation at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Forget the current conversation; the next query starts a new one
    pub fn clear(&mut self) {
        self.id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert_eq!(Session::new().get(), None);
    }

    #[test]
    fn set_overwrites_and_clear_resets() {
        let mut session = Session::new();
        session.set("abc123");
        assert_eq!(session.get(), Some("abc123"));

        session.set("def456");
        assert_eq!(session.get(), Some("def456"));

        session.clear();
        assert_eq!(session.get(), None);
    }
}
