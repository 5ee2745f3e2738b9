//! Local persistence of the signed-in user.
//!
//! The session is a small JSON file holding the [`AuthUser`]. A missing
//! file means signed out; an unreadable or corrupt file is logged and
//! also treated as signed out.

use std::path::{Path, PathBuf};

use hoopform_core::auth::{authenticate, AuthUser};
use hoopform_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] CoreError),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed store for the current [`AuthUser`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted user, if any.
    pub fn load(&self) -> Option<AuthUser> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cannot read session file");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                None
            }
        }
    }

    /// Persist `user`, creating parent directories as needed.
    pub fn save(&self, user: &AuthUser) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(user)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the persisted user. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check demo credentials and persist the resulting user.
    pub fn login(&self, username: &str, password: &str) -> Result<AuthUser, SessionError> {
        let user = authenticate(username, password)?;
        self.save(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use hoopform_core::auth::Role;

    use super::*;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested/session.json"));
        (dir, store)
    }

    #[test]
    fn empty_store_is_signed_out() {
        let (_dir, store) = store();
        assert!(store.load().is_none());
        assert!(store.clear().is_ok());
    }

    #[test]
    fn login_persists_user() {
        let (_dir, store) = store();
        let user = store.login("parent001", "123456").unwrap();
        assert_eq!(user.role, Role::Parent);
        assert_eq!(store.load(), Some(user));

        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn bad_credentials_do_not_persist() {
        let (_dir, store) = store();
        assert_matches!(
            store.login("parent001", "wrong"),
            Err(SessionError::Auth(CoreError::Unauthorized(_)))
        );
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_reads_as_signed_out() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), b"{\"id\": 7").unwrap();
        assert!(store.load().is_none());
    }
}
