use crate::session::Session;
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where the single session record lives. The dashboard only ever keeps one
/// signed-in user, so the port is load/save/clear of one value.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<Session>>;
    fn save(&self, session: &Session) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// Single JSON file on disk, the local-store analog. A record that fails to
/// parse is discarded and treated as signed-out.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> anyhow::Result<Option<Session>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read session file {:?}", self.path))
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "discarding unparseable session record");
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        let raw = serde_json::to_string(session).context("serialize session failed")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("write session file {:?}", self.path))
    }

    fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove session file {:?}", self.path)),
        }
    }
}

/// Non-persistent backend for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    inner: Mutex<Option<Session>>,
}

impl SessionStorage for InMemorySessionStorage {
    fn load(&self) -> anyhow::Result<Option<Session>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("savvystock-session-{}.json", Uuid::new_v4()))
    }

    fn session() -> Session {
        Session {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            full_name: "a".to_string(),
        }
    }

    #[test]
    fn file_storage_roundtrip() {
        let storage = FileSessionStorage::new(temp_path());
        assert!(storage.load().unwrap().is_none());

        let s = session();
        storage.save(&s).unwrap();
        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.id, s.id);
        assert_eq!(loaded.email, "a@b.com");

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        storage.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_discarded() {
        let path = temp_path();
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert!(storage.load().unwrap().is_none());
        // The bad record is gone, not re-read on the next load.
        assert!(!path.exists());
    }

    #[test]
    fn in_memory_roundtrip() {
        let storage = InMemorySessionStorage::default();
        assert!(storage.load().unwrap().is_none());
        storage.save(&session()).unwrap();
        assert!(storage.load().unwrap().is_some());
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
