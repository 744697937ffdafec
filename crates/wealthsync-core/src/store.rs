//! File-backed client store.
//!
//! One pretty-printed JSON document per client under `<root>/clients/`, and
//! net worth snapshots under `<root>/snapshots/<client-id>/`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{ClientProfile, CoreError, NetWorthSnapshot, StorageConfig};

#[derive(Debug, Clone)]
pub struct ClientStore {
    root: PathBuf,
}

/// Ids become file names, so keep them to a safe alphabet.
fn check_id(id: &str) -> Result<(), CoreError> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidId(id.to_string()))
    }
}

impl ClientStore {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::at(storage.resolved_data_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn clients_dir(&self) -> PathBuf {
        self.root.join("clients")
    }

    fn client_path(&self, id: &str) -> PathBuf {
        self.clients_dir().join(format!("{id}.json"))
    }

    fn snapshots_dir(&self, id: &str) -> PathBuf {
        self.root.join("snapshots").join(id)
    }

    /// All client ids, sorted.
    pub fn list_clients(&self) -> Result<Vec<String>, CoreError> {
        let dir = self.clients_dir();
        if !dir.exists() {
            return Ok(vec![]);
        }
        let mut ids: Vec<String> = fs::read_dir(&dir)
            .map_err(|e| CoreError::io(&dir, e))?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    return None;
                }
                name.strip_suffix(".json").map(|n| n.to_string())
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    pub fn read_client_raw(&self, id: &str) -> Result<String, CoreError> {
        check_id(id)?;
        let path = self.client_path(id);
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound {
                kind: "client",
                id: id.to_string(),
            },
            _ => CoreError::io(&path, e),
        })
    }

    pub fn read_client(&self, id: &str) -> Result<ClientProfile, CoreError> {
        let raw = self.read_client_raw(id)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write a client document from raw JSON.
    ///
    /// The JSON must describe a valid [`ClientProfile`] whose `id` matches.
    /// Writes go to a temp file that is then renamed over the target, so a
    /// reader never sees a half-written document.
    pub fn write_client_raw(&self, id: &str, data: &str) -> Result<(), CoreError> {
        check_id(id)?;
        let profile: ClientProfile = serde_json::from_str(data)?;
        if profile.id != id {
            return Err(CoreError::InvalidId(format!(
                "{id} (document id is '{}')",
                profile.id
            )));
        }
        let dir = self.clients_dir();
        fs::create_dir_all(&dir).map_err(|e| CoreError::io(&dir, e))?;
        let tmp = dir.join(format!(".{id}.json.tmp"));
        let path = self.client_path(id);
        fs::write(&tmp, data).map_err(|e| CoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| CoreError::io(&path, e))?;
        tracing::debug!(client = id, "client written");
        Ok(())
    }

    pub fn write_client(&self, profile: &ClientProfile) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(profile)?;
        self.write_client_raw(&profile.id, &json)
    }

    /// Delete a client and its snapshots. Missing clients are not an error.
    pub fn delete_client(&self, id: &str) -> Result<(), CoreError> {
        check_id(id)?;
        let path = self.client_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| CoreError::io(&path, e))?;
        }
        let snaps = self.snapshots_dir(id);
        if snaps.exists() {
            fs::remove_dir_all(&snaps).map_err(|e| CoreError::io(&snaps, e))?;
        }
        Ok(())
    }

    pub fn save_snapshot(&self, client_id: &str, snapshot: &NetWorthSnapshot) -> Result<(), CoreError> {
        check_id(client_id)?;
        check_id(&snapshot.id)?;
        let dir = self.snapshots_dir(client_id);
        fs::create_dir_all(&dir).map_err(|e| CoreError::io(&dir, e))?;
        let path = dir.join(format!("{}.json", snapshot.id));
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json).map_err(|e| CoreError::io(&path, e))
    }

    /// Most recent snapshots first, at most `count`.
    pub fn list_snapshots(&self, client_id: &str, count: usize) -> Result<Vec<NetWorthSnapshot>, CoreError> {
        check_id(client_id)?;
        let dir = self.snapshots_dir(client_id);
        if !dir.exists() {
            return Ok(vec![]);
        }
        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| CoreError::io(&dir, e))? {
            let path = entry.map_err(|e| CoreError::io(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
            match serde_json::from_str::<NetWorthSnapshot>(&raw) {
                Ok(snap) => snapshots.push(snap),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable snapshot"),
            }
        }
        snapshots.sort_by(|a, b| b.date.cmp(&a.date));
        snapshots.truncate(count);
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_rules() {
        assert!(check_id("client-42_a").is_ok());
        assert!(check_id("").is_err());
        assert!(check_id("../etc").is_err());
        assert!(check_id(".hidden").is_err());
        assert!(check_id("a/b").is_err());
    }
}
