use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Environment variable overriding the base directory artifacts are looked up in.
pub const HOME_ENV: &str = "EMOTION_CLASSIFIER_HOME";

/// File name of the artifact inside the models directory.
pub const DEFAULT_ARTIFACT_NAME: &str = "emotion_detection.json";

/// Extension of the sidecar file holding an artifact's expected SHA-256 digest.
pub const SIDECAR_EXTENSION: &str = "sha256";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Invalid SHA-256 digest '{0}'")]
    InvalidDigest(String),
    #[error("Hash mismatch: expected {expected}, got {actual} for {path}")]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

/// Locates classifier artifacts on disk and verifies their integrity.
///
/// Artifacts are produced by an external training process; this type never writes them.
#[derive(Debug, Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
}

impl ModelManager {
    /// Creates a new ModelManager rooted at the default models directory
    pub fn new_default() -> Self {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(HOME_ENV) {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("emotion-classifier").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir
                .join(".local")
                .join("share")
                .join("emotion-classifier")
                .join("models");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("emotion-classifier").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> Self {
        Self {
            models_dir: models_dir.as_ref().to_path_buf(),
        }
    }

    pub fn get_artifact_path(&self) -> PathBuf {
        self.models_dir.join(DEFAULT_ARTIFACT_NAME)
    }

    /// Picks the artifact to load: an explicit path wins over the managed location.
    pub fn resolve(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => self.get_artifact_path(),
        }
    }

    /// Path of the `<artifact>.sha256` sidecar for `artifact`.
    pub fn sidecar_path(artifact: &Path) -> PathBuf {
        let mut name = artifact.as_os_str().to_os_string();
        name.push(".");
        name.push(SIDECAR_EXTENSION);
        PathBuf::from(name)
    }

    /// Reads the expected digest from the artifact's sidecar, if one exists.
    ///
    /// Accepts either a bare hex digest or a `sha256sum` line (`<hex>  <file name>`).
    pub fn read_sidecar_digest(artifact: &Path) -> Result<Option<String>, ModelError> {
        let sidecar = Self::sidecar_path(artifact);
        if !sidecar.exists() {
            return Ok(None);
        }
        log::debug!("Reading expected digest from {:?}", sidecar);
        let contents = fs::read_to_string(&sidecar)?;
        let digest = contents.split_whitespace().next().unwrap_or_default();
        Self::normalize_digest(digest).map(Some)
    }

    /// Lowercases a hex digest and checks it is a well-formed SHA-256.
    pub fn normalize_digest(digest: &str) -> Result<String, ModelError> {
        let digest = digest.trim().to_ascii_lowercase();
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ModelError::InvalidDigest(digest));
        }
        Ok(digest)
    }

    pub fn digest(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Checks `bytes` against `expected`, failing with `HashMismatch` on disagreement.
    pub fn verify_bytes(path: &Path, bytes: &[u8], expected: &str) -> Result<(), ModelError> {
        let expected = Self::normalize_digest(expected)?;
        let actual = Self::digest(bytes);
        log::debug!("Calculated hash: {}", actual);
        log::debug!("Expected hash:   {}", expected);
        if actual != expected {
            log::warn!("Artifact {:?} failed checksum verification", path);
            return Err(ModelError::HashMismatch {
                path: path.display().to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_models_dir() {
        // Test with environment variable
        env::set_var(HOME_ENV, "/tmp/test-emotion-home");
        let path = ModelManager::get_default_models_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-emotion-home/models"));
        env::remove_var(HOME_ENV);

        // Test without environment variable
        let path = ModelManager::get_default_models_dir();
        assert!(path.ends_with("emotion-classifier/models"));
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let manager = ModelManager::new("/opt/models");
        assert_eq!(
            manager.resolve(None),
            PathBuf::from("/opt/models/emotion_detection.json")
        );
        assert_eq!(
            manager.resolve(Some(Path::new("custom.json"))),
            PathBuf::from("custom.json")
        );
    }

    #[test]
    fn test_sidecar_path() {
        let sidecar = ModelManager::sidecar_path(Path::new("/models/emotion_detection.json"));
        assert_eq!(sidecar, PathBuf::from("/models/emotion_detection.json.sha256"));
    }

    #[test]
    fn test_digest_known_value() {
        assert_eq!(
            ModelManager::digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sidecar_digest() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = ModelManager::new(dir.path()).get_artifact_path();
        fs::write(&path, b"abc")?;
        assert_eq!(ModelManager::read_sidecar_digest(&path)?, None);

        // sha256sum format, uppercase digest
        fs::write(
            ModelManager::sidecar_path(&path),
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD  emotion_detection.json\n",
        )?;
        let expected = ModelManager::read_sidecar_digest(&path)?.unwrap();
        assert_eq!(expected, ModelManager::digest(b"abc"));
        ModelManager::verify_bytes(&path, b"abc", &expected)?;

        assert!(matches!(
            ModelManager::verify_bytes(&path, b"corrupted data", &expected),
            Err(ModelError::HashMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_digest() {
        assert!(matches!(
            ModelManager::normalize_digest("not-a-digest"),
            Err(ModelError::InvalidDigest(_))
        ));
    }
}
