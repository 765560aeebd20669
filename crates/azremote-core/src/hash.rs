use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use md5::{Digest, Md5};
use tokio::io::AsyncReadExt;

use crate::error::{Result, TreeError};

/// Name of the only checksum cloud trees report.
pub const MD5: &str = "md5";

/// Content hash of a stored object: algorithm name plus lowercase hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashInfo {
    pub name: &'static str,
    pub value: String,
}

impl HashInfo {
    pub fn md5(hex_digest: impl Into<String>) -> Self {
        Self {
            name: MD5,
            value: hex_digest.into().to_lowercase(),
        }
    }

    /// Decode a `Content-MD5` property value (base64 of the raw digest,
    /// sometimes quoted). Returns `None` when the property is empty.
    pub fn from_content_md5(encoded: &str) -> Result<Option<Self>> {
        let trimmed = encoded.trim().trim_matches('"');
        if trimmed.is_empty() {
            return Ok(None);
        }
        let raw = BASE64
            .decode(trimmed)
            .map_err(|e| TreeError::InvalidHash(format!("`{trimmed}` is not base64: {e}")))?;
        Ok(Some(Self::md5(hex::encode(raw))))
    }

    /// MD5 of a local file, read in 1 MiB pieces.
    pub async fn md5_of_file(path: &Path) -> Result<Self> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut hasher = Md5::new();
        let mut buf = vec![0u8; 1024 * 1024];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self::md5(hex::encode(hasher.finalize())))
    }
}

impl fmt::Display for HashInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // md5("hello world")
    const HELLO_HEX: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
    const HELLO_B64: &str = "XrY7u+Ae7tCTyyK7j1rNww==";

    #[test]
    fn decodes_base64_content_md5() {
        let hash = HashInfo::from_content_md5(HELLO_B64).unwrap().unwrap();
        assert_eq!(hash.name, "md5");
        assert_eq!(hash.value, HELLO_HEX);
    }

    #[test]
    fn strips_quotes() {
        let quoted = format!("\"{HELLO_B64}\"");
        let hash = HashInfo::from_content_md5(&quoted).unwrap().unwrap();
        assert_eq!(hash.value, HELLO_HEX);
    }

    #[test]
    fn empty_property_is_absent() {
        assert!(HashInfo::from_content_md5("").unwrap().is_none());
        assert!(HashInfo::from_content_md5("\"\"").unwrap().is_none());
    }

    #[test]
    fn malformed_property_is_an_error() {
        assert!(HashInfo::from_content_md5("not base64!").is_err());
    }

    #[tokio::test]
    async fn md5_of_local_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hello.txt");
        std::fs::write(&path, b"hello world").unwrap();
        let hash = HashInfo::md5_of_file(&path).await.unwrap();
        assert_eq!(hash.value, HELLO_HEX);
    }
}
