//! Cloud path references: `<scheme>://<bucket>[/<path>]`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TreeError};

/// Storage scheme tag carried by every [`RemotePath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Azure,
    S3,
    Gs,
    Local,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Azure => "azure",
            Scheme::S3 => "s3",
            Scheme::Gs => "gs",
            Scheme::Local => "file",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = TreeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(Scheme::Azure),
            "s3" => Ok(Scheme::S3),
            "gs" => Ok(Scheme::Gs),
            "file" | "local" => Ok(Scheme::Local),
            other => Err(TreeError::InvalidPath(
                s.to_string(),
                format!("unknown scheme `{other}`"),
            )),
        }
    }
}

/// Immutable (scheme, bucket, path-within-bucket) triple.
///
/// The path component never starts with `/`. A trailing `/` is kept as-is:
/// it is how a listing gets scoped to the children of a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath {
    scheme: Scheme,
    bucket: String,
    path: String,
}

impl RemotePath {
    pub fn new(scheme: Scheme, bucket: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            scheme,
            bucket: bucket.into(),
            path: path.trim_start_matches('/').to_string(),
        }
    }

    /// Parse the textual form `<scheme>://<bucket>[/<path>]`.
    pub fn parse(url: &str) -> Result<Self> {
        let (scheme, rest) = url.split_once("://").ok_or_else(|| {
            TreeError::InvalidPath(url.to_string(), "expected `<scheme>://`".to_string())
        })?;
        let scheme: Scheme = scheme.parse().map_err(|_| {
            TreeError::InvalidPath(url.to_string(), format!("unknown scheme `{scheme}`"))
        })?;
        let (bucket, path) = match rest.split_once('/') {
            Some((bucket, path)) => (bucket, path),
            None => (rest, ""),
        };
        Ok(Self::new(scheme, bucket, path))
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Append a path component, posix style.
    ///
    /// `join("")` adds a trailing separator to a non-root path and leaves the
    /// root untouched.
    pub fn join(&self, name: &str) -> Self {
        let name = name.trim_start_matches('/');
        let path = if self.path.is_empty() {
            name.to_string()
        } else if self.path.ends_with('/') {
            format!("{}{}", self.path, name)
        } else {
            format!("{}/{}", self.path, name)
        };
        Self {
            scheme: self.scheme,
            bucket: self.bucket.clone(),
            path,
        }
    }

    /// Same scheme and bucket, different path.
    pub fn replace_path(&self, path: impl Into<String>) -> Self {
        Self::new(self.scheme, self.bucket.clone(), path)
    }

    /// Last path component, ignoring a trailing separator.
    pub fn name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// True when a component is `.` or `..`, which URL-based stores cannot
    /// address without collapsing it.
    pub fn has_dot_segment(&self) -> bool {
        self.path.split('/').any(|part| matches!(part, "." | ".."))
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.bucket)?;
        if !self.path.is_empty() {
            write!(f, "/{}", self.path)?;
        }
        Ok(())
    }
}

impl FromStr for RemotePath {
    type Err = TreeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}
