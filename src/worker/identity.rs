//! Worker identity stamped on every response.

use std::fmt;
use std::sync::Arc;

/// Name identifying this bridge process. Immutable and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerIdentity(Arc<str>);

impl WorkerIdentity {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Use `configured` when present, otherwise the host name.
    pub fn resolve(configured: Option<&str>) -> std::io::Result<Self> {
        match configured {
            Some(name) if !name.is_empty() => Ok(Self::new(name)),
            _ => {
                let host = hostname::get()?;
                Ok(Self::new(host.to_string_lossy()))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_name_wins() {
        let identity = WorkerIdentity::resolve(Some("bridge-7")).unwrap();
        assert_eq!(identity.as_str(), "bridge-7");
        assert_eq!(identity.to_string(), "bridge-7");
    }

    #[test]
    fn falls_back_to_host_name() {
        let identity = WorkerIdentity::resolve(None).unwrap();
        assert!(!identity.as_str().is_empty());
        assert_eq!(WorkerIdentity::resolve(Some("")).unwrap(), identity);
    }
}
