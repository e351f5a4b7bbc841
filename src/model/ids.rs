use serde::{Deserialize, Serialize};

const LOCAL_PREFIX: &str = "local-";
const SAMPLE_PREFIX: &str = "sample-";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DreamId(pub String);

impl DreamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for a dream synthesized on this device; never collides with
    /// server ids, which are decimal.
    pub fn local() -> Self {
        Self(format!("{}{}", LOCAL_PREFIX, random_hex()))
    }

    /// Id for bundled demo content. Samples are never kept alongside a
    /// server listing.
    pub fn sample() -> Self {
        Self(format!("{}{}", SAMPLE_PREFIX, random_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_PREFIX)
    }

    pub fn is_sample(&self) -> bool {
        self.0.starts_with(SAMPLE_PREFIX)
    }
}

impl std::fmt::Display for DreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DreamId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// 8 random bytes, hex-encoded.
pub(crate) fn random_hex() -> String {
    let mut bytes = [0u8; 8];
    if getrandom::getrandom(&mut bytes).is_err() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        bytes = nanos.to_be_bytes();
    }
    let mut out = String::with_capacity(16);
    for b in &bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
