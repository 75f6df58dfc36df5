//! Entity key type identifying a light on a controller

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for invalid entity keys
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityKeyError {
    #[error("mac address cannot be empty")]
    EmptyMac,

    #[error("mac address must be 12 hexadecimal digits, optionally separated by ':'")]
    InvalidMac,

    #[error("segment id '{0}' is not a non-negative integer")]
    InvalidSegment(String),
}

/// Which light of a controller an entity controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightTarget {
    /// The virtual master light layering over all segments
    Main,
    /// A single segment
    Segment(u32),
}

/// Identifies a light entity: controller MAC address plus main/segment target
///
/// The string form doubles as the entity's unique id: `aabbccddeeff` for the
/// main light and `aabbccddeeff_3` for segment 3.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKey {
    mac: String,
    target: LightTarget,
}

impl EntityKey {
    /// Create a key for the main light of a controller
    pub fn main(mac: impl AsRef<str>) -> Result<Self, EntityKeyError> {
        Ok(Self {
            mac: normalize_mac(mac.as_ref())?,
            target: LightTarget::Main,
        })
    }

    /// Create a key for a segment of a controller
    pub fn segment(mac: impl AsRef<str>, segment_id: u32) -> Result<Self, EntityKeyError> {
        Ok(Self {
            mac: normalize_mac(mac.as_ref())?,
            target: LightTarget::Segment(segment_id),
        })
    }

    /// Normalized (lowercase, no separators) MAC address
    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn target(&self) -> LightTarget {
        self.target
    }

    /// Segment id, or None for the main light
    pub fn segment_id(&self) -> Option<u32> {
        match self.target {
            LightTarget::Main => None,
            LightTarget::Segment(id) => Some(id),
        }
    }
}

/// Lowercase a MAC address and strip ':' separators
///
/// WLED reports MACs without separators; user input often has them.
fn normalize_mac(mac: &str) -> Result<String, EntityKeyError> {
    if mac.is_empty() {
        return Err(EntityKeyError::EmptyMac);
    }
    let normalized: String = mac
        .chars()
        .filter(|c| *c != ':')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if normalized.len() != 12 || !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EntityKeyError::InvalidMac);
    }
    Ok(normalized)
}

impl FromStr for EntityKey {
    type Err = EntityKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('_') {
            None => Self::main(s),
            Some((mac, segment)) => {
                let segment_id = segment
                    .parse::<u32>()
                    .map_err(|_| EntityKeyError::InvalidSegment(segment.to_string()))?;
                Self::segment(mac, segment_id)
            }
        }
    }
}

impl TryFrom<String> for EntityKey {
    type Error = EntityKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityKey> for String {
    fn from(key: EntityKey) -> String {
        key.to_string()
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            LightTarget::Main => write!(f, "{}", self.mac),
            LightTarget::Segment(id) => write!(f, "{}_{}", self.mac, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_key() {
        let key = EntityKey::main("AA:BB:CC:DD:EE:FF").unwrap();
        assert_eq!(key.mac(), "aabbccddeeff");
        assert_eq!(key.target(), LightTarget::Main);
        assert_eq!(key.segment_id(), None);
        assert_eq!(key.to_string(), "aabbccddeeff");
    }

    #[test]
    fn test_segment_key() {
        let key = EntityKey::segment("aabbccddeeff", 3).unwrap();
        assert_eq!(key.segment_id(), Some(3));
        assert_eq!(key.to_string(), "aabbccddeeff_3");
    }

    #[test]
    fn test_parse_key() {
        let key: EntityKey = "aabbccddeeff_12".parse().unwrap();
        assert_eq!(key.target(), LightTarget::Segment(12));

        let key: EntityKey = "aabbccddeeff".parse().unwrap();
        assert_eq!(key.target(), LightTarget::Main);
    }

    #[test]
    fn test_invalid_mac() {
        assert_eq!("".parse::<EntityKey>().unwrap_err(), EntityKeyError::EmptyMac);
        assert_eq!(
            "aabbcc".parse::<EntityKey>().unwrap_err(),
            EntityKeyError::InvalidMac
        );
        assert_eq!(
            "zzbbccddeeff".parse::<EntityKey>().unwrap_err(),
            EntityKeyError::InvalidMac
        );
    }

    #[test]
    fn test_invalid_segment() {
        assert_eq!(
            "aabbccddeeff_main".parse::<EntityKey>().unwrap_err(),
            EntityKeyError::InvalidSegment("main".to_string())
        );
        assert_eq!(
            "aabbccddeeff_-1".parse::<EntityKey>().unwrap_err(),
            EntityKeyError::InvalidSegment("-1".to_string())
        );
    }

    #[test]
    fn test_same_segment_same_key() {
        let a = EntityKey::segment("AABBCCDDEEFF", 1).unwrap();
        let b = EntityKey::segment("aa:bb:cc:dd:ee:ff", 1).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, EntityKey::main("aabbccddeeff").unwrap());
    }

    #[test]
    fn test_serde_roundtrip() {
        let key = EntityKey::segment("aabbccddeeff", 0).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"aabbccddeeff_0\"");

        let parsed: EntityKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }
}
