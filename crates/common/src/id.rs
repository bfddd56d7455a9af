use crate::error::{Error, Result};
use faststr::FastStr;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{
    fmt,
    str::FromStr,
    sync::{
        LazyLock,
        atomic::{AtomicU32, Ordering},
    },
};

const ID_LEN: usize = 12;

// 5 bytes unique to this process, shared by every id it mints.
static PROCESS_UNIQUE: LazyLock<[u8; 5]> = LazyLock::new(|| {
    let mut bytes = [0u8; 5];
    rand::rng().fill_bytes(&mut bytes);
    bytes
});

static COUNTER: LazyLock<AtomicU32> = LazyLock::new(|| AtomicU32::new(rand::random()));

/// Server-assigned recipe identifier.
///
/// 12 bytes: big-endian unix seconds (4), process-unique random (5) and a
/// wrapping counter (3). Rendered as 24 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipeId([u8; ID_LEN]);

impl RecipeId {
    pub fn new() -> Self {
        let secs = chrono::Utc::now().timestamp() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn to_hex(&self) -> FastStr {
        hex::encode(self.0).into()
    }

    pub fn bytes(&self) -> [u8; ID_LEN] {
        self.0
    }
}

impl Default for RecipeId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RecipeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != ID_LEN * 2 {
            return Err(Error::InvalidIdLength(s.to_owned().into()));
        }
        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::InvalidIdHex(s.to_owned().into(), e))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecipeId({self})")
    }
}

impl Serialize for RecipeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecipeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = FastStr::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
