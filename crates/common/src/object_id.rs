//! CDMI object identifiers
//!
//! Every container, data object and capability object gets a 40 byte
//! identifier at creation time, rendered as 80 uppercase hex characters.
//! The layout follows CDMI 1.0.2 section 5.10:
//!
//! ```text
//! byte  0      reserved (0)
//! bytes 1..4   SNMP enterprise number, big-endian
//! byte  4      reserved (0)
//! byte  5      length of the whole id in bytes (40)
//! bytes 6..8   CRC-16 over the id with this field zeroed
//! bytes 8..40  opaque: 16 zero bytes followed by a v4 UUID
//! ```
//!
//! Ids are never reassigned. Moving a resource keeps its id, and deleting it
//! retires the id for good (see [`crate::namespace::ObjectIdIndex`]).

use std::fmt;
use std::str::FromStr;

use crc::{Crc, CRC_16_ARC};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Length of an object id in bytes
pub const OBJECT_ID_LEN: usize = 40;
/// Length of an object id rendered as hex
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;
/// Enterprise number found in ids issued by the reference deployment
pub const DEFAULT_ENTERPRISE_NUMBER: u32 = 0x0005_3F;

const MAX_ENTERPRISE_NUMBER: u32 = 0x00FF_FFFF;
const LENGTH_OFFSET: usize = 5;
const CRC_OFFSET: usize = 6;
const OPAQUE_OFFSET: usize = 8;

// CRC-16/ARC (poly 0x8005, reflected)
const ID_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_ARC);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ObjectIdError {
    #[error("object id must be {OBJECT_ID_HEX_LEN} hex characters, got {0}")]
    InvalidLength(usize),
    #[error("object id is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("object id declares a length of {0} bytes, expected {OBJECT_ID_LEN}")]
    LengthMismatch(u8),
    #[error("enterprise number {0:#x} does not fit in 24 bits")]
    EnterpriseNumberOutOfRange(u32),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Build an id from its enterprise number and the UUID carried in the
    ///  opaque section. The CRC is computed here.
    fn assemble(enterprise_number: u32, uuid: Uuid) -> Self {
        let mut bytes = [0u8; OBJECT_ID_LEN];
        let enterprise = enterprise_number.to_be_bytes();
        bytes[1..4].copy_from_slice(&enterprise[1..4]);
        bytes[LENGTH_OFFSET] = OBJECT_ID_LEN as u8;
        bytes[OBJECT_ID_LEN - 16..].copy_from_slice(uuid.as_bytes());

        let crc = crc16(&bytes);
        bytes[CRC_OFFSET..OPAQUE_OFFSET].copy_from_slice(&crc.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    pub fn enterprise_number(&self) -> u32 {
        u32::from_be_bytes([0, self.0[1], self.0[2], self.0[3]])
    }

    /// The CRC stored in the id
    pub fn crc(&self) -> u16 {
        u16::from_be_bytes([self.0[CRC_OFFSET], self.0[CRC_OFFSET + 1]])
    }

    /// Recompute the CRC and compare it with the stored one.
    ///  Ids issued by other servers may use a different checksum,
    ///  so parsing does not enforce this.
    pub fn has_valid_crc(&self) -> bool {
        let mut zeroed = self.0;
        zeroed[CRC_OFFSET] = 0;
        zeroed[CRC_OFFSET + 1] = 0;
        crc16(&zeroed) == self.crc()
    }

    pub fn opaque(&self) -> &[u8] {
        &self.0[OPAQUE_OFFSET..]
    }

    /// Object id URI, e.g. `/cdmi_objectid/0000053F...`
    pub fn uri(&self) -> String {
        format!("/cdmi_objectid/{}", self)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self)
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OBJECT_ID_HEX_LEN {
            return Err(ObjectIdError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        if bytes[LENGTH_OFFSET] as usize != OBJECT_ID_LEN {
            return Err(ObjectIdError::LengthMismatch(bytes[LENGTH_OFFSET]));
        }
        Ok(Self(bytes))
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectId::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Issues fresh object ids for one enterprise number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectIdGenerator {
    enterprise_number: u32,
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self {
            enterprise_number: DEFAULT_ENTERPRISE_NUMBER,
        }
    }
}

impl ObjectIdGenerator {
    pub fn new(enterprise_number: u32) -> Result<Self, ObjectIdError> {
        if enterprise_number > MAX_ENTERPRISE_NUMBER {
            return Err(ObjectIdError::EnterpriseNumberOutOfRange(
                enterprise_number,
            ));
        }
        Ok(Self { enterprise_number })
    }

    pub fn enterprise_number(&self) -> u32 {
        self.enterprise_number
    }

    pub fn generate(&self) -> ObjectId {
        ObjectId::assemble(self.enterprise_number, Uuid::new_v4())
    }
}

// CRC-16/ARC: polynomial 0x8005, reflected, zero init
fn crc16(bytes: &[u8]) -> u16 {
    ID_CRC.checksum(bytes)
}
