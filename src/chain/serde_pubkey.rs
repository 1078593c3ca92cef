//! Base58 string (de)serialization for `Pubkey` fields of the JSON
//! configuration document.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serializer, de::Error};
use solana_pubkey::Pubkey;

pub fn serialize<S: Serializer>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(pubkey)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
    let value = String::deserialize(deserializer)?;
    Pubkey::from_str(&value).map_err(|e| D::Error::custom(format!("invalid pubkey {value}: {e}")))
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(pubkey: &Option<Pubkey>, serializer: S) -> Result<S::Ok, S::Error> {
        match pubkey {
            Some(pubkey) => serializer.collect_str(pubkey),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Pubkey>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|value| {
                Pubkey::from_str(&value)
                    .map_err(|e| D::Error::custom(format!("invalid pubkey {value}: {e}")))
            })
            .transpose()
    }
}
