//! Serde adapter encoding `Option<T>` as a zero-or-one element list.
//!
//! The wallet service uses this shape for optional arguments: an absent value
//! travels as `[]`, a present one as `[value]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    value.as_slice().serialize(serializer)
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let mut items = Vec::<T>::deserialize(deserializer)?;
    if items.len() > 1 {
        return Err(serde::de::Error::invalid_length(
            items.len(),
            &"a list with zero or one element",
        ));
    }
    Ok(items.pop())
}
