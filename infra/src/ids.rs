use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use data_encoding::HEXLOWER;
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// An opaque identifier for a document of type `T`.
///
/// Any string is a valid id; ids handed out by [`IdGen`] are 32 lower case
/// hex characters.
pub struct Id<T> {
    val: String,
    phantom: PhantomData<T>,
}

pub trait Entity {
    /// Used when talking about the entity in messages, eg: "Dish".
    const NAME: &'static str;
}

#[derive(Debug, Clone, Default)]
pub struct IdGen {
    _priv: (),
}

impl IdGen {
    pub fn new() -> Self {
        IdGen { _priv: () }
    }

    pub fn generate<T>(&self) -> Id<T> {
        let bytes = rand::thread_rng().gen::<[u8; 16]>();
        Id::from(HEXLOWER.encode(&bytes))
    }
}

impl<T> Id<T> {
    pub fn as_str(&self) -> &str {
        &self.val
    }

    pub fn is_empty(&self) -> bool {
        self.val.is_empty()
    }
}

impl<T> From<String> for Id<T> {
    fn from(val: String) -> Self {
        Id {
            val,
            phantom: PhantomData,
        }
    }
}

impl<T> From<&str> for Id<T> {
    fn from(val: &str) -> Self {
        Id::from(val.to_string())
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.val)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_tuple("Id").field(&self.val).finish()
    }
}

impl<T> std::str::FromStr for Id<T> {
    type Err = std::convert::Infallible;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Ok(Id::from(src))
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialEq<str> for Id<T> {
    fn eq(&self, other: &str) -> bool {
        self.val == other
    }
}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.val.cmp(&other.val)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.val.hash(state)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Id {
            val: self.val.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.val)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdStrVisitor<T>(PhantomData<T>);
        impl<'vi, T> de::Visitor<'vi> for IdStrVisitor<T> {
            type Value = Id<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an Id string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Id<T>, E> {
                Ok(Id::from(value))
            }
        }

        deserializer.deserialize_str(IdStrVisitor(PhantomData))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug)]
    struct Canary;

    impl Entity for Canary {
        const NAME: &'static str = "Canary";
    }

    #[test]
    fn round_trips_via_serde_json() {
        let id = Id::<Canary>::from("boo");

        let json = serde_json::to_string(&id).expect("serde_json::to_string");
        println!("Json: {}", json);
        let id2: Id<Canary> = serde_json::from_str(&json).expect("serde_json::from_str");
        assert_eq!(id, id2);
    }

    #[test]
    fn serializes_to_bare_string() {
        let id = Id::<Canary>::from("Hi!");

        let json = serde_json::to_string(&id).expect("serde_json::to_string");
        assert_eq!(json, "\"Hi!\"");
    }

    #[test]
    fn should_generate_distinct_ids() {
        let idgen = IdGen::new();

        let ids = (0..64)
            .map(|_| idgen.generate::<Canary>())
            .collect::<HashSet<_>>();

        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn generated_ids_should_be_hex() {
        let id = IdGen::new().generate::<Canary>();

        let s = id.to_string();

        assert_eq!(s.len(), 32, "string: {:?}", s);
        assert!(
            s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
            "string: {:?} should be lower case hex",
            s
        );
    }

    #[test]
    fn should_accept_any_string() {
        let s = "not-a-generated-id";

        let id = s.parse::<Id<Canary>>().expect("parse");

        assert_eq!(id.as_str(), s);
        assert!(id == *s);
    }
}
