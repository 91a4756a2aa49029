//! Module: key
//! Responsibility: the scalar key domain shared by every index.
//! Does not own: key extraction (caller functions) or index storage.
//!
//! Invariants:
//! - A key is exactly one of Int, Uint, or Text; kinds never compare equal.
//! - Typed keys convert into `Key` losslessly and back only for their kind.

use std::fmt::{self, Display};

///
/// KeyKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum KeyKind {
    Int,
    Uint,
    Text,
}

impl Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Text => "text",
        };
        write!(f, "{label}")
    }
}

///
/// Key
///
/// Erased scalar key stored in index maps. Equality and ordering are by
/// value within a kind.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Key {
    Int(i64),
    Uint(u64),
    Text(String),
}

impl Key {
    #[must_use]
    pub const fn kind(&self) -> KeyKind {
        match self {
            Self::Int(_) => KeyKind::Int,
            Self::Uint(_) => KeyKind::Uint,
            Self::Text(_) => KeyKind::Text,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

///
/// ScalarKey
///
/// Typed key returned by an index's key function. The associated kind is
/// fixed per type, so one index always yields one kind of key.
///

pub trait ScalarKey: Clone + fmt::Debug + 'static {
    const KIND: KeyKind;

    fn into_key(self) -> Key;

    /// Recover the typed key; `None` for another kind or an out-of-range value.
    fn from_key(key: &Key) -> Option<Self>;

    fn to_key(&self) -> Key {
        self.clone().into_key()
    }
}

impl ScalarKey for String {
    const KIND: KeyKind = KeyKind::Text;

    fn into_key(self) -> Key {
        Key::Text(self)
    }

    fn from_key(key: &Key) -> Option<Self> {
        key.as_text().map(ToString::to_string)
    }
}

macro_rules! impl_scalar_key_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScalarKey for $ty {
                const KIND: KeyKind = KeyKind::Int;

                fn into_key(self) -> Key {
                    Key::Int(i64::from(self))
                }

                fn from_key(key: &Key) -> Option<Self> {
                    match key {
                        Key::Int(v) => Self::try_from(*v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_scalar_key_uint {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScalarKey for $ty {
                const KIND: KeyKind = KeyKind::Uint;

                fn into_key(self) -> Key {
                    Key::Uint(u64::from(self))
                }

                fn from_key(key: &Key) -> Option<Self> {
                    match key {
                        Key::Uint(v) => Self::try_from(*v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_scalar_key_int!(i8, i16, i32, i64);
impl_scalar_key_uint!(u8, u16, u32, u64);

impl ScalarKey for isize {
    const KIND: KeyKind = KeyKind::Int;

    fn into_key(self) -> Key {
        Key::Int(self as i64)
    }

    fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Int(v) => Self::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl ScalarKey for usize {
    const KIND: KeyKind = KeyKind::Uint;

    fn into_key(self) -> Key {
        Key::Uint(self as u64)
    }

    fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Uint(v) => Self::try_from(*v).ok(),
            _ => None,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_keys_report_their_kind() {
        assert_eq!(5_i32.into_key().kind(), KeyKind::Int);
        assert_eq!(5_u16.into_key().kind(), KeyKind::Uint);
        assert_eq!(7_usize.into_key().kind(), KeyKind::Uint);
        assert_eq!("a".to_string().into_key().kind(), KeyKind::Text);
        assert_eq!(<i64 as ScalarKey>::KIND, KeyKind::Int);
    }

    #[test]
    fn from_key_rejects_other_kinds_and_out_of_range() {
        assert_eq!(i32::from_key(&Key::Int(-3)), Some(-3));
        assert_eq!(i32::from_key(&Key::Uint(3)), None);
        assert_eq!(u8::from_key(&Key::Uint(300)), None);
        assert_eq!(String::from_key(&Key::from("x")), Some("x".to_string()));
        assert_eq!(String::from_key(&Key::Int(1)), None);
    }

    #[test]
    fn equal_values_of_different_kinds_are_distinct_keys() {
        assert_ne!(Key::Int(1), Key::Uint(1));
        assert_ne!(Key::Text("1".into()), Key::Int(1));
    }

    #[test]
    fn display_quotes_text_only() {
        assert_eq!(Key::Int(-4).to_string(), "-4");
        assert_eq!(Key::Uint(4).to_string(), "4");
        assert_eq!(Key::from("a").to_string(), "\"a\"");
    }
}
