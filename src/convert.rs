//! Reversible conversions between user-facing and wire-level values.
//!
//! The round-trip law is `from_wire(to_wire(x)) == x` for every valid user
//! value `x`. The reverse is not guaranteed: several user values may
//! normalize to one wire value (case-insensitive enum literals being the
//! usual case).

use std::sync::Arc;

use crate::error::BindResult;
use crate::value::SqlValue;

/// A reversible mapping between a user-facing value and its wire value.
///
/// Converters are immutable, created once per binding declaration and
/// shared by reference across all uses of that binding.
pub trait Convert: Send + Sync {
    /// User value to wire value.
    fn to_wire(&self, user: &SqlValue) -> BindResult<SqlValue>;

    /// Wire value back to user value.
    fn from_wire(&self, wire: SqlValue) -> BindResult<SqlValue>;

    /// True only for the identity converter; lets `chain` and the
    /// delegating codec skip a no-op layer in the hot path.
    fn is_identity(&self) -> bool {
        false
    }
}

/// The identity converter. A codec wrapped in this behaves identically to
/// the unwrapped codec.
#[derive(Debug, Default)]
pub struct Identity;

impl Convert for Identity {
    fn to_wire(&self, user: &SqlValue) -> BindResult<SqlValue> {
        Ok(user.clone())
    }

    fn from_wire(&self, wire: SqlValue) -> BindResult<SqlValue> {
        Ok(wire)
    }

    fn is_identity(&self) -> bool {
        true
    }
}

/// Two converters applied in sequence: `inner` sits next to the wire,
/// `outer` next to the user type.
pub struct Chained {
    inner: Arc<dyn Convert>,
    outer: Arc<dyn Convert>,
}

impl Convert for Chained {
    fn to_wire(&self, user: &SqlValue) -> BindResult<SqlValue> {
        let mid = self.outer.to_wire(user)?;
        self.inner.to_wire(&mid)
    }

    fn from_wire(&self, wire: SqlValue) -> BindResult<SqlValue> {
        let mid = self.inner.from_wire(wire)?;
        self.outer.from_wire(mid)
    }
}

/// Compose two converters. Identity is a left and right unit: chaining with
/// it returns the other converter unchanged rather than allocating a
/// wrapper, which also short-circuits self-composition of identities.
pub fn chain(inner: Arc<dyn Convert>, outer: Arc<dyn Convert>) -> Arc<dyn Convert> {
    if inner.is_identity() {
        return outer;
    }
    if outer.is_identity() {
        return inner;
    }
    Arc::new(Chained { inner, outer })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindError;

    /// Normalizes user text to lowercase on the way to the wire; many user
    /// spellings collapse to one wire value.
    struct Lowercase;

    impl Convert for Lowercase {
        fn to_wire(&self, user: &SqlValue) -> BindResult<SqlValue> {
            match user {
                SqlValue::Text(s) => Ok(SqlValue::Text(s.to_lowercase())),
                other => Ok(other.clone()),
            }
        }

        fn from_wire(&self, wire: SqlValue) -> BindResult<SqlValue> {
            Ok(wire)
        }
    }

    /// Prefixes wire text, strictly reversible.
    struct Prefixed;

    impl Convert for Prefixed {
        fn to_wire(&self, user: &SqlValue) -> BindResult<SqlValue> {
            match user {
                SqlValue::Text(s) => Ok(SqlValue::Text(format!("v1:{}", s))),
                other => Ok(other.clone()),
            }
        }

        fn from_wire(&self, wire: SqlValue) -> BindResult<SqlValue> {
            match wire {
                SqlValue::Text(s) => match s.strip_prefix("v1:") {
                    Some(rest) => Ok(SqlValue::Text(rest.to_string())),
                    None => Err(BindError::Conversion(format!("missing prefix: '{}'", s))),
                },
                other => Ok(other),
            }
        }
    }

    #[test]
    fn test_round_trip_law() {
        let c = Prefixed;
        let user = SqlValue::Text("hello".into());
        let wire = c.to_wire(&user).unwrap();
        assert_eq!(wire, SqlValue::Text("v1:hello".into()));
        assert_eq!(c.from_wire(wire).unwrap(), user);
    }

    #[test]
    fn test_chain_order() {
        // outer runs first on the way to the wire.
        let chained = chain(Arc::new(Prefixed), Arc::new(Lowercase));
        let wire = chained.to_wire(&SqlValue::Text("HeLLo".into())).unwrap();
        assert_eq!(wire, SqlValue::Text("v1:hello".into()));
        assert_eq!(
            chained.from_wire(wire).unwrap(),
            SqlValue::Text("hello".into())
        );
    }

    #[test]
    fn test_identity_is_a_unit() {
        let id: Arc<dyn Convert> = Arc::new(Identity);
        let p: Arc<dyn Convert> = Arc::new(Prefixed);

        let left = chain(id.clone(), p.clone());
        assert!(Arc::ptr_eq(&left, &p));

        let right = chain(p.clone(), id.clone());
        assert!(Arc::ptr_eq(&right, &p));

        // Identity composed with itself must not recurse or wrap.
        let both = chain(id.clone(), id.clone());
        assert!(both.is_identity());
    }
}
