//! Closed label sets.
//!
//! A class label is a field whose value must come from a fixed list of
//! names. In the source files a label shows up either as its name
//! (`"economy"`) or as its zero-based position in that list (`0`); both
//! decode to the same variant. Labels always serialize as their name.

use serde_json::Value;

/// A fieldless enum backed by an ordered list of label names
pub trait ClassLabel: Sized + Copy + 'static {
    /// Label names, in index order
    const NAMES: &'static [&'static str];

    /// Variants, in the same order as `NAMES`
    const ALL: &'static [Self];

    fn index(self) -> usize;

    fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .and_then(Self::from_index)
    }

    /// Decode a label from a raw JSON value.
    ///
    /// Returns a human readable reason when the value is not part of the set.
    fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(s) => Self::from_name(s)
                .ok_or_else(|| format!("'{}' is not one of {:?}", s, Self::NAMES)),
            Value::Number(n) => n
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(Self::from_index)
                .ok_or_else(|| format!("{} is not a label index for {:?}", n, Self::NAMES)),
            other => Err(format!(
                "expected one of {:?}, found {}",
                Self::NAMES,
                super::fields::json_type_name(other)
            )),
        }
    }
}

/// Declare a class label enum together with its name table.
///
/// The generated type implements `ClassLabel`, `Display` and serializes as
/// its label name.
#[macro_export]
macro_rules! class_label {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::dataset::class_label::ClassLabel for $name {
            const NAMES: &'static [&'static str] = &[$($label),+];
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn index(self) -> usize {
                self as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                use $crate::dataset::class_label::ClassLabel;
                f.write_str(self.name())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                use $crate::dataset::class_label::ClassLabel;
                serializer.serialize_str(self.name())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    crate::class_label! {
        enum Size {
            Small => "small",
            Large => "large",
        }
    }

    #[test]
    fn test_name_and_index_lookup() {
        assert_eq!(Size::from_name("large"), Some(Size::Large));
        assert_eq!(Size::from_index(0), Some(Size::Small));
        assert_eq!(Size::from_index(2), None);
        assert_eq!(Size::Large.index(), 1);
        assert_eq!(Size::Small.to_string(), "small");
    }

    #[test]
    fn test_from_json_accepts_name_or_index() {
        assert_eq!(Size::from_json(&json!("small")).unwrap(), Size::Small);
        assert_eq!(Size::from_json(&json!(1)).unwrap(), Size::Large);
    }

    #[test]
    fn test_from_json_rejects_values_outside_the_set() {
        let err = Size::from_json(&json!("medium")).unwrap_err();
        assert!(err.contains("medium"));
        assert!(Size::from_json(&json!(5)).is_err());
        assert!(Size::from_json(&json!(-1)).is_err());
        assert!(Size::from_json(&json!(true)).is_err());
    }

    #[test]
    fn test_huge_index_does_not_wrap() {
        // 2^32 would truncate to index 0 on 32-bit targets
        assert!(Size::from_json(&json!(4_294_967_296u64)).is_err());
        assert!(Size::from_json(&json!(u64::MAX)).is_err());
    }

    #[test]
    fn test_serializes_as_name() {
        assert_eq!(serde_json::to_value(Size::Large).unwrap(), json!("large"));
    }
}
