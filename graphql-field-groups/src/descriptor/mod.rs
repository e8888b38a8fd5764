//! Normalized field group and field configuration.
//!
//! Descriptors are deserialized from the configuration store's records. The store is loose
//! about scalar shapes (flags stored as `0`/`1`/`"1"`, lists stored as `""`), so the
//! deserializers here accept every shape the store writes.

mod field;
mod group;

pub use field::FieldDescriptor;
pub use field::FieldKind;
pub use field::Layout;
pub use field::NewLines;
pub use group::FieldGroupDescriptor;
pub use group::LocationRule;
pub use group::ParentLink;

pub(crate) mod lenient {
    use serde::Deserialize;
    use serde::Deserializer;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    impl Flag {
        fn truthy(&self) -> bool {
            match self {
                Flag::Bool(b) => *b,
                Flag::Int(i) => *i != 0,
                Flag::Float(f) => *f != 0.0,
                Flag::Text(s) => !matches!(s.trim(), "" | "0" | "false"),
            }
        }
    }

    pub(crate) fn default_true() -> bool {
        true
    }

    /// `null` and absent mean "unset".
    pub(crate) fn optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| flag.truthy()))
    }

    pub(crate) fn flag_or_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional_flag(deserializer)?.unwrap_or(true))
    }

    pub(crate) fn flag_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional_flag(deserializer)?.unwrap_or(false))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    /// Accepts a list of strings, a single string, `""` or `null`; drops empty entries.
    pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = match Option::<OneOrMany>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(OneOrMany::One(one)) => vec![one],
            Some(OneOrMany::Many(many)) => many,
        };
        Ok(list
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }

    /// Treats `""` like `null`.
    pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Text(String),
    }

    /// Accepts numbers and numeric strings.
    pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(
            Option::<Number>::deserialize(deserializer)?.and_then(|number| match number {
                Number::Int(i) => Some(i),
                Number::Text(s) => s.trim().parse().ok(),
            }),
        )
    }

    pub(crate) fn number_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional_number(deserializer)?.unwrap_or_default())
    }
}
