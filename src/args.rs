//! Lenient decoding of module option values
//!
//! Ansible hands option values through as the playbook wrote them, so a
//! `list` option may arrive as a comma-separated string and a `bool` option
//! as `"yes"` or `1`.

use pveapi::convert::{DEFAULT_SEPARATOR, delimited_to_list};
use serde::Deserialize;
use serde::de::{self, Deserializer};

const TRUE_WORDS: &[&str] = &["y", "yes", "on", "1", "true", "t"];
const FALSE_WORDS: &[&str] = &["n", "no", "off", "0", "false", "f"];

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseBool {
    Bool(bool),
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseList {
    List(Vec<String>),
    Text(String),
}

/// Parse an Ansible boolean word, case-insensitively
pub fn parse_bool(value: &str) -> Option<bool> {
    let word = value.trim().to_ascii_lowercase();
    if TRUE_WORDS.contains(&word.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&word.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn loose_bool<E: de::Error>(value: LooseBool) -> Result<bool, E> {
    match value {
        LooseBool::Bool(flag) => Ok(flag),
        LooseBool::Number(0) => Ok(false),
        LooseBool::Number(1) => Ok(true),
        LooseBool::Number(n) => Err(E::custom(format!("{n} is not a valid boolean"))),
        LooseBool::Text(text) => parse_bool(&text)
            .ok_or_else(|| E::custom(format!("'{text}' is not a valid boolean"))),
    }
}

/// `bool` option; `null` counts as `false`
pub fn deserialize_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<LooseBool>::deserialize(deserializer)?.map_or(Ok(false), loose_bool)
}

/// Optional `bool` option; `null` stays unset
pub fn deserialize_optional_bool<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    Option::<LooseBool>::deserialize(deserializer)?
        .map(loose_bool)
        .transpose()
}

/// `list` option; a string is split on commas, `null` is empty
pub fn deserialize_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<LooseList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(LooseList::List(items)) => items,
        Some(LooseList::Text(text)) => delimited_to_list(Some(&text), DEFAULT_SEPARATOR),
    })
}
