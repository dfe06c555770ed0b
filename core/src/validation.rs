//! The conventional validation error payload.
//!
//! Backends in this family answer a rejected write with `422` and a body of
//! the form `{"errors": {"name": ["can't be blank"], ...}}`. This type is a
//! ready-made target for [`decode_errors`](crate::decode::decode_errors).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Messages for one field; empty when the field has none.
    pub fn field(&self, name: &str) -> &[String] {
        self.errors.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.errors.values().all(Vec::is_empty)
    }

    /// `"<field> <message>"` for every message, fields in name order.
    /// Messages on `base` are not prefixed.
    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |message| {
                    if field == "base" {
                        message.clone()
                    } else {
                        format!("{} {message}", humanize(field))
                    }
                })
            })
            .collect()
    }
}

/// `email_address` -> `Email address`.
fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
