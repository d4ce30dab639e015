use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    pub static ref EMAIL_RX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("email pattern compiles");
}

/// Accumulates `(field, message)` pairs in the order checks fail.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<(String, String)>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push((field.to_owned(), message.to_owned()));
    }

    /// Records `message` against `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    /// Field -> message map for the error envelope. The first failure recorded
    /// for a field is the one reported.
    pub fn into_field_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        for (field, message) in self.errors {
            map.entry(field).or_insert(Value::String(message));
        }
        map
    }
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}
