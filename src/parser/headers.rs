//! Ordered, case-insensitive header storage.

use crate::parser::error::Error;

/// Header fields in the order they appeared on the wire.
///
/// Lookups ignore ASCII case. Repeated field names are all kept, so a name
/// can carry a list of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `Name: value` lines into a header map.
    ///
    /// Lines starting with a space or tab continue the previous field's
    /// value (obsolete line folding). Names and values are trimmed.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self, Error> {
        let mut headers = Headers::new();

        for line in lines {
            let line = line.as_ref();

            if line.starts_with(&[' ', '\t'][..]) {
                let (_, value) = headers
                    .entries
                    .last_mut()
                    .ok_or_else(|| Error::InvalidHeaderFormat(line.to_string()))?;
                let folded = line.trim();
                if !folded.is_empty() {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(folded);
                }
                continue;
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| Error::InvalidHeaderFormat(line.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::InvalidHeaderFormat(line.to_string()));
            }

            headers.append(name, value.trim());
        }

        Ok(headers)
    }

    /// Add a field, keeping any existing fields with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in wire order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
