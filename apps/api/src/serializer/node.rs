//! Ordered YAML node tree. Mapping keys keep insertion order; duplicate keys are
//! refused rather than overwritten.

#[derive(Debug, Clone, PartialEq)]
pub enum YamlNode {
    Scalar(String),
    Bool(bool),
    Sequence(Vec<YamlNode>),
    Mapping(Mapping),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, YamlNode)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey(pub String);

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: YamlNode) -> Result<(), DuplicateKey> {
        if self.contains_key(key) {
            return Err(DuplicateKey(key.to_string()));
        }
        self.entries.push((key.to_string(), value));
        Ok(())
    }

    /// Inserts a scalar when the value is present and not blank.
    pub fn insert_text(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.entries.push((key.to_string(), YamlNode::Scalar(v.to_string())));
        }
    }

    /// Inserts a scalar sequence, skipping blank items; nothing when all are blank.
    pub fn insert_list(&mut self, key: &str, items: &[String]) {
        let items: Vec<YamlNode> = items
            .iter()
            .filter(|i| !i.trim().is_empty())
            .map(|i| YamlNode::Scalar(i.clone()))
            .collect();
        if !items.is_empty() {
            self.entries.push((key.to_string(), YamlNode::Sequence(items)));
        }
    }

    pub fn insert_sequence(&mut self, key: &str, items: Vec<YamlNode>) {
        if !items.is_empty() {
            self.entries.push((key.to_string(), YamlNode::Sequence(items)));
        }
    }

    pub fn insert_bool(&mut self, key: &str, value: bool) {
        self.entries.push((key.to_string(), YamlNode::Bool(value)));
    }

    pub fn insert_mapping(&mut self, key: &str, mapping: Mapping) {
        if !mapping.is_empty() {
            self.entries.push((key.to_string(), YamlNode::Mapping(mapping)));
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &YamlNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Mapping> for YamlNode {
    fn from(mapping: Mapping) -> Self {
        YamlNode::Mapping(mapping)
    }
}
