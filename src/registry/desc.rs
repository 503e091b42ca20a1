use crate::labels::hash_name;

/// Identity and documentation for one metric family. Two descriptors that
/// hash to the same `id` (i.e. share a name) are the same metric family;
/// registering a second one is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
    pub id: u64,
}

impl Desc {
    pub fn new(name: impl Into<String>, help: impl Into<String>, label_names: &[&str]) -> Self {
        let name = name.into();
        let id = hash_name(&name);
        Self {
            name,
            help: help.into(),
            label_names: label_names.iter().map(|s| s.to_string()).collect(),
            id,
        }
    }
}
