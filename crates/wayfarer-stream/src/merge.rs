//! Identity-keyed merging of result collections.

use std::collections::HashMap;

use uuid::Uuid;

use crate::types::{Hotel, Poi, Restaurant, ZERO_UUID};

/// An item that can be deduplicated across stream updates.
pub trait Identifiable {
    fn id(&self) -> Option<&str>;
    fn name(&self) -> &str;
    fn interaction_id(&self) -> Option<&str>;
}

impl Identifiable for Poi {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn interaction_id(&self) -> Option<&str> {
        self.llm_interaction_id.as_deref()
    }
}

impl Identifiable for Hotel {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn interaction_id(&self) -> Option<&str> {
        self.llm_interaction_id.as_deref()
    }
}

impl Identifiable for Restaurant {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn interaction_id(&self) -> Option<&str> {
        self.llm_interaction_id.as_deref()
    }
}

/// The key an item is deduplicated by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    /// A stable, canonical UUID.
    Id(String),
    /// Normalised name, for items without a stable id.
    Name(String),
    /// Generator interaction id, when there is no usable name either.
    Interaction(String),
    /// Nothing to go on; never equal to any other key.
    Anonymous(Uuid),
}

/// Whether `id` is a real identity rather than a placeholder.
pub fn is_stable_id(id: &str) -> bool {
    // Hyphenated form is exactly 36 chars; the other forms Uuid accepts are not.
    id != ZERO_UUID && id.len() == 36 && Uuid::try_parse(id).is_ok()
}

/// Lower-cased name with everything but letters and digits removed.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Derive the identity key for `item`.
pub fn identity_key<T: Identifiable>(item: &T) -> IdentityKey {
    if let Some(id) = item.id()
        && is_stable_id(id)
    {
        return IdentityKey::Id(id.to_string());
    }

    let name = normalize_name(item.name());
    if !name.is_empty() {
        return IdentityKey::Name(name);
    }

    match item.interaction_id() {
        Some(interaction) if !interaction.is_empty() => {
            IdentityKey::Interaction(interaction.to_string())
        }
        _ => IdentityKey::Anonymous(Uuid::new_v4()),
    }
}

/// Merge `next` into `previous`.
///
/// Newer entries replace older ones with the same key, keeping the older
/// entry's position; order is first-seen across `previous` then `next`.
/// An item carrying a stable id also replaces an earlier entry that was
/// only known by the same name, so an id assigned mid-stream does not
/// duplicate the item.
pub fn merge<T: Identifiable>(previous: Vec<T>, next: Vec<T>) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(previous.len() + next.len());
    let mut index: HashMap<IdentityKey, usize> = HashMap::new();

    for item in previous.into_iter().chain(next) {
        let key = identity_key(&item);
        let slot = index.get(&key).copied().or_else(|| match &key {
            IdentityKey::Id(_) => {
                let name = normalize_name(item.name());
                (!name.is_empty())
                    .then(|| index.get(&IdentityKey::Name(name)).copied())
                    .flatten()
            }
            _ => None,
        });

        match slot {
            Some(position) => {
                merged[position] = item;
                index.insert(key, position);
            }
            None => {
                index.insert(key, merged.len());
                merged.push(item);
            }
        }
    }

    merged
}
