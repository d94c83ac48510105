use std::collections::{hash_map::Entry, HashMap};

use tracing::debug;

use crate::{
    address::NormalizedAddress,
    geojson::{Feature, FeatureCollection},
};

/// Features already resolved, indexed by normalized address.
///
/// Holds the snapshot loaded from the store and everything resolved during
/// the current run, so a given address reaches a provider at most once.
/// When the store holds duplicates the first one wins.
pub struct ResolutionCache {
    existing: Vec<Feature>,
    index: HashMap<String, Slot>,
}

#[derive(Clone, Copy)]
enum Slot {
    Existing(usize),
    Resolved(usize),
}

pub enum Hit<'a> {
    Existing(&'a Feature),
    /// Resolved earlier in this run, by position in the output.
    Resolved(usize),
}

impl ResolutionCache {
    pub fn new(existing: FeatureCollection) -> Self {
        let mut index = HashMap::with_capacity(existing.len());
        let mut duplicates = 0usize;
        for (i, feature) in existing.features.iter().enumerate() {
            // keys are folded so entries written with stray capitals still match
            match index.entry(feature.properties.address.to_lowercase()) {
                Entry::Vacant(x) => {
                    x.insert(Slot::Existing(i));
                }
                Entry::Occupied(_) => duplicates += 1,
            }
        }
        if duplicates > 0 {
            debug!("store holds {duplicates} repeated addresses, first of each is indexed");
        }

        Self {
            existing: existing.features,
            index,
        }
    }

    /// Re-lowers the matched entry's address before handing it out.
    pub fn lookup(&mut self, key: &NormalizedAddress) -> Option<Hit<'_>> {
        match *self.index.get(key.as_str())? {
            Slot::Existing(i) => {
                let feature = &mut self.existing[i];
                feature.properties.address = feature.properties.address.to_lowercase();
                Some(Hit::Existing(feature))
            }
            Slot::Resolved(i) => Some(Hit::Resolved(i)),
        }
    }

    /// Records that `key` was resolved into output position `position`.
    pub fn insert(&mut self, key: NormalizedAddress, position: usize) {
        self.index
            .entry(key.as_str().to_string())
            .or_insert(Slot::Resolved(position));
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }
}
