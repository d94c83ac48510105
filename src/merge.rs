use std::{collections::HashMap, fmt};

use tracing::{debug, info};

use crate::{
    address::{normalize, NormalizedAddress},
    cache::{Hit, ResolutionCache},
    geocode::ProviderChain,
    geojson::{Feature, FeatureCollection, Properties},
    region::RegionFilter,
    sources::Record,
    utils::progress_bar,
};

/// Outcome counts for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub records: usize,
    /// No address, nothing attempted.
    pub skipped: usize,
    /// Found in the store.
    pub cached: usize,
    /// Resolved earlier in this run.
    pub reused: usize,
    pub geocoded: usize,
    pub failed: usize,
    pub rejected: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records: {} cached, {} reused, {} geocoded, {} failed, {} outside region, {} without address",
            self.records,
            self.cached,
            self.reused,
            self.geocoded,
            self.failed,
            self.rejected,
            self.skipped
        )
    }
}

#[derive(Clone, Copy)]
enum Unresolved {
    Failed,
    Rejected,
}

/// Builds the output collection one record at a time.
pub struct Merger<'a> {
    cache: ResolutionCache,
    chain: &'a ProviderChain,
    region: Option<&'a RegionFilter>,
    // addresses that already failed or were rejected this run
    unresolved: HashMap<NormalizedAddress, Unresolved>,
    output: FeatureCollection,
    stats: Stats,
}

impl<'a> Merger<'a> {
    pub fn new(
        existing: FeatureCollection,
        chain: &'a ProviderChain,
        region: Option<&'a RegionFilter>,
    ) -> Self {
        Self {
            cache: ResolutionCache::new(existing),
            chain,
            region,
            unresolved: HashMap::new(),
            output: FeatureCollection::new(),
            stats: Stats::default(),
        }
    }

    /// Appends at most one feature for `record`, `index` being its position
    /// in the batch.
    pub fn merge_record(&mut self, index: usize, record: &Record) {
        self.stats.records += 1;

        let raw = match record.raw_address.as_deref() {
            Some(x) if !x.trim().is_empty() => x,
            _ => {
                debug!("{:?} has no address", record.customer_name);
                self.stats.skipped += 1;
                return;
            }
        };
        let key = normalize(raw);

        match self.cache.lookup(&key) {
            Some(Hit::Existing(feature)) => {
                self.output.features.push(feature.clone());
                self.stats.cached += 1;
                return;
            }
            Some(Hit::Resolved(position)) => {
                let feature = self.output.features[position].clone();
                self.output.features.push(feature);
                self.stats.reused += 1;
                return;
            }
            None => {}
        }

        match self.unresolved.get(&key) {
            Some(Unresolved::Failed) => {
                self.stats.failed += 1;
                return;
            }
            Some(Unresolved::Rejected) => {
                self.stats.rejected += 1;
                return;
            }
            None => {}
        }

        let geocode = match self.chain.resolve(&key, &record.customer_name) {
            Some(x) => x,
            None => {
                info!("Could not geocode {:?} ({key})", record.customer_name);
                self.unresolved.insert(key, Unresolved::Failed);
                self.stats.failed += 1;
                return;
            }
        };

        if let Some(region) = self.region {
            let resolved = geocode.address.as_deref().unwrap_or_default();
            if !region.accept(resolved) {
                info!(
                    "Dropping {:?}: {key} resolved to {resolved:?}, outside {}",
                    record.customer_name,
                    region.code()
                );
                self.unresolved.insert(key, Unresolved::Rejected);
                self.stats.rejected += 1;
                return;
            }
        }

        debug!("{key} -> {:?} via {}", geocode.point.x_y(), geocode.provider);
        let feature = Feature::new(
            index,
            geocode.point,
            Properties::new(&record.customer_name, &key, &record.customer_type),
        );
        self.cache.insert(key, self.output.len());
        self.output.features.push(feature);
        self.stats.geocoded += 1;
    }

    pub fn finish(self) -> (FeatureCollection, Stats) {
        (self.output, self.stats)
    }
}

/// Runs every record through a [`Merger`], strictly in order.
pub fn merge(
    records: &[Record],
    existing: FeatureCollection,
    chain: &ProviderChain,
    region: Option<&RegionFilter>,
) -> (FeatureCollection, Stats) {
    let mut merger = Merger::new(existing, chain, region);
    let pb = progress_bar(records.len());
    for (index, record) in records.iter().enumerate() {
        merger.merge_record(index, record);
        pb.inc(1);
    }
    pb.finish_and_clear();
    merger.finish()
}
