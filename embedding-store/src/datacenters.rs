use serde::{Deserialize, Serialize};

/// The region every embedding uploaded before replica tracking existed was written to.
/// Only referenced by the backfill migration; the runtime merge never assumes it.
pub const LEGACY_DATACENTER: &str = "b2-eu-cen";

/// The set of storage regions holding a copy of an embedding's derived payload.
///
/// Insertion order is kept so that the set round-trips to the `datacenters` array column
/// unchanged, but equality ignores order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DatacenterSet(Vec<String>);

impl DatacenterSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a region, returning false if it was already present.
    pub fn insert(&mut self, datacenter: &str) -> bool {
        if self.contains(datacenter) {
            return false;
        }
        self.0.push(datacenter.to_owned());
        true
    }

    /// Removes a region, returning false if it was not present.
    pub fn remove(&mut self, datacenter: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|dc| dc != datacenter);
        self.0.len() != before
    }

    pub fn contains(&self, datacenter: &str) -> bool {
        self.0.iter().any(|dc| dc == datacenter)
    }

    /// Merges another set into this one.
    pub fn union_with(&mut self, other: &DatacenterSet) {
        for dc in other.iter() {
            self.insert(dc);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for DatacenterSet {
    fn from(datacenters: Vec<String>) -> Self {
        datacenters.iter().map(String::as_str).collect()
    }
}

impl From<DatacenterSet> for Vec<String> {
    fn from(set: DatacenterSet) -> Self {
        set.0
    }
}

impl<'a> FromIterator<&'a str> for DatacenterSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = DatacenterSet::new();
        for dc in iter {
            set.insert(dc);
        }
        set
    }
}

impl PartialEq for DatacenterSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|dc| other.contains(dc))
    }
}

impl Eq for DatacenterSet {}
