use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Accumulates one record per distinct IP, in first-seen order. Each
/// extraction pass looks up the record for its row's trailing IP and fills
/// the fields that pass owns; the caller controls field ownership, so no
/// positional column bookkeeping is needed.
pub struct IpMerged<T> {
    order: Vec<String>,
    map: HashMap<String, T>,
}

impl<T: Default> IpMerged<T> {
    pub fn new() -> Self {
        IpMerged {
            order: Vec::new(),
            map: HashMap::new(),
        }
    }

    /// The record for `ip`, created on first sight.
    pub fn entry(&mut self, ip: &str) -> &mut T {
        match self.map.entry(ip.to_string()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => {
                self.order.push(ip.to_string());
                v.insert(T::default())
            }
        }
    }

    /// All `(ip, record)` pairs in first-seen IP order.
    pub fn into_rows(mut self) -> Vec<(String, T)> {
        self.order
            .into_iter()
            .filter_map(|ip| {
                let rec = self.map.remove(&ip)?;
                Some((ip, rec))
            })
            .collect()
    }
}

impl<T: Default> Default for IpMerged<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ──
