/// An ordered set of integer keys indexing the entries of a vector, or the rows
/// or columns of a matrix.
///
/// Keys are usually the contiguous range `0..n`, in which case membership is a
/// single comparison. Sub-matrices carry arbitrary key lists; their order is
/// preserved and membership falls back to a linear scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySet {
    keys: Vec<usize>,
    contiguous: bool,
}

impl KeySet {
    /// Creates the key set `0..len`.
    pub fn range(len: usize) -> Self {
        Self {
            keys: (0..len).collect(),
            contiguous: true,
        }
    }

    /// Creates a key set from an explicit list of keys, preserving their order.
    ///
    /// Duplicate keys are dropped, keeping the first occurrence.
    pub fn from_keys(keys: &[usize]) -> Self {
        let mut unique = Vec::with_capacity(keys.len());
        for &k in keys {
            if !unique.contains(&k) {
                unique.push(k);
            }
        }
        let contiguous = unique.iter().enumerate().all(|(i, &k)| i == k);
        Self {
            keys: unique,
            contiguous,
        }
    }

    /// The number of keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the key set has no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether `key` belongs to the set.
    #[inline]
    pub fn contains(&self, key: usize) -> bool {
        if self.contiguous {
            key < self.keys.len()
        } else {
            self.keys.contains(&key)
        }
    }

    /// The position of `key` in the ordered set.
    pub fn position(&self, key: usize) -> Option<usize> {
        if self.contiguous {
            (key < self.keys.len()).then_some(key)
        } else {
            self.keys.iter().position(|&k| k == key)
        }
    }

    /// The key stored at `position`.
    #[inline]
    pub fn get(&self, position: usize) -> Option<usize> {
        self.keys.get(position).copied()
    }

    /// Iterates the keys in order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.keys.iter().copied()
    }

    /// The keys as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.keys
    }

    /// Whether the keys are exactly `0..len`.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }
}
