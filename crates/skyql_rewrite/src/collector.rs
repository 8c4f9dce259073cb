use indexmap::{IndexMap, IndexSet};

/// Candidate subchunks grouped by chunk.
///
/// Chunks are kept in the order they were first seen, as are the subchunks
/// of each chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionMapping {
    chunks: IndexMap<i64, Vec<i64>>,
}

impl PartitionMapping {
    pub fn get(&self, chunk: i64) -> Option<&[i64]> {
        self.chunks.get(&chunk).map(|s| s.as_slice())
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &[i64])> {
        self.chunks.iter().map(|(c, s)| (*c, s.as_slice()))
    }
}

impl IntoIterator for PartitionMapping {
    type Item = (i64, Vec<i64>);
    type IntoIter = indexmap::map::IntoIter<i64, Vec<i64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

impl FromIterator<(i64, i64)> for PartitionMapping {
    fn from_iter<T: IntoIterator<Item = (i64, i64)>>(iter: T) -> Self {
        let mut collector = SubchunkTupleCollector::default();
        collector.extend(iter);
        collector.finish()
    }
}

/// Accumulates (chunk, subchunk) rows returned by the partition map query.
#[derive(Debug, Default)]
pub struct SubchunkTupleCollector {
    chunks: IndexMap<i64, IndexSet<i64>>,
}

impl SubchunkTupleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a row. Repeated rows are ignored.
    pub fn push(&mut self, chunk: i64, subchunk: i64) {
        self.chunks.entry(chunk).or_default().insert(subchunk);
    }

    pub fn finish(self) -> PartitionMapping {
        PartitionMapping {
            chunks: self
                .chunks
                .into_iter()
                .map(|(chunk, subchunks)| (chunk, subchunks.into_iter().collect()))
                .collect(),
        }
    }

    /// Collect all rows into a mapping.
    pub fn collect(rows: impl IntoIterator<Item = (i64, i64)>) -> PartitionMapping {
        rows.into_iter().collect()
    }
}

impl Extend<(i64, i64)> for SubchunkTupleCollector {
    fn extend<T: IntoIterator<Item = (i64, i64)>>(&mut self, iter: T) {
        for (chunk, subchunk) in iter {
            self.push(chunk, subchunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_by_chunk_in_first_seen_order() {
        let mapping = SubchunkTupleCollector::collect([(1, 5), (1, 6), (2, 7)]);
        let got: Vec<_> = mapping.iter().map(|(c, s)| (c, s.to_vec())).collect();
        assert_eq!(vec![(1, vec![5, 6]), (2, vec![7])], got);
    }

    #[test]
    fn unsorted_input_keeps_order() {
        let mapping = SubchunkTupleCollector::collect([(9, 3), (2, 1), (9, 1), (2, 0)]);
        assert_eq!(Some([3, 1].as_slice()), mapping.get(9));
        assert_eq!(Some([1, 0].as_slice()), mapping.get(2));
        let chunks: Vec<_> = mapping.into_iter().map(|(c, _)| c).collect();
        assert_eq!(vec![9, 2], chunks);
    }

    #[test]
    fn duplicates_ignored() {
        let mut collector = SubchunkTupleCollector::new();
        collector.push(1, 5);
        collector.push(1, 5);
        collector.push(1, 6);
        collector.push(1, 5);
        let mapping = collector.finish();
        assert_eq!(1, mapping.len());
        assert_eq!(Some([5, 6].as_slice()), mapping.get(1));
    }

    #[test]
    fn empty() {
        let mapping = SubchunkTupleCollector::collect(std::iter::empty());
        assert!(mapping.is_empty());
        assert_eq!(None, mapping.get(1));
    }
}
