/// Disjoint-set forest over dense `usize` handles.
///
/// Union by rank keeps trees shallow; `find` compresses paths iteratively so
/// large schematics never recurse.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Create `size` singleton sets, one per handle
    pub fn new(size: usize) -> Self {
        DisjointSet {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    /// Merge the sets containing `a` and `b`. Returns false if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }

        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Materialize every set as a list of members.
    ///
    /// Groups are ordered by their smallest member and members are ascending,
    /// so the output does not depend on the order unions were applied in.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root = vec![usize::MAX; self.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for handle in 0..self.len() {
            let root = self.find(handle);
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = groups.len();
                groups.push(Vec::new());
            }
            groups[slot_of_root[root]].push(handle);
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let mut dsu = DisjointSet::new(3);
        assert_eq!(dsu.groups(), vec![vec![0], vec![1], vec![2]]);
        assert!(!dsu.connected(0, 2));
    }

    #[test]
    fn test_union_is_transitive() {
        let mut dsu = DisjointSet::new(5);
        assert!(dsu.union(0, 3));
        assert!(dsu.union(3, 4));
        assert!(!dsu.union(4, 0));
        assert!(dsu.connected(0, 4));
        assert_eq!(dsu.groups(), vec![vec![0, 3, 4], vec![1], vec![2]]);
    }

    #[test]
    fn test_groups_independent_of_union_order() {
        let pairs = [(0, 1), (2, 3), (1, 3), (5, 6)];

        let mut forward = DisjointSet::new(7);
        for &(a, b) in &pairs {
            forward.union(a, b);
        }

        let mut backward = DisjointSet::new(7);
        for &(a, b) in pairs.iter().rev() {
            backward.union(b, a);
        }

        assert_eq!(forward.groups(), backward.groups());
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let n = 200_000;
        let mut dsu = DisjointSet::new(n);
        for i in 1..n {
            dsu.union(i - 1, i);
        }
        assert!(dsu.connected(0, n - 1));
        assert_eq!(dsu.groups().len(), 1);
    }
}
