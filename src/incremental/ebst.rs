use super::statistics::RegressionStatistics;


/// A node of an [`Ebst`]. `left` holds the observations of this subtree
/// with `x <= key`, `right` those with `x > key`.
#[derive(Debug, Clone, PartialEq)]
struct EbstNode {
    key: f64,
    left: RegressionStatistics,
    right: RegressionStatistics,
    left_child: Option<usize>,
    right_child: Option<usize>,
}


/// Extended binary search tree over the values of one input.
/// Every distinct value is a node key, and each node keeps
/// the statistics of the observations on both sides of its key,
/// so the statistics of any split `x <= key` are recovered
/// by one in-order walk without storing the observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ebst {
    nodes: Vec<EbstNode>,
    total: RegressionStatistics,
}


#[derive(Clone, Copy)]
enum Walk {
    Enter(usize),
    Visit(usize),
    Leave(usize),
}


impl Ebst {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }


    /// Statistics of every observation.
    #[inline]
    pub fn total(&self) -> &RegressionStatistics {
        &self.total
    }


    /// Number of distinct values.
    #[inline]
    pub fn n_keys(&self) -> usize {
        self.nodes.len()
    }


    /// Records the observation `(x, y)`.
    pub fn add(&mut self, x: f64, y: f64) {
        self.total.add(x, y);

        let mut current = if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        };
        let mut parent = None;
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            if x <= node.key {
                node.left.add(x, y);
                if x == node.key {
                    return;
                }
                parent = Some((id, true));
                current = node.left_child;
            } else {
                node.right.add(x, y);
                parent = Some((id, false));
                current = node.right_child;
            }
        }

        let mut left = RegressionStatistics::default();
        left.add(x, y);
        let id = self.nodes.len();
        self.nodes.push(EbstNode {
            key: x,
            left,
            right: RegressionStatistics::default(),
            left_child: None,
            right_child: None,
        });
        match parent {
            Some((p, true)) => self.nodes[p].left_child = Some(id),
            Some((p, false)) => self.nodes[p].right_child = Some(id),
            None => {},
        }
    }


    /// Calls `visit(key, left, right)` for every key in increasing order,
    /// where `left` summarizes the observations with `x <= key`
    /// and `right` the others.
    pub fn for_each_split<F>(&self, mut visit: F)
        where F: FnMut(f64, &RegressionStatistics, &RegressionStatistics)
    {
        if self.nodes.is_empty() {
            return;
        }
        let mut left = RegressionStatistics::default();
        let mut stack = vec![Walk::Enter(0)];
        while let Some(step) = stack.pop() {
            match step {
                Walk::Enter(id) => {
                    stack.push(Walk::Visit(id));
                    if let Some(child) = self.nodes[id].left_child {
                        stack.push(Walk::Enter(child));
                    }
                },
                Walk::Visit(id) => {
                    let node = &self.nodes[id];
                    left += &node.left;
                    let mut right = self.total;
                    right -= &left;
                    visit(node.key, &left, &right);

                    stack.push(Walk::Leave(id));
                    if let Some(child) = node.right_child {
                        stack.push(Walk::Enter(child));
                    }
                },
                Walk::Leave(id) => {
                    left -= &self.nodes[id].left;
                },
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_come_in_key_order_with_cumulative_counts() {
        let mut ebst = Ebst::new();
        for (x, y) in [(3.0, 1.0), (1.0, 0.0), (4.0, 2.0), (1.0, 0.5), (2.0, 0.0)] {
            ebst.add(x, y);
        }
        assert_eq!(ebst.n_keys(), 4);

        let mut splits = Vec::new();
        ebst.for_each_split(|key, left, right| {
            splits.push((key, left.count(), right.count()));
        });
        assert_eq!(
            splits,
            vec![(1.0, 2.0, 3.0), (2.0, 3.0, 2.0), (3.0, 4.0, 1.0), (4.0, 5.0, 0.0)]
        );
    }


    #[test]
    fn sorted_streams_do_not_recurse() {
        let mut ebst = Ebst::new();
        (0..5_000).for_each(|i| ebst.add(i as f64, 1.0));

        let mut n_splits = 0;
        ebst.for_each_split(|_, _, _| n_splits += 1);
        assert_eq!(n_splits, 5_000);
    }
}
