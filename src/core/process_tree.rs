//! Parent/child relationships within a snapshot
//!
//! Built from the ppid column of a snapshot; used by the details view to show
//! a process's ancestry chain and its direct children.

use std::collections::{HashMap, HashSet};

use super::models::ProcessInfo;

/// Upper bound on ancestry walks; guards against pid reuse producing cycles.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct ProcessTree {
    parents: HashMap<u32, u32>,
    children: HashMap<u32, Vec<u32>>,
}

impl ProcessTree {
    pub fn build(processes: &[ProcessInfo]) -> Self {
        let mut tree = Self::default();
        for process in processes {
            if process.ppid != 0 && process.ppid != process.pid {
                tree.parents.insert(process.pid, process.ppid);
                tree.children.entry(process.ppid).or_default().push(process.pid);
            }
        }
        for children in tree.children.values_mut() {
            children.sort_unstable();
        }
        tree
    }

    pub fn parent(&self, pid: u32) -> Option<u32> {
        self.parents.get(&pid).copied()
    }

    pub fn children(&self, pid: u32) -> &[u32] {
        self.children.get(&pid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parent chain starting at the direct parent and ending at the root.
    pub fn ancestry(&self, pid: u32) -> Vec<u32> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([pid]);
        let mut current = pid;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent) || chain.len() >= MAX_DEPTH {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    pub fn descendant_count(&self, pid: u32) -> usize {
        let mut count = 0;
        let mut stack = vec![pid];
        let mut seen = HashSet::from([pid]);
        while let Some(current) = stack.pop() {
            for child in self.children(current) {
                if seen.insert(*child) {
                    count += 1;
                    stack.push(*child);
                }
            }
        }
        count
    }
}
