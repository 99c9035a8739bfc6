//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - Holding URLs accepted for fetching until a worker is free
//! - Handing them out in the configured queue order
//! - Tagging each entry with its link depth and discovery sequence

use crate::config::QueueOrder;
use crate::url::CanonicalUrl;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone)]
pub struct QueuedUrl {
    /// Deduplication key
    pub canonical: CanonicalUrl,

    /// The URL actually requested
    pub fetch_url: Url,

    /// Link distance from the seed (the seed is 0)
    pub depth: u32,

    /// Insertion sequence, unique per scheduler
    pub seq: u64,
}

// Implement ordering traits for priority queue
// Shallower entries pop first from BinaryHeap, ties go to the earliest insert
impl Ord for QueuedUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .depth
            .cmp(&self.depth)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedUrl {}

#[derive(Debug)]
enum Frontier {
    Stack(Vec<QueuedUrl>),
    Queue(VecDeque<QueuedUrl>),
    Heap(BinaryHeap<QueuedUrl>),
}

/// Scheduler manages the frontier queue
///
/// It owns no synchronization: the coordinator is the only caller.
#[derive(Debug)]
pub struct Scheduler {
    frontier: Frontier,
    order: QueueOrder,
    next_seq: u64,
}

impl Scheduler {
    /// Creates an empty scheduler with the given queue order
    pub fn new(order: QueueOrder) -> Self {
        let frontier = match order {
            QueueOrder::DepthFirst => Frontier::Stack(Vec::new()),
            QueueOrder::Fifo => Frontier::Queue(VecDeque::new()),
            QueueOrder::ShallowestFirst => Frontier::Heap(BinaryHeap::new()),
        };

        Self {
            frontier,
            order,
            next_seq: 0,
        }
    }

    /// Queues a single URL
    pub fn push(&mut self, canonical: CanonicalUrl, fetch_url: Url, depth: u32) {
        let entry = QueuedUrl {
            canonical,
            fetch_url,
            depth,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        match &mut self.frontier {
            Frontier::Stack(stack) => stack.push(entry),
            Frontier::Queue(queue) => queue.push_back(entry),
            Frontier::Heap(heap) => heap.push(entry),
        }
    }

    /// Queues the links found on one page, in discovery order
    ///
    /// With depth-first order the batch is pushed in reverse, so the page's
    /// links are popped in the order they were found and ahead of anything
    /// queued earlier. Links are marked visited when they are queued, so a
    /// link shared by a page and one of its children keeps its place in the
    /// parent's batch instead of being fetched first through the child.
    pub fn push_batch(&mut self, batch: Vec<(CanonicalUrl, Url)>, depth: u32) {
        if self.order == QueueOrder::DepthFirst {
            for (canonical, fetch_url) in batch.into_iter().rev() {
                self.push(canonical, fetch_url, depth);
            }
        } else {
            for (canonical, fetch_url) in batch {
                self.push(canonical, fetch_url, depth);
            }
        }
    }

    /// Takes the next URL to fetch
    pub fn pop(&mut self) -> Option<QueuedUrl> {
        match &mut self.frontier {
            Frontier::Stack(stack) => stack.pop(),
            Frontier::Queue(queue) => queue.pop_front(),
            Frontier::Heap(heap) => heap.pop(),
        }
    }

    /// Empties the frontier, returning whatever was still queued
    pub fn drain(&mut self) -> Vec<QueuedUrl> {
        let mut remaining = Vec::with_capacity(self.len());
        while let Some(entry) = self.pop() {
            remaining.push(entry);
        }
        remaining
    }

    /// Number of queued URLs
    pub fn len(&self) -> usize {
        match &self.frontier {
            Frontier::Stack(stack) => stack.len(),
            Frontier::Queue(queue) => queue.len(),
            Frontier::Heap(heap) => heap.len(),
        }
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
