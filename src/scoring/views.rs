//! Memoized views over the additive knowledge base
//!
//! Category groupings and concern statistics are derived from the immutable
//! knowledge base and memoized per [`ViewKey`]. The memo only grows until
//! [`KnowledgeBaseViews::clear`] is called; entries never expire. It is never
//! consulted while scoring a product.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::additives::ConcernCounts;
use super::knowledge_base::AdditiveKnowledgeBase;
use crate::models::ConcernLevel;

/// Identifies one memoized view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    CategoryGroups,
    Statistics,
    CodesByConcern(ConcernLevel),
}

/// Aggregate statistics over the knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeBaseStats {
    pub total_entries: usize,
    pub range_entries: usize,
    pub by_concern: ConcernCounts,
    pub by_category: BTreeMap<String, usize>,
    pub combination_rules: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum View {
    Groups(BTreeMap<String, Vec<String>>),
    Stats(KnowledgeBaseStats),
    Codes(Vec<String>),
}

/// Hit/miss counters for the memo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Read-through memo of views over one knowledge base
#[derive(Debug)]
pub struct KnowledgeBaseViews {
    knowledge_base: Arc<AdditiveKnowledgeBase>,
    memo: Mutex<HashMap<ViewKey, Arc<View>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl KnowledgeBaseViews {
    pub fn new(knowledge_base: Arc<AdditiveKnowledgeBase>) -> Self {
        Self {
            knowledge_base,
            memo: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn knowledge_base(&self) -> &AdditiveKnowledgeBase {
        &self.knowledge_base
    }

    /// Category name -> codes, both sorted
    pub fn category_groups(&self) -> BTreeMap<String, Vec<String>> {
        let kb = self.knowledge_base();
        match &*self.get_or_build(ViewKey::CategoryGroups, || View::Groups(build_groups(kb))) {
            View::Groups(groups) => groups.clone(),
            _ => build_groups(kb),
        }
    }

    pub fn statistics(&self) -> KnowledgeBaseStats {
        let kb = self.knowledge_base();
        match &*self.get_or_build(ViewKey::Statistics, || View::Stats(build_stats(kb))) {
            View::Stats(stats) => stats.clone(),
            _ => build_stats(kb),
        }
    }

    /// Codes (or range keys) at one concern level, sorted
    pub fn codes_by_concern(&self, level: ConcernLevel) -> Vec<String> {
        let kb = self.knowledge_base();
        let key = ViewKey::CodesByConcern(level);
        match &*self.get_or_build(key, || View::Codes(build_codes(kb, level))) {
            View::Codes(codes) => codes.clone(),
            _ => build_codes(kb, level),
        }
    }

    pub fn contains(&self, key: ViewKey) -> bool {
        self.lock().contains_key(&key)
    }

    /// Drop every memoized view; returns how many were removed
    pub fn clear(&self) -> usize {
        let mut memo = self.lock();
        let removed = memo.len();
        memo.clear();
        tracing::info!("Cleared {} knowledge base views", removed);
        removed
    }

    pub fn stats(&self) -> ViewCacheStats {
        ViewCacheStats {
            entries: self.lock().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn get_or_build<F>(&self, key: ViewKey, build: F) -> Arc<View>
    where
        F: FnOnce() -> View,
    {
        let mut memo = self.lock();
        if let Some(view) = memo.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(view);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(?key, "Building knowledge base view");
        let view = Arc::new(build());
        memo.insert(key, Arc::clone(&view));
        view
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ViewKey, Arc<View>>> {
        // The memo holds derived data only, so a poisoned lock is still usable
        self.memo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn build_groups(kb: &AdditiveKnowledgeBase) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in kb.entries() {
        groups
            .entry(entry.category.clone())
            .or_default()
            .push(entry.code.clone());
    }
    for codes in groups.values_mut() {
        codes.sort();
    }
    groups
}

fn build_stats(kb: &AdditiveKnowledgeBase) -> KnowledgeBaseStats {
    let mut by_concern = ConcernCounts::default();
    let mut by_category = BTreeMap::new();
    let mut range_entries = 0;

    for entry in kb.entries() {
        by_concern.add(entry.concern_level);
        *by_category.entry(entry.category.clone()).or_insert(0) += 1;
        if entry.code.contains('-') {
            range_entries += 1;
        }
    }

    KnowledgeBaseStats {
        total_entries: kb.len(),
        range_entries,
        by_concern,
        by_category,
        combination_rules: kb.combinations().len(),
    }
}

fn build_codes(kb: &AdditiveKnowledgeBase, level: ConcernLevel) -> Vec<String> {
    let mut codes: Vec<String> = kb
        .entries()
        .iter()
        .filter(|entry| entry.concern_level == level)
        .map(|entry| entry.code.clone())
        .collect();
    codes.sort();
    codes
}
