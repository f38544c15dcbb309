//! Incremental mirror of the daemon's torrent list.
//!
//! The daemon hands out a cache id with every list response. Echoing it on the
//! next request makes the daemon send only what changed since then.

use std::collections::HashMap;

use tracing::debug;

use crate::action::{CACHE_ID_PARAM, LIST_PARAM};
use crate::message::ListUpdate;
use crate::model::Torrent;
use crate::transport::QueryParam;

/// Torrents keyed by hash plus the last cache id received.
#[derive(Debug, Clone, Default)]
pub struct TorrentListCache {
    cache_id: Option<String>,
    torrents: HashMap<String, Torrent>,
}

impl TorrentListCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters for the next list request: `list=1` and, if held, `cid`.
    #[must_use]
    pub fn list_request_params(&self) -> Vec<QueryParam> {
        let mut params = vec![QueryParam::new(LIST_PARAM, "1")];
        if let Some(cache_id) = &self.cache_id {
            params.push(QueryParam::new(CACHE_ID_PARAM, cache_id.as_str()));
        }
        params
    }

    /// Merges a decoded list response.
    ///
    /// A full snapshot replaces the whole map. A delta replaces changed torrents
    /// wholesale, deletes removed hashes (unknown ones are ignored) and inserts
    /// new ones. An absent cache id keeps the previous one.
    pub fn apply_update(&mut self, update: ListUpdate) {
        let ListUpdate {
            full_snapshot,
            changed,
            removed,
            cache_id,
        } = update;

        if full_snapshot {
            self.torrents.clear();
        }
        for hash in &removed {
            self.torrents.remove(hash);
        }
        let changed_count = changed.len();
        for torrent in changed {
            self.torrents.insert(torrent.hash.clone(), torrent);
        }
        if cache_id.is_some() {
            self.cache_id = cache_id;
        }

        debug!(
            full_snapshot,
            changed = changed_count,
            removed = removed.len(),
            total = self.torrents.len(),
            "Applied torrent list update"
        );
    }

    /// Every cached torrent, in no particular order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Torrent> {
        self.torrents.values().cloned().collect()
    }

    #[must_use]
    pub fn lookup(&self, hash: &str) -> Option<&Torrent> {
        self.torrents.get(hash)
    }

    #[must_use]
    pub fn cache_id(&self) -> Option<&str> {
        self.cache_id.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.torrents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.torrents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torrent(hash: &str, name: &str) -> Torrent {
        Torrent {
            hash: hash.to_string(),
            name: name.to_string(),
            ..Torrent::default()
        }
    }

    fn sorted(cache: &TorrentListCache) -> Vec<Torrent> {
        let mut torrents = cache.snapshot();
        torrents.sort_by(|a, b| a.hash.cmp(&b.hash));
        torrents
    }

    #[test]
    fn test_list_params_echo_cache_id_once_held() {
        let mut cache = TorrentListCache::new();
        let params = cache.list_request_params();
        assert_eq!(params, vec![QueryParam::new("list", "1")]);

        let update = ListUpdate::delta(Vec::new(), Vec::new(), Some("77".to_string()));
        cache.apply_update(update);
        let params = cache.list_request_params();
        assert_eq!(
            params,
            vec![QueryParam::new("list", "1"), QueryParam::new("cid", "77")]
        );
    }

    #[test]
    fn test_applying_same_update_twice_is_idempotent() {
        let update = ListUpdate::delta(
            vec![torrent("A", "a"), torrent("B", "b")],
            vec!["C".to_string()],
            Some("1".to_string()),
        );
        let mut once = TorrentListCache::new();
        once.apply_update(update.clone());
        let mut twice = TorrentListCache::new();
        twice.apply_update(update.clone());
        twice.apply_update(update);

        assert_eq!(sorted(&once), sorted(&twice));
        assert_eq!(once.cache_id(), twice.cache_id());
    }

    #[test]
    fn test_changed_torrent_is_replaced_wholesale() {
        let mut cache = TorrentListCache::new();
        let mut original = torrent("A", "old");
        original.label = "movies".to_string();
        original.progress_permille = 400;
        cache.apply_update(ListUpdate::delta(vec![original], Vec::new(), None));

        let update = ListUpdate::delta(vec![torrent("A", "new")], Vec::new(), None);
        cache.apply_update(update);

        let stored = cache.lookup("A").cloned();
        assert_eq!(stored, Some(torrent("A", "new")));
    }

    #[test]
    fn test_removing_unknown_hash_is_noop() {
        let mut cache = TorrentListCache::new();
        let update = ListUpdate::delta(vec![torrent("A", "a")], Vec::new(), None);
        cache.apply_update(update);
        let before = sorted(&cache);

        let update = ListUpdate::delta(Vec::new(), vec!["ZZZ".to_string()], None);
        cache.apply_update(update);

        assert_eq!(sorted(&cache), before);
        assert!(cache.lookup("ZZZ").is_none());
    }

    #[test]
    fn test_removal_deletes_known_hash() {
        let mut cache = TorrentListCache::new();
        cache.apply_update(ListUpdate::delta(
            vec![torrent("A", "a"), torrent("B", "b")],
            Vec::new(),
            None,
        ));
        let update = ListUpdate::delta(Vec::new(), vec!["A".to_string()], None);
        cache.apply_update(update);

        assert!(cache.lookup("A").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_absent_cache_id_keeps_previous() {
        let mut cache = TorrentListCache::new();
        let update = ListUpdate::delta(Vec::new(), Vec::new(), Some("5".to_string()));
        cache.apply_update(update);
        cache.apply_update(ListUpdate::delta(Vec::new(), Vec::new(), None));
        assert_eq!(cache.cache_id(), Some("5"));
    }

    #[test]
    fn test_full_snapshot_drops_torrents_not_listed() {
        let mut cache = TorrentListCache::new();
        cache.apply_update(ListUpdate::delta(
            vec![torrent("A", "a"), torrent("B", "b")],
            Vec::new(),
            None,
        ));

        cache.apply_update(ListUpdate {
            full_snapshot: true,
            changed: vec![torrent("B", "b2")],
            removed: Vec::new(),
            cache_id: Some("9".to_string()),
        });

        assert_eq!(sorted(&cache), vec![torrent("B", "b2")]);
        assert_eq!(cache.cache_id(), Some("9"));
    }
}
