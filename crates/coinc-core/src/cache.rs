use std::collections::BTreeMap;

use chrono::Duration;

use crate::grouping;
use crate::observation::Observation;
use crate::subgroup::{SubGroup, TransitionFlag};

/// In-memory table of active sub-groups (§3 "Cache"). Single-threaded
/// mutation: the consumer loop is the sole owner and sole caller of
/// [`Cache::apply_add`], [`Cache::apply_update`] and [`Cache::retract`].
pub struct Cache {
    window: Duration,
    sub_groups: BTreeMap<u64, SubGroup>,
    flags: BTreeMap<u64, TransitionFlag>,
    next_tag: u64,
}

impl Cache {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            sub_groups: BTreeMap::new(),
            flags: BTreeMap::new(),
            next_tag: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn sub_groups(&self) -> &BTreeMap<u64, SubGroup> {
        &self.sub_groups
    }

    pub fn flags(&self) -> &BTreeMap<u64, TransitionFlag> {
        &self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.sub_groups.is_empty()
    }

    pub fn contains_detector(&self, detector_name: &str) -> bool {
        self.sub_groups.values().any(|g| g.contains_detector(detector_name))
    }

    pub(crate) fn alloc_tag(&mut self) -> u64 {
        let tag = self.next_tag;
        self.next_tag += 1;
        tag
    }

    pub(crate) fn insert_sub_group(&mut self, g: SubGroup, flag: TransitionFlag) {
        let tag = g.tag;
        self.sub_groups.insert(tag, g);
        self.flags.insert(tag, flag);
    }

    pub(crate) fn sub_groups_mut_entry(&mut self, tag: u64) -> Option<&mut SubGroup> {
        self.sub_groups.get_mut(&tag)
    }

    pub(crate) fn set_flag(&mut self, tag: u64, flag: TransitionFlag) {
        self.flags.insert(tag, flag);
    }

    /// All observations currently held by any sub-group, deduplicated on
    /// `(detector_name, neutrino_time)` as §4.3.2 requires for candidate
    /// construction. An observation present in several sub-groups (I5)
    /// contributes one entry.
    pub(crate) fn distinct_observations(&self) -> Vec<Observation> {
        let mut seen = std::collections::BTreeSet::new();
        let mut out = Vec::new();
        for g in self.sub_groups.values() {
            for m in g.members() {
                let key = (m.detector_name.clone(), m.neutrino_time);
                if seen.insert(key) {
                    out.push(m.clone());
                }
            }
        }
        out
    }

    /// Drop `candidate` if it duplicates I3 against the existing cache
    /// (ignoring `candidate`'s own tag, which is not yet in `self.sub_groups`).
    /// A singleton whose lone member already lives in some other sub-group is
    /// always redundant (I3). A singleton is never treated as an alertable
    /// coincidence by the caller regardless of this check — see
    /// [`crate::grouping::add_routine`], which inserts a surviving singleton
    /// candidate unflagged so the observation stays in the cache for future
    /// coincidence tests without producing a spurious alert (§4.4 / scenario 3).
    pub(crate) fn is_redundant(&self, candidate: &SubGroup) -> bool {
        if candidate.len() == 1 {
            let id = &candidate.members()[0].id;
            if self.sub_groups.values().any(|g| g.contains_id(id)) {
                return true;
            }
        }
        self.sub_groups.values().any(|g| candidate.is_subset_of(g))
    }

    /// Add path (§4.2) for an observation whose detector is not already in
    /// the cache. The empty-cache case seeds sub-group 0 as `INITIAL`;
    /// otherwise defers to the Grouping Engine (§4.3.2).
    pub fn apply_add(&mut self, obs: Observation) {
        if self.sub_groups.is_empty() {
            let tag = self.alloc_tag();
            let g = SubGroup::new(tag, obs);
            self.insert_sub_group(g, TransitionFlag::Initial);
            return;
        }
        grouping::add_routine(self, obs);
    }

    /// Update path (§4.2): applied to every sub-group already containing
    /// this detector. Sub-groups where the new time falls outside that
    /// sub-group's window are left untouched and unflagged.
    pub fn apply_update(&mut self, obs: Observation) {
        let mut touched = Vec::new();
        for (&tag, g) in self.sub_groups.iter_mut() {
            if !g.contains_detector(&obs.detector_name) {
                continue;
            }
            let a = g.anchor_time();
            if (obs.neutrino_time - a).abs() > self.window {
                continue;
            }
            g.replace_detector(obs.clone());
            touched.push(tag);
        }
        for tag in touched {
            if let Some(g) = self.sub_groups.get_mut(&tag) {
                g.repair();
            }
            self.flags.insert(tag, TransitionFlag::Update);
        }
    }

    /// Retraction (§4.2). Returns `false` if no sub-group contained
    /// `detector_name` — callers surface this as `UnknownDetector`, an
    /// informational log rather than a mutation or a hard error.
    pub fn retract(&mut self, detector_name: &str) -> bool {
        let mut touched = Vec::new();
        for (&tag, g) in self.sub_groups.iter_mut() {
            if g.remove_detector(detector_name) > 0 {
                touched.push(tag);
            }
        }
        if touched.is_empty() {
            return false;
        }
        for tag in touched {
            let g = self.sub_groups.get_mut(&tag).expect("tag collected above");
            if g.is_empty() {
                self.sub_groups.remove(&tag);
                self.flags.remove(&tag);
                continue;
            }
            g.repair();
            if g.len() == 1 {
                let member_id = g.members()[0].id.clone();
                let redundant = self
                    .sub_groups
                    .iter()
                    .any(|(&other_tag, other)| other_tag != tag && other.contains_id(&member_id));
                if redundant {
                    self.sub_groups.remove(&tag);
                    self.flags.remove(&tag);
                    continue;
                }
            }
            self.flags.insert(tag, TransitionFlag::Retraction);
        }
        true
    }

    /// Clears all transition flags to absent (equivalent to `NONE`), as the
    /// consumer loop does after the Alert Decider runs for one message.
    pub fn clear_flags(&mut self) {
        self.flags.clear();
    }
}
