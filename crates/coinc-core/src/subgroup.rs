use chrono::{DateTime, Duration, Utc};

use crate::observation::Observation;

/// What happened to a sub-group during the message currently being processed
/// (§3 "Transition flags"). Cleared to `None` by the consumer loop after the
/// Alert Decider runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionFlag {
    #[default]
    None,
    Initial,
    CoincMsg,
    Update,
    Retraction,
}

/// A set of observations judged coincident with a common anchor (§3).
///
/// Members are always kept sorted by `(neutrino_time, id)` ascending, so
/// `members()[0]` is always the anchor — [`SubGroup::repair`] is the only
/// operation that may break this invariant, and it is always called before
/// the sub-group is handed back to a caller.
#[derive(Debug, Clone)]
pub struct SubGroup {
    pub tag: u64,
    members: Vec<Observation>,
}

impl SubGroup {
    /// A fresh sub-group containing only `anchor`.
    pub fn new(tag: u64, anchor: Observation) -> Self {
        Self {
            tag,
            members: vec![anchor],
        }
    }

    pub fn members(&self) -> &[Observation] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// I4: the earliest `neutrino_time` among members. Panics on an empty
    /// sub-group — callers must drop empty sub-groups immediately, they are
    /// never retained across a public Cache operation.
    pub fn anchor_time(&self) -> DateTime<Utc> {
        self.members[0].neutrino_time
    }

    /// `obs.neutrino_time - anchor_time`, per §3's `delta` definition.
    pub fn delta_of(&self, obs: &Observation) -> Duration {
        obs.neutrino_time - self.anchor_time()
    }

    pub fn contains_detector(&self, detector_name: &str) -> bool {
        self.members.iter().any(|m| m.detector_name == detector_name)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    pub fn push(&mut self, obs: Observation) {
        self.members.push(obs);
    }

    /// Overwrites the member with the same `detector_name`, if present.
    /// Returns `false` (no-op) if this sub-group does not contain that
    /// detector — callers check [`SubGroup::contains_detector`] first.
    pub fn replace_detector(&mut self, obs: Observation) -> bool {
        match self.members.iter_mut().find(|m| m.detector_name == obs.detector_name) {
            Some(slot) => {
                *slot = obs;
                true
            }
            None => false,
        }
    }

    /// Removes every member with the given detector. Returns the number of
    /// members removed (0 or 1 under I2, but retraction does not assume I2
    /// holds ahead of the call).
    pub fn remove_detector(&mut self, detector_name: &str) -> usize {
        let before = self.members.len();
        self.members.retain(|m| m.detector_name != detector_name);
        before - self.members.len()
    }

    /// Anchor repair (§4.3.3): resort by `(neutrino_time, id)` ascending so
    /// the earliest member is first. I1 and I4 hold for the caller as soon
    /// as this returns — deltas are derived from `anchor_time()`, never
    /// stored, so there is nothing else to recompute.
    pub fn repair(&mut self) {
        self.members
            .sort_by(|a, b| a.neutrino_time.cmp(&b.neutrino_time).then_with(|| a.id.cmp(&b.id)));
        debug_assert!(!self.members.is_empty(), "repair called on an empty sub-group");
        debug_assert!(
            self.members.iter().skip(1).all(|m| self.delta_of(m) > Duration::zero()),
            "anchor repair must leave every non-anchor delta positive"
        );
    }

    /// I3: true if every member of `self` (by observation id) is also a
    /// member of `other`. A sub-group is never a subset of itself under this
    /// check's callers — they always compare against distinct tags.
    pub fn is_subset_of(&self, other: &SubGroup) -> bool {
        self.members.iter().all(|m| other.contains_id(&m.id))
    }

    /// Canonical order for the outbound alert payload (§4.3.4, §6):
    /// `neutrino_time` ascending, then `id` ascending. Members are already
    /// kept in this order, but callers should go through this accessor
    /// rather than assume it so intent stays documented at call sites.
    pub fn ordered_members(&self) -> &[Observation] {
        &self.members
    }
}
