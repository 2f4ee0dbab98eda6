//! Sub-group creation / assignment / anchor-repair rules invoked by the
//! [`crate::cache::Cache`] on add (§4.3). Coincidence Cache owns the data;
//! this module only contains the free functions that decide how it changes
//! shape, so they can be read and tested independently of storage.

use chrono::Duration;

use crate::cache::Cache;
use crate::observation::Observation;
use crate::subgroup::{SubGroup, TransitionFlag};

/// §4.3.1: `obs` is coincident with a sub-group anchored at `anchor_time`
/// iff `anchor_time < obs.neutrino_time <= anchor_time + window`. Strict on
/// the lower bound so an arriving message cannot masquerade as its own
/// anchor; inclusive on the upper bound.
pub fn is_coincident(anchor_time: chrono::DateTime<chrono::Utc>, obs: &Observation, window: Duration) -> bool {
    obs.neutrino_time > anchor_time && obs.neutrino_time <= anchor_time + window
}

/// §4.3.2 add routine, invoked once the Cache has determined `obs` is a new
/// detector arriving into a non-empty cache.
pub fn add_routine(cache: &mut Cache, obs: Observation) {
    let window = cache.window();

    // Step 1: append obs to every existing sub-group it is coincident with.
    let coincident_tags: Vec<u64> = cache
        .sub_groups()
        .iter()
        .filter(|(_, g)| is_coincident(g.anchor_time(), &obs, window))
        .map(|(&tag, _)| tag)
        .collect();

    for tag in &coincident_tags {
        if let Some(g) = cache.sub_groups_mut_entry(*tag) {
            g.push(obs.clone());
            g.repair();
        }
    }
    for tag in &coincident_tags {
        cache.set_flag(*tag, TransitionFlag::CoincMsg);
    }

    // Step 2: two candidate sub-groups anchored at obs, regardless of
    // whether step 1 found anything.
    let pool = cache.distinct_observations();

    let early: Vec<Observation> = pool
        .iter()
        .filter(|o| {
            let delta = o.neutrino_time - obs.neutrino_time;
            delta >= -window && delta <= Duration::zero()
        })
        .cloned()
        .collect();
    let post: Vec<Observation> = pool
        .iter()
        .filter(|o| {
            let delta = o.neutrino_time - obs.neutrino_time;
            delta >= Duration::zero() && delta <= window
        })
        .cloned()
        .collect();

    let build = |mut members: Vec<Observation>, tag: u64| -> SubGroup {
        if !members.iter().any(|m| m.id == obs.id) {
            members.push(obs.clone());
        }
        let mut candidate = SubGroup::new(tag, members.remove(0));
        for m in members {
            candidate.push(m);
        }
        candidate.repair();
        candidate
    };
    let early_tag = cache.alloc_tag();
    let post_tag = cache.alloc_tag();
    let early_candidate = build(early, early_tag);
    let post_candidate = build(post, post_tag);

    // The two candidates may overlap completely (e.g. the early window's
    // member set turns out to be exactly the post window's, or one is a
    // strict subset of the other) before either has even touched the rest
    // of the cache — I3 must hold between them too, so resolve that first.
    let survivors = if early_candidate.is_subset_of(&post_candidate) {
        vec![post_candidate]
    } else if post_candidate.is_subset_of(&early_candidate) {
        vec![early_candidate]
    } else {
        vec![early_candidate, post_candidate]
    };
    // tags assigned to a dropped candidate are simply never inserted — tags
    // need not be dense after pruning (§3).

    for candidate in survivors {
        if cache.is_redundant(&candidate) {
            continue;
        }
        // A surviving singleton absorbed no other observation, so it is not
        // a coincidence yet — keep it in the cache for future coincidence
        // tests (§4.3.2's pool) but do not flag it as one (§4.4 / scenario 3:
        // "one new sub-group {C} … no alert, singleton").
        let flag = if candidate.len() == 1 { TransitionFlag::None } else { TransitionFlag::CoincMsg };
        cache.insert_sub_group(candidate, flag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::Value;

    fn epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn obs(id: &str, det: &str, offset_secs: i64) -> Observation {
        Observation {
            id: id.to_string(),
            detector_name: det.to_string(),
            neutrino_time: epoch() + Duration::seconds(offset_secs),
            machine_time: None,
            received_time: None,
            p_val: 0.5,
            meta: Value::Null,
        }
    }

    #[test]
    fn coincidence_test_is_lower_exclusive_upper_inclusive() {
        let a = epoch();
        let w = Duration::seconds(10);
        assert!(!is_coincident(a, &obs("x", "d", 0), w));
        assert!(is_coincident(a, &obs("x", "d", 1), w));
        assert!(is_coincident(a, &obs("x", "d", 10), w));
        assert!(!is_coincident(a, &obs("x", "d", 11), w));
        assert!(!is_coincident(a, &obs("x", "d", -1), w));
    }
}
