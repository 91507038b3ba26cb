//! Joining station information with station status.
//!
//! The two feeds are fetched independently, so they can disagree: a station
//! may have metadata but no status yet, or a status entry for a station that
//! has been removed. Only stations present in both are rendered.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::{JoinedStation, StationId, StationInfo, StationStatus};

/// Counts describing how well the two feeds lined up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Information records seen
    pub information: usize,
    /// Distinct station ids in the status feed
    pub status: usize,
    /// Stations emitted
    pub joined: usize,
    /// Information records with no matching status
    pub missing_status: usize,
    /// Status ids with no matching information record
    pub orphan_status: usize,
}

/// Merge information and status records by station id.
///
/// Emits one [`JoinedStation`] per information record that has a status,
/// in information order. Duplicate status ids resolve last-one-wins.
pub fn join_stations(info: &[StationInfo], status: &[StationStatus]) -> Vec<JoinedStation> {
    join_with_stats(info, status).0
}

/// Like [`join_stations`], also reporting feed skew.
pub fn join_with_stats(
    info: &[StationInfo],
    status: &[StationStatus],
) -> (Vec<JoinedStation>, JoinStats) {
    let mut index: HashMap<&StationId, &StationStatus> = HashMap::with_capacity(status.len());
    for s in status {
        if index.insert(&s.station_id, s).is_some() {
            debug!(station = %s.station_id, "duplicate station in status feed, keeping last");
        }
    }

    let mut joined = Vec::with_capacity(info.len().min(index.len()));
    let mut matched: HashSet<&StationId> = HashSet::with_capacity(index.len());
    let mut missing_status = 0;

    for station in info {
        match index.get(&station.station_id) {
            Some(s) => {
                matched.insert(&station.station_id);
                joined.push(JoinedStation {
                    station_id: station.station_id.clone(),
                    lat: station.lat,
                    lon: station.lon,
                    bikes_available: s.bikes_available,
                });
            }
            None => missing_status += 1,
        }
    }

    let stats = JoinStats {
        information: info.len(),
        status: index.len(),
        joined: joined.len(),
        missing_status,
        orphan_status: index.len() - matched.len(),
    };

    (joined, stats)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Small id alphabet so information and status overlap often.
    fn ids() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[A-F]", 0..12)
    }

    fn build(info_ids: &[String], status_ids: &[String]) -> (Vec<StationInfo>, Vec<StationStatus>) {
        let infos = info_ids
            .iter()
            .map(|id| StationInfo {
                station_id: StationId::new(id.clone()),
                lat: 0.0,
                lon: 0.0,
                name: id.clone(),
                address: None,
                capacity: None,
            })
            .collect();
        let statuses = status_ids
            .iter()
            .enumerate()
            .map(|(i, id)| StationStatus {
                station_id: StationId::new(id.clone()),
                installed: true,
                renting: true,
                returning: true,
                bikes_available: i as u32,
                docks_available: 0,
            })
            .collect();
        (infos, statuses)
    }

    proptest! {
        /// Output ids are exactly the information ids that also have a status
        #[test]
        fn set_intersection(info_ids in ids(), status_ids in ids()) {
            let (infos, statuses) = build(&info_ids, &status_ids);
            let joined = join_stations(&infos, &statuses);

            let status_set: HashSet<&String> = status_ids.iter().collect();
            let expected: Vec<&String> =
                info_ids.iter().filter(|id| status_set.contains(id)).collect();
            let actual: Vec<&str> = joined.iter().map(|j| j.station_id.as_str()).collect();

            prop_assert_eq!(actual, expected.iter().map(|s| s.as_str()).collect::<Vec<_>>());
        }

        /// Shuffling the status feed never changes the result when ids are unique
        #[test]
        fn status_order_irrelevant(info_ids in ids(), mut status_ids in ids()) {
            status_ids.sort();
            status_ids.dedup();
            let (infos, statuses) = build(&info_ids, &status_ids);
            let mut reversed = statuses.clone();
            reversed.reverse();

            let a: Vec<_> = join_stations(&infos, &statuses)
                .into_iter().map(|j| j.station_id).collect();
            let b: Vec<_> = join_stations(&infos, &reversed)
                .into_iter().map(|j| j.station_id).collect();
            prop_assert_eq!(a, b);
        }

        /// Same input, same output
        #[test]
        fn deterministic(info_ids in ids(), status_ids in ids()) {
            let (infos, statuses) = build(&info_ids, &status_ids);
            prop_assert_eq!(join_stations(&infos, &statuses), join_stations(&infos, &statuses));
        }
    }
}
