//! Ward hotspots: density clustering over ward entity positions.
//!
//! A light DBSCAN. A point is dense when it has at least `min_points - 1`
//! other points within `eps`. Each unvisited dense point seeds a cluster
//! that grows breadth-first through dense members; non-dense members are
//! kept as border points but not expanded. Points that never join a
//! cluster are noise and are left out.
//!
//! Neighbourhoods are computed exhaustively, O(n²) in ward count.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::identity::Team;
use crate::tracking::{Position, WardEntity, WardType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardHotspot {
    pub x: f64,
    pub y: f64,
    pub count: usize,
    pub by_type: BTreeMap<WardType, usize>,
    pub by_team: BTreeMap<Team, usize>,
    pub eps: f64,
    #[serde(rename = "minpts")]
    pub min_points: usize,
}

struct Point<'a> {
    entity: &'a WardEntity,
    position: Position,
}

fn neighbours(points: &[Point<'_>], idx: usize, eps: f64) -> Vec<usize> {
    let origin = points[idx].position;
    points
        .iter()
        .enumerate()
        .filter(|&(j, p)| j != idx && origin.distance(&p.position) <= eps)
        .map(|(j, _)| j)
        .collect()
}

/// Cluster ward entities that have a known position.
pub fn ward_hotspots(entities: &[WardEntity], eps: f64, min_points: usize) -> Vec<WardHotspot> {
    let points: Vec<Point<'_>> = entities
        .iter()
        .filter_map(|entity| {
            entity.position.map(|position| Point { entity, position })
        })
        .collect();

    let mut used = vec![false; points.len()];
    let mut hotspots = Vec::new();

    for i in 0..points.len() {
        if used[i] || neighbours(&points, i, eps).len() + 1 < min_points {
            continue;
        }

        let mut members = Vec::new();
        let mut queue = VecDeque::from([i]);
        used[i] = true;
        while let Some(u) = queue.pop_front() {
            members.push(u);
            let around = neighbours(&points, u, eps);
            if around.len() + 1 < min_points {
                continue;
            }
            for v in around {
                if !used[v] {
                    used[v] = true;
                    queue.push_back(v);
                }
            }
        }

        hotspots.push(summarize(&points, &members, eps, min_points));
    }

    tracing::debug!(
        wards = points.len(),
        hotspots = hotspots.len(),
        "Ward hotspot clustering complete"
    );
    hotspots
}

fn summarize(points: &[Point<'_>], members: &[usize], eps: f64, min_points: usize) -> WardHotspot {
    let centroid = Position::centroid(members.iter().map(|&m| &points[m].position))
        .unwrap_or(Position::new(0.0, 0.0));
    let mut by_type = BTreeMap::new();
    let mut by_team = BTreeMap::new();
    for &m in members {
        *by_type.entry(points[m].entity.ward_type).or_insert(0) += 1;
        *by_team.entry(points[m].entity.team).or_insert(0) += 1;
    }
    WardHotspot {
        x: centroid.x,
        y: centroid.y,
        count: members.len(),
        by_type,
        by_team,
        eps,
        min_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ward(x: f64, y: f64, ward_type: WardType, team: Team) -> WardEntity {
        WardEntity {
            ward_type,
            team,
            position: Some(Position::new(x, y)),
        }
    }

    #[test]
    fn test_star_forms_one_cluster() {
        // All points within eps of the centre point
        let wards = vec![
            ward(0.0, 0.0, WardType::Observer, Team::Radiant),
            ward(1000.0, 0.0, WardType::Observer, Team::Radiant),
            ward(-1000.0, 0.0, WardType::Sentry, Team::Dire),
            ward(0.0, 1100.0, WardType::Observer, Team::Dire),
        ];
        let hotspots = ward_hotspots(&wards, 1200.0, 3);

        assert_eq!(hotspots.len(), 1);
        let h = &hotspots[0];
        assert_eq!(h.count, 4);
        assert_eq!(h.by_type[&WardType::Observer], 3);
        assert_eq!(h.by_type[&WardType::Sentry], 1);
        assert_eq!(h.by_team[&Team::Radiant], 2);
        assert!((h.x - 0.0).abs() < 1e-9);
        assert!((h.y - 275.0).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_points_are_noise() {
        let wards = vec![
            ward(0.0, 0.0, WardType::Observer, Team::Radiant),
            ward(100.0, 0.0, WardType::Observer, Team::Radiant),
            ward(0.0, 100.0, WardType::Observer, Team::Radiant),
            ward(9000.0, 9000.0, WardType::Observer, Team::Dire),
        ];
        let hotspots = ward_hotspots(&wards, 1200.0, 3);
        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].count, 3);
    }

    #[test]
    fn test_too_sparse_is_empty() {
        let wards = vec![
            ward(0.0, 0.0, WardType::Observer, Team::Radiant),
            ward(100.0, 0.0, WardType::Observer, Team::Radiant),
        ];
        assert!(ward_hotspots(&wards, 1200.0, 3).is_empty());
    }

    #[test]
    fn test_entities_without_position_are_skipped() {
        let mut wards = vec![
            ward(0.0, 0.0, WardType::Observer, Team::Radiant),
            ward(100.0, 0.0, WardType::Observer, Team::Radiant),
        ];
        wards.push(WardEntity {
            ward_type: WardType::Observer,
            team: Team::Radiant,
            position: None,
        });
        assert!(ward_hotspots(&wards, 1200.0, 3).is_empty());
    }

    #[test]
    fn test_two_separate_clusters() {
        let mut wards = Vec::new();
        for dx in [0.0, 50.0, 100.0] {
            wards.push(ward(dx, 0.0, WardType::Observer, Team::Radiant));
            wards.push(ward(5000.0 + dx, 5000.0, WardType::Sentry, Team::Dire));
        }
        let hotspots = ward_hotspots(&wards, 1200.0, 3);
        assert_eq!(hotspots.len(), 2);
        assert!(hotspots.iter().all(|h| h.count == 3));
    }
}
