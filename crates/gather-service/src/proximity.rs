//! Ordering teams by distance from the caller.

use std::cmp::Ordering;

use gather_core::team::Team;

/// Distance from some reference point to a team, in any consistent unit.
///
/// `None` means the distance is unknown; such teams sort after every team
/// with a known distance.
pub trait TeamDistance {
  fn distance_from(&self, team: &Team) -> Option<f64>;
}

impl<F> TeamDistance for F
where
  F: Fn(&Team) -> Option<f64>,
{
  fn distance_from(&self, team: &Team) -> Option<f64> { self(team) }
}

/// No reference point: every distance is unknown and the input order stands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlocated;

impl TeamDistance for Unlocated {
  fn distance_from(&self, _team: &Team) -> Option<f64> { None }
}

/// Stable sort of `teams` by ascending distance, unknown distances last.
pub fn sort_by_proximity<D>(teams: Vec<Team>, distance: &D) -> Vec<Team>
where
  D: TeamDistance + ?Sized,
{
  let mut keyed: Vec<(Option<f64>, Team)> = teams
    .into_iter()
    .map(|t| (distance.distance_from(&t), t))
    .collect();
  keyed.sort_by(|(a, _), (b, _)| match (a, b) {
    (Some(a), Some(b)) => a.total_cmp(b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  });
  keyed.into_iter().map(|(_, t)| t).collect()
}
