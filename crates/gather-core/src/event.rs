//! Team events, event series and organization-wide common events: the parts
//! the authorization policy and the team and organization pages need.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recurring run of events belonging to one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
  pub series_id:  Uuid,
  pub team_id:    Uuid,
  pub name:       String,
  pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:   Uuid,
  pub team_id:    Uuid,
  pub series_id:  Option<Uuid>,
  pub name:       String,
  pub created_by: Option<Uuid>,
  pub start_time: DateTime<Utc>,
  pub end_time:   DateTime<Utc>,
}

/// Input to event creation; the team and creator come from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
  pub name:       String,
  pub series_id:  Option<Uuid>,
  pub start_time: DateTime<Utc>,
  pub end_time:   DateTime<Utc>,
}

impl NewEvent {
  pub fn into_event(self, team_id: Uuid, created_by: Option<Uuid>) -> Event {
    Event {
      event_id: Uuid::new_v4(),
      team_id,
      series_id: self.series_id,
      name: self.name,
      created_by,
      start_time: self.start_time,
      end_time: self.end_time,
    }
  }
}

// ─── Common events ───────────────────────────────────────────────────────────

/// An event held by an organization as a whole rather than by one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonEvent {
  pub common_event_id: Uuid,
  pub organization_id: Uuid,
  pub name:            String,
  pub created_by:      Option<Uuid>,
  pub start_time:      DateTime<Utc>,
  pub end_time:        DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommonEvent {
  pub name:       String,
  pub start_time: DateTime<Utc>,
  pub end_time:   DateTime<Utc>,
}

impl NewCommonEvent {
  pub fn into_common_event(self, organization_id: Uuid, created_by: Option<Uuid>) -> CommonEvent {
    CommonEvent {
      common_event_id: Uuid::new_v4(),
      organization_id,
      name: self.name,
      created_by,
      start_time: self.start_time,
      end_time: self.end_time,
    }
  }
}
