use gather_core::event::{NewCommonEvent, NewEvent};
use gather_service::{events, organizations};

use super::{Session, print_json};
use crate::cli::EventCommand;

pub async fn run(session: &Session, cmd: EventCommand) -> anyhow::Result<()> {
  let store = &session.store;
  let profile = &session.profile;

  match cmd {
    EventCommand::Create { team, name, start, end, series } => {
      let start_time = profile.utc_from_local(start);
      let end_time = profile.utc_from_local(end);
      anyhow::ensure!(end_time > start_time, "an event must end after it starts");

      let input = NewEvent { name, series_id: series, start_time, end_time };
      let event = events::create_event(store, profile, team, input).await?;
      print_json(&event)
    }

    EventCommand::Series { team, name } => {
      let series = events::create_series(store, profile, team, name).await?;
      print_json(&series)
    }

    EventCommand::Common { org, name, start, end } => {
      let start_time = profile.utc_from_local(start);
      let end_time = profile.utc_from_local(end);
      anyhow::ensure!(end_time > start_time, "an event must end after it starts");

      let input = NewCommonEvent { name, start_time, end_time };
      let event = organizations::create_common_event(store, profile, org, input).await?;
      print_json(&event)
    }
  }
}
