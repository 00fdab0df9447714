use gather_core::membership::Role;
use gather_service::members;

use super::{Session, print_json};
use crate::cli::MemberCommand;

pub async fn run(session: &Session, cmd: MemberCommand) -> anyhow::Result<()> {
  let store = &session.store;
  let profile = &session.profile;

  match cmd {
    MemberCommand::Join { team } => {
      session.require_signed_in()?;
      let membership =
        members::add_member(store, profile, team, profile.profile_id, Role::Normal).await?;
      print_json(&membership)
    }

    MemberCommand::Add { team, username, role } => {
      let member = session.profile_by_username(&username).await?;
      let membership =
        members::add_member(store, profile, team, member.profile_id, role).await?;
      print_json(&membership)
    }

    MemberCommand::Role { team, username, role } => {
      let member = session.profile_by_username(&username).await?;
      let membership = members::set_role(store, profile, team, member.profile_id, role).await?;
      print_json(&membership)
    }

    MemberCommand::Remove { team, username } => {
      let member = session.profile_by_username(&username).await?;
      members::remove_member(store, profile, team, member.profile_id).await?;
      print_json(&serde_json::json!({ "team": team, "removed": username }))
    }
  }
}
