//! Mapping a caller onto its profile.

use gather_core::{
  profile::{Caller, Profile, ProfileDefaults},
  store::CommunityStore,
};
use tracing::{debug, info};

use crate::{Result, ServiceError};

/// The profile acting on behalf of `caller`.
///
/// Anonymous callers get [`Profile::anonymous`] and the store is not
/// touched. Authenticated callers get their stored profile, which is created
/// from the identity's attributes the first time it is seen. The identity's
/// superuser flag is attached to the returned value on every call.
pub async fn resolve_profile<S>(store: &S, caller: &Caller) -> Result<Profile>
where
  S: CommunityStore,
{
  let Caller::Authenticated(identity) = caller else {
    return Ok(Profile::anonymous());
  };

  let (mut profile, created) = store
    .get_or_create_profile(
      identity.username.clone(),
      ProfileDefaults::for_identity(identity),
    )
    .await
    .map_err(ServiceError::store)?;

  if created {
    info!(username = %identity.username, profile_id = %profile.profile_id, "created profile");
  } else {
    debug!(username = %identity.username, "resolved existing profile");
  }

  if let Some(user) = profile.user.as_mut() {
    user.is_superuser = identity.is_superuser;
  }
  Ok(profile)
}
