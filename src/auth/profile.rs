//! Cached profile of the connected account.

// self
use crate::_prelude::*;

/// Derived account data used to build canonical post URLs; may go stale.
///
/// Serialized with the key names of the persisted `user_info` object. Older token
/// files that stored `user_id` instead of `id`, or extra keys such as `following`,
/// still load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Platform account identifier.
	#[serde(alias = "user_id")]
	pub id: String,
	/// Account handle without the leading `@`.
	pub username: String,
	/// Human-readable display name.
	#[serde(rename = "name")]
	pub display_name: String,
	/// Follower count, when the platform reported it.
	#[serde(rename = "followers", default, skip_serializing_if = "Option::is_none")]
	pub follower_count: Option<u64>,
}
impl UserProfile {
	/// Builds a profile from the handle returned alongside an access token.
	pub fn from_handle(id: impl Into<String>, username: impl Into<String>) -> Self {
		let username = username.into();

		Self { id: id.into(), display_name: username.clone(), username, follower_count: None }
	}
}

/// Wire shape of the platform's `GET` profile response (`{data: {...}}`).
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileEnvelope {
	pub(crate) data: ProfileData,
}
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileData {
	id: String,
	username: String,
	name: String,
	#[serde(default)]
	public_metrics: Option<PublicMetrics>,
}
#[derive(Debug, Deserialize)]
struct PublicMetrics {
	#[serde(default)]
	followers_count: Option<u64>,
}
impl From<ProfileEnvelope> for UserProfile {
	fn from(envelope: ProfileEnvelope) -> Self {
		let ProfileData { id, username, name, public_metrics } = envelope.data;

		Self {
			id,
			username,
			display_name: name,
			follower_count: public_metrics.and_then(|metrics| metrics.followers_count),
		}
	}
}
