// self
use crate::_prelude::*;

/// Callback value for out-of-band (PIN) authorization.
pub const OOB_CALLBACK: &str = "oob";
/// Default maximum post length, in Unicode scalar values.
pub const DEFAULT_MAX_POST_CHARS: usize = 280;

/// Platform-specific quirks that influence how flows behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformQuirks {
	/// Maximum post length accepted before any network call is made.
	pub max_post_chars: usize,
	/// `oauth_callback` sent with the request-token call; `oob` or an absolute URL.
	pub callback: String,
	/// Extra query pairs appended (and signed) on profile lookups.
	pub profile_query: Vec<(String, String)>,
}
impl Default for PlatformQuirks {
	fn default() -> Self {
		Self {
			max_post_chars: DEFAULT_MAX_POST_CHARS,
			callback: OOB_CALLBACK.into(),
			profile_query: Vec::new(),
		}
	}
}
