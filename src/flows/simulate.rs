//! Network-free stand-in used while no account is connected.

// crates.io
use rand::Rng;
// self
use crate::{
	_prelude::*,
	auth::{PlatformId, PostId},
	flows::PublishResult,
};

/// Host of every simulated post URL; `.invalid` never resolves.
pub const SIMULATED_HOST: &str = "simulated.invalid";

/// Produces well-formed but clearly synthetic publish results.
///
/// The publisher selects it once, when no token is loaded; it never stands in for a live
/// call that failed.
#[derive(Clone, Debug)]
pub struct FallbackSimulator {
	platform: PlatformId,
}
impl FallbackSimulator {
	/// Creates a simulator labeling its URLs with `platform`.
	pub fn new(platform: PlatformId) -> Self {
		Self { platform }
	}

	/// Returns a successful, simulated result without any I/O.
	pub fn publish(&self) -> PublishResult {
		let suffix: u64 = rand::rng().random();
		let post_id = format!("sim-{suffix:016x}");
		let url = format!("https://{SIMULATED_HOST}/{}/status/{post_id}", self.platform);

		PublishResult {
			success: true,
			post_id: PostId::new(&post_id).ok(),
			url: Some(url),
			username: None,
			simulated: true,
			error: None,
			error_kind: None,
			retry_after_secs: None,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn simulated_results_are_well_formed_and_distinct() {
		let simulator =
			FallbackSimulator::new(PlatformId::new("twitter").expect("Fixture id should be valid."));
		let first = simulator.publish();
		let second = simulator.publish();

		assert!(first.success);
		assert!(first.simulated);
		assert!(first.error.is_none());

		let url = Url::parse(first.url.as_deref().expect("Simulated result should carry a URL."))
			.expect("Simulated URL should parse.");

		assert_eq!(url.host_str(), Some(SIMULATED_HOST));
		assert!(url.path().starts_with("/twitter/status/sim-"));
		assert_ne!(first.post_id, second.post_id);
	}
}
