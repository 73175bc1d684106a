//! Strongly typed identifiers for platforms and published posts.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (platform, post).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (platform, post).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (platform, post).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { PlatformId, "Identifier for a publishing platform descriptor.", "Platform" }
def_id! { PostId, "Identifier the platform assigned to a published post.", "Post" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_empty_values() {
		assert!(PlatformId::new(" twitter").is_err(), "Leading whitespace must be rejected.");
		assert!(PlatformId::new("twitter ").is_err(), "Trailing whitespace must be rejected.");
		assert!(PostId::new("").is_err());

		let platform = PlatformId::new("twitter").expect("Platform fixture should be valid.");

		assert_eq!(platform.as_ref(), "twitter");
		assert_eq!(platform.to_string(), "twitter");
		assert_eq!(format!("{platform:?}"), "Platform(twitter)");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let post: PostId =
			serde_json::from_str("\"1445880548472328192\"").expect("Post id should deserialize.");

		assert_eq!(post.as_ref(), "1445880548472328192");
		assert!(serde_json::from_str::<PostId>("\"with space\"").is_err());
		assert_eq!(
			serde_json::to_string(&post).expect("Post id should serialize."),
			"\"1445880548472328192\""
		);
	}

	#[test]
	fn length_limit_is_enforced() {
		let exact = "1".repeat(IDENTIFIER_MAX_LEN);

		PostId::new(&exact).expect("Exact length should succeed.");

		let too_long = "1".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(PostId::new(&too_long).is_err());
	}
}
