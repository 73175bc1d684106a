//! Auth-domain identifiers, credentials, token pairs, and the cached account profile.

pub mod credentials;
pub mod id;
pub mod profile;
pub mod token;

pub use credentials::*;
pub use id::*;
pub use profile::UserProfile;
pub use token::{pair::*, secret::*};
