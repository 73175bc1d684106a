//! Interactive three-legged OAuth 1.0a walkthrough for X (Twitter).
//!
//! Reads `TWITTER_APP_KEY` and `TWITTER_APP_SECRET` from the environment. If the token file
//! already holds credentials the authorization step is skipped; otherwise the example
//! prints the authorize URL, waits for the PIN (or `oauth_verifier`) via stdin, and stores
//! the resulting access token. It can then publish a post, simulated when no account is
//! connected.

// std
use std::io::{self, Write};
// crates.io
use color_eyre::Result;
// self
use oauth1_publisher::{
	config::PublisherConfig,
	flows::{AuthenticatedPublisher, TokenExchangeClient},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = PublisherConfig::from_env()?;
	let platform = config.platform()?;
	let publisher = AuthenticatedPublisher::open(platform.clone()).await;

	println!("Token file: {}", config.token_path.display());

	if publisher.status().connected {
		let profile = publisher.verify_credentials().await?;

		println!("Already connected as @{}.", profile.username);
	} else {
		let exchange = TokenExchangeClient::new(platform);
		let authorize_url = exchange.get_authorization_url().await?;

		println!("Authorize URL: {authorize_url}");
		println!("Approve the application, then paste the PIN or `oauth_verifier` shown by X.");

		match prompt_optional("Verifier (leave blank to stay in simulated mode)")? {
			Some(verifier) => {
				let token = exchange.complete_authorization(&verifier).await?;
				let profile = exchange.access_token().and_then(|(_, profile)| profile);

				publisher.connect(token, profile);

				println!("Connected; token saved to {}.", config.token_path.display());
			},
			None => println!("Verifier not provided; publishes will be simulated."),
		}
	}

	let Some(text) = prompt_optional("Post text (leave blank to skip publishing)")? else {
		println!("Publishing skipped.");

		return Ok(());
	};
	let result = publisher.publish_report(&text).await;

	println!("{}", serde_json::to_string_pretty(&result)?);

	Ok(())
}

fn prompt_optional(message: &str) -> Result<Option<String>> {
	print!("{message}: ");

	io::stdout().flush()?;

	let mut input = String::new();

	io::stdin().read_line(&mut input)?;

	let trimmed = input.trim();

	if trimmed.is_empty() { Ok(None) } else { Ok(Some(trimmed.to_owned())) }
}
