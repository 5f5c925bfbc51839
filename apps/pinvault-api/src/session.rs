//! Signed cookie sessions.
//!
//! The cookie value is `base64url(json).hex(hmac_sha256(base64url(json)))`. A cookie that fails to
//! decode or verify reads as an empty session.

use std::{convert::Infallible, sync::Arc};

use axum::{
	extract::FromRequestParts,
	http::{
		HeaderMap, HeaderValue,
		header::{COOKIE, SET_COOKIE},
		request::Parts,
	},
	response::{IntoResponseParts, Redirect, ResponseParts},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::eyre;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use pinvault_config::Security;
use pinvault_service::Tenant;

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
	#[serde(default)]
	pub authenticated: bool,
	#[serde(default)]
	pub pin: Option<String>,
	#[serde(default)]
	pub vault_id: Option<Uuid>,
	#[serde(default)]
	pub flashes: Vec<String>,
}
impl SessionData {
	pub fn tenant(&self) -> Option<Tenant> {
		if !self.authenticated {
			return None;
		}

		match (&self.pin, self.vault_id) {
			(Some(pin), Some(vault_id)) => Some(Tenant { vault_id, pin: pin.clone() }),
			_ => None,
		}
	}

	pub fn log_in(&mut self, tenant: Tenant) {
		self.authenticated = true;
		self.pin = Some(tenant.pin);
		self.vault_id = Some(tenant.vault_id);
	}

	pub fn log_out(&mut self) {
		self.authenticated = false;
		self.pin = None;
		self.vault_id = None;
	}

	pub fn flash(&mut self, message: impl Into<String>) {
		self.flashes.push(message.into());
	}

	pub fn take_flashes(&mut self) -> Vec<String> {
		std::mem::take(&mut self.flashes)
	}
}

pub struct SessionKey {
	mac: HmacSha256,
	cookie_name: String,
	secure: bool,
}
impl SessionKey {
	pub fn new(security: &Security) -> color_eyre::Result<Self> {
		let mac = HmacSha256::new_from_slice(security.session_secret.as_bytes())
			.map_err(|_| eyre::eyre!("security.session_secret is not a usable HMAC key."))?;

		Ok(Self { mac, cookie_name: security.cookie_name.clone(), secure: security.secure_cookie })
	}

	pub fn cookie_name(&self) -> &str {
		&self.cookie_name
	}

	pub fn encode(&self, data: &SessionData) -> serde_json::Result<String> {
		let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(data)?);
		let mut mac = self.mac.clone();

		mac.update(payload.as_bytes());

		let signature = hex::encode(mac.finalize().into_bytes());

		Ok(format!("{payload}.{signature}"))
	}

	pub fn decode(&self, value: &str) -> Option<SessionData> {
		let (payload, signature) = value.split_once('.')?;
		let signature = hex::decode(signature).ok()?;
		let mut mac = self.mac.clone();

		mac.update(payload.as_bytes());
		mac.verify_slice(&signature).ok()?;

		let json = URL_SAFE_NO_PAD.decode(payload).ok()?;

		serde_json::from_slice(&json).ok()
	}

	/// Reads the session from the request cookies, falling back to an empty one.
	pub fn read(&self, headers: &HeaderMap) -> SessionData {
		headers
			.get_all(COOKIE)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.flat_map(|value| value.split(';'))
			.filter_map(|pair| pair.trim().split_once('='))
			.filter(|(name, _)| *name == self.cookie_name)
			.find_map(|(_, value)| self.decode(value))
			.unwrap_or_default()
	}

	pub fn set_cookie(&self, data: &SessionData) -> serde_json::Result<String> {
		let value = self.encode(data)?;
		let secure = if self.secure { "; Secure" } else { "" };

		Ok(format!("{}={value}; Path=/; HttpOnly; SameSite=Lax{secure}", self.cookie_name))
	}
}

/// The current session. Returning it from a handler writes the updated cookie back.
pub struct Session {
	pub data: SessionData,
	key: Arc<SessionKey>,
}
impl Session {
	pub fn new(key: Arc<SessionKey>, data: SessionData) -> Self {
		Self { data, key }
	}

	pub fn flash(&mut self, message: impl Into<String>) {
		self.data.flash(message);
	}
}
impl FromRequestParts<AppState> for Session {
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Infallible> {
		let data = state.sessions.read(&parts.headers);

		Ok(Self::new(state.sessions.clone(), data))
	}
}
impl IntoResponseParts for Session {
	type Error = Infallible;

	fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Infallible> {
		let cookie = self.key.set_cookie(&self.data).map_err(|err| err.to_string()).and_then(
			|cookie| HeaderValue::from_str(&cookie).map_err(|err| err.to_string()),
		);

		match cookie {
			Ok(value) => {
				res.headers_mut().append(SET_COOKIE, value);
			},
			Err(err) => tracing::error!(error = %err, "Failed to write session cookie."),
		}

		Ok(res)
	}
}

/// A session that has logged in. Anything else is redirected to the login page.
pub struct Authenticated {
	pub session: Session,
	pub tenant: Tenant,
}
impl FromRequestParts<AppState> for Authenticated {
	type Rejection = Redirect;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Redirect> {
		let Ok(session) = Session::from_request_parts(parts, state).await;
		let tenant = session.data.tenant().ok_or_else(|| Redirect::to("/login"))?;

		Ok(Self { session, tenant })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn security(secure_cookie: bool) -> Security {
		Security {
			session_secret: "0123456789abcdef0123456789abcdef".to_string(),
			cookie_name: "pinvault_session".to_string(),
			secure_cookie,
			bind_localhost_only: true,
		}
	}

	fn logged_in() -> SessionData {
		let mut data = SessionData::default();

		data.log_in(Tenant { vault_id: Uuid::from_u128(7), pin: "1234".to_string() });
		data.flash("New vault created!");

		data
	}

	#[test]
	fn signed_sessions_decode_back() {
		let key = SessionKey::new(&security(false)).expect("Key.");
		let data = logged_in();
		let value = key.encode(&data).expect("Encode.");

		assert_eq!(key.decode(&value), Some(data));
	}

	#[test]
	fn tampering_invalidates_the_session() {
		let key = SessionKey::new(&security(false)).expect("Key.");
		let value = key.encode(&logged_in()).expect("Encode.");
		let (payload, signature) = value.split_once('.').expect("Separator.");
		let forged_payload = URL_SAFE_NO_PAD
			.encode(br#"{"authenticated":true,"pin":"9999","vault_id":null,"flashes":[]}"#);

		assert_eq!(key.decode(&format!("{forged_payload}.{signature}")), None);
		assert_eq!(key.decode(&format!("{payload}.{}", "0".repeat(64))), None);
		assert_eq!(key.decode(payload), None);
		assert_eq!(key.decode("not a cookie"), None);

		let other = SessionKey::new(&Security {
			session_secret: "another-secret-another-secret-xx".to_string(),
			..security(false)
		})
		.expect("Key.");

		assert_eq!(other.decode(&value), None);
	}

	#[test]
	fn reads_the_named_cookie_among_others() {
		let key = SessionKey::new(&security(false)).expect("Key.");
		let value = key.encode(&logged_in()).expect("Encode.");
		let mut headers = HeaderMap::new();

		headers.append(COOKIE, HeaderValue::from_static("theme=dark; pinvault_session=garbage"));
		headers.append(
			COOKIE,
			HeaderValue::from_str(&format!("other=1; pinvault_session={value}")).expect("Header."),
		);

		assert_eq!(key.read(&headers).tenant().map(|tenant| tenant.pin), Some("1234".to_string()));
		assert_eq!(key.read(&HeaderMap::new()), SessionData::default());
	}

	#[test]
	fn logout_keeps_flashes_only() {
		let mut data = logged_in();

		data.log_out();

		assert_eq!(data.tenant(), None);
		assert_eq!(data.take_flashes(), vec!["New vault created!".to_string()]);
		assert!(data.flashes.is_empty());
	}

	#[test]
	fn cookie_attributes_follow_config() {
		let plain = SessionKey::new(&security(false)).expect("Key.");
		let secure = SessionKey::new(&security(true)).expect("Key.");
		let cookie = plain.set_cookie(&SessionData::default()).expect("Cookie.");

		assert!(cookie.starts_with("pinvault_session="));
		assert!(cookie.ends_with("; Path=/; HttpOnly; SameSite=Lax"));
		assert!(
			secure.set_cookie(&SessionData::default()).expect("Cookie.").ends_with("; Secure")
		);
	}
}
