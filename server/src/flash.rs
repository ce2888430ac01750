//! One-time messages shown on the next rendered page.
//!
//! Pending messages are kept client-side in a cookie so they survive a redirect.
//! Rendering a page takes them, which clears the cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Success,
    Info,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: Category,
    pub message: String,
}

/// Queues a message for the next rendered page.
pub fn push(jar: CookieJar, category: Category, message: impl Into<String>) -> CookieJar {
    let mut flashes = pending(&jar);
    flashes.push(Flash {
        category,
        message: message.into(),
    });

    match encode(&flashes) {
        Some(value) => jar.add(
            Cookie::build((FLASH_COOKIE, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        ),
        None => {
            tracing::warn!("Could not encode flash messages");
            jar
        }
    }
}

/// Removes and returns every pending message.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    let flashes = pending(&jar);
    let jar = match jar.get(FLASH_COOKIE) {
        Some(_) => jar.remove(Cookie::build(FLASH_COOKIE).path("/")),
        None => jar,
    };
    (jar, flashes)
}

const FLASH_COOKIE: &str = "flash";

/// Cookies are client-controlled, so anything undecodable is treated as empty.
fn pending(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

fn encode(flashes: &[Flash]) -> Option<String> {
    serde_json::to_vec(flashes).ok().map(|json| URL_SAFE_NO_PAD.encode(json))
}

fn decode(value: &str) -> Option<Vec<Flash>> {
    let json = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&json).ok()
}
