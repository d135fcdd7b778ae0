use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::Error;

/// Bot-check widget service the server validates tokens against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "Option<String>")]
pub enum CaptchaProvider {
    /// Local/demo mode, no widget
    #[default]
    None,
    Turnstile,
    Recaptcha,
}

impl CaptchaProvider {
    /// Script injected into the page before the widget can render.
    pub fn script_url(&self) -> Option<&'static str> {
        match self {
            CaptchaProvider::None => None,
            CaptchaProvider::Turnstile => {
                Some("https://challenges.cloudflare.com/turnstile/v0/api.js")
            }
            CaptchaProvider::Recaptcha => {
                Some("https://www.google.com/recaptcha/api.js?render=explicit")
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptchaProvider::None => "none",
            CaptchaProvider::Turnstile => "turnstile",
            CaptchaProvider::Recaptcha => "recaptcha",
        }
    }
}

impl fmt::Display for CaptchaProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptchaProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(CaptchaProvider::None),
            "turnstile" => Ok(CaptchaProvider::Turnstile),
            "recaptcha" => Ok(CaptchaProvider::Recaptcha),
            other => Err(Error::Config(format!("unsupported captcha provider: {other}"))),
        }
    }
}

impl TryFrom<Option<String>> for CaptchaProvider {
    type Error = Error;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        value.as_deref().unwrap_or("none").parse()
    }
}

/// Payload of `GET /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaConfig {
    #[serde(default)]
    pub captcha_provider: CaptchaProvider,
    #[serde(default)]
    pub captcha_site_key: Option<String>,
}

impl CaptchaConfig {
    pub fn site_key(&self) -> &str {
        self.captcha_site_key.as_deref().unwrap_or("")
    }
}
