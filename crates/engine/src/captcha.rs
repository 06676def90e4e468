//! Login captcha, enabled or disabled once at startup.
use tracing::info;

use crate::error::EngineError;

/// Token accepted by the backend when the captcha is switched off.
pub const BYPASS_TOKEN: &str = "recaptcha-bypass-token";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptchaMode {
    Disabled,
    Enabled { site_key: String },
}

impl CaptchaMode {
    pub fn resolve(enabled: bool, site_key: Option<&str>) -> Result<Self, EngineError> {
        if !enabled {
            return Ok(Self::Disabled);
        }
        match site_key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => Ok(Self::Enabled {
                site_key: key.to_string(),
            }),
            None => Err(EngineError::Config(
                "captcha is enabled but no site key is configured".to_string(),
            )),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }
}

#[derive(Debug)]
pub struct CaptchaGate {
    mode: CaptchaMode,
    solved: Option<String>,
}

impl CaptchaGate {
    pub fn new(mode: CaptchaMode) -> Self {
        info!(enabled = mode.is_enabled(), "captcha mode resolved");
        Self { mode, solved: None }
    }

    pub fn mode(&self) -> &CaptchaMode {
        &self.mode
    }

    /// Store the response of a solved challenge.
    pub fn solve(&mut self, response: impl Into<String>) {
        let response = response.into();
        self.solved = (!response.trim().is_empty()).then_some(response);
    }

    /// Token to send with the login request; `None` while a challenge is pending.
    pub fn token(&self) -> Option<&str> {
        match self.mode {
            CaptchaMode::Disabled => Some(BYPASS_TOKEN),
            CaptchaMode::Enabled { .. } => self.solved.as_deref(),
        }
    }

    /// Tokens are single use.
    pub fn reset(&mut self) {
        self.solved = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_mode_uses_bypass_token() {
        let gate = CaptchaGate::new(CaptchaMode::resolve(false, None).unwrap());
        assert_eq!(gate.token(), Some(BYPASS_TOKEN));
    }

    #[test]
    fn enabled_mode_needs_site_key() {
        assert!(matches!(
            CaptchaMode::resolve(true, Some("  ")),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn enabled_mode_waits_for_solution() {
        let mode = CaptchaMode::resolve(true, Some("site-key")).unwrap();
        let mut gate = CaptchaGate::new(mode);
        assert_eq!(gate.token(), None);
        gate.solve("03AGdBq2");
        assert_eq!(gate.token(), Some("03AGdBq2"));
        gate.reset();
        assert_eq!(gate.token(), None);
    }
}
