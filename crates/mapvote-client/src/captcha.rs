//! Captcha widget loading.
//!
//! Each external provider's script is injected at most once per loader.
//! Render requests that arrive while the script is still loading are
//! queued and rendered when the host reports the script ready.

use parking_lot::Mutex;
use std::{collections::HashMap, fmt, sync::Arc};

use mapvote_common::{CaptchaConfig, CaptchaProvider};

use crate::error::CaptchaError;

/// Token handed to the provider "none".
pub const PLACEHOLDER_TOKEN: &str = "dev";

pub type TokenCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Where a widget is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MountPoint(pub String);

impl MountPoint {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The page environment a widget lives in.
pub trait CaptchaHost: Send + Sync {
    /// Start loading a provider script. Completion is reported back through
    /// `CaptchaLoader::script_ready`.
    fn inject_script(&self, provider: CaptchaProvider, url: &str) -> Result<(), CaptchaError>;

    fn mount_available(&self, mount: &MountPoint) -> bool;

    fn render(
        &self,
        provider: CaptchaProvider,
        mount: &MountPoint,
        site_key: &str,
        on_token: TokenCallback,
    ) -> Result<(), CaptchaError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

/// What `CaptchaLoader::mount` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// Provider "none": token already delivered, no widget
    Placeholder,
    /// Waiting for the provider script
    Queued,
    Rendered,
    /// Script ready but the mount point is gone; nothing rendered
    Skipped,
}

struct RenderRequest {
    mount: MountPoint,
    site_key: String,
    on_token: TokenCallback,
}

#[derive(Default)]
struct ProviderSlot {
    state: ScriptState,
    pending: Vec<RenderRequest>,
}

pub struct CaptchaLoader<H: CaptchaHost> {
    host: Arc<H>,
    providers: Mutex<HashMap<CaptchaProvider, ProviderSlot>>,
}

impl<H: CaptchaHost> CaptchaLoader<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            providers: Mutex::new(HashMap::new()),
        }
    }

    pub fn script_state(&self, provider: CaptchaProvider) -> ScriptState {
        self.providers
            .lock()
            .get(&provider)
            .map(|slot| slot.state)
            .unwrap_or_default()
    }

    pub fn pending(&self, provider: CaptchaProvider) -> usize {
        self.providers
            .lock()
            .get(&provider)
            .map(|slot| slot.pending.len())
            .unwrap_or(0)
    }

    /// Mount a widget for `config` at `mount`, delivering the token to
    /// `on_token` once the user solves it.
    pub fn mount(
        &self,
        config: &CaptchaConfig,
        mount: MountPoint,
        on_token: TokenCallback,
    ) -> Result<MountOutcome, CaptchaError> {
        let provider = config.captcha_provider;
        let Some(url) = provider.script_url() else {
            on_token(PLACEHOLDER_TOKEN.to_string());
            return Ok(MountOutcome::Placeholder);
        };

        let request = RenderRequest {
            mount,
            site_key: config.site_key().to_string(),
            on_token,
        };

        enum Next {
            Render(RenderRequest),
            Wait,
            Inject,
        }

        let next = {
            let mut providers = self.providers.lock();
            let slot = providers.entry(provider).or_default();
            match slot.state {
                ScriptState::Loaded => Next::Render(request),
                ScriptState::Loading => {
                    slot.pending.push(request);
                    Next::Wait
                }
                ScriptState::Unloaded => {
                    slot.state = ScriptState::Loading;
                    slot.pending.push(request);
                    Next::Inject
                }
            }
        };

        match next {
            Next::Render(request) => return self.render(provider, request),
            Next::Wait => {}
            Next::Inject => {
                tracing::info!("Injecting {} captcha script", provider);
                if let Err(e) = self.host.inject_script(provider, url) {
                    let mut providers = self.providers.lock();
                    if let Some(slot) = providers.get_mut(&provider) {
                        slot.state = ScriptState::Unloaded;
                        slot.pending.clear();
                    }
                    return Err(e);
                }
            }
        }
        Ok(MountOutcome::Queued)
    }

    /// Called when a provider script signals readiness. Renders every queued
    /// request whose mount point exists; the rest stay queued for the next
    /// readiness signal. Returns how many widgets were rendered.
    pub fn script_ready(&self, provider: CaptchaProvider) -> usize {
        let queued = {
            let mut providers = self.providers.lock();
            let slot = providers.entry(provider).or_default();
            slot.state = ScriptState::Loaded;
            std::mem::take(&mut slot.pending)
        };

        let mut rendered = 0;
        let mut waiting = Vec::new();
        for request in queued {
            if !self.host.mount_available(&request.mount) {
                tracing::debug!("Mount point {} not available yet", request.mount);
                waiting.push(request);
                continue;
            }
            match self.render_now(provider, &request) {
                Ok(()) => rendered += 1,
                Err(e) => tracing::warn!("Captcha render failed: {}", e),
            }
        }

        if !waiting.is_empty() {
            let mut providers = self.providers.lock();
            providers
                .entry(provider)
                .or_default()
                .pending
                .extend(waiting);
        }
        rendered
    }

    fn render(
        &self,
        provider: CaptchaProvider,
        request: RenderRequest,
    ) -> Result<MountOutcome, CaptchaError> {
        if !self.host.mount_available(&request.mount) {
            return Ok(MountOutcome::Skipped);
        }
        self.render_now(provider, &request)?;
        Ok(MountOutcome::Rendered)
    }

    fn render_now(
        &self,
        provider: CaptchaProvider,
        request: &RenderRequest,
    ) -> Result<(), CaptchaError> {
        self.host.render(
            provider,
            &request.mount,
            &request.site_key,
            request.on_token.clone(),
        )
    }
}

/// Host for environments without a browser: the script is "ready" as soon as
/// it is injected and solving the widget yields a token supplied up front.
pub struct PresetTokenHost {
    token: String,
    injected: Mutex<Vec<String>>,
}

impl PresetTokenHost {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            injected: Mutex::new(Vec::new()),
        }
    }

    pub fn injected_scripts(&self) -> Vec<String> {
        self.injected.lock().clone()
    }
}

impl CaptchaLoader<PresetTokenHost> {
    /// Mount the widget for `config` and return the token it delivers. The
    /// preset host is ready as soon as its script has been injected.
    pub fn solve(
        &self,
        config: &CaptchaConfig,
        mount: MountPoint,
    ) -> Result<String, CaptchaError> {
        let token = Arc::new(Mutex::new(String::new()));
        let sink = token.clone();
        let on_token: TokenCallback = Arc::new(move |t| *sink.lock() = t);

        if self.mount(config, mount, on_token)? == MountOutcome::Queued {
            self.script_ready(config.captcha_provider);
        }
        let token = token.lock().clone();
        Ok(token)
    }
}

impl CaptchaHost for PresetTokenHost {
    fn inject_script(&self, provider: CaptchaProvider, url: &str) -> Result<(), CaptchaError> {
        tracing::debug!("Preset host loading {} script from {}", provider, url);
        self.injected.lock().push(url.to_string());
        Ok(())
    }

    fn mount_available(&self, _mount: &MountPoint) -> bool {
        true
    }

    fn render(
        &self,
        _provider: CaptchaProvider,
        _mount: &MountPoint,
        _site_key: &str,
        on_token: TokenCallback,
    ) -> Result<(), CaptchaError> {
        on_token(self.token.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingHost {
        injected: Mutex<Vec<String>>,
        rendered: Mutex<Vec<(MountPoint, String)>>,
        mount_missing: AtomicBool,
    }

    impl CaptchaHost for RecordingHost {
        fn inject_script(&self, _: CaptchaProvider, url: &str) -> Result<(), CaptchaError> {
            self.injected.lock().push(url.to_string());
            Ok(())
        }

        fn mount_available(&self, _: &MountPoint) -> bool {
            !self.mount_missing.load(Ordering::SeqCst)
        }

        fn render(
            &self,
            _: CaptchaProvider,
            mount: &MountPoint,
            site_key: &str,
            on_token: TokenCallback,
        ) -> Result<(), CaptchaError> {
            self.rendered.lock().push((mount.clone(), site_key.to_string()));
            on_token(format!("token-for-{}", mount));
            Ok(())
        }
    }

    fn collector() -> (TokenCallback, Arc<Mutex<Vec<String>>>) {
        let tokens = Arc::new(Mutex::new(Vec::new()));
        let sink = tokens.clone();
        let callback: TokenCallback = Arc::new(move |t| sink.lock().push(t));
        (callback, tokens)
    }

    fn turnstile() -> CaptchaConfig {
        CaptchaConfig {
            captcha_provider: CaptchaProvider::Turnstile,
            captcha_site_key: Some("site-key".to_string()),
        }
    }

    #[test]
    fn test_none_delivers_placeholder_synchronously() {
        let host = Arc::new(RecordingHost::default());
        let loader = CaptchaLoader::new(host.clone());
        let (callback, tokens) = collector();

        let outcome = loader
            .mount(&CaptchaConfig::default(), MountPoint::new("vote"), callback)
            .unwrap();

        assert_eq!(outcome, MountOutcome::Placeholder);
        assert_eq!(*tokens.lock(), vec!["dev".to_string()]);
        assert!(host.injected.lock().is_empty());
    }

    #[test]
    fn test_script_injected_once_for_concurrent_mounts() {
        let host = Arc::new(RecordingHost::default());
        let loader = CaptchaLoader::new(host.clone());
        let (callback, tokens) = collector();

        for id in ["a", "b"] {
            let outcome = loader
                .mount(&turnstile(), MountPoint::new(id), callback.clone())
                .unwrap();
            assert_eq!(outcome, MountOutcome::Queued);
        }
        assert_eq!(host.injected.lock().len(), 1);
        assert_eq!(loader.script_state(CaptchaProvider::Turnstile), ScriptState::Loading);
        assert_eq!(loader.pending(CaptchaProvider::Turnstile), 2);

        assert_eq!(loader.script_ready(CaptchaProvider::Turnstile), 2);
        assert_eq!(
            *tokens.lock(),
            vec!["token-for-a".to_string(), "token-for-b".to_string()]
        );

        // Later mounts render straight away without a new script.
        let outcome = loader
            .mount(&turnstile(), MountPoint::new("c"), callback)
            .unwrap();
        assert_eq!(outcome, MountOutcome::Rendered);
        assert_eq!(host.injected.lock().len(), 1);
        assert_eq!(host.rendered.lock()[2].1, "site-key");
    }

    #[test]
    fn test_missing_mount_needs_second_ready_signal() {
        let host = Arc::new(RecordingHost::default());
        let loader = CaptchaLoader::new(host.clone());
        let (callback, tokens) = collector();

        loader
            .mount(&turnstile(), MountPoint::new("late"), callback)
            .unwrap();
        host.mount_missing.store(true, Ordering::SeqCst);
        assert_eq!(loader.script_ready(CaptchaProvider::Turnstile), 0);
        assert!(tokens.lock().is_empty());
        assert_eq!(loader.pending(CaptchaProvider::Turnstile), 1);

        host.mount_missing.store(false, Ordering::SeqCst);
        assert_eq!(loader.script_ready(CaptchaProvider::Turnstile), 1);
        assert_eq!(tokens.lock().len(), 1);
    }

    #[test]
    fn test_providers_load_independently() {
        let host = Arc::new(RecordingHost::default());
        let loader = CaptchaLoader::new(host.clone());
        let (callback, _) = collector();

        let recaptcha = CaptchaConfig {
            captcha_provider: CaptchaProvider::Recaptcha,
            captcha_site_key: None,
        };
        loader.mount(&turnstile(), MountPoint::new("a"), callback.clone()).unwrap();
        loader.mount(&recaptcha, MountPoint::new("b"), callback).unwrap();

        let injected = host.injected.lock().clone();
        assert_eq!(injected.len(), 2);
        assert!(injected[1].contains("recaptcha"));
    }

    #[test]
    fn test_preset_host_delivers_its_token() {
        let host = Arc::new(PresetTokenHost::new("cli-token"));
        let loader = CaptchaLoader::new(host.clone());
        let (callback, tokens) = collector();

        loader.mount(&turnstile(), MountPoint::new("cli"), callback).unwrap();
        loader.script_ready(CaptchaProvider::Turnstile);

        assert_eq!(*tokens.lock(), vec!["cli-token".to_string()]);
        assert_eq!(host.injected_scripts().len(), 1);
    }
}
