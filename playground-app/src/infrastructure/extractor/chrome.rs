use super::page::{normalize_text, PageView, ProbeError};
use super::renderer::{remaining, wait_for_idle, CancelFlag, IdleSnapshot, RenderError, Renderer};
use crate::config::ExtractorConfig;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counts in-flight fetch/XHR requests and the time of the last network
/// event. Installed before any page script runs.
const NETWORK_TRACKER_JS: &str = r#"
(() => {
    if (window.__netTracker) return;
    const t = { inflight: 0, last: performance.now() };
    window.__netTracker = t;
    const begin = () => { t.inflight += 1; t.last = performance.now(); };
    const end = () => { t.inflight = Math.max(0, t.inflight - 1); t.last = performance.now(); };

    const origFetch = window.fetch;
    if (origFetch) {
        window.fetch = function(...args) {
            begin();
            return origFetch.apply(this, args).finally(end);
        };
    }

    const origSend = XMLHttpRequest.prototype.send;
    XMLHttpRequest.prototype.send = function(...args) {
        begin();
        this.addEventListener('loadend', end, { once: true });
        return origSend.apply(this, args);
    };

    try {
        new PerformanceObserver(() => { t.last = performance.now(); })
            .observe({ type: 'resource', buffered: true });
    } catch (e) {}
})();
"#;

const IDLE_SNAPSHOT_JS: &str = r#"
(() => {
    const t = window.__netTracker || { inflight: 0, last: 0 };
    return JSON.stringify({
        ready: document.readyState === 'complete',
        inflight: t.inflight,
        idleForMs: Math.max(0, Math.floor(performance.now() - t.last))
    });
})()
"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIdle {
    ready: bool,
    inflight: u32,
    idle_for_ms: u64,
}

/// Every `open` launches its own browser process with a throwaway profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeRenderer;

impl ChromeRenderer {
    fn launch(config: &ExtractorConfig) -> Result<Browser, RenderError> {
        let (width, height) = config.viewport;
        let args = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--no-first-run"),
            OsStr::new("--no-default-browser-check"),
            OsStr::new("--disable-extensions"),
            OsStr::new("--disable-background-networking"),
            OsStr::new("--disable-sync"),
            OsStr::new("--mute-audio"),
        ];

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .window_size(Some((width, height)))
            .idle_browser_timeout(config.load_timeout + Duration::from_secs(30))
            .args(args)
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        Browser::new(launch_options).map_err(|e| RenderError::Launch(e.to_string()))
    }
}

impl Renderer for ChromeRenderer {
    fn open(
        &self,
        url: &str,
        config: &ExtractorConfig,
        cancel: &CancelFlag,
    ) -> Result<Box<dyn PageView>, RenderError> {
        let deadline = Instant::now() + config.load_timeout;
        cancel.check()?;

        tracing::info!(url, "Launching headless browser");
        let browser = Self::launch(config)?;
        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        // Owning the tab first means a failure below still closes it.
        let page = ChromePage { tab, _browser: browser };

        let budget = remaining(deadline);
        if budget.is_zero() {
            return Err(RenderError::Timeout(config.load_timeout));
        }
        page.tab.set_default_timeout(budget);
        page.tab
            .set_user_agent(&config.user_agent, None, None)
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let add_script = Page::AddScriptToEvaluateOnNewDocument {
            source: NETWORK_TRACKER_JS.to_string(),
            world_name: None,
            include_command_line_api: None,
            run_immediately: None,
        };
        page.tab
            .call_method(add_script)
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        page.tab
            .navigate_to(url)
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        if let Err(e) = page.tab.wait_until_navigated() {
            if Instant::now() >= deadline {
                return Err(RenderError::Timeout(config.load_timeout));
            }
            return Err(RenderError::Navigation(e.to_string()));
        }

        wait_for_idle(|| page.idle_snapshot(), config, deadline, cancel)?;
        tracing::debug!(url, "Page reached network idle");

        Ok(Box::new(page))
    }
}

/// A live tab. Dropping it closes the tab before the browser process exits.
pub struct ChromePage {
    tab: Arc<Tab>,
    _browser: Browser,
}

impl ChromePage {
    fn idle_snapshot(&self) -> Result<IdleSnapshot, RenderError> {
        let raw: RawIdle = self
            .eval_json(IDLE_SNAPSHOT_JS)
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        Ok(IdleSnapshot {
            ready: raw.ready,
            inflight: raw.inflight,
            idle_for: Duration::from_millis(raw.idle_for_ms),
        })
    }

    // `script` must return a `JSON.stringify` result.
    fn eval_json<T: DeserializeOwned>(&self, script: &str) -> Result<T, ProbeError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| ProbeError::Query(e.to_string()))?;
        let encoded = result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProbeError::Decode("script returned no JSON string".to_string()))?;
        serde_json::from_str(encoded).map_err(|e| ProbeError::Decode(e.to_string()))
    }

    fn query_script(selector: &str, body: &str) -> Result<String, ProbeError> {
        let quoted = serde_json::to_string(selector).map_err(|e| ProbeError::Decode(e.to_string()))?;
        Ok(format!(
            r#"(() => {{
                let nodes;
                try {{ nodes = Array.from(document.querySelectorAll({quoted})); }}
                catch (e) {{ return JSON.stringify({{ invalid: true }}); }}
                return JSON.stringify({{ invalid: false, value: {body} }});
            }})()"#
        ))
    }

    fn query<T: DeserializeOwned>(&self, selector: &str, body: &str) -> Result<T, ProbeError> {
        #[derive(Deserialize)]
        struct Reply<V> {
            invalid: bool,
            value: Option<V>,
        }

        let reply: Reply<T> = self.eval_json(&Self::query_script(selector, body)?)?;
        if reply.invalid {
            return Err(ProbeError::InvalidSelector(selector.to_string()));
        }
        reply
            .value
            .ok_or_else(|| ProbeError::Decode(format!("no value for `{}`", selector)))
    }
}

impl PageView for ChromePage {
    fn title(&self) -> Result<String, ProbeError> {
        self.eval_json("JSON.stringify(document.title || '')")
    }

    fn markup(&self) -> Result<String, ProbeError> {
        self.tab
            .get_content()
            .map_err(|e| ProbeError::Query(e.to_string()))
    }

    fn body_text(&self) -> Result<String, ProbeError> {
        let text: String =
            self.eval_json("JSON.stringify(document.body ? document.body.innerText : '')")?;
        Ok(normalize_text(&text))
    }

    fn inner_texts(&self, selector: &str, limit: usize) -> Result<Vec<String>, ProbeError> {
        let limit = limit.min(u32::MAX as usize);
        let texts: Vec<String> = self.query(
            selector,
            &format!("nodes.slice(0, {limit}).map(n => n.innerText || n.textContent || '')"),
        )?;
        Ok(texts.iter().map(|t| normalize_text(t)).collect())
    }

    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ProbeError> {
        let quoted = serde_json::to_string(name).map_err(|e| ProbeError::Decode(e.to_string()))?;
        let value: Vec<String> = self.query(
            selector,
            &format!("nodes.slice(0, 1).map(n => n.getAttribute({quoted})).filter(v => v !== null)"),
        )?;
        Ok(value.into_iter().next())
    }

    fn count(&self, selector: &str) -> Result<usize, ProbeError> {
        self.query(selector, "nodes.length")
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(true) {
            tracing::debug!(error = %e, "Failed to close tab");
        }
    }
}
