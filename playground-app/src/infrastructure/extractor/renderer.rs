use super::page::PageView;
use super::static_page::StaticPage;
use crate::config::ExtractorConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("failed to start browser: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("page did not settle within {0:?}")]
    Timeout(Duration),

    #[error("extraction cancelled")]
    Cancelled,

    #[error("renderer crashed: {0}")]
    Crashed(String),
}

#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), RenderError> {
        if self.is_cancelled() {
            Err(RenderError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn guard(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

pub struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Implementations block; callers run them off the async executor.
pub trait Renderer: Send + Sync {
    fn open(
        &self,
        url: &str,
        config: &ExtractorConfig,
        cancel: &CancelFlag,
    ) -> Result<Box<dyn PageView>, RenderError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRenderer;

impl Renderer for HttpRenderer {
    fn open(
        &self,
        url: &str,
        config: &ExtractorConfig,
        cancel: &CancelFlag,
    ) -> Result<Box<dyn PageView>, RenderError> {
        cancel.check()?;

        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.load_timeout)
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                RenderError::Timeout(config.load_timeout)
            } else {
                RenderError::Navigation(e.to_string())
            }
        };

        let response = client.get(url).send().map_err(map_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Navigation(format!("HTTP {}", status)));
        }
        let html = response.text().map_err(map_err)?;

        cancel.check()?;
        tracing::debug!(url, bytes = html.len(), "Fetched static page");
        Ok(Box::new(StaticPage::parse(&html)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleSnapshot {
    pub ready: bool,
    pub inflight: u32,
    pub idle_for: Duration,
}

impl IdleSnapshot {
    fn is_idle(&self, config: &ExtractorConfig) -> bool {
        self.ready && self.inflight <= config.max_inflight && self.idle_for >= config.quiet_window
    }
}

/// Snapshot errors count as "not idle yet"; the document may be mid-navigation.
pub fn wait_for_idle<F>(
    mut snapshot: F,
    config: &ExtractorConfig,
    deadline: Instant,
    cancel: &CancelFlag,
) -> Result<(), RenderError>
where
    F: FnMut() -> Result<IdleSnapshot, RenderError>,
{
    loop {
        cancel.check()?;

        match snapshot() {
            Ok(snap) if snap.is_idle(config) => return Ok(()),
            Ok(_) => {}
            Err(RenderError::Cancelled) => return Err(RenderError::Cancelled),
            Err(e) => tracing::debug!(error = %e, "Idle probe failed, retrying"),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(RenderError::Timeout(config.load_timeout));
        }
        std::thread::sleep(config.poll_interval.min(deadline - now));
    }
}

pub(crate) fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config(load_timeout: Duration) -> ExtractorConfig {
        ExtractorConfig {
            load_timeout,
            quiet_window: Duration::from_millis(500),
            poll_interval: Duration::from_millis(5),
            ..ExtractorConfig::default()
        }
    }

    #[test]
    fn test_idle_after_inflight_drains() {
        let config = fast_config(Duration::from_secs(2));
        let mut polls = 0;
        let result = wait_for_idle(
            || {
                polls += 1;
                Ok(IdleSnapshot {
                    ready: true,
                    inflight: if polls < 3 { 2 } else { 0 },
                    idle_for: Duration::from_millis(600),
                })
            },
            &config,
            Instant::now() + config.load_timeout,
            &CancelFlag::new(),
        );
        assert_eq!(result, Ok(()));
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_never_idle_page_times_out() {
        let config = fast_config(Duration::from_millis(60));
        let started = Instant::now();
        let result = wait_for_idle(
            || {
                Ok(IdleSnapshot {
                    ready: true,
                    inflight: 1,
                    idle_for: Duration::ZERO,
                })
            },
            &config,
            started + config.load_timeout,
            &CancelFlag::new(),
        );
        assert_eq!(result, Err(RenderError::Timeout(Duration::from_millis(60))));
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_snapshot_errors_are_retried() {
        let config = fast_config(Duration::from_secs(2));
        let mut polls = 0;
        let result = wait_for_idle(
            || {
                polls += 1;
                if polls == 1 {
                    return Err(RenderError::Navigation("context destroyed".into()));
                }
                Ok(IdleSnapshot {
                    ready: true,
                    inflight: 0,
                    idle_for: Duration::from_secs(1),
                })
            },
            &config,
            Instant::now() + config.load_timeout,
            &CancelFlag::new(),
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_cancel_stops_waiting() {
        let config = fast_config(Duration::from_secs(5));
        let cancel = CancelFlag::new();
        let inner = cancel.clone();
        let result = wait_for_idle(
            || {
                inner.cancel();
                Ok(IdleSnapshot {
                    ready: false,
                    inflight: 0,
                    idle_for: Duration::ZERO,
                })
            },
            &config,
            Instant::now() + config.load_timeout,
            &cancel,
        );
        assert_eq!(result, Err(RenderError::Cancelled));
    }

    #[test]
    fn test_remaining_budget_shrinks_to_zero() {
        assert_eq!(remaining(Instant::now()), Duration::ZERO);

        let budget = Duration::from_secs(30);
        let left = remaining(Instant::now() + budget);
        assert!(left <= budget);
        assert!(left > Duration::from_secs(29));
    }

    #[test]
    fn test_guard_cancels_on_drop() {
        let flag = CancelFlag::new();
        {
            let _guard = flag.guard();
            assert!(!flag.is_cancelled());
        }
        assert!(flag.is_cancelled());
    }
}
