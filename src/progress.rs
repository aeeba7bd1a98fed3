use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indicatif::{HumanBytes, HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    List,
    Detail,
}

impl RequestKind {
    fn label(self) -> &'static str {
        match self {
            RequestKind::List => "list",
            RequestKind::Detail => "detail",
        }
    }
}

pub struct Progress {
    enabled: bool,
    start: Instant,

    // UI
    mp: Option<MultiProgress>,
    stage: ProgressBar,
    pages: ProgressBar,
    requests: ProgressBar,

    // Counters
    pages_written: AtomicU64,
    http_in_flight: AtomicU64,
    http_done: AtomicU64,
    http_failed: AtomicU64,
    http_throttled: AtomicU64,
    http_bytes: AtomicU64,
    list_done: AtomicU64,
    detail_done: AtomicU64,
    last_http_label: Mutex<String>,
}

impl Progress {
    pub fn new(enabled: bool) -> Arc<Self> {
        let (mp, stage, pages, requests) = if enabled {
            let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());

            let stage = mp.add(ProgressBar::new_spinner());
            stage.set_style(
                ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            stage.enable_steady_tick(Duration::from_millis(80));
            stage.set_message("starting");

            let pages = mp.add(ProgressBar::new(0));
            pages.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            pages.set_message("pages");

            let requests = mp.add(ProgressBar::new_spinner());
            requests.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            requests.enable_steady_tick(Duration::from_millis(120));
            requests.set_message("http");

            (Some(mp), stage, pages, requests)
        } else {
            (
                None,
                ProgressBar::hidden(),
                ProgressBar::hidden(),
                ProgressBar::hidden(),
            )
        };

        Arc::new(Self {
            enabled,
            start: Instant::now(),
            mp,
            stage,
            pages,
            requests,
            pages_written: AtomicU64::new(0),
            http_in_flight: AtomicU64::new(0),
            http_done: AtomicU64::new(0),
            http_failed: AtomicU64::new(0),
            http_throttled: AtomicU64::new(0),
            http_bytes: AtomicU64::new(0),
            list_done: AtomicU64::new(0),
            detail_done: AtomicU64::new(0),
            last_http_label: Mutex::new(String::new()),
        })
    }

    pub fn disabled() -> Arc<Self> {
        Self::new(false)
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    pub fn add_pages_total(&self, more: usize) {
        if self.enabled {
            self.pages.inc_length(more as u64);
        }
    }

    pub fn page_written(&self, route: &str) {
        self.pages_written.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.pages.inc(1);
            self.pages.set_message(route.to_string());
        }
    }

    #[cfg(test)]
    fn pages_written(&self) -> u64 {
        self.pages_written.load(Ordering::Relaxed)
    }

    pub fn http_start(&self, kind: RequestKind, url: &Url) {
        self.http_in_flight.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.set_label(format!("GET {} ({})", url, kind.label()));
            self.refresh_requests();
        }
    }

    pub fn http_throttled(&self, kind: RequestKind, url: &Url, status: u16, wait: Duration) {
        self.http_throttled.fetch_add(1, Ordering::Relaxed);
        if !self.enabled {
            return;
        }
        self.set_label(format!(
            "GET {} ({}) throttled {} wait {}ms",
            url,
            kind.label(),
            status,
            wait.as_millis()
        ));
        self.refresh_requests();
    }

    pub fn http_ok(&self, kind: RequestKind, url: &Url, bytes: usize) {
        self.http_in_flight.fetch_sub(1, Ordering::Relaxed);
        self.http_done.fetch_add(1, Ordering::Relaxed);
        self.http_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        match kind {
            RequestKind::List => self.list_done.fetch_add(1, Ordering::Relaxed),
            RequestKind::Detail => self.detail_done.fetch_add(1, Ordering::Relaxed),
        };

        if self.enabled {
            self.set_label(format!("GET {} ({}) ok {}B", url, kind.label(), bytes));
            self.refresh_requests();
        }
    }

    pub fn http_err(&self, kind: RequestKind, url: &Url) {
        self.http_in_flight.fetch_sub(1, Ordering::Relaxed);
        self.http_failed.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.set_label(format!("GET {} ({}) failed", url, kind.label()));
            self.refresh_requests();
        }
    }

    #[cfg(test)]
    fn requests_done(&self) -> u64 {
        self.http_done.load(Ordering::Relaxed)
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.refresh_requests();
        self.stage.finish_with_message("done");
        self.pages.finish_and_clear();
        self.requests.finish_and_clear();
        if let Some(mp) = &self.mp {
            let _ = mp.println(format!(
                "Done in {}, {} pages written",
                HumanDuration(self.start.elapsed()),
                self.pages_written.load(Ordering::Relaxed)
            ));
        }
    }

    fn set_label(&self, label: String) {
        if let Ok(mut last) = self.last_http_label.lock() {
            *last = label;
        }
    }

    fn refresh_requests(&self) {
        if !self.enabled {
            return;
        }

        let in_flight = self.http_in_flight.load(Ordering::Relaxed);
        let done = self.http_done.load(Ordering::Relaxed);
        let failed = self.http_failed.load(Ordering::Relaxed);
        let throttled = self.http_throttled.load(Ordering::Relaxed);
        let bytes = self.http_bytes.load(Ordering::Relaxed);
        let list = self.list_done.load(Ordering::Relaxed);
        let detail = self.detail_done.load(Ordering::Relaxed);

        let last = self
            .last_http_label
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        self.requests.set_message(format!(
            "HTTP: done {done} | in-flight {in_flight} | failed {failed} | throttled {throttled} | bytes {bytes} | list {list} detail {detail} | {last}",
            bytes = HumanBytes(bytes),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_progress_still_counts() {
        let progress = Progress::disabled();
        let url = Url::parse("https://example.com/posts").unwrap();
        progress.http_start(RequestKind::List, &url);
        progress.http_ok(RequestKind::List, &url, 42);
        progress.page_written("/");
        progress.finish();
        assert_eq!(progress.requests_done(), 1);
        assert_eq!(progress.pages_written(), 1);
    }
}
