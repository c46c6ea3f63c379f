//! Typed scan events decoded from a backend SSE byte stream.

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ScanError, ScanResult};
use crate::sse::{LineSplitter, SseDecoder, SseFrame};
use crate::types::ScanReport;

/// One frame pushed by `/scan-stream`, decoded from its `type` tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    Started {
        #[serde(default)]
        message: Option<String>,
    },
    Progress {
        percent: f64,
    },
    HostsUpdate {
        #[serde(alias = "hostsFound", alias = "hosts_found")]
        count: u64,
    },
    Complete {
        #[serde(default, alias = "result", alias = "xml")]
        report: Option<ScanReport>,
        #[serde(default, alias = "hostsFound")]
        hosts_found: Option<u64>,
    },
    Error {
        #[serde(default, alias = "error")]
        message: Option<String>,
    },
}

impl ScanEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanEvent::Complete { .. } | ScanEvent::Error { .. })
    }
}

pub type BoxEventStream = Pin<Box<dyn Stream<Item = ScanResult<ScanEvent>> + Send>>;

pub const CONNECTION_LOST: &str = "connection lost";

fn decode_frame(frame: &SseFrame) -> Option<ScanEvent> {
    match serde_json::from_str::<ScanEvent>(&frame.data) {
        Ok(ev) => Some(ev),
        Err(e) => {
            warn!(error = %e, event = ?frame.event, "skipping undecodable scan frame");
            None
        }
    }
}

/// Turns a chunked byte stream into scan events.
///
/// Ends right after the first `Complete` or `Error` event. If the bytes run
/// out first, yields a single `StreamError` and ends. Never reconnects.
pub struct ScanEventStream<S> {
    inner: S,
    lines: LineSplitter,
    decoder: SseDecoder,
    queued: VecDeque<ScanEvent>,
    line_limit: usize,
    // `inner` has returned `None` and must not be polled again
    inner_done: bool,
    finished: bool,
}

/// Longest unterminated line accepted before the stream is abandoned. A
/// complete report can ride in one `data:` line, so this is generous.
pub const DEFAULT_LINE_LIMIT: usize = 16 * 1024 * 1024;

impl<S, B, E> ScanEventStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    pub fn new(inner: S) -> Self {
        Self::with_line_limit(inner, DEFAULT_LINE_LIMIT)
    }

    pub fn with_line_limit(inner: S, line_limit: usize) -> Self {
        Self {
            inner,
            lines: LineSplitter::new(),
            decoder: SseDecoder::new(),
            queued: VecDeque::new(),
            line_limit,
            inner_done: false,
            finished: false,
        }
    }

    fn absorb_lines(&mut self, lines: Vec<String>) {
        for line in lines {
            if let Some(frame) = self.decoder.feed_line(&line) {
                if let Some(ev) = decode_frame(&frame) {
                    self.queued.push_back(ev);
                }
            }
        }
    }

    pub async fn next_event(&mut self) -> Option<ScanResult<ScanEvent>> {
        loop {
            if self.finished {
                return None;
            }
            if let Some(ev) = self.queued.pop_front() {
                if ev.is_terminal() {
                    self.finished = true;
                    self.queued.clear();
                }
                return Some(Ok(ev));
            }
            if self.inner_done {
                debug!("scan stream closed without a terminal frame");
                self.finished = true;
                return Some(Err(ScanError::StreamError(CONNECTION_LOST.into())));
            }
            match self.inner.next().await {
                Some(Ok(chunk)) => {
                    let lines = self.lines.push(chunk.as_ref());
                    self.absorb_lines(lines);
                    if self.lines.pending().len() > self.line_limit {
                        warn!(limit = self.line_limit, "scan stream line too long, dropping connection");
                        self.finished = true;
                        return Some(Err(ScanError::StreamError(format!(
                            "line exceeds {} bytes",
                            self.line_limit
                        ))));
                    }
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(ScanError::StreamError(format!("{CONNECTION_LOST}: {e}"))));
                }
                None => {
                    self.inner_done = true;
                    // flush an unterminated final frame
                    let mut tail = Vec::new();
                    if !self.lines.pending().is_empty() {
                        tail.extend(self.lines.push(b"\n"));
                    }
                    tail.push(String::new());
                    self.absorb_lines(tail);
                }
            }
        }
    }
}

impl<S, B, E> ScanEventStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    pub fn into_boxed(self) -> BoxEventStream {
        Box::pin(stream::unfold(self, |mut s| async move {
            s.next_event().await.map(|ev| (ev, s))
        }))
    }
}
