// src/exec/stream.rs

//! Pure accumulation of streamed process output.
//!
//! The serial monitor feeds every chunk it reads through
//! [`StreamAccumulator::absorb_stdout`] / [`StreamAccumulator::absorb_stderr`].
//! Nothing in here touches a process, so the filtering rules can be
//! exercised by folding over plain strings.

use crate::config::model::default_banners;
use crate::types::{ExecutionResult, MonitorMethod};

/// Decides which stdout chunks are toolchain noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerFilter {
    banners: Vec<String>,
    enabled: bool,
}

impl BannerFilter {
    pub fn new(banners: Vec<String>, enabled: bool) -> Self {
        Self { banners, enabled }
    }

    /// Default banner set, filtering on.
    pub fn standard() -> Self {
        Self::new(default_banners(), true)
    }

    /// Keep every chunk.
    pub fn disabled() -> Self {
        Self::new(Vec::new(), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_banner(&self, chunk: &str) -> bool {
        self.banners.iter().any(|b| chunk.contains(b.as_str()))
    }

    /// A rejected chunk is discarded entirely, not partially.
    pub fn rejects(&self, chunk: &str) -> bool {
        self.enabled && (chunk.trim().is_empty() || self.is_banner(chunk))
    }
}

impl Default for BannerFilter {
    fn default() -> Self {
        Self::standard()
    }
}

/// Output captured by one monitor session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamAccumulator {
    stdout: String,
    stderr: String,
    useful_data_seen: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb_stdout(mut self, chunk: &str, filter: &BannerFilter) -> Self {
        if filter.rejects(chunk) {
            return self;
        }
        self.stdout.push_str(chunk);
        if !chunk.trim().is_empty() {
            self.useful_data_seen = true;
        }
        self
    }

    /// stderr is never filtered.
    pub fn absorb_stderr(mut self, chunk: &str) -> Self {
        self.stderr.push_str(chunk);
        self
    }

    pub fn fold_stdout<'a, I>(chunks: I, filter: &BannerFilter) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        chunks
            .into_iter()
            .fold(Self::new(), |acc, chunk| acc.absorb_stdout(chunk, filter))
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn useful_data_seen(&self) -> bool {
        self.useful_data_seen
    }

    /// Resolve the session once its deadline has passed.
    ///
    /// Priority: useful stdout, then stderr, then a synthesized no-data
    /// message naming the baud rate and capture window.
    pub fn into_result(
        self,
        method: MonitorMethod,
        baud: u32,
        timeout_secs: u64,
    ) -> ExecutionResult {
        let stdout = self.stdout.trim();
        if self.useful_data_seen && !stdout.is_empty() {
            return ExecutionResult::succeeded(stdout, self.stderr).with_method(method);
        }

        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return ExecutionResult::failed("", stderr, Some(stderr.to_string()))
                .with_method(method);
        }

        let message = method.no_data_message(baud, timeout_secs);
        ExecutionResult::failed("", message.clone(), Some(message)).with_method(method)
    }
}

/// Incremental UTF-8 decoder for pipe reads.
///
/// A multi-byte character split across two reads is held back until its
/// remaining bytes arrive; genuinely invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // from_utf8 already proved the prefix valid.
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more.
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flush whatever is left once the stream has ended.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}
