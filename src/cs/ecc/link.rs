//! Moving framed samples from a sample source to a frame sink.
//!
//! The hardware on either side (a motion sensor on a bus, a serial port) is injected through
//! the [`SampleSource`] and [`FrameSink`] traits. [`Transmitter::run`] is the supervisory loop:
//! it polls the source at a fixed interval, retries failed iterations with exponential backoff,
//! and gives up after a bounded number of consecutive failures.

use crate::cs::ecc::frame::{encode_sample16, FrameEncoder, FRAME_BYTES};
use crate::cs::ecc::Result;
use crate::error::Error;
use log::{debug, info, warn};
use std::io::Write;
use std::thread;
use std::time::Duration;

/// Produces signed 16-bit samples.
pub trait SampleSource {
    /// Reads the next sample.
    ///
    /// Returns [`Error::SourceExhausted`] when no more samples will ever be produced.
    fn next_sample(&mut self) -> Result<i16>;
}

/// Accepts packed frames for transmission.
pub trait FrameSink {
    /// Sends one frame.
    fn send(&mut self, frame: &[u8]) -> Result<()>;
}

/// A [`SampleSource`] over any iterator of samples.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    samples: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = i16>,
{
    /// Wraps anything that iterates samples.
    pub fn new(samples: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            samples: samples.into_iter(),
        }
    }
}

impl<I> SampleSource for IterSource<I>
where
    I: Iterator<Item = i16>,
{
    fn next_sample(&mut self) -> Result<i16> {
        self.samples.next().ok_or(Error::SourceExhausted)
    }
}

/// A [`FrameSink`] that writes each frame to an [`std::io::Write`] and flushes it.
#[derive(Debug)]
pub struct WriteSink<W> {
    writer: W,
}

impl<W: Write> WriteSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for WriteSink<W> {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.writer.write_all(frame)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Timing and failure limits for [`Transmitter::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between successfully transmitted samples
    pub poll_interval: Duration,
    /// Pause after the first failure
    pub initial_backoff: Duration,
    /// Upper bound for the doubling backoff
    pub max_backoff: Duration,
    /// Consecutive failures after which the loop gives up
    pub max_consecutive_failures: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            max_consecutive_failures: 10,
        }
    }
}

impl RetryPolicy {
    /// Backoff to apply after the `failures`-th consecutive failure (1-based).
    pub fn backoff(&self, failures: u32) -> Duration {
        let doublings = failures.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << doublings)
            .min(self.max_backoff)
    }
}

/// One sample's trip through the transmitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    /// Sample as read from the source
    pub sample: i16,
    /// Word that was framed
    pub word: u16,
    /// Bytes handed to the sink
    pub frame: Vec<u8>,
}

/// Counters reported by [`Transmitter::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStats {
    /// Frames handed to the sink
    pub frames_sent: u64,
    /// Iterations that failed and were retried
    pub failures: u64,
}

/// Reads samples, frames them and hands the frames to a sink.
#[derive(Debug)]
pub struct Transmitter<S, K> {
    source: S,
    sink: K,
    encoder: FrameEncoder,
    policy: RetryPolicy,
    frames_sent: u64,
}

impl<S: SampleSource, K: FrameSink> Transmitter<S, K> {
    /// Creates a transmitter with the default encoder and retry policy.
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            encoder: FrameEncoder::default(),
            policy: RetryPolicy::default(),
            frames_sent: 0,
        }
    }

    /// Replaces the frame encoder.
    pub fn with_encoder(mut self, encoder: FrameEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of frames handed to the sink so far.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Returns the sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Consumes the transmitter, returning the source and sink.
    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    /// Reads one sample, frames it and sends it.
    pub fn transmit_one(&mut self) -> Result<Transmission> {
        let sample = self.source.next_sample()?;
        let word = self.encoder.word(sample);
        let frame = encode_sample16(word);
        debug_assert_eq!(frame.len(), FRAME_BYTES);

        self.sink.send(&frame)?;
        self.frames_sent += 1;

        debug!(
            "sample #{} {} framed as {:#06x} -> {}",
            self.frames_sent,
            sample,
            word,
            hex::encode(&frame)
        );

        Ok(Transmission {
            sample,
            word,
            frame,
        })
    }

    /// Transmits until the source is exhausted or `limit` frames have been sent in this call.
    ///
    /// Failed iterations are retried after a backoff. The loop returns
    /// [`Error::RetriesExhausted`], carrying the last failure, once the policy's
    /// consecutive-failure limit is reached.
    pub fn run(&mut self, limit: Option<u64>) -> Result<LinkStats> {
        let mut stats = LinkStats::default();
        let mut consecutive_failures = 0u32;

        info!("transmitter started (limit {:?})", limit);

        while limit.map_or(true, |max| stats.frames_sent < max) {
            match self.transmit_one() {
                Ok(_) => {
                    stats.frames_sent += 1;
                    consecutive_failures = 0;
                    if limit != Some(stats.frames_sent) {
                        pause(self.policy.poll_interval);
                    }
                }
                Err(Error::SourceExhausted) => {
                    info!("sample source exhausted");
                    break;
                }
                Err(err) => {
                    stats.failures += 1;
                    consecutive_failures += 1;
                    if consecutive_failures >= self.policy.max_consecutive_failures {
                        warn!(
                            "giving up after {} consecutive failures: {}",
                            consecutive_failures, err
                        );
                        return Err(Error::RetriesExhausted {
                            attempts: consecutive_failures,
                            last: Box::new(err),
                        });
                    }

                    let backoff = self.policy.backoff(consecutive_failures);
                    warn!(
                        "transmission failed ({}), retrying in {:?}",
                        err, backoff
                    );
                    pause(backoff);
                }
            }
        }

        info!(
            "transmitter stopped: {} frames sent, {} failures",
            stats.frames_sent, stats.failures
        );
        Ok(stats)
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
