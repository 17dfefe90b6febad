//! Tick orchestration.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use signal_core::error::{DataError, EngineError};
use signal_core::traits::CandleSource;
use signal_core::types::{SeriesKey, Signal};
use signal_engine::{format_signal, Evaluation, SignalEngine, SkipReason};
use signal_monitor::TickReport;
use signal_notify::NotifierSet;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Pacing and polling settings.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub poll_interval: Duration,
    /// Delay between the starts of consecutive key evaluations
    pub pacing: Duration,
    /// Keys in flight at the same time
    pub concurrency: usize,
    /// Candles requested per key
    pub candle_limit: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            pacing: Duration::from_millis(350),
            concurrency: 1,
            candle_limit: 300,
        }
    }
}

/// What happened to one key during a tick.
#[derive(Debug)]
pub enum KeyOutcome {
    Emitted {
        signal: Signal,
        delivered: usize,
        failed: usize,
    },
    /// Evaluated, nothing to send
    Quiet,
    Skipped(SkipReason),
    SourceFailed(DataError),
    EngineFailed(EngineError),
}

/// Report and per-key outcomes of one tick, in completion order.
#[derive(Debug)]
pub struct TickResult {
    pub report: TickReport,
    pub outcomes: Vec<(SeriesKey, KeyOutcome)>,
}

pub struct Scanner {
    engine: Arc<SignalEngine>,
    source: Arc<dyn CandleSource>,
    notifiers: NotifierSet,
    keys: Vec<SeriesKey>,
    config: ScannerConfig,
}

impl Scanner {
    /// Scan `keys` in order. Every key must be tracked by `engine`.
    pub fn new(
        engine: Arc<SignalEngine>,
        source: Arc<dyn CandleSource>,
        notifiers: NotifierSet,
        keys: Vec<SeriesKey>,
        config: ScannerConfig,
    ) -> Result<Self, EngineError> {
        if let Some(key) = keys.iter().find(|k| !engine.contains(k)) {
            return Err(EngineError::UnknownKey(key.to_string()));
        }
        if config.concurrency == 0 {
            return Err(EngineError::InvalidConfig(
                "Scanner concurrency must be greater than 0".into(),
            ));
        }
        if config.poll_interval.is_zero() {
            return Err(EngineError::InvalidConfig(
                "Poll interval must be greater than 0".into(),
            ));
        }
        Ok(Self {
            engine,
            source,
            notifiers,
            keys,
            config,
        })
    }

    pub fn keys(&self) -> &[SeriesKey] {
        &self.keys
    }

    /// Fetch, evaluate and notify for one key.
    ///
    /// State is updated before delivery; a failed delivery is reported but
    /// never undoes the transition.
    pub async fn scan_key(&self, key: &SeriesKey) -> KeyOutcome {
        let candles = match self
            .source
            .fetch_candles(&key.instrument, key.timeframe, self.config.candle_limit)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                warn!(key = %key, source = self.source.name(), error = %e, "Candle fetch failed");
                return KeyOutcome::SourceFailed(e);
            }
        };

        let evaluation = match self.engine.evaluate(key, &candles) {
            Ok(evaluation) => evaluation,
            Err(e) => {
                error!(key = %key, error = %e, "Evaluation failed");
                return KeyOutcome::EngineFailed(e);
            }
        };

        match evaluation {
            Evaluation::Skipped(reason) => KeyOutcome::Skipped(reason),
            Evaluation::Evaluated(report) => match report.signal {
                Some(signal) => {
                    let text = format_signal(&signal);
                    let reports = self.notifiers.deliver(&text).await;
                    let delivered = reports.iter().filter(|r| r.is_ok()).count();
                    KeyOutcome::Emitted {
                        signal,
                        delivered,
                        failed: reports.len() - delivered,
                    }
                }
                None => KeyOutcome::Quiet,
            },
        }
    }

    /// One pass over every key.
    pub async fn run_tick(&self, tick: u64) -> TickResult {
        let started = Instant::now();
        let mut report = TickReport::new(tick);
        let pacing = self.config.pacing;

        let outcomes: Vec<(SeriesKey, KeyOutcome)> = stream::iter(self.keys.iter().enumerate())
            .then(|(i, key)| async move {
                if i > 0 && !pacing.is_zero() {
                    sleep(pacing).await;
                }
                key
            })
            .map(|key| async move { (key.clone(), self.scan_key(key).await) })
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        for (key, outcome) in &outcomes {
            match outcome {
                KeyOutcome::Emitted {
                    delivered, failed, ..
                } => report.record_emitted(*delivered, *failed),
                KeyOutcome::Quiet => report.record_quiet(),
                KeyOutcome::Skipped(reason) => {
                    debug!(key = %key, %reason, "Key skipped");
                    report.record_skipped();
                }
                KeyOutcome::SourceFailed(_) => report.record_source_failure(),
                KeyOutcome::EngineFailed(_) => report.record_skipped(),
            }
        }

        report.finish(started.elapsed());
        TickResult { report, outcomes }
    }

    /// Tick every poll interval until `shutdown` resolves.
    ///
    /// Shutdown is observed between ticks. Returns the number of ticks run.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            keys = self.keys.len(),
            interval_secs = self.config.poll_interval.as_secs(),
            concurrency = self.config.concurrency,
            "Scanner started"
        );

        let mut tick = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(ticks = tick, "Shutdown requested, scanner stopped");
                    break;
                }
                _ = ticker.tick() => {}
            }

            tick += 1;
            let result = self.run_tick(tick).await;
            result.report.log();
        }
        tick
    }

    /// Tick until Ctrl-C.
    pub async fn run(&self) -> u64 {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
