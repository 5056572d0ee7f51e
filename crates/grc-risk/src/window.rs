//! Tumbling time windows.
//!
//! Each window kind has a fixed length; the first event after expiry resets
//! the window wholesale and re-seeds it from that event only. Events that
//! straddle the previous boundary are not retroactively counted — O(1) per
//! event, bounded memory, coarse circuit-breaking rather than precise
//! accounting.

/// One trade outcome as the window tracker sees it.
///
/// `amount_micros` is the absolute loss for losing trades and the profit for
/// the rest; always >= 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WindowEvent {
    pub is_loss: bool,
    pub amount_micros: i64,
}

impl WindowEvent {
    /// Classify a signed trade result (loss < 0).
    pub fn from_trade_result(trade_result_micros: i64) -> Self {
        if trade_result_micros < 0 {
            Self {
                is_loss: true,
                amount_micros: trade_result_micros.saturating_abs(),
            }
        } else {
            Self {
                is_loss: false,
                amount_micros: trade_result_micros,
            }
        }
    }
}

/// Counters accumulated inside one tumbling window.
///
/// Invariant: `end_secs = start_secs + length`; the window is current iff
/// `now <= end_secs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeWindowState {
    pub start_secs: i64,
    pub end_secs: i64,
    pub total_loss_micros: i64,
    pub total_profit_micros: i64,
    pub trade_count: u32,
    pub consecutive_losses: u32,
}

impl TimeWindowState {
    /// Open a fresh window at `now`, seeded from a single event.
    pub fn open(now_secs: i64, length_secs: i64, event: &WindowEvent) -> Self {
        let mut w = Self {
            start_secs: now_secs,
            end_secs: now_secs.saturating_add(length_secs),
            total_loss_micros: 0,
            total_profit_micros: 0,
            trade_count: 0,
            consecutive_losses: 0,
        };
        w.accumulate(event);
        w
    }

    /// `true` iff `now` falls inside this window.
    pub fn is_current(&self, now_secs: i64) -> bool {
        now_secs <= self.end_secs
    }

    /// Record one event, tumbling first if the window has expired.
    pub fn record(&mut self, now_secs: i64, length_secs: i64, event: &WindowEvent) {
        if now_secs > self.end_secs {
            *self = Self::open(now_secs, length_secs, event);
        } else {
            self.accumulate(event);
        }
    }

    fn accumulate(&mut self, event: &WindowEvent) {
        self.trade_count = self.trade_count.saturating_add(1);
        if event.is_loss {
            self.consecutive_losses = self.consecutive_losses.saturating_add(1);
            self.total_loss_micros = self.total_loss_micros.saturating_add(event.amount_micros);
        } else {
            self.consecutive_losses = 0;
            self.total_profit_micros =
                self.total_profit_micros.saturating_add(event.amount_micros);
        }
    }
}
