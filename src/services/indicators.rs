use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{IndicatorSnapshot, PriceBar};

/// Minimum bars of history required before any snapshot is emitted.
pub const MIN_HISTORY: usize = 20;

/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until enough values exist
/// - `Some(avg)` after `window` values
///
/// Each window is summed from scratch. An incremental add/subtract
/// running sum accumulates floating-point drift and the output here
/// must be the exact trailing mean.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 >= window {
                let sum: f64 = values[i + 1 - window..=i].iter().sum();
                Some(sum / window as f64)
            } else {
                None
            }
        })
        .collect()
}

/// Exponential Moving Average (EMA), smoothing factor 2/(window+1),
/// seeded with the first value. Early values are hidden until the
/// window is reached.
pub fn ema(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if values.is_empty() || window == 0 {
        return vec![None; values.len()];
    }

    let alpha = 2.0 / (window as f64 + 1.0);

    values
        .iter()
        .enumerate()
        .scan(values[0], move |prev_ema, (i, &v)| {
            let next = alpha * v + (1.0 - alpha) * *prev_ema;
            *prev_ema = next;

            let out = if i + 1 >= window { Some(next) } else { None };
            Some(out)
        })
        .collect()
}

/// Relative Strength Index (RSI)
///
/// Momentum oscillator in [0, 100] built from the trailing `period`
/// daily price changes:
/// 1. avg gain / avg loss = plain rolling means of the gains and losses
/// 2. RS = avg gain / avg loss
/// 3. RSI = 100 - 100 / (1 + RS)
///
/// This uses the simple rolling-mean form (not Wilder's recursive
/// smoothing), matching how the snapshots were historically computed.
/// When the window has no losses the RS division is undefined and the
/// RSI is reported as the 100.0 sentinel.
///
/// Returns `None` for the first `period` indices.
pub fn rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; prices.len()];
    if prices.len() < 2 || period == 0 {
        return result;
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    if changes.len() < period {
        return result;
    }

    for i in period..prices.len() {
        // deltas ending at price index i
        let window = &changes[i - period..i];

        let avg_gain = window.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
        let avg_loss = window.iter().filter(|&&c| c < 0.0).map(|c| -c).sum::<f64>() / period as f64;

        result[i] = if avg_loss == 0.0 {
            Some(100.0)
        } else {
            let rs = avg_gain / avg_loss;
            Some(100.0 - 100.0 / (1.0 + rs))
        };
    }

    result
}

/// Moving Average Convergence Divergence (MACD)
///
/// MACD line = EMA(fast) - EMA(slow); signal line = EMA(signal_period)
/// of the MACD line, mapped back to the source indices.
///
/// Returns: (macd_line, signal_line)
pub fn macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    if prices.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let len = prices.len();

    let fast_ema = ema(prices, fast_period);
    let slow_ema = ema(prices, slow_period);

    let mut macd_line: Vec<Option<f64>> = vec![None; len];
    for i in 0..len {
        if let (Some(fast), Some(slow)) = (fast_ema[i], slow_ema[i]) {
            macd_line[i] = Some(fast - slow);
        }
    }

    // The signal EMA runs over the compacted MACD series, then gets
    // mapped back to the indices where the MACD line exists.
    let macd_values: Vec<f64> = macd_line.iter().filter_map(|&v| v).collect();
    let signal_values = ema(&macd_values, signal_period);

    let mut signal_line: Vec<Option<f64>> = vec![None; len];
    let mut signal_idx = 0;
    for i in 0..len {
        if macd_line[i].is_some() {
            if signal_idx < signal_values.len() {
                signal_line[i] = signal_values[signal_idx];
                signal_idx += 1;
            }
        }
    }

    (macd_line, signal_line)
}

/// Bollinger Bands: SMA(period) middle band with upper/lower bands at
/// `num_std_dev` population standard deviations of the same window.
///
/// Returns: (upper_band, lower_band)
pub fn bollinger_bands(
    prices: &[f64],
    period: usize,
    num_std_dev: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    if prices.is_empty() || period == 0 {
        return (Vec::new(), Vec::new());
    }

    let len = prices.len();
    let middle_band = sma(prices, period);

    let mut upper_band: Vec<Option<f64>> = vec![None; len];
    let mut lower_band: Vec<Option<f64>> = vec![None; len];

    for i in 0..len {
        if i + 1 >= period {
            let window = &prices[i + 1 - period..=i];
            let mean = match middle_band[i] {
                Some(m) => m,
                None => continue,
            };

            let variance = window
                .iter()
                .map(|&x| {
                    let diff = x - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;

            let std_dev = variance.sqrt();

            upper_band[i] = Some(mean + num_std_dev * std_dev);
            lower_band[i] = Some(mean - num_std_dev * std_dev);
        }
    }

    (upper_band, lower_band)
}

/// Compute one indicator snapshot per date with at least [`MIN_HISTORY`]
/// bars of history behind it. Dates with less history are omitted
/// entirely; no null rows.
///
/// Pure function of the input series: running it twice on the same bars
/// yields identical values.
pub fn compute_snapshots(bars: &[PriceBar]) -> Vec<IndicatorSnapshot> {
    if bars.len() < MIN_HISTORY {
        return Vec::new();
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();

    let rsi_14 = rsi(&closes, 14);
    let sma_20 = sma(&closes, 20);
    let sma_50 = sma(&closes, 50);
    let sma_200 = sma(&closes, 200);
    let ema_12 = ema(&closes, 12);
    let ema_26 = ema(&closes, 26);
    let (macd_line, signal_line) = macd(&closes, 12, 26, 9);
    let (bb_upper, bb_lower) = bollinger_bands(&closes, 20, 2.0);

    (MIN_HISTORY - 1..bars.len())
        .map(|i| IndicatorSnapshot {
            id: Uuid::new_v4(),
            symbol: bars[i].symbol.clone(),
            date: dates[i],
            rsi: rsi_14[i],
            sma_20: sma_20[i],
            sma_50: sma_50[i],
            sma_200: sma_200[i],
            ema_12: ema_12[i],
            ema_26: ema_26[i],
            macd: macd_line[i],
            macd_signal: signal_line[i],
            bollinger_upper: bb_upper[i],
            bollinger_lower: bb_lower[i],
        })
        .collect()
}
