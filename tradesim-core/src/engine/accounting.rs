//! Daily accounting identities.
//!
//! Pure functions over one day's prices and positions. Shorts are carried
//! with their entry notional parked in `margin`; `MARGIN` in the panel is the
//! short notional marked to the close.

/// Portfolio value marked to the open, used for sizing:
/// `cash + margin + Σ(position_last × open)`.
pub fn value_at_open(cash: f64, margin: f64, position_last: &[i64], open: &[f64]) -> f64 {
    let marked: f64 = position_last
        .iter()
        .zip(open)
        .map(|(&p, &o)| p as f64 * o)
        .sum();
    cash + margin + marked
}

/// Per-instrument P&L for the day:
/// `positions × (close − open) + position_last × (open − close_last) − cost`.
///
/// The first term is today's session on the new book, the second the
/// overnight gap on yesterday's book.
pub fn daily_pnl(
    positions: &[i64],
    position_last: &[i64],
    open: &[f64],
    close: &[f64],
    close_last: &[f64],
    cost_to_trade: &[f64],
) -> Vec<f64> {
    (0..positions.len())
        .map(|i| {
            positions[i] as f64 * (close[i] - open[i])
                + position_last[i] as f64 * (open[i] - close_last[i])
                - cost_to_trade[i]
        })
        .collect()
}

/// Short notional at the close: `−Σ(positions × close)` over short positions.
pub fn margin_at_close(positions: &[i64], close: &[f64]) -> f64 {
    -positions
        .iter()
        .zip(close)
        .filter(|&(&p, _)| p < 0)
        .map(|(&p, &c)| p as f64 * c)
        .sum::<f64>()
}

/// Portfolio value marked to the close:
/// `cash + margin + (margin − margin_close) + Σ(positions × close)` over longs.
///
/// `margin − margin_close` is the unrealized gain on the short book.
pub fn value_at_close(
    cash: f64,
    margin: f64,
    margin_close: f64,
    positions: &[i64],
    close: &[f64],
) -> f64 {
    let longs: f64 = positions
        .iter()
        .zip(close)
        .filter(|&(&p, _)| p > 0)
        .map(|(&p, &c)| p as f64 * c)
        .sum();
    cash + margin + (margin - margin_close) + longs
}
