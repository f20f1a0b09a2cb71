use crate::domain::instrument::{IndexRecord, Stock};
use anyhow::Context;
use rand::{Rng, SeedableRng};

/// Uniform draws in [0, 1). Injected everywhere randomness is needed so tests
/// can supply fixed sequences and the CLI can seed a run.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Ambient entropy, used by the live refresh loops.
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Deterministic source for reproducible runs (`--seed`).
#[derive(Debug)]
pub struct SeededRandom {
    rng: rand::rngs::StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

// Trend-biased walk parameters: with CONTINUE_P the move keeps the prior
// direction with a magnitude in [0, CONTINUE_MAX); otherwise it reverses with
// a magnitude in [0, REVERSE_MAX). Percent units.
const CONTINUE_P: f64 = 0.7;
const CONTINUE_MAX: f64 = 1.2;
const REVERSE_MAX: f64 = 2.0;

/// One simulated tick for a stock. Pure: returns the next state, the caller
/// swaps it into place.
pub fn jitter_stock(stock: &Stock, rng: &mut dyn RandomSource) -> anyhow::Result<Stock> {
    let price = parse_decimal(&stock.price)
        .with_context(|| format!("unparseable price for {}", stock.symbol))?;

    let delta = draw_delta(stock.is_up, rng);
    let new_price = round2(price * (1.0 + delta / 100.0));

    let volume = match &stock.volume {
        Some(v) => Some(jitter_volume(v, rng).with_context(|| {
            format!("unparseable volume for {}", stock.symbol)
        })?),
        None => None,
    };

    Ok(Stock {
        price: format!("{new_price:.2}"),
        change: format_change(delta),
        is_up: delta >= 0.0,
        volume,
        ..stock.clone()
    })
}

/// One simulated tick for an index. Thousands separators in `value` are
/// preserved on output.
pub fn jitter_index(index: &IndexRecord, rng: &mut dyn RandomSource) -> anyhow::Result<IndexRecord> {
    let value = parse_decimal(&index.value)
        .with_context(|| format!("unparseable value for {}", index.symbol))?;

    let delta = draw_delta(index.is_up, rng);
    let new_value = round2(value * (1.0 + delta / 100.0));

    Ok(IndexRecord {
        value: format_grouped(new_value),
        change: format_change(delta),
        is_up: delta >= 0.0,
        ..index.clone()
    })
}

fn draw_delta(was_up: bool, rng: &mut dyn RandomSource) -> f64 {
    let continued = rng.next_f64() < CONTINUE_P;
    let magnitude = if continued {
        rng.next_f64() * CONTINUE_MAX
    } else {
        rng.next_f64() * REVERSE_MAX
    };
    let signed = match (was_up, continued) {
        (true, true) | (false, false) => magnitude,
        (true, false) | (false, true) => -magnitude,
    };
    round2(signed)
}

// Volume strings look like "58.2M". Perturb by [-1, 1) millions, clamped at
// zero so a thin name can never go negative.
fn jitter_volume(volume: &str, rng: &mut dyn RandomSource) -> anyhow::Result<String> {
    let value: f64 = volume
        .trim()
        .trim_end_matches('M')
        .parse()
        .with_context(|| format!("bad volume string: {volume:?}"))?;
    let next = (value + (rng.next_f64() * 2.0 - 1.0)).max(0.0);
    Ok(format!("{:.1}M", round1(next)))
}

fn format_change(delta: f64) -> String {
    if delta >= 0.0 {
        format!("+{delta:.2}%")
    } else {
        format!("{delta:.2}%")
    }
}

pub fn parse_decimal(s: &str) -> anyhow::Result<f64> {
    s.trim()
        .replace(',', "")
        .parse::<f64>()
        .with_context(|| format!("not a decimal: {s:?}"))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn format_grouped(value: f64) -> String {
    let s = format!("{value:.2}");
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s.as_str(), "00"),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(s.len() + 4);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    format!("{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSequence {
        values: Vec<f64>,
        at: usize,
    }

    impl FixedSequence {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                at: 0,
            }
        }
    }

    impl RandomSource for FixedSequence {
        fn next_f64(&mut self) -> f64 {
            let v = self.values[self.at % self.values.len()];
            self.at += 1;
            v
        }
    }

    fn stock(price: &str, is_up: bool, volume: Option<&str>) -> Stock {
        Stock {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            price: price.to_string(),
            change: "+0.00%".to_string(),
            is_up,
            volume: volume.map(str::to_string),
            market_cap: None,
            pe_ratio: None,
            dividend: None,
            sector: None,
        }
    }

    #[test]
    fn uptrend_usually_continues_up() {
        // 0.5 < 0.7 keeps the direction; magnitude 0.5 * 1.2 = 0.6.
        let mut rng = FixedSequence::new(&[0.5, 0.5]);
        let next = jitter_stock(&stock("100.00", true, None), &mut rng).unwrap();
        assert_eq!(next.price, "100.60");
        assert_eq!(next.change, "+0.60%");
        assert!(next.is_up);
    }

    #[test]
    fn uptrend_reversal_uses_wider_range() {
        // 0.9 >= 0.7 reverses; magnitude 0.5 * 2.0 = 1.0.
        let mut rng = FixedSequence::new(&[0.9, 0.5]);
        let next = jitter_stock(&stock("100.00", true, None), &mut rng).unwrap();
        assert_eq!(next.price, "99.00");
        assert_eq!(next.change, "-1.00%");
        assert!(!next.is_up);
    }

    #[test]
    fn downtrend_usually_continues_down() {
        let mut rng = FixedSequence::new(&[0.5, 0.5]);
        let next = jitter_stock(&stock("100.00", false, None), &mut rng).unwrap();
        assert_eq!(next.price, "99.40");
        assert_eq!(next.change, "-0.60%");
        assert!(!next.is_up);
    }

    #[test]
    fn downtrend_reversal_turns_positive() {
        let mut rng = FixedSequence::new(&[0.95, 0.25]);
        let next = jitter_stock(&stock("100.00", false, None), &mut rng).unwrap();
        assert_eq!(next.price, "100.50");
        assert_eq!(next.change, "+0.50%");
        assert!(next.is_up);
    }

    #[test]
    fn zero_delta_counts_as_up() {
        let mut rng = FixedSequence::new(&[0.5, 0.0]);
        let next = jitter_stock(&stock("100.00", true, None), &mut rng).unwrap();
        assert_eq!(next.change, "+0.00%");
        assert!(next.is_up);
        assert_eq!(next.price, "100.00");
    }

    #[test]
    fn delta_is_rounded_to_two_decimals() {
        // magnitude 0.11111 * 1.2 = 0.1333... -> 0.13%.
        let mut rng = FixedSequence::new(&[0.5, 0.11111]);
        let next = jitter_stock(&stock("100.00", true, None), &mut rng).unwrap();
        assert_eq!(next.change, "+0.13%");
        assert_eq!(next.price, "100.13");
    }

    #[test]
    fn volume_is_clamped_at_zero() {
        // Third draw feeds the volume delta: 0.0 * 2 - 1 = -1.0 million.
        let mut rng = FixedSequence::new(&[0.5, 0.5, 0.0]);
        let next = jitter_stock(&stock("100.00", true, Some("0.3M")), &mut rng).unwrap();
        assert_eq!(next.volume.as_deref(), Some("0.0M"));
    }

    #[test]
    fn volume_moves_within_one_million() {
        // 0.75 * 2 - 1 = +0.5 million.
        let mut rng = FixedSequence::new(&[0.5, 0.5, 0.75]);
        let next = jitter_stock(&stock("100.00", true, Some("58.2M")), &mut rng).unwrap();
        assert_eq!(next.volume.as_deref(), Some("58.7M"));
    }

    #[test]
    fn missing_volume_stays_missing() {
        let mut rng = FixedSequence::new(&[0.5, 0.5]);
        let next = jitter_stock(&stock("100.00", true, None), &mut rng).unwrap();
        assert!(next.volume.is_none());
    }

    #[test]
    fn unparseable_price_is_an_error() {
        let mut rng = FixedSequence::new(&[0.5, 0.5]);
        assert!(jitter_stock(&stock("n/a", true, None), &mut rng).is_err());
    }

    #[test]
    fn index_values_keep_thousands_separators() {
        let index = IndexRecord {
            symbol: "SPX".to_string(),
            name: "S&P 500".to_string(),
            value: "4,781.24".to_string(),
            change: "+0.83%".to_string(),
            is_up: true,
            description: "Large-cap US equities.".to_string(),
            components: vec!["AAPL".to_string()],
        };
        let mut rng = FixedSequence::new(&[0.5, 0.5]);
        let next = jitter_index(&index, &mut rng).unwrap();
        assert_eq!(next.value, "4,809.93");
        assert_eq!(next.change, "+0.60%");
    }

    #[test]
    fn parse_decimal_strips_separators() {
        assert_eq!(parse_decimal("4,781.24").unwrap(), 4781.24);
        assert_eq!(parse_decimal("189.84").unwrap(), 189.84);
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn grouped_formatting() {
        assert_eq!(format_grouped(4809.93), "4,809.93");
        assert_eq!(format_grouped(38519.84), "38,519.84");
        assert_eq!(format_grouped(999.5), "999.50");
        assert_eq!(format_grouped(1000000.0), "1,000,000.00");
    }

    #[test]
    fn seeded_source_is_reproducible() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..16 {
            let (x, y) = (a.next_f64(), b.next_f64());
            assert_eq!(x, y);
            assert!((0.0..1.0).contains(&x));
        }
    }
}
