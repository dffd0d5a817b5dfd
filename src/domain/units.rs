// SI unit scaling for axis tick labels

/// Decimal SI prefixes, each a further factor of 1000.
const PREFIXES: [(&str, f64); 8] = [
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
    ("Z", 1e21),
    ("Y", 1e24),
];

pub const DEFAULT_TICK_DECIMALS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub factor: f64,
    pub prefix: &'static str,
}

impl Scale {
    pub const UNIT: Scale = Scale {
        factor: 1.0,
        prefix: "",
    };
}

/// Largest prefix whose factor does not exceed `max`.
pub fn scale_factor(max: f64) -> Scale {
    let magnitude = max.abs();
    PREFIXES
        .iter()
        .rev()
        .find(|(_, factor)| magnitude / factor >= 1.0)
        .map(|&(prefix, factor)| Scale { factor, prefix })
        .unwrap_or(Scale::UNIT)
}

/// The parts of an axis tick formatting depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub max: f64,
    pub tick_decimals: usize,
}

impl AxisScale {
    pub fn new(max: f64, tick_decimals: Option<usize>) -> Self {
        Self {
            max,
            tick_decimals: tick_decimals.unwrap_or(DEFAULT_TICK_DECIMALS),
        }
    }
}

pub fn is_seconds(units: &str) -> bool {
    matches!(units, "s" | "seconds")
}

pub fn format_tick(value: f64, axis: &AxisScale, units: &str) -> String {
    if is_seconds(units) {
        return format!("{:.*}s", axis.tick_decimals, value);
    }

    let scale = scale_factor(axis.max);
    format!(
        "{:.*}{}{}",
        axis.tick_decimals,
        value / scale.factor,
        scale.prefix,
        units
    )
}
