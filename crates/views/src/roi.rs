//! Retention ROI estimate. Pure arithmetic, no backend calls.

/// Share of high-risk departures an intervention programme is assumed to prevent.
pub const INTERVENTION_SUCCESS_RATE: f64 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct RoiCalculator {
    pub replacement_cost: f64,
    pub training_cost: f64,
    /// Months to full productivity. Shown as an assumption, not used in the maths.
    pub ramp_up_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiProjection {
    pub high_risk_count: u64,
    pub total_exposure: f64,
    pub projected_savings: f64,
}

impl RoiCalculator {
    pub fn new(replacement_cost: f64, training_cost: f64) -> Self {
        Self {
            replacement_cost,
            training_cost,
            ramp_up_months: 3,
        }
    }

    pub fn total_exposure(&self, high_risk_count: u64) -> f64 {
        high_risk_count as f64 * (self.replacement_cost + self.training_cost)
    }

    pub fn projected_savings(&self, high_risk_count: u64) -> f64 {
        self.total_exposure(high_risk_count) * INTERVENTION_SUCCESS_RATE
    }

    /// Evaluated on demand, so it always reflects the current inputs.
    pub fn project(&self, high_risk_count: u64) -> RoiProjection {
        RoiProjection {
            high_risk_count,
            total_exposure: self.total_exposure(high_risk_count),
            projected_savings: self.projected_savings(high_risk_count),
        }
    }
}

impl Default for RoiCalculator {
    fn default() -> Self {
        Self::new(30_000.0, 5_000.0)
    }
}

/// Thousands-separated amount, no currency symbol, at most two decimals.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative && cents > 0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if frac > 0 {
        if frac % 10 == 0 {
            out.push_str(&format!(".{}", frac / 10));
        } else {
            out.push_str(&format!(".{:02}", frac));
        }
    }
    out
}
