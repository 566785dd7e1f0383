// src/core/usage.rs — Running token totals and cost estimation

use std::fmt;

use crate::provider::TokenUsage;

/// Per-token rates in USD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub input_per_token: f64,
    pub cached_per_token: f64,
    pub output_per_token: f64,
}

impl Pricing {
    /// Build from USD-per-million-token rates.
    pub fn per_mtok(input: f64, cached_input: f64, output: f64) -> Self {
        Self {
            input_per_token: input / 1_000_000.0,
            cached_per_token: cached_input / 1_000_000.0,
            output_per_token: output / 1_000_000.0,
        }
    }

    pub fn for_model(model: &str) -> Self {
        let (input, cached, output) = model_pricing(model);
        Self::per_mtok(input, cached, output)
    }
}

/// Returns (input, cached_input, output) USD per Mtok.
pub fn model_pricing(model: &str) -> (f64, f64, f64) {
    match model {
        m if m.contains("gpt-4.1-nano") => (0.1, 0.025, 0.4),
        m if m.contains("gpt-4.1-mini") => (0.4, 0.1, 1.6),
        m if m.contains("gpt-4.1") => (2.0, 0.5, 8.0),
        m if m.contains("gpt-4o-mini") => (0.15, 0.075, 0.6),
        m if m.contains("gpt-4o") => (2.5, 1.25, 10.0),
        m if m.contains("o3-mini") || m.contains("o4-mini") => (1.1, 0.55, 4.4),
        m if m.contains("o3") => (2.0, 0.5, 8.0),

        // Local models served through an OpenAI-compatible endpoint
        m if m.contains("llama")
            || m.contains("mistral")
            || m.contains("gemma")
            || m.contains("qwen")
            || m.contains("deepseek") =>
        {
            (0.0, 0.0, 0.0)
        }

        _ => (1.0, 0.5, 3.0),
    }
}

/// Which kind of call produced a usage record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Responder,
    FollowUp,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Responder => write!(f, "API Call"),
            CallKind::FollowUp => write!(f, "Follow-up API Call"),
        }
    }
}

/// Cumulative token counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub cached_tokens: u64,
    pub output_tokens: u64,
}

impl UsageTotals {
    /// `(input - cached) * input_rate + cached * cached_rate + output * output_rate`
    pub fn estimated_cost(&self, pricing: &Pricing) -> f64 {
        let uncached = self.input_tokens.saturating_sub(self.cached_tokens);
        uncached as f64 * pricing.input_per_token
            + self.cached_tokens as f64 * pricing.cached_per_token
            + self.output_tokens as f64 * pricing.output_per_token
    }
}

/// What a single `record` call reports back for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSnapshot {
    pub call: TokenUsage,
    pub totals: UsageTotals,
    pub estimated_cost: f64,
}

impl UsageSnapshot {
    pub fn summary(&self) -> String {
        format!(
            "Input tokens used = {}, Cached tokens used = {}, Output tokens used = {}, \
             Total input tokens used so far = {}, Total cached tokens used so far = {}, \
             Total output tokens used so far = {}, Estimated total cost so far = ${:.4}",
            self.call.input_tokens,
            self.call.cached_tokens,
            self.call.output_tokens,
            self.totals.input_tokens,
            self.totals.cached_tokens,
            self.totals.output_tokens,
            self.estimated_cost,
        )
    }
}

/// Accumulates usage across every call in one run.
#[derive(Debug, Clone)]
pub struct UsageAccumulator {
    totals: UsageTotals,
    pricing: Pricing,
}

impl UsageAccumulator {
    pub fn new(pricing: Pricing) -> Self {
        Self {
            totals: UsageTotals::default(),
            pricing,
        }
    }

    pub fn record(&mut self, kind: CallKind, usage: &TokenUsage) -> UsageSnapshot {
        self.totals.input_tokens += u64::from(usage.input_tokens);
        self.totals.cached_tokens += u64::from(usage.cached_tokens);
        self.totals.output_tokens += u64::from(usage.output_tokens);

        let snapshot = self.snapshot(*usage);
        tracing::info!(
            call = %kind,
            input = usage.input_tokens,
            cached = usage.cached_tokens,
            output = usage.output_tokens,
            total_input = self.totals.input_tokens,
            total_cached = self.totals.cached_tokens,
            total_output = self.totals.output_tokens,
            "estimated cost so far ${:.4}",
            snapshot.estimated_cost
        );
        snapshot
    }

    fn snapshot(&self, call: TokenUsage) -> UsageSnapshot {
        UsageSnapshot {
            call,
            totals: self.totals,
            estimated_cost: self.estimated_cost(),
        }
    }

    /// Snapshot of the current totals, with no per-call usage attached.
    pub fn current(&self) -> UsageSnapshot {
        self.snapshot(TokenUsage::default())
    }

    pub fn estimated_cost(&self) -> f64 {
        self.totals.estimated_cost(&self.pricing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(input: u32, output: u32, cached: u32) -> TokenUsage {
        TokenUsage {
            input_tokens: input,
            output_tokens: output,
            cached_tokens: cached,
        }
    }

    fn mini() -> Pricing {
        Pricing::per_mtok(0.15, 0.075, 0.6)
    }

    // ─── pricing ────────────────────────────────────────────────

    #[test]
    fn test_pricing_openai() {
        assert_eq!(model_pricing("gpt-4o-mini"), (0.15, 0.075, 0.6));
        assert_eq!(model_pricing("gpt-4o"), (2.5, 1.25, 10.0));
        assert_eq!(model_pricing("gpt-4.1-mini"), (0.4, 0.1, 1.6));
        assert_eq!(model_pricing("o3-mini"), (1.1, 0.55, 4.4));
    }

    #[test]
    fn test_pricing_local_free() {
        assert_eq!(model_pricing("llama3.3"), (0.0, 0.0, 0.0));
        assert_eq!(model_pricing("qwen2.5"), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_pricing_unknown_defaults() {
        assert_eq!(model_pricing("some-unknown-model"), (1.0, 0.5, 3.0));
    }

    #[test]
    fn test_per_mtok_conversion() {
        let p = mini();
        assert!((p.input_per_token - 0.15e-6).abs() < 1e-15);
        assert!((p.cached_per_token - 0.075e-6).abs() < 1e-15);
        assert!((p.output_per_token - 0.6e-6).abs() < 1e-15);
    }

    // ─── estimated cost ─────────────────────────────────────────

    #[test]
    fn test_cost_formula() {
        let totals = UsageTotals {
            input_tokens: 1_000_000,
            cached_tokens: 200_000,
            output_tokens: 500_000,
        };
        // 800K × 0.15 + 200K × 0.075 + 500K × 0.6 = 0.12 + 0.015 + 0.30
        let cost = totals.estimated_cost(&mini());
        assert!((cost - 0.435).abs() < 1e-9);
    }

    #[test]
    fn test_cost_zero_usage() {
        assert_eq!(UsageTotals::default().estimated_cost(&mini()), 0.0);
    }

    #[test]
    fn test_cost_cached_exceeding_input_saturates() {
        let totals = UsageTotals {
            input_tokens: 10,
            cached_tokens: 20,
            output_tokens: 0,
        };
        let cost = totals.estimated_cost(&mini());
        assert!((cost - 20.0 * 0.075e-6).abs() < 1e-15);
    }

    // ─── accumulator ────────────────────────────────────────────

    #[test]
    fn test_accumulator_new() {
        let acc = UsageAccumulator::new(mini());
        assert_eq!(acc.current().totals, UsageTotals::default());
        assert_eq!(acc.estimated_cost(), 0.0);
    }

    #[test]
    fn test_record_accumulates() {
        let mut acc = UsageAccumulator::new(mini());
        acc.record(CallKind::Responder, &usage(100, 50, 10));
        let snap = acc.record(CallKind::FollowUp, &usage(200, 20, 0));

        assert_eq!(snap.call, usage(200, 20, 0));
        assert_eq!(
            snap.totals,
            UsageTotals {
                input_tokens: 300,
                cached_tokens: 10,
                output_tokens: 70,
            }
        );
    }

    #[test]
    fn test_record_cost_matches_formula_every_step() {
        let p = mini();
        let mut acc = UsageAccumulator::new(p);
        let mut previous = 0.0;
        for (i, o, c) in [(120, 40, 0), (300, 80, 128), (50, 0, 0), (900, 100, 512)] {
            let snap = acc.record(CallKind::Responder, &usage(i, o, c));
            let t = snap.totals;
            let expected = (t.input_tokens - t.cached_tokens) as f64 * p.input_per_token
                + t.cached_tokens as f64 * p.cached_per_token
                + t.output_tokens as f64 * p.output_per_token;
            assert!((snap.estimated_cost - expected).abs() < 1e-15);
            assert!(snap.estimated_cost >= previous);
            previous = snap.estimated_cost;
        }
    }

    #[test]
    fn test_missing_cached_counts_as_zero() {
        let mut acc = UsageAccumulator::new(mini());
        let snap = acc.record(CallKind::Responder, &usage(1000, 100, 0));
        assert_eq!(snap.totals.cached_tokens, 0);
        let expected = 1000.0 * 0.15e-6 + 100.0 * 0.6e-6;
        assert!((snap.estimated_cost - expected).abs() < 1e-15);
    }

    #[test]
    fn test_current_snapshot_has_empty_call() {
        let mut acc = UsageAccumulator::new(mini());
        acc.record(CallKind::Responder, &usage(10, 5, 0));
        let snap = acc.current();
        assert_eq!(snap.call, TokenUsage::default());
        assert_eq!(snap.totals.input_tokens, 10);
    }

    #[test]
    fn test_summary_format() {
        let mut acc = UsageAccumulator::new(mini());
        let s = acc.record(CallKind::Responder, &usage(1000, 100, 0)).summary();
        assert!(s.starts_with("Input tokens used = 1000, Cached tokens used = 0"));
        assert!(s.ends_with("Estimated total cost so far = $0.0002"));
    }

    #[test]
    fn test_call_kind_display() {
        assert_eq!(CallKind::Responder.to_string(), "API Call");
        assert_eq!(CallKind::FollowUp.to_string(), "Follow-up API Call");
    }
}
