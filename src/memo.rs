//! Static investment memo: market, competition, risks and projections.

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CompanyOverview {
    pub name: &'static str,
    pub sector: &'static str,
    pub stage: &'static str,
    pub headquarters: &'static str,
    pub founded: u16,
    pub summary: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketSegment {
    pub label: &'static str,
    pub size_usd_m: f64,
    pub cagr_pct: f64,
    pub basis: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Competitor {
    pub name: &'static str,
    pub positioning: &'static str,
    pub pricing: &'static str,
    pub threat: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    fn score(self) -> u8 {
        match self {
            Level::Low => 1,
            Level::Medium => 2,
            Level::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Risk {
    pub title: &'static str,
    pub likelihood: Level,
    pub impact: Level,
    pub mitigation: &'static str,
}

impl Risk {
    /// likelihood x impact on a 1..=9 scale
    pub fn severity(&self) -> u8 {
        self.likelihood.score() * self.impact.score()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct YearProjection {
    pub year: u16,
    pub revenue_usd_k: f64,
    pub gross_margin_pct: f64,
    pub net_burn_usd_k: f64,
    pub headcount: u32,
    pub customers: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FundingAsk {
    pub round: &'static str,
    pub amount_usd_m: f64,
    pub pre_money_usd_m: f64,
    pub use_of_funds: Vec<(&'static str, f64)>,
}

impl FundingAsk {
    pub fn post_money_usd_m(&self) -> f64 {
        self.pre_money_usd_m + self.amount_usd_m
    }

    pub fn dilution_pct(&self) -> f64 {
        self.amount_usd_m / self.post_money_usd_m() * 100.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestmentMemo {
    pub company: CompanyOverview,
    pub market: Vec<MarketSegment>,
    pub competitors: Vec<Competitor>,
    pub risks: Vec<Risk>,
    pub projections: Vec<YearProjection>,
    pub funding: FundingAsk,
}

static MEMO: Lazy<InvestmentMemo> = Lazy::new(|| InvestmentMemo {
    company: CompanyOverview {
        name: "Northwind Sensorics",
        sector: "Industrial IoT / predictive maintenance",
        stage: "Seed",
        headquarters: "Rotterdam, NL",
        founded: 2022,
        summary: "Retrofit vibration sensors and a failure-prediction service that lets \
                  mid-size manufacturers schedule maintenance before rotating equipment fails.",
    },
    market: vec![
        MarketSegment {
            label: "TAM",
            size_usd_m: 12_400.0,
            cagr_pct: 24.0,
            basis: "Global predictive maintenance software and sensing",
        },
        MarketSegment {
            label: "SAM",
            size_usd_m: 1_850.0,
            cagr_pct: 27.0,
            basis: "EU mid-size discrete and process manufacturers",
        },
        MarketSegment {
            label: "SOM",
            size_usd_m: 46.0,
            cagr_pct: 35.0,
            basis: "Benelux and DACH plants reachable by 2029",
        },
    ],
    competitors: vec![
        Competitor {
            name: "Large automation vendors",
            positioning: "Bundled condition monitoring on new equipment",
            pricing: "$35-60 per sensor per month, multi-year contracts",
            threat: Level::High,
        },
        Competitor {
            name: "Horizontal IoT platforms",
            positioning: "Generic telemetry with DIY analytics",
            pricing: "Usage based",
            threat: Level::Medium,
        },
        Competitor {
            name: "Vibration analysis consultancies",
            positioning: "Periodic manual route-based inspections",
            pricing: "Day-rate services",
            threat: Level::Low,
        },
    ],
    risks: vec![
        Risk {
            title: "Model precision degrades on new asset classes",
            likelihood: Level::Medium,
            impact: Level::High,
            mitigation: "Transfer-learning program and per-class labelling budget",
        },
        Risk {
            title: "Long enterprise sales cycles",
            likelihood: Level::High,
            impact: Level::Medium,
            mitigation: "Paid pilots with pre-agreed conversion terms",
        },
        Risk {
            title: "Hardware supply disruption",
            likelihood: Level::Low,
            impact: Level::High,
            mitigation: "Second-source contract manufacturer qualified in 2025",
        },
        Risk {
            title: "Certification delays for hazardous areas",
            likelihood: Level::Medium,
            impact: Level::Medium,
            mitigation: "Pre-assessment with notified body before volume order",
        },
        Risk {
            title: "Incumbent price response",
            likelihood: Level::Medium,
            impact: Level::Medium,
            mitigation: "Focus on retrofit segment incumbents underserve",
        },
    ],
    projections: vec![
        YearProjection {
            year: 2025,
            revenue_usd_k: 420.0,
            gross_margin_pct: 38.0,
            net_burn_usd_k: 2_100.0,
            headcount: 14,
            customers: 6,
        },
        YearProjection {
            year: 2026,
            revenue_usd_k: 1_350.0,
            gross_margin_pct: 49.0,
            net_burn_usd_k: 3_200.0,
            headcount: 26,
            customers: 19,
        },
        YearProjection {
            year: 2027,
            revenue_usd_k: 3_900.0,
            gross_margin_pct: 58.0,
            net_burn_usd_k: 3_600.0,
            headcount: 41,
            customers: 52,
        },
        YearProjection {
            year: 2028,
            revenue_usd_k: 8_700.0,
            gross_margin_pct: 63.0,
            net_burn_usd_k: 1_900.0,
            headcount: 58,
            customers: 118,
        },
    ],
    funding: FundingAsk {
        round: "Seed extension",
        amount_usd_m: 6.0,
        pre_money_usd_m: 18.0,
        use_of_funds: vec![
            ("Engineering and ML", 45.0),
            ("Sales and pilots", 30.0),
            ("Hardware inventory and certification", 15.0),
            ("G&A", 10.0),
        ],
    },
});

/// The hardcoded memo shown on every view.
pub fn investment_memo() -> &'static InvestmentMemo {
    &MEMO
}

impl InvestmentMemo {
    /// Year-over-year revenue growth in percent, aligned with `projections[1..]`.
    pub fn revenue_growth_pct(&self) -> Vec<(u16, f64)> {
        self.projections
            .windows(2)
            .filter(|w| w[0].revenue_usd_k > 0.0)
            .map(|w| {
                let growth = (w[1].revenue_usd_k / w[0].revenue_usd_k - 1.0) * 100.0;
                (w[1].year, growth)
            })
            .collect()
    }

    pub fn cumulative_burn_usd_k(&self) -> f64 {
        self.projections.iter().map(|p| p.net_burn_usd_k).sum()
    }

    /// Risks ordered by severity, highest first.
    pub fn risks_by_severity(&self) -> Vec<&Risk> {
        let mut risks: Vec<&Risk> = self.risks.iter().collect();
        risks.sort_by(|a, b| b.severity().cmp(&a.severity()));
        risks
    }

    /// Plain-text rendering used as LLM context and by the CLI.
    pub fn to_context_text(&self) -> String {
        let mut out = String::new();
        let c = &self.company;
        let _ = writeln!(out, "# {} ({}, {})", c.name, c.sector, c.stage);
        let _ = writeln!(out, "HQ: {}. Founded {}.", c.headquarters, c.founded);
        let _ = writeln!(out, "{}", c.summary);

        let _ = writeln!(out, "\n## Market");
        for m in &self.market {
            let _ = writeln!(
                out,
                "- {}: ${:.0}M, CAGR {:.0}% ({})",
                m.label, m.size_usd_m, m.cagr_pct, m.basis
            );
        }

        let _ = writeln!(out, "\n## Competition");
        for comp in &self.competitors {
            let _ = writeln!(
                out,
                "- {} [threat: {}]: {}; pricing {}",
                comp.name,
                comp.threat.as_str(),
                comp.positioning,
                comp.pricing
            );
        }

        let _ = writeln!(out, "\n## Risks");
        for r in self.risks_by_severity() {
            let _ = writeln!(
                out,
                "- {} (likelihood {}, impact {}, severity {}/9). Mitigation: {}",
                r.title,
                r.likelihood.as_str(),
                r.impact.as_str(),
                r.severity(),
                r.mitigation
            );
        }

        let _ = writeln!(out, "\n## Financial projections (USD k)");
        let growth = self.revenue_growth_pct();
        for p in &self.projections {
            let yoy = growth
                .iter()
                .find(|(y, _)| *y == p.year)
                .map(|(_, g)| format!(", YoY {:+.0}%", g))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "- {}: revenue {:.0}{}, gross margin {:.0}%, net burn {:.0}, headcount {}, customers {}",
                p.year,
                p.revenue_usd_k,
                yoy,
                p.gross_margin_pct,
                p.net_burn_usd_k,
                p.headcount,
                p.customers
            );
        }
        let _ = writeln!(
            out,
            "Cumulative net burn: {:.0}",
            self.cumulative_burn_usd_k()
        );

        let f = &self.funding;
        let _ = writeln!(
            out,
            "\n## Funding ask\n{}: ${:.1}M at ${:.1}M pre-money (post ${:.1}M, dilution {:.1}%)",
            f.round,
            f.amount_usd_m,
            f.pre_money_usd_m,
            f.post_money_usd_m(),
            f.dilution_pct()
        );
        for (purpose, pct) in &f.use_of_funds {
            let _ = writeln!(out, "- {}: {:.0}%", purpose, pct);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_follows_projection_years() {
        let memo = investment_memo();
        let growth = memo.revenue_growth_pct();
        assert_eq!(growth.len(), memo.projections.len() - 1);
        assert_eq!(growth[0].0, 2026);
        assert!((growth[0].1 - 221.428).abs() < 0.01);
    }

    #[test]
    fn funding_math() {
        let f = &investment_memo().funding;
        assert_eq!(f.post_money_usd_m(), 24.0);
        assert!((f.dilution_pct() - 25.0).abs() < f64::EPSILON);
        let total: f64 = f.use_of_funds.iter().map(|(_, p)| p).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn highest_severity_risk_listed_first() {
        let risks = investment_memo().risks_by_severity();
        assert_eq!(risks[0].severity(), 6);
        assert!(risks.windows(2).all(|w| w[0].severity() >= w[1].severity()));
    }

    #[test]
    fn context_text_mentions_every_section() {
        let text = investment_memo().to_context_text();
        for needle in [
            "## Market",
            "## Competition",
            "## Risks",
            "## Financial",
            "## Funding ask",
        ] {
            assert!(text.contains(needle), "missing {}", needle);
        }
        assert!(text.contains("Northwind Sensorics"));
    }
}
