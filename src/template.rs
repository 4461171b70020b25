//! Hardcoded hypothesis template the store is seeded and reset from.

use once_cell::sync::Lazy;

use crate::hypothesis::{Category, Hypothesis, HypothesisKind, Outcome, Status};

struct Seed {
    id: &'static str,
    category: Category,
    kind: HypothesisKind,
    title: &'static str,
    description: &'static str,
    success_criteria: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "H1",
        category: Category::Market,
        kind: HypothesisKind::KillCriteria,
        title: "Mid-size plants will pay for predictive maintenance",
        description: "Plant managers at 200-2,000 employee manufacturers have budget authority \
                      for a subscription that prevents unplanned downtime.",
        success_criteria: "At least 8 of 20 discovery interviews confirm an allocated OPEX line \
                           above $40k/year.",
    },
    Seed {
        id: "H2",
        category: Category::Tech,
        kind: HypothesisKind::KillCriteria,
        title: "Failure prediction beats the 14-day lead time",
        description: "The vibration model flags bearing and gearbox failures early enough for a \
                      planned intervention.",
        success_criteria: "Pilot data shows >= 70% recall at >= 14 days lead time with fewer \
                           than 2 false alarms per asset per quarter.",
    },
    Seed {
        id: "H3",
        category: Category::Team,
        kind: HypothesisKind::KillCriteria,
        title: "Founders can run an enterprise sales motion",
        description: "The founding team can close six-figure contracts without a hired VP of \
                      Sales in the first 18 months.",
        success_criteria: "Two signed contracts above $100k ACV sourced and closed by founders.",
    },
    Seed {
        id: "H4",
        category: Category::Regulatory,
        kind: HypothesisKind::KillCriteria,
        title: "Sensor hardware clears industrial certification",
        description: "The edge sensor can be certified for hazardous-area installation without a \
                      redesign of the enclosure.",
        success_criteria: "ATEX/IECEx pre-assessment passes with no major findings.",
    },
    Seed {
        id: "H5",
        category: Category::Financial,
        kind: HypothesisKind::KillCriteria,
        title: "Unit economics support a venture outcome",
        description: "Hardware plus subscription pricing yields payback under 18 months at \
                      pilot-scale volumes.",
        success_criteria: "Modelled CAC payback <= 18 months and blended gross margin >= 55% \
                           using pilot actuals.",
    },
    Seed {
        id: "H6",
        category: Category::Market,
        kind: HypothesisKind::Weighted,
        title: "Pilots convert to paid deployments",
        description: "Customers who run a 90-day pilot expand to a plant-wide deployment.",
        success_criteria: "At least 3 of 5 active pilots convert within 120 days.",
    },
    Seed {
        id: "H7",
        category: Category::Market,
        kind: HypothesisKind::Weighted,
        title: "Land-and-expand across sites",
        description: "Multi-site customers roll out to a second facility within a year.",
        success_criteria: "Net revenue retention above 120% in the reference cohort.",
    },
    Seed {
        id: "H8",
        category: Category::Tech,
        kind: HypothesisKind::Weighted,
        title: "Installation takes under a day per line",
        description: "Retrofit installation does not require a production stoppage.",
        success_criteria: "Median install time below 6 hours across pilot lines.",
    },
    Seed {
        id: "H9",
        category: Category::Tech,
        kind: HypothesisKind::Weighted,
        title: "Model transfers across machine types",
        description: "A model trained on pumps generalizes to compressors and conveyors with \
                      limited relabelling.",
        success_criteria: "Less than 200 labelled events needed per new asset class.",
    },
    Seed {
        id: "H10",
        category: Category::Team,
        kind: HypothesisKind::Weighted,
        title: "Key ML hires are attainable",
        description: "The company can hire two senior ML engineers at planned compensation.",
        success_criteria: "Two offers accepted within 4 months of close.",
    },
    Seed {
        id: "H11",
        category: Category::Regulatory,
        kind: HypothesisKind::Weighted,
        title: "Plant data can leave the premises",
        description: "Customer IT policies allow telemetry export to a cloud region in the EU.",
        success_criteria: "No more than 1 in 5 prospects require a fully on-prem deployment.",
    },
    Seed {
        id: "H12",
        category: Category::Financial,
        kind: HypothesisKind::Weighted,
        title: "Hardware margin improves with volume",
        description: "Contract manufacturing quotes fall as order volume crosses 5,000 units.",
        success_criteria: "Quoted BOM cost at 5k units at least 25% below pilot batch cost.",
    },
    Seed {
        id: "H13",
        category: Category::Financial,
        kind: HypothesisKind::Weighted,
        title: "Runway covers Series A milestones",
        description: "The proposed round funds the company to the revenue milestone for a \
                      Series A.",
        success_criteria: "Bottom-up plan reaches $2.5M ARR with at least 6 months runway left.",
    },
    Seed {
        id: "H14",
        category: Category::Competitive,
        kind: HypothesisKind::Weighted,
        title: "Incumbents cannot match price point",
        description: "Large automation vendors will not offer a comparable subscription below \
                      $15 per sensor per month.",
        success_criteria: "Competitive quotes collected from 3 lost deals are at least 40% higher.",
    },
    Seed {
        id: "H15",
        category: Category::Competitive,
        kind: HypothesisKind::Weighted,
        title: "Channel partners will resell",
        description: "Regional maintenance integrators will bundle the product into service \
                      contracts.",
        success_criteria: "Two reseller agreements signed with committed volume.",
    },
];

static TEMPLATE: Lazy<Vec<Hypothesis>> = Lazy::new(|| {
    SEEDS
        .iter()
        .map(|seed| Hypothesis {
            id: seed.id.to_string(),
            category: seed.category,
            kind: seed.kind,
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            success_criteria: seed.success_criteria.to_string(),
            status: Status::NotStarted,
            outcome: Outcome::Pending,
            owner: String::new(),
            due_date: None,
            notes: String::new(),
            last_modified: None,
        })
        .collect()
});

/// Fresh copy of the template collection.
pub fn template() -> Vec<Hypothesis> {
    TEMPLATE.clone()
}

/// Template ids in collection order.
pub fn template_ids() -> impl Iterator<Item = &'static str> {
    SEEDS.iter().map(|s| s.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = template_ids().collect();
        assert_eq!(ids.len(), SEEDS.len());
    }

    #[test]
    fn every_record_starts_pending_and_not_started() {
        for h in template() {
            assert_eq!(h.outcome, Outcome::Pending, "{}", h.id);
            assert_eq!(h.status, Status::NotStarted, "{}", h.id);
            assert!(h.last_modified.is_none());
        }
    }

    #[test]
    fn template_has_both_kinds() {
        let t = template();
        assert!(t.iter().any(Hypothesis::is_kill_criterion));
        assert!(t.iter().any(|h| !h.is_kill_criterion()));
    }
}
