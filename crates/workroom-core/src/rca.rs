use crate::event::{
    DataEvent, Incident, RcaIndexContent, SolutionContent, SolutionStub, SolutionTier,
};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// RcaReport
// ---------------------------------------------------------------------------

/// Root-cause view model. The incident header and narrative are singletons:
/// whichever `data-index` / `data-rca` event arrived last wins outright,
/// whatever its artifact id — re-emitting either replaces the whole view.
/// Solution details fold latest-by-`solution_id` and are spliced into the
/// winning narrative's stubs; a detail no stub references stays invisible.
#[derive(Debug, Clone, PartialEq)]
pub struct RcaReport {
    pub index: Option<RcaIndexContent>,
    pub incident: Option<Incident>,
    pub immediate: Vec<Solution>,
    pub short_term: Vec<Solution>,
    pub long_term: Vec<Solution>,
    dropped: Vec<Solution>,
}

/// One remediation: the stub from the narrative plus its detail, when the
/// matching `data-solution` event has arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub stub: SolutionStub,
    pub detail: Option<SolutionContent>,
}

impl RcaReport {
    pub fn from_events(events: &[DataEvent]) -> RcaReport {
        let index = events
            .iter()
            .filter_map(|e| match e {
                DataEvent::RcaIndex { data } => Some(data.content.clone()),
                _ => None,
            })
            .last();
        let narrative = events
            .iter()
            .filter_map(|e| match e {
                DataEvent::Rca { data } => Some(data.content.clone()),
                _ => None,
            })
            .last();

        let mut details: HashMap<String, SolutionContent> = HashMap::new();
        for event in events {
            if let DataEvent::Solution { data } = event {
                details.insert(data.content.solution_id.clone(), data.content.clone());
            }
        }

        let mut report = RcaReport {
            index,
            incident: narrative.as_ref().map(|n| n.incident.clone()),
            immediate: Vec::new(),
            short_term: Vec::new(),
            long_term: Vec::new(),
            dropped: Vec::new(),
        };

        if let Some(narrative) = narrative {
            for stub in narrative.solutions {
                let solution = Solution {
                    detail: details.get(&stub.id).cloned(),
                    stub,
                };
                let bucket = match solution.stub.tier {
                    SolutionTier::Immediate => &mut report.immediate,
                    SolutionTier::ShortTerm => &mut report.short_term,
                    SolutionTier::LongTerm => &mut report.long_term,
                    SolutionTier::Unknown => &mut report.dropped,
                };
                bucket.push(solution);
            }
        }

        report
    }

    /// Tier buckets in rendering order.
    pub fn tiers(&self) -> [(SolutionTier, &[Solution]); 3] {
        [
            (SolutionTier::Immediate, self.immediate.as_slice()),
            (SolutionTier::ShortTerm, self.short_term.as_slice()),
            (SolutionTier::LongTerm, self.long_term.as_slice()),
        ]
    }

    /// Stubs whose tier parsed as `Unknown`; they are kept out of every
    /// bucket but surfaced here so callers can mention the gap.
    pub fn dropped_solutions(&self) -> &[Solution] {
        &self.dropped
    }

    pub fn total_solutions(&self) -> usize {
        self.immediate.len() + self.short_term.len() + self.long_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_none() && self.incident.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
