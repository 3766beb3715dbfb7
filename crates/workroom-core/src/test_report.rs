use crate::event::{DataEvent, SourceContent, TestCaseContent, TestCaseKind};
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// TestReport
// ---------------------------------------------------------------------------

/// Test-generation view model: sources in first-appearance order, each with
/// its current cases bucketed by kind. Rebuilt from scratch on every fold;
/// membership always reflects each source's latest index, so an index that
/// shrank drops the cases it no longer lists.
#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    pub sources: Vec<SourceGroup>,
    unassigned: Vec<TestCaseContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceGroup {
    pub artifact_id: String,
    pub source: SourceContent,
    pub functional: Vec<TestCaseContent>,
    pub edge: Vec<TestCaseContent>,
    pub negative: Vec<TestCaseContent>,
    pub regression: Vec<TestCaseContent>,
}

impl SourceGroup {
    fn new(artifact_id: String, source: SourceContent) -> Self {
        SourceGroup {
            artifact_id,
            source,
            functional: Vec::new(),
            edge: Vec::new(),
            negative: Vec::new(),
            regression: Vec::new(),
        }
    }

    fn bucket_mut(&mut self, kind: TestCaseKind) -> &mut Vec<TestCaseContent> {
        match kind {
            TestCaseKind::Functional => &mut self.functional,
            TestCaseKind::Edge => &mut self.edge,
            TestCaseKind::Negative => &mut self.negative,
            TestCaseKind::Regression => &mut self.regression,
        }
    }

    pub fn cases(&self, kind: TestCaseKind) -> &[TestCaseContent] {
        match kind {
            TestCaseKind::Functional => &self.functional,
            TestCaseKind::Edge => &self.edge,
            TestCaseKind::Negative => &self.negative,
            TestCaseKind::Regression => &self.regression,
        }
    }

    /// Buckets in fixed rendering order, empty ones included.
    pub fn buckets(&self) -> impl Iterator<Item = (TestCaseKind, &[TestCaseContent])> {
        TestCaseKind::all().iter().map(|k| (*k, self.cases(*k)))
    }

    pub fn total(&self) -> usize {
        self.functional.len() + self.edge.len() + self.negative.len() + self.regression.len()
    }
}

impl TestReport {
    /// Fold the event log into the report. Two passes: first upsert the
    /// latest source record per `artifact_id` and the latest case record per
    /// case id (insertion order preserved on overwrite), then group.
    ///
    /// Grouping: a case joins every source whose current index lists its id,
    /// at most once per source. A case no index claims falls back to file
    /// path matching — it joins each source whose `artifact_id` appears
    /// inside the case's file path. Cases neither claimed nor matched stay
    /// in `unassigned`.
    pub fn from_events(events: &[DataEvent]) -> TestReport {
        let mut source_order: Vec<String> = Vec::new();
        let mut sources: HashMap<String, SourceContent> = HashMap::new();
        let mut case_order: Vec<String> = Vec::new();
        let mut cases: HashMap<String, TestCaseContent> = HashMap::new();

        for event in events {
            match event {
                DataEvent::Source { data } => {
                    if !sources.contains_key(&data.artifact_id) {
                        source_order.push(data.artifact_id.clone());
                    }
                    sources.insert(data.artifact_id.clone(), data.content.clone());
                }
                DataEvent::TestCase { data } => {
                    if !cases.contains_key(&data.content.id) {
                        case_order.push(data.content.id.clone());
                    }
                    cases.insert(data.content.id.clone(), data.content.clone());
                }
                _ => {}
            }
        }

        let mut groups: Vec<SourceGroup> = source_order
            .iter()
            .map(|id| SourceGroup::new(id.clone(), sources[id].clone()))
            .collect();

        let mut claimed: HashSet<String> = HashSet::new();
        for group in &mut groups {
            let listed: Vec<String> = group
                .source
                .test_case_index
                .iter()
                .map(|p| p.id.clone())
                .collect();
            let mut seen: HashSet<String> = HashSet::new();
            for id in listed {
                if !seen.insert(id.clone()) {
                    continue;
                }
                if let Some(case) = cases.get(&id) {
                    group.bucket_mut(case.kind).push(case.clone());
                    claimed.insert(id);
                }
            }
        }

        let mut unassigned = Vec::new();
        for id in &case_order {
            if claimed.contains(id) {
                continue;
            }
            let case = &cases[id];
            let mut placed = false;
            if let Some(file) = &case.file {
                for group in &mut groups {
                    if file.contains(group.artifact_id.as_str()) {
                        group.bucket_mut(case.kind).push(case.clone());
                        placed = true;
                    }
                }
            }
            if !placed {
                unassigned.push(case.clone());
            }
        }

        TestReport { sources: groups, unassigned }
    }

    /// Cases grouped under at least one source.
    pub fn total_cases(&self) -> usize {
        self.sources.iter().map(SourceGroup::total).sum()
    }

    /// Cases no index claims and no file path places.
    pub fn unassigned(&self) -> &[TestCaseContent] {
        &self.unassigned
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
