use crate::event::{DataEvent, FileWriteContent, FileWriteStatus};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// AutomationReport
// ---------------------------------------------------------------------------

/// Files the agent wrote during a run: latest record per artifact id, in
/// first-appearance order. Backs the automation view and the end-of-run
/// summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationReport {
    pub files: Vec<FileWriteContent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AutomationCounts {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

impl AutomationReport {
    pub fn from_events(events: &[DataEvent]) -> AutomationReport {
        let mut order: Vec<String> = Vec::new();
        let mut latest: HashMap<String, FileWriteContent> = HashMap::new();
        for event in events {
            if let DataEvent::FileWrite { data } = event {
                if !latest.contains_key(&data.artifact_id) {
                    order.push(data.artifact_id.clone());
                }
                latest.insert(data.artifact_id.clone(), data.content.clone());
            }
        }
        AutomationReport {
            files: order.iter().map(|id| latest[id].clone()).collect(),
        }
    }

    pub fn counts(&self) -> AutomationCounts {
        let mut counts = AutomationCounts {
            created: 0,
            updated: 0,
            failed: 0,
        };
        for file in &self.files {
            match file.status {
                FileWriteStatus::Created => counts.created += 1,
                FileWriteStatus::Updated => counts.updated += 1,
                FileWriteStatus::Failed => counts.failed += 1,
                FileWriteStatus::Unknown => {}
            }
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
