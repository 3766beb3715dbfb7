use crate::event::{DataEvent, RequirementContent, RequirementKind};
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// RequirementsTree
// ---------------------------------------------------------------------------

/// Requirements-breakdown view model: epics holding stories holding tasks.
/// Children hang off their parent by inverting the child's back-reference
/// (`story.epic_id`, `task.story_id`); a record whose parent never arrived
/// is promoted to the top level rather than dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementsTree {
    pub epics: Vec<EpicNode>,
    pub orphan_stories: Vec<StoryNode>,
    pub orphan_tasks: Vec<RequirementContent>,
    records: Vec<RequirementContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpicNode {
    pub epic: RequirementContent,
    pub stories: Vec<StoryNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoryNode {
    pub story: RequirementContent,
    pub tasks: Vec<RequirementContent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TreeCounts {
    pub epics: usize,
    pub stories: usize,
    pub tasks: usize,
    pub orphans: usize,
}

impl RequirementsTree {
    /// Fold the event log into the tree. Records fold latest-by-id first
    /// (insertion order preserved), then the task→story index is built once
    /// and consumed while stories and epics are assembled in order.
    pub fn from_events(events: &[DataEvent]) -> RequirementsTree {
        let mut order: Vec<String> = Vec::new();
        let mut latest: HashMap<String, RequirementContent> = HashMap::new();
        for event in events {
            if let DataEvent::Requirement { data } = event {
                if !latest.contains_key(&data.content.id) {
                    order.push(data.content.id.clone());
                }
                latest.insert(data.content.id.clone(), data.content.clone());
            }
        }
        let records: Vec<RequirementContent> = order.iter().map(|id| latest[id].clone()).collect();

        let epic_ids: HashSet<&str> = records
            .iter()
            .filter(|r| r.kind == RequirementKind::Epic)
            .map(|r| r.id.as_str())
            .collect();
        let story_ids: HashSet<&str> = records
            .iter()
            .filter(|r| r.kind == RequirementKind::Story)
            .map(|r| r.id.as_str())
            .collect();

        let mut tasks_by_story: HashMap<String, Vec<RequirementContent>> = HashMap::new();
        let mut orphan_tasks = Vec::new();
        for record in &records {
            if record.kind != RequirementKind::Task {
                continue;
            }
            match &record.story_id {
                Some(sid) if story_ids.contains(sid.as_str()) => {
                    tasks_by_story
                        .entry(sid.clone())
                        .or_default()
                        .push(record.clone());
                }
                _ => orphan_tasks.push(record.clone()),
            }
        }

        let mut stories_by_epic: HashMap<String, Vec<StoryNode>> = HashMap::new();
        let mut orphan_stories = Vec::new();
        for record in &records {
            if record.kind != RequirementKind::Story {
                continue;
            }
            let node = StoryNode {
                tasks: tasks_by_story.remove(&record.id).unwrap_or_default(),
                story: record.clone(),
            };
            match &record.epic_id {
                Some(eid) if epic_ids.contains(eid.as_str()) => {
                    stories_by_epic.entry(eid.clone()).or_default().push(node);
                }
                _ => orphan_stories.push(node),
            }
        }

        let mut epics = Vec::new();
        for record in &records {
            if record.kind != RequirementKind::Epic {
                continue;
            }
            epics.push(EpicNode {
                stories: stories_by_epic.remove(&record.id).unwrap_or_default(),
                epic: record.clone(),
            });
        }

        RequirementsTree {
            epics,
            orphan_stories,
            orphan_tasks,
            records,
        }
    }

    /// Tasks belonging to `story_id`, looked up against the flat folded
    /// records instead of the assembled tree. For any story in the tree this
    /// returns exactly the node's attached tasks.
    pub fn related_tasks(&self, story_id: &str) -> Vec<&RequirementContent> {
        self.records
            .iter()
            .filter(|r| {
                r.kind == RequirementKind::Task && r.story_id.as_deref() == Some(story_id)
            })
            .collect()
    }

    pub fn counts(&self) -> TreeCounts {
        let stories: usize =
            self.epics.iter().map(|e| e.stories.len()).sum::<usize>() + self.orphan_stories.len();
        let tasks: usize = self
            .epics
            .iter()
            .flat_map(|e| e.stories.iter())
            .chain(self.orphan_stories.iter())
            .map(|s| s.tasks.len())
            .sum::<usize>()
            + self.orphan_tasks.len();
        TreeCounts {
            epics: self.epics.len(),
            stories,
            tasks,
            orphans: self.orphan_stories.len() + self.orphan_tasks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
