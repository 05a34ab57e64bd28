use serde::{Deserialize, Serialize};

/// A named activity that records are attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Stable identifier, unique within a timelog
    pub id: String,
    /// Display label, may repeat across plans
    #[serde(default)]
    pub name: String,
}

impl Plan {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One time interval attributed to a plan.
/// An empty `stop` marks the record as still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub start: String,
    #[serde(default)]
    pub stop: String,
    /// Plan id; not checked against the plan list
    #[serde(default)]
    pub id: String,
}

impl Record {
    pub fn open(start: impl Into<String>, plan_id: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            stop: String::new(),
            id: plan_id.into(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.stop.is_empty()
    }
}

/// Plans shipped in every new timelog file
pub fn default_plans() -> Vec<Plan> {
    vec![
        Plan::new("001", "背单词"),
        Plan::new("002", "跑步"),
        Plan::new("003", "休息"),
    ]
}

/// The whole content of one timelog file.
/// Missing keys decode to their defaults so older files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timelog {
    #[serde(default = "default_plans")]
    pub plans: Vec<Plan>,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Default for Timelog {
    fn default() -> Self {
        Self {
            plans: default_plans(),
            records: Vec::new(),
        }
    }
}

impl Timelog {
    pub fn is_open(&self) -> bool {
        records_open(&self.records)
    }
}

/// True iff the last record has not been stopped
pub fn records_open(records: &[Record]) -> bool {
    records.last().is_some_and(Record::is_open)
}

/// Display name for a plan id, empty when the plan no longer exists
pub fn plan_name<'a>(plans: &'a [Plan], id: &str) -> &'a str {
    plans
        .iter()
        .find(|plan| plan.id == id)
        .map(|plan| plan.name.as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timelog() {
        let timelog = Timelog::default();
        assert_eq!(timelog.plans.len(), 3);
        assert!(timelog.records.is_empty());
        assert!(!timelog.is_open());
    }

    #[test]
    fn test_is_open_only_looks_at_last_record() {
        let mut records = vec![Record::open("2024-03-01 09:00:00", "001")];
        assert!(records_open(&records));

        records[0].stop = "2024-03-01 10:00:00".to_string();
        assert!(!records_open(&records));

        records.push(Record::open("2024-03-01 11:00:00", "002"));
        assert!(records_open(&records));
    }

    #[test]
    fn test_plan_name_falls_back_to_empty() {
        let plans = default_plans();
        assert_eq!(plan_name(&plans, "002"), "跑步");
        assert_eq!(plan_name(&plans, "deleted"), "");
    }
}
