use crate::domain::Timelog;
use crate::error::{TimelogError, TimelogResult};

/// Decode file content into a timelog, merging over the defaults.
///
/// Empty content is a freshly created file and decodes as the default
/// timelog. Anything else that isn't timelog JSON is a parse error; it is
/// never silently replaced with defaults.
pub fn decode(path: &str, content: &str) -> TimelogResult<Timelog> {
    if content.trim().is_empty() {
        return Ok(Timelog::default());
    }
    serde_json::from_str(content).map_err(|source| TimelogError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Encode a timelog as compact JSON
pub fn encode(timelog: &Timelog) -> TimelogResult<String> {
    Ok(serde_json::to_string(timelog)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timelog::default_plans;
    use crate::domain::{Plan, Record};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_empty_content_is_default() {
        assert_eq!(decode("a.timelog", "").unwrap(), Timelog::default());
        assert_eq!(decode("a.timelog", "  \n").unwrap(), Timelog::default());
    }

    #[test]
    fn test_decode_merges_missing_keys() {
        let timelog = decode("a.timelog", r#"{"records":[{"start":"2024-03-01 09:00:00","id":"001"}]}"#).unwrap();
        assert_eq!(timelog.plans, default_plans());
        assert_eq!(timelog.records, vec![Record::open("2024-03-01 09:00:00", "001")]);

        let timelog = decode("a.timelog", r#"{"plans":[{"id":"x"}]}"#).unwrap();
        assert_eq!(timelog.plans, vec![Plan::new("x", "")]);
        assert!(timelog.records.is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode("a.timelog", "not json").unwrap_err();
        assert!(matches!(err, TimelogError::Parse { .. }));
        assert!(err.to_string().starts_with("a.timelog is not a valid timelog file"));
    }

    #[test]
    fn test_encode_field_order() {
        let timelog = Timelog {
            plans: vec![Plan::new("001", "跑步")],
            records: vec![Record::open("2024-03-01 09:00:00", "001")],
        };
        assert_eq!(
            encode(&timelog).unwrap(),
            r#"{"plans":[{"id":"001","name":"跑步"}],"records":[{"start":"2024-03-01 09:00:00","stop":"","id":"001"}]}"#
        );
    }

    #[test]
    fn test_encode_then_decode_is_equal() {
        let mut timelog = Timelog::default();
        timelog.records.push(Record {
            start: "2024-03-01 09:00:00".to_string(),
            stop: "2024-03-01 09:30:00".to_string(),
            id: "002".to_string(),
        });
        let content = encode(&timelog).unwrap();
        assert_eq!(decode("a.timelog", &content).unwrap(), timelog);
    }
}
