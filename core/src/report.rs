use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::errors::SkyscoutResult;
use crate::search::{SearchOutcome, SearchParameters};

/// JSON record written after each standalone run. Single slot: the file is
/// fully overwritten, never appended.
#[derive(Serialize, Debug)]
pub struct SearchRecord {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_parameters: Option<RecordedParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct RecordedParameters {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub trip_type: String,
}

impl From<&SearchParameters> for RecordedParameters {
    fn from(params: &SearchParameters) -> Self {
        Self {
            origin: params.origin.clone(),
            destination: params.destination.clone(),
            departure_date: params.departure_date.to_string(),
            return_date: params.return_date.map(|d| d.to_string()),
            trip_type: params.trip_type().to_string(),
        }
    }
}

impl From<&SearchOutcome> for SearchRecord {
    fn from(outcome: &SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Success { parameters, details } => Self {
                status: "success",
                details: Some(details.clone()),
                search_parameters: Some(parameters.into()),
                message: None,
            },
            SearchOutcome::Failure { message } => Self {
                status: "error",
                details: None,
                search_parameters: None,
                message: Some(message.clone()),
            },
        }
    }
}

/// Writes the record to `path`, replacing any previous contents.
pub fn write_record(path: &Path, outcome: &SearchOutcome) -> SkyscoutResult<()> {
    let record = SearchRecord::from(outcome);
    let json = serde_json::to_string_pretty(&record)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::Value;

    #[test]
    fn failure_record_has_no_search_parameters_key() {
        let outcome = SearchOutcome::Failure {
            message: "agent timed out".to_string(),
        };
        let value: Value =
            serde_json::from_str(&serde_json::to_string(&SearchRecord::from(&outcome)).unwrap())
                .unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "agent timed out");
        assert!(value.get("search_parameters").is_none());
        assert!(value.get("details").is_none());
    }

    #[test]
    fn success_record_matches_the_file_shape() {
        let params = SearchParameters::round_trip(
            "SFO",
            "JFK",
            NaiveDate::from_ymd_opt(2026, 5, 15).unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 22).unwrap(),
        );
        let outcome = SearchOutcome::Success {
            parameters: params,
            details: "Delta $250 nonstop".to_string(),
        };
        let value: Value =
            serde_json::from_str(&serde_json::to_string(&SearchRecord::from(&outcome)).unwrap())
                .unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["details"], "Delta $250 nonstop");
        let sp = &value["search_parameters"];
        assert_eq!(sp["origin"], "SFO");
        assert_eq!(sp["destination"], "JFK");
        assert_eq!(sp["departure_date"], "2026-05-15");
        assert_eq!(sp["return_date"], "2026-05-22");
        assert_eq!(sp["trip_type"], "round-trip");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn one_way_record_serializes_a_null_return_date() {
        let params = SearchParameters::one_way(
            "SFO",
            "JFK",
            NaiveDate::from_ymd_opt(2026, 5, 15).unwrap(),
        );
        let outcome = SearchOutcome::Success {
            parameters: params,
            details: String::new(),
        };
        let value: Value =
            serde_json::from_str(&serde_json::to_string(&SearchRecord::from(&outcome)).unwrap())
                .unwrap();

        assert!(value["search_parameters"]["return_date"].is_null());
        assert_eq!(value["search_parameters"]["trip_type"], "one-way");
    }

    #[test]
    fn write_record_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        let first = SearchOutcome::Success {
            parameters: SearchParameters::one_way(
                "SFO",
                "JFK",
                NaiveDate::from_ymd_opt(2026, 5, 15).unwrap(),
            ),
            details: "first run".to_string(),
        };
        write_record(&path, &first).unwrap();

        let second = SearchOutcome::Failure {
            message: "second run".to_string(),
        };
        write_record(&path, &second).unwrap();

        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["status"], "error");
        assert!(value.get("details").is_none());
    }
}
