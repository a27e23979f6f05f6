//! Raw response export.

use crate::answers::{AnswerValue, ResponseDocument};
use crate::error::ExportError;
use crate::presenter::latest_first;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::Write;

const HEADER: [&str; 3] = ["response_uuid", "submitted_at", "answers_json"];

/// Write responses as CSV, oldest submission first.
///
/// Responses without a readable timestamp come first, in input order.
pub fn write_responses_csv<W: Write>(
    responses: &[ResponseDocument],
    writer: W,
) -> Result<(), ExportError> {
    let mut ordered: Vec<&ResponseDocument> = responses.iter().collect();
    ordered.sort_by_key(|response| response.submitted_at_utc());

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for response in ordered {
        let answers = serde_json::to_string(&response.answers)?;
        csv_writer.write_record([
            response.response_uuid.as_deref().unwrap_or(""),
            response.submitted_at.as_deref().unwrap_or(""),
            answers.as_str(),
        ])?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Responses CSV as a string.
pub fn responses_csv(responses: &[ResponseDocument]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_responses_csv(responses, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// One response as stored, in the JSON export.
#[derive(Debug, Serialize)]
struct RawResponse<'a> {
    response_uuid: Option<&'a str>,
    answers_json: &'a IndexMap<String, AnswerValue>,
    submitted_at: Option<&'a str>,
}

/// Responses as a JSON array, newest submission first.
pub fn responses_json(responses: &[ResponseDocument]) -> Result<String, ExportError> {
    let records: Vec<RawResponse<'_>> = latest_first(responses)
        .into_iter()
        .map(|response| RawResponse {
            response_uuid: response.response_uuid.as_deref(),
            answers_json: &response.answers,
            submitted_at: response.submitted_at.as_deref(),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(uuid: &str, submitted_at: Option<&str>, answers: serde_json::Value) -> ResponseDocument {
        ResponseDocument {
            response_uuid: Some(uuid.to_string()),
            submitted_at: submitted_at.map(String::from),
            answers: serde_json::from_value(answers).unwrap(),
        }
    }

    #[test]
    fn test_responses_csv_order_and_shape() {
        let responses = vec![
            response("late", Some("2025-02-01 08:00:00"), json!({"q1": "b"})),
            response("early", Some("2025-01-01T08:00:00+07:00"), json!({"q1": "a", "q2": [1, 2]})),
            response("unknown", None, json!({})),
        ];

        let csv = responses_csv(&responses).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "response_uuid,submitted_at,answers_json");
        assert_eq!(lines[1], "unknown,,{}");
        assert_eq!(
            lines[2],
            r#"early,2025-01-01T08:00:00+07:00,"{""q1"":""a"",""q2"":[1,2]}""#
        );
        assert!(lines[3].starts_with("late,2025-02-01 08:00:00,"));
    }

    #[test]
    fn test_empty_corpus_has_header_only() {
        let csv = responses_csv(&[]).unwrap();
        assert_eq!(csv, "response_uuid,submitted_at,answers_json\n");
    }

    #[test]
    fn test_responses_json_newest_first() {
        let responses = vec![
            response("early", Some("2025-01-01T08:00:00+07:00"), json!({"q1": "a"})),
            response("unknown", None, json!({})),
            response("late", Some("2025-02-01 08:00:00"), json!({"q1": "b", "q2": [1, 2]})),
        ];

        let exported: serde_json::Value =
            serde_json::from_str(&responses_json(&responses).unwrap()).unwrap();

        assert_eq!(
            exported,
            json!([
                {"response_uuid": "late", "answers_json": {"q1": "b", "q2": [1, 2]}, "submitted_at": "2025-02-01 08:00:00"},
                {"response_uuid": "early", "answers_json": {"q1": "a"}, "submitted_at": "2025-01-01T08:00:00+07:00"},
                {"response_uuid": "unknown", "answers_json": {}, "submitted_at": null}
            ])
        );

        let text = responses_json(&responses).unwrap();
        let uuid_at = text.find("response_uuid").unwrap();
        let answers_at = text.find("answers_json").unwrap();
        let submitted_at = text.find("submitted_at").unwrap();
        assert!(uuid_at < answers_at && answers_at < submitted_at);
    }

    #[test]
    fn test_empty_corpus_is_empty_array() {
        assert_eq!(responses_json(&[]).unwrap(), "[]");
    }
}
