//! Loading survey and response documents from disk.
//!
//! Accepts the shapes produced by the survey backend: a bare schema or a
//! survey record wrapping it, and response lists either as raw rows
//! (`answers_json`), as `{ answers }` objects, or as bare answer maps.

use crate::answers::{AnswerValue, ResponseDocument};
use crate::error::{json_kind, InputError};
use crate::schema::SurveySchema;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A survey schema plus the record fields around it, when present.
#[derive(Debug, Clone, Default)]
pub struct SurveyDocument {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub schema: SurveySchema,
}

impl SurveyDocument {
    /// Record title, else the schema title, else `"Survei"`.
    pub fn display_title(&self, locale: &str) -> String {
        self.title
            .clone()
            .filter(|title| !title.trim().is_empty())
            .or_else(|| self.schema.title.as_ref().and_then(|t| t.resolve(locale)))
            .unwrap_or_else(|| "Survei".to_string())
    }
}

fn read_json(path: &Path) -> Result<Value, InputError> {
    let content = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a survey from a JSON file.
pub fn load_survey(path: &Path) -> Result<SurveyDocument, InputError> {
    let document = parse_survey(read_json(path)?)?;
    info!(
        "Loaded survey from {} ({} questions)",
        path.display(),
        document.schema.questions().len()
    );
    Ok(document)
}

/// Interpret a survey document, bare or wrapped in `{ title, slug, schema_json }`.
pub fn parse_survey(value: Value) -> Result<SurveyDocument, InputError> {
    let mut record = match value {
        Value::Object(record) => record,
        other => {
            return Err(InputError::SchemaNotAnObject {
                found: json_kind(&other),
            })
        }
    };

    let Some(wrapped) = record.remove("schema_json") else {
        return Ok(SurveyDocument {
            schema: schema_from_object(record),
            ..SurveyDocument::default()
        });
    };

    let schema = match decode_embedded(wrapped) {
        Value::Object(schema) => schema_from_object(schema),
        other => {
            return Err(InputError::SchemaNotAnObject {
                found: json_kind(&other),
            })
        }
    };

    Ok(SurveyDocument {
        title: string_field(&record, "title"),
        slug: string_field(&record, "slug"),
        schema,
    })
}

fn schema_from_object(object: Map<String, Value>) -> SurveySchema {
    // Field deserializers are lenient, so only a non-object can fail here.
    serde_json::from_value(Value::Object(object)).unwrap_or_default()
}

/// Columns stored as JSON text are decoded; anything else is returned as is.
fn decode_embedded(value: Value) -> Value {
    match value {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}

fn string_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Load responses from a JSON file.
pub fn load_responses(path: &Path) -> Result<Vec<ResponseDocument>, InputError> {
    let responses = parse_responses(read_json(path)?)?;
    info!("Loaded {} responses from {}", responses.len(), path.display());
    Ok(responses)
}

/// Interpret a responses document: an array, or an object with a
/// `responses` array.
pub fn parse_responses(value: Value) -> Result<Vec<ResponseDocument>, InputError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("responses") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(InputError::UnsupportedResponses {
                    found: json_kind(&other),
                })
            }
            None => {
                return Err(InputError::UnsupportedResponses {
                    found: "an object without `responses`",
                })
            }
        },
        other => {
            return Err(InputError::UnsupportedResponses {
                found: json_kind(&other),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_response(item, index))
        .collect()
}

/// Interpret one response entry.
pub fn parse_response(value: Value, index: usize) -> Result<ResponseDocument, InputError> {
    let mut record = match value {
        Value::Object(record) => record,
        _ => return Err(InputError::ResponseNotAnObject { index }),
    };

    let answers = if let Some(raw) = record.remove("answers_json") {
        match decode_embedded(raw) {
            Value::Object(answers) => answers,
            Value::Null => Map::new(),
            _ => return Err(InputError::ResponseNotAnObject { index }),
        }
    } else if matches!(record.get("answers"), Some(Value::Object(_))) {
        match record.remove("answers") {
            Some(Value::Object(answers)) => answers,
            _ => Map::new(),
        }
    } else {
        return Ok(ResponseDocument::from_answers(into_answers(record)));
    };

    Ok(ResponseDocument {
        response_uuid: string_field(&record, "response_uuid"),
        submitted_at: string_field(&record, "submitted_at"),
        answers: into_answers(answers),
    })
}

fn into_answers(object: Map<String, Value>) -> IndexMap<String, AnswerValue> {
    object
        .into_iter()
        .map(|(key, value)| (key, AnswerValue::from(value)))
        .collect()
}

/// Load one response per `*.json` file under `dir`, in sorted path order.
///
/// Unreadable or malformed files are skipped with a warning.
pub fn load_responses_dir(
    dir: &Path,
    show_progress: bool,
) -> Result<Vec<ResponseDocument>, InputError> {
    let files = collect_json_files(dir)?;
    debug!("Found {} response files in {}", files.len(), dir.display());

    let progress = show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let mut responses = Vec::with_capacity(files.len());
    for (index, path) in files.iter().enumerate() {
        if let Some(ref pb) = progress {
            pb.set_message(path.display().to_string());
            pb.inc(1);
        }

        match read_json(path).and_then(|value| parse_response(value, index)) {
            Ok(response) => responses.push(response),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    info!(
        "Loaded {} responses from {} files in {}",
        responses.len(),
        files.len(),
        dir.display()
    );
    Ok(responses)
}

fn collect_json_files(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    if !dir.is_dir() {
        return Err(InputError::Read {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Cannot walk entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();

    files.sort();
    Ok(files)
}
