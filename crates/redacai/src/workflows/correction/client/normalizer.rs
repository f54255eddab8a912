//! Maps the scoring boundary's loosely structured JSON onto [`EvaluationResult`].
//!
//! Upstream replies come either as a bare object or as an array whose first element holds
//! the payload, optionally nested under `output`. Every field is optional.

use serde_json::Value;

use super::EvaluationError;
use crate::workflows::correction::domain::{EvaluationResult, MAX_SCORE};

/// Score key exactly as the boundary emits it.
pub const SCORE_KEY: &str = "nota_geraç";
pub const STRENGTHS_KEY: &str = "pontos_fortes";
pub const IMPROVEMENTS_KEY: &str = "pontos_a_melhorar";
pub const FINAL_COMMENTS_KEY: &str = "comentarios_finais";

const OUTPUT_KEY: &str = "output";

pub fn normalize_body(body: &[u8]) -> Result<EvaluationResult, EvaluationError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| EvaluationError::Protocol(format!("response is not JSON: {err}")))?;
    normalize(&value)
}

pub fn normalize(value: &Value) -> Result<EvaluationResult, EvaluationError> {
    let item = match value {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| EvaluationError::Protocol("response array is empty".to_string()))?,
        other => other,
    };

    if !item.is_object() {
        return Err(EvaluationError::Protocol(format!(
            "expected an object, found {}",
            kind_of(item)
        )));
    }

    let output = match item.get(OUTPUT_KEY) {
        Some(nested) if !nested.is_null() => nested,
        _ => item,
    };

    Ok(EvaluationResult::compose(
        coerce_score(output.get(SCORE_KEY)),
        text_block(output.get(STRENGTHS_KEY)),
        text_block(output.get(IMPROVEMENTS_KEY)),
        text_block(output.get(FINAL_COMMENTS_KEY)),
    ))
}

fn coerce_score(value: Option<&Value>) -> Option<u16> {
    let number = match value? {
        Value::Number(number) => number.as_f64()?,
        Value::String(raw) => raw.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() {
        return None;
    }

    Some(number.round().clamp(0.0, f64::from(MAX_SCORE)) as u16)
}

fn text_block(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
