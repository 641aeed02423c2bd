//! Common rail response envelope
//!
//! Every rail answers with at least `{success, transactionId, amount}`, plus
//! an optional rail-specific `status` and a `message`/`error` on decline.
//! Fields may sit at the top level or inside a `data` object.

use monay_types::{FailureKind, PaymentIntent, PaymentResult, PaymentStatus, RailKind, RailResponse};
use serde_json::{Map, Value};

/// Fields extracted from a rail response body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RailEnvelope {
    pub success: Option<bool>,
    pub transaction_id: Option<String>,
    pub amount: Option<i64>,
    pub status: Option<String>,
    pub message: Option<String>,
}

impl RailEnvelope {
    /// Extract the envelope from a JSON body
    pub fn parse(body: &Value) -> Result<Self, String> {
        let top = body
            .as_object()
            .ok_or_else(|| format!("expected a JSON object, got {}", json_kind(body)))?;
        let data = top.get("data").and_then(Value::as_object);
        let field = |names: &[&str]| lookup(top, data, names);

        let success = match field(&["success"]) {
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => return Err(format!("'success' is not a boolean: {}", other)),
            None => None,
        };

        let transaction_id = match field(&["transactionId", "transaction_id", "id"]) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let amount = match field(&["amount"]) {
            Some(Value::Number(n)) => Some(minor_units(n)?),
            Some(other) => return Err(format!("'amount' is not a number: {}", other)),
            None => None,
        };

        let status = field(&["status"]).and_then(Value::as_str).map(str::to_string);

        let message = field(&["message", "error", "failureReason", "reason"]).map(|v| match v {
            Value::String(s) => s.clone(),
            Value::Object(o) => o
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| v.to_string()),
            other => other.to_string(),
        });

        Ok(Self {
            success,
            transaction_id,
            amount,
            status,
            message,
        })
    }
}

fn lookup<'a>(top: &'a Map<String, Value>, data: Option<&'a Map<String, Value>>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|n| top.get(*n))
        .or_else(|| data.and_then(|d| names.iter().find_map(|n| d.get(*n))))
        .filter(|v| !v.is_null())
}

fn minor_units(n: &serde_json::Number) -> Result<i64, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(format!("'amount' is not a whole number of minor units: {}", n)),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize a rail response given that rail's status table
///
/// `classify` maps a lower-cased rail status onto the three-way outcome, or
/// returns `None` for a status it does not know.
pub fn normalize_envelope(
    intent: &PaymentIntent,
    rail: RailKind,
    response: &RailResponse,
    classify: fn(&str) -> Option<PaymentStatus>,
) -> PaymentResult {
    let envelope = match RailEnvelope::parse(&response.body) {
        Ok(envelope) => envelope,
        Err(reason) => {
            return PaymentResult::failed(
                intent,
                rail,
                FailureKind::MalformedResponse,
                format!("malformed {} response: {}", rail, reason),
            )
        }
    };

    if !response.is_success() || envelope.success == Some(false) {
        let reason = envelope
            .message
            .clone()
            .unwrap_or_else(|| format!("{} rail declined the payment (HTTP {})", rail, response.status));
        return PaymentResult::failed(intent, rail, FailureKind::Rejected, reason)
            .with_transaction_id(envelope.transaction_id);
    }

    let status = match (&envelope.status, envelope.success) {
        (Some(raw), _) => match classify(&raw.to_lowercase()) {
            Some(status) => status,
            None => {
                return PaymentResult::failed(
                    intent,
                    rail,
                    FailureKind::UnrecognizedStatus,
                    format!("unrecognized {} status '{}'", rail, raw),
                )
                .with_transaction_id(envelope.transaction_id)
            }
        },
        (None, Some(true)) => PaymentStatus::Completed,
        (None, _) => {
            return PaymentResult::failed(
                intent,
                rail,
                FailureKind::MalformedResponse,
                format!("malformed {} response: missing 'success' and 'status'", rail),
            )
        }
    };

    if status == PaymentStatus::Failed {
        let reason = envelope.message.clone().unwrap_or_else(|| {
            format!(
                "{} reported status '{}'",
                rail,
                envelope.status.as_deref().unwrap_or_default()
            )
        });
        return PaymentResult::failed(intent, rail, FailureKind::Rejected, reason)
            .with_transaction_id(envelope.transaction_id);
    }

    let transaction_id = match envelope.transaction_id {
        Some(id) => id,
        None => {
            return PaymentResult::failed(
                intent,
                rail,
                FailureKind::MalformedResponse,
                format!("malformed {} response: missing transaction id", rail),
            )
        }
    };

    let amount = envelope.amount.unwrap_or(intent.amount_minor_units);
    if amount <= 0 {
        return PaymentResult::failed(
            intent,
            rail,
            FailureKind::MalformedResponse,
            format!("malformed {} response: non-positive amount {}", rail, amount),
        )
        .with_transaction_id(Some(transaction_id));
    }
    if amount != intent.amount_minor_units {
        tracing::warn!(
            rail = %rail,
            requested = intent.amount_minor_units,
            reported = amount,
            "Rail reported a different amount than requested"
        );
    }

    match status {
        PaymentStatus::Completed => PaymentResult::completed(intent, rail, transaction_id, amount),
        _ => PaymentResult::pending(intent, rail, transaction_id, amount),
    }
}
