//! Small static lookups so the service has instrumented traffic with
//! path parameters. Not part of the telemetry engine.

use axum::{extract::Path, Json};
use serde::Serialize;

use super::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct Aircraft {
    pub model: &'static str,
    pub manufacturer: &'static str,
    /// ISO country codes whose authority has certified the type.
    pub certified_in: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceCheck {
    pub model: &'static str,
    pub country: String,
    pub compliant: bool,
}

static CATALOG: &[Aircraft] = &[
    Aircraft {
        model: "A320",
        manufacturer: "Airbus",
        certified_in: &["FR", "DE", "US", "GB"],
    },
    Aircraft {
        model: "B737",
        manufacturer: "Boeing",
        certified_in: &["US", "GB", "CA"],
    },
    Aircraft {
        model: "E190",
        manufacturer: "Embraer",
        certified_in: &["BR", "US"],
    },
];

fn lookup(model: &str) -> Result<&'static Aircraft, AppError> {
    CATALOG
        .iter()
        .find(|a| a.model.eq_ignore_ascii_case(model))
        .ok_or_else(|| AppError::NotFound(format!("aircraft '{model}' not found")))
}

// ─── GET /api/aircraft/:model ────────────────────────────────────

pub async fn get_aircraft(Path(model): Path<String>) -> Result<Json<Aircraft>, AppError> {
    lookup(&model).cloned().map(Json)
}

// ─── GET /api/compliance/check/:model/:country ───────────────────

pub async fn check_compliance(
    Path((model, country)): Path<(String, String)>,
) -> Result<Json<ComplianceCheck>, AppError> {
    if country.len() != 2 {
        return Err(AppError::BadRequest(format!(
            "country must be a two-letter code, got '{country}'"
        )));
    }
    let aircraft = lookup(&model)?;
    let country = country.to_ascii_uppercase();

    Ok(Json(ComplianceCheck {
        model: aircraft.model,
        compliant: aircraft.certified_in.contains(&country.as_str()),
        country,
    }))
}
