//! Event batches in, correction reports out.
//!
//! A batch is a JSON document holding one entry per event: the uncorrected
//! MET collection and the event's muons. The report pairs every event id
//! with its corrected MET or with the error that stopped its correction.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use muonmet_corrector::{CorrectorConfig, MuonMetCorrector};
use muonmet_types::{AnyMet, MetError, MetLike, MuonRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::{error, info_span};

/// Run / luminosity block / event number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EventId {
    pub run: u64,
    pub lumi: u64,
    pub event: u64,
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.run, self.lumi, self.event)
    }
}

/// One event to correct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventInput {
    #[serde(default)]
    pub id: EventId,
    /// Uncorrected MET collection; only the first entry is corrected.
    pub met: Vec<AnyMet>,
    #[serde(default)]
    pub muons: Vec<MuonRecord>,
}

/// Input document of `muonmet correct`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventBatch {
    pub events: Vec<EventInput>,
}

/// Result of correcting one event. Exactly one of `met` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub id: EventId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub met: Option<AnyMet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MetError>,
}

impl EventOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Output document of `muonmet correct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReport {
    pub generated_at: DateTime<Utc>,
    pub field_tesla: f64,
    pub config: CorrectorConfig,
    pub events: Vec<EventOutcome>,
}

impl EventReport {
    pub fn failed(&self) -> usize {
        self.events.iter().filter(|e| !e.is_ok()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.events.len() - self.failed()
    }
}

/// Parse a batch from `path`.
pub fn read_batch(path: &Path) -> Result<EventBatch> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event batch {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse event batch {}", path.display()))
}

/// Correct every event of `batch`. A failing event is logged and recorded;
/// it never stops the batch.
pub fn run_batch(corrector: &MuonMetCorrector, field_tesla: f64, batch: &EventBatch) -> EventReport {
    let events = batch
        .events
        .iter()
        .map(|input| {
            let _span = info_span!("event", id = %input.id).entered();
            match corrector.correct(&input.met, &input.muons) {
                Ok(met) => EventOutcome {
                    id: input.id,
                    met: Some(met),
                    error: None,
                },
                Err(e) => {
                    error!(event = %input.id, error = %e, "event correction failed");
                    EventOutcome {
                        id: input.id,
                        met: None,
                        error: Some(e),
                    }
                }
            }
        })
        .collect();

    EventReport {
        generated_at: Utc::now(),
        field_tesla,
        config: *corrector.config(),
        events,
    }
}

/// Write `report` as pretty JSON to `path`, or to stdout when `None`.
pub fn write_report(report: &EventReport, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    match path {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write report {}", path.display())),
        None => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{json}").context("failed to write report to stdout")
        }
    }
}

/// One-line human summary of a corrected MET.
pub fn describe(met: &AnyMet) -> String {
    format!(
        "MET {:.2} GeV (px {:.2}, py {:.2}), ΣET {:.2} GeV",
        met.pt(),
        met.px(),
        met.py(),
        met.sum_et()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use muonmet_corrector::{RecordedAssociation, UniformField};
    use muonmet_types::{FourMomentum, Met, Momentum3};

    fn corrector() -> MuonMetCorrector {
        MuonMetCorrector::new(
            CorrectorConfig::default(),
            Box::new(UniformField(3.8)),
            Box::new(RecordedAssociation),
        )
    }

    fn central_muon(pt: f64) -> MuonRecord {
        let track = Momentum3::new(pt, 0.0, 0.0);
        MuonRecord {
            charge: -1,
            p4: FourMomentum::massless(track),
            inner_track: Some(track),
            combined_track: Some(track),
            ..Default::default()
        }
    }

    // ── input parsing ────────────────────────────────────────────────────────

    #[test]
    fn batch_parses_with_defaults() {
        let json = r#"{
            "events": [
                { "met": [ { "kind": "met", "sum_et": 100.0,
                             "p4": { "px": 0.0, "py": 0.0, "pz": 0.0, "e": 0.0 } } ] }
            ]
        }"#;
        let batch: EventBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.events[0].id, EventId::default());
        assert!(batch.events[0].muons.is_empty());
    }

    #[test]
    fn read_batch_reports_the_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "not json").unwrap();
        let err = read_batch(&path).unwrap_err();
        assert!(format!("{err:#}").contains("events.json"));
    }

    #[test]
    fn event_id_display() {
        let id = EventId {
            run: 1,
            lumi: 20,
            event: 300,
        };
        assert_eq!(id.to_string(), "1:20:300");
    }

    // ── running ──────────────────────────────────────────────────────────────

    #[test]
    fn run_batch_corrects_each_event() {
        let batch = EventBatch {
            events: vec![EventInput {
                id: EventId {
                    run: 1,
                    lumi: 1,
                    event: 7,
                },
                met: vec![AnyMet::Met(Met::new(100.0, 0.0, 0.0))],
                muons: vec![central_muon(40.0)],
            }],
        };
        let report = run_batch(&corrector(), 3.8, &batch);
        assert_eq!(report.failed(), 0);
        let met = report.events[0].met.as_ref().unwrap();
        assert!((met.px() + 40.0).abs() < 1e-9);
        assert_eq!(met.corrections().len(), 1);
    }

    #[test]
    fn failing_event_does_not_stop_the_batch() {
        let batch = EventBatch {
            events: vec![
                EventInput {
                    id: EventId::default(),
                    met: vec![],
                    muons: vec![],
                },
                EventInput {
                    id: EventId {
                        run: 1,
                        lumi: 1,
                        event: 2,
                    },
                    met: vec![AnyMet::Met(Met::new(50.0, 1.0, 2.0))],
                    muons: vec![],
                },
            ],
        };
        let report = run_batch(&corrector(), 3.8, &batch);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.events[0].error, Some(MetError::EmptyInputCollection));
        assert!(report.events[1].met.is_some());
    }

    // ── output ───────────────────────────────────────────────────────────────

    #[test]
    fn report_is_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = run_batch(&corrector(), 3.8, &EventBatch::default());
        write_report(&report, Some(&path)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let back: EventReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn successful_outcome_omits_error_key() {
        let outcome = EventOutcome {
            id: EventId::default(),
            met: Some(AnyMet::Met(Met::new(1.0, 0.0, 0.0))),
            error: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("met").is_some());
    }

    #[test]
    fn describe_mentions_magnitude() {
        let text = describe(&AnyMet::Met(Met::new(80.0, 3.0, 4.0)));
        assert!(text.contains("MET 5.00 GeV"));
        assert!(text.contains("80.00"));
    }
}
