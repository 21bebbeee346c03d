use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single raw model prediction: a class label with its confidence score
/// in the `0.0..=1.0` range.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

impl Prediction {
    fn from_entry(entry: &Value) -> Self {
        Self {
            label: entry
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            score: entry.get("score").and_then(Value::as_f64).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Prediction {
    /// Formats the prediction as `"<label> — <score>%"` with the score as
    /// a percentage rounded to one decimal place.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {:.1}%", self.label, self.score * 100.0)
    }
}

/// The outcome of one successful analysis: the top breed guess, free-text
/// advice, and optionally the ranked raw predictions behind the guess.
///
/// Replaced wholesale by the next analysis, never merged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BreedReport {
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub advice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_predictions: Option<Vec<Prediction>>,
}

impl BreedReport {
    /// Builds a report from a decoded response body, passing fields through
    /// verbatim. Missing or mistyped fields become empty rather than errors;
    /// `breed` and `advice` are not validated to be non-empty.
    pub fn from_body(body: &Value) -> Self {
        let text = |field: &str| {
            body.get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        let raw_predictions = body
            .get("raw_predictions")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(Prediction::from_entry).collect());

        Self {
            breed: text("breed"),
            advice: text("advice"),
            raw_predictions,
        }
    }
}

impl fmt::Display for BreedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detected breed: {}", self.breed)?;
        if !self.advice.is_empty() {
            writeln!(f, "\nAI recommendations:\n{}", self.advice)?;
        }
        if let Some(predictions) = &self.raw_predictions {
            writeln!(f, "\nTop predictions:")?;
            for prediction in predictions {
                writeln!(f, "  {prediction}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prediction_displays_as_percentage() {
        let prediction = Prediction {
            label: "Labrador".to_string(),
            score: 0.92,
        };
        assert_eq!(prediction.to_string(), "Labrador — 92.0%");
    }

    #[test]
    fn prediction_display_rounds_to_one_decimal() {
        let prediction = Prediction {
            label: "husky".to_string(),
            score: 0.8765,
        };
        assert_eq!(prediction.to_string(), "husky — 87.7%");
    }

    #[test]
    fn from_body_passes_fields_through() {
        let body = json!({
            "breed": "Labrador",
            "advice": "Brush weekly",
            "raw_predictions": [
                { "label": "Labrador", "score": 0.92 },
                { "label": "Golden Retriever", "score": 0.05 },
            ],
        });
        let report = BreedReport::from_body(&body);
        assert_eq!(report.breed, "Labrador");
        assert_eq!(report.advice, "Brush weekly");
        let predictions = report.raw_predictions.unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].label, "Labrador");
        assert_eq!(predictions[1].score, 0.05);
    }

    #[test]
    fn from_body_defaults_missing_fields() {
        let report = BreedReport::from_body(&json!({}));
        assert_eq!(report.breed, "");
        assert_eq!(report.advice, "");
        assert!(report.raw_predictions.is_none());
    }

    #[test]
    fn from_body_ignores_mistyped_fields() {
        let body = json!({ "breed": 42, "advice": null, "raw_predictions": "oops" });
        let report = BreedReport::from_body(&body);
        assert_eq!(report.breed, "");
        assert_eq!(report.advice, "");
        assert!(report.raw_predictions.is_none());
    }

    #[test]
    fn report_display_lists_predictions() {
        let report = BreedReport {
            breed: "Labrador".to_string(),
            advice: "Brush weekly".to_string(),
            raw_predictions: Some(vec![Prediction {
                label: "Labrador".to_string(),
                score: 0.92,
            }]),
        };
        let rendered = report.to_string();
        assert!(rendered.contains("Detected breed: Labrador"));
        assert!(rendered.contains("Brush weekly"));
        assert!(rendered.contains("  Labrador — 92.0%"));
    }
}
