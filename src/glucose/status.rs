use serde::{Deserialize, Serialize};

/// Severity band for a predicted glucose value. Ordered: the calendar view
/// keeps the worst band seen on a day.
///
/// Convention: `> 199` is danger, `> 140` is pre-diabetic, else normal —
/// so 140 is normal and 200 is danger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlucoseStatus {
    Normal,
    PreDiabetic,
    Danger,
}

impl GlucoseStatus {
    pub fn classify(value_mgdl: i32) -> GlucoseStatus {
        if value_mgdl > 199 {
            GlucoseStatus::Danger
        } else if value_mgdl > 140 {
            GlucoseStatus::PreDiabetic
        } else {
            GlucoseStatus::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GlucoseStatus::Normal => "normal",
            GlucoseStatus::PreDiabetic => "pre-diabetic",
            GlucoseStatus::Danger => "danger",
        }
    }

    pub fn from_label(s: &str) -> Option<GlucoseStatus> {
        match s {
            "normal" => Some(GlucoseStatus::Normal),
            "pre-diabetic" => Some(GlucoseStatus::PreDiabetic),
            "danger" => Some(GlucoseStatus::Danger),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values() {
        assert_eq!(GlucoseStatus::classify(140), GlucoseStatus::Normal);
        assert_eq!(GlucoseStatus::classify(141), GlucoseStatus::PreDiabetic);
        assert_eq!(GlucoseStatus::classify(199), GlucoseStatus::PreDiabetic);
        assert_eq!(GlucoseStatus::classify(200), GlucoseStatus::Danger);
    }

    #[test]
    fn every_reportable_value_gets_exactly_one_band() {
        for v in 80..=250 {
            let s = GlucoseStatus::classify(v);
            let expected = if v <= 140 {
                GlucoseStatus::Normal
            } else if v <= 199 {
                GlucoseStatus::PreDiabetic
            } else {
                GlucoseStatus::Danger
            };
            assert_eq!(s, expected, "value {v}");
        }
    }

    #[test]
    fn severity_ordering() {
        assert!(GlucoseStatus::Danger > GlucoseStatus::PreDiabetic);
        assert!(GlucoseStatus::PreDiabetic > GlucoseStatus::Normal);
    }

    #[test]
    fn wire_labels_round_trip() {
        for s in [
            GlucoseStatus::Normal,
            GlucoseStatus::PreDiabetic,
            GlucoseStatus::Danger,
        ] {
            assert_eq!(GlucoseStatus::from_label(s.as_str()), Some(s));
            let json = serde_json::to_string(&s).unwrap();
            assert_eq!(json, format!("\"{}\"", s.as_str()));
        }
    }
}
