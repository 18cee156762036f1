use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::CommandError;

/// `[lat, lng]` as the controller expects waypoints.
pub type Coordinate = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    AllStop,
    UpdateWaypoints,
    BeginAuto,
    BeginManual,
    BeginUserTracking,
    BeginObjectTracking,
    SetCameraMode,
    SetCameraLearningSize,
    DoCameraAutoLearning,
    SetCameraLearningValues,
    ShowLearningThreshold,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::AllStop => "allStop",
            Action::UpdateWaypoints => "updateWaypoints",
            Action::BeginAuto => "beginAuto",
            Action::BeginManual => "beginManual",
            Action::BeginUserTracking => "beginUserTracking",
            Action::BeginObjectTracking => "beginObjectTracking",
            Action::SetCameraMode => "setCameraMode",
            Action::SetCameraLearningSize => "setCameraLearningSize",
            Action::DoCameraAutoLearning => "doCameraAutoLearning",
            Action::SetCameraLearningValues => "setCameraLearningValues",
            Action::ShowLearningThreshold => "showLearningThreshold",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hue/saturation/value thresholds in the controller's own units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CalibrationRecord {
    pub min_hue: i32,
    pub max_hue: i32,
    pub min_sat: i32,
    pub max_sat: i32,
    pub min_val: i32,
    pub max_val: i32,
}

impl CalibrationRecord {
    pub fn fields(&self) -> [(&'static str, i32); 6] {
        [
            ("MIN_HUE", self.min_hue),
            ("MAX_HUE", self.max_hue),
            ("MIN_SAT", self.min_sat),
            ("MAX_SAT", self.max_sat),
            ("MIN_VAL", self.min_val),
            ("MAX_VAL", self.max_val),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandPayload {
    Integer(i64),
    Text(String),
    Waypoints(Vec<Coordinate>),
    Calibration(CalibrationRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CommandPayload>,
}

impl Command {
    pub fn bare(action: Action) -> Self {
        Self { action, data: None }
    }

    pub fn with_payload(action: Action, data: CommandPayload) -> Self {
        Self {
            action,
            data: Some(data),
        }
    }

    pub fn integer(action: Action, value: i64) -> Self {
        Self::with_payload(action, CommandPayload::Integer(value))
    }

    pub fn flag(action: Action, on: bool) -> Self {
        Self::integer(action, i64::from(on))
    }

    /// Form fields in the bracketed layout the controller's PHP bridge decodes:
    /// `data[0][]=lat&data[0][]=lng` for pairs, `data[MIN_HUE]=..` for records.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("action".to_string(), self.action.as_str().to_string())];
        match &self.data {
            None => fields.push(("data".to_string(), String::new())),
            Some(CommandPayload::Integer(value)) => {
                fields.push(("data".to_string(), value.to_string()));
            }
            Some(CommandPayload::Text(value)) => {
                fields.push(("data".to_string(), value.clone()));
            }
            Some(CommandPayload::Waypoints(pairs)) => {
                for (index, pair) in pairs.iter().enumerate() {
                    for component in pair {
                        fields.push((format!("data[{index}][]"), component.to_string()));
                    }
                }
            }
            Some(CommandPayload::Calibration(record)) => {
                for (name, value) in record.fields() {
                    fields.push((format!("data[{name}]"), value.to_string()));
                }
            }
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub action: Action,
    pub body: String,
}

impl RawResponse {
    pub fn new(action: Action, body: impl Into<String>) -> Self {
        Self {
            action,
            body: body.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn parse_integer(&self) -> Result<i64, CommandError> {
        let trimmed = self.body.trim();
        trimmed.parse::<i64>().map_err(|err| {
            CommandError::protocol(
                self.action,
                format!("expected an integer, got {trimmed:?}: {err}"),
            )
        })
    }

    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T, CommandError> {
        serde_json::from_str(&self.body).map_err(|err| CommandError::protocol(self.action, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(fields: &[(String, String)]) -> Vec<(&str, &str)> {
        fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    #[test]
    fn action_names_match_serde_names() {
        for action in [
            Action::AllStop,
            Action::UpdateWaypoints,
            Action::BeginObjectTracking,
            Action::DoCameraAutoLearning,
            Action::ShowLearningThreshold,
        ] {
            let encoded = serde_json::to_string(&action).expect("encode action");
            assert_eq!(encoded, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn bare_command_sends_empty_data_field() {
        let fields = Command::bare(Action::AllStop).form_fields();
        assert_eq!(pairs(&fields), vec![("action", "allStop"), ("data", "")]);
    }

    #[test]
    fn waypoints_use_nested_bracket_keys() {
        let command = Command::with_payload(
            Action::UpdateWaypoints,
            CommandPayload::Waypoints(vec![[1.0, 2.5], [-3.25, 4.0]]),
        );
        assert_eq!(
            pairs(&command.form_fields()),
            vec![
                ("action", "updateWaypoints"),
                ("data[0][]", "1"),
                ("data[0][]", "2.5"),
                ("data[1][]", "-3.25"),
                ("data[1][]", "4"),
            ]
        );
    }

    #[test]
    fn calibration_record_uses_named_keys_in_field_order() {
        let record = CalibrationRecord {
            min_hue: 350,
            max_hue: 10,
            min_sat: 95,
            max_sat: 255,
            min_val: 40,
            max_val: 200,
        };
        let command = Command::with_payload(
            Action::SetCameraLearningValues,
            CommandPayload::Calibration(record),
        );
        let fields = command.form_fields();
        let keys: Vec<&str> = fields.iter().skip(1).map(|(key, _)| key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "data[MIN_HUE]",
                "data[MAX_HUE]",
                "data[MIN_SAT]",
                "data[MAX_SAT]",
                "data[MIN_VAL]",
                "data[MAX_VAL]",
            ]
        );
        assert_eq!(fields[1].1, "350");
    }

    #[test]
    fn calibration_record_reads_controller_json() {
        let response = RawResponse::new(
            Action::DoCameraAutoLearning,
            r#"{"MIN_HUE":350,"MAX_HUE":10,"MIN_SAT":95,"MAX_SAT":255,"MIN_VAL":40,"MAX_VAL":200}"#,
        );
        let record: CalibrationRecord = response.parse_json().expect("parse record");
        assert_eq!(record.min_hue, 350);
        assert_eq!(record.max_val, 200);
    }

    #[test]
    fn integer_response_tolerates_surrounding_whitespace() {
        let response = RawResponse::new(Action::SetCameraMode, " 999\n");
        assert_eq!(response.parse_integer(), Ok(999));
    }

    #[test]
    fn non_integer_response_is_a_protocol_error() {
        let response = RawResponse::new(Action::SetCameraMode, "camera offline");
        let err = response.parse_integer().expect_err("not an integer");
        assert!(matches!(
            err,
            CommandError::Protocol {
                action: Action::SetCameraMode,
                ..
            }
        ));
    }
}
