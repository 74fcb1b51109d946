use anyhow::{bail, Result};
use orient_common::Orientation;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenRotation {
    Landscape,
    Portrait,
    LandscapeFlipped,
    PortraitFlipped,
}

impl ScreenRotation {
    pub fn angle(&self) -> u16 {
        match self {
            ScreenRotation::Landscape => 0,
            ScreenRotation::Portrait => 90,
            ScreenRotation::LandscapeFlipped => 180,
            ScreenRotation::PortraitFlipped => 270,
        }
    }
}

/// What to do with the screen when the sensor settles in one orientation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenAction {
    pub rotation: Option<ScreenRotation>,
    pub position: Option<(i32, i32)>,
}

impl ScreenAction {
    pub fn is_empty(&self) -> bool {
        self.rotation.is_none() && self.position.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenActions {
    pub x_pos: ScreenAction,
    pub x_neg: ScreenAction,
    pub y_pos: ScreenAction,
    pub y_neg: ScreenAction,
    pub flat: ScreenAction,
}

impl ScreenActions {
    pub fn action_for(&self, orientation: Orientation) -> Option<&ScreenAction> {
        match orientation {
            Orientation::PositiveX => Some(&self.x_pos),
            Orientation::NegativeX => Some(&self.x_neg),
            Orientation::PositiveY => Some(&self.y_pos),
            Orientation::NegativeY => Some(&self.y_neg),
            Orientation::Flat => Some(&self.flat),
            Orientation::Start => None,
        }
    }
}

/// Arguments for the display program, `None` if there is nothing to change.
pub fn display_args(monitor: u32, action: &ScreenAction) -> Option<Vec<String>> {
    if action.is_empty() {
        return None;
    }

    let mut args = vec!["/device".to_string(), monitor.to_string()];
    if let Some(rotation) = action.rotation {
        args.push("/rotate".to_string());
        args.push(rotation.angle().to_string());
    }
    if let Some((x, y)) = action.position {
        args.push("/position".to_string());
        args.push(x.to_string());
        args.push(y.to_string());
    }
    Some(args)
}

pub async fn run_display_program(program: &str, args: &[String]) -> Result<()> {
    log::debug!("Running {} {}", program, args.join(" "));
    let status = Command::new(program).args(args).status().await?;
    if !status.success() {
        bail!("{} exited with {}", program, status);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rotation_angles() {
        let angles: Vec<_> = [
            ScreenRotation::Landscape,
            ScreenRotation::Portrait,
            ScreenRotation::LandscapeFlipped,
            ScreenRotation::PortraitFlipped,
        ]
        .iter()
        .map(ScreenRotation::angle)
        .collect();
        assert_eq!(angles, vec![0, 90, 180, 270]);
    }

    #[test]
    fn rotation_names() {
        let rotation: ScreenRotation = serde_json::from_str("\"PORTRAIT_FLIPPED\"").unwrap();
        assert_eq!(rotation, ScreenRotation::PortraitFlipped);
        assert!(serde_json::from_str::<ScreenRotation>("\"UPSIDE_DOWN\"").is_err());
    }

    #[test]
    fn builds_rotate_and_position_args() {
        let action = ScreenAction {
            rotation: Some(ScreenRotation::Portrait),
            position: Some((-1080, 0)),
        };
        assert_eq!(
            display_args(2, &action).unwrap(),
            vec!["/device", "2", "/rotate", "90", "/position", "-1080", "0"]
        );
    }

    #[test]
    fn position_only() {
        let action = ScreenAction {
            rotation: None,
            position: Some((1920, 0)),
        };
        assert_eq!(
            display_args(1, &action).unwrap(),
            vec!["/device", "1", "/position", "1920", "0"]
        );
    }

    #[test]
    fn empty_action_is_skipped() {
        assert_eq!(display_args(1, &ScreenAction::default()), None);
    }

    #[test]
    fn start_has_no_action() {
        let actions = ScreenActions::default();
        assert!(actions.action_for(Orientation::Start).is_none());
        assert!(actions.action_for(Orientation::Flat).is_some());
    }
}
