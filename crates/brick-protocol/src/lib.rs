//! Messages exchanged with the rendering/UI side: input events in, scene frames out.

use brick_core::{Brick, BrickColor, BrickId, BrickType, GridRotation, Tool};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum PointerMsg {
    /// A pick ray to be resolved against the scene.
    Ray { origin: [f32; 3], dir: [f32; 3] },
    /// An already-resolved hit. `node` is the struck render node; absent
    /// means the ground plane.
    Hit {
        point: [f32; 3],
        #[serde(default)]
        normal: Option<[f32; 3]>,
        #[serde(default)]
        node: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputMsg {
    SetTool { tool: Tool },
    SetColor { color: BrickColor },
    SetBrickType { brick: BrickType },
    PointerMove { pointer: PointerMsg },
    PointerLeave,
    Click { pointer: PointerMsg },
    Key { key: char },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickView {
    #[serde(flatten)]
    pub brick: Brick,
    /// Tagged render node that owns this brick's meshes.
    pub node: u32,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostView {
    pub position: [f32; 3],
    #[serde(rename = "type")]
    pub kind: BrickType,
    pub rotation: GridRotation,
    pub hex: String,
    pub opacity: f32,
    pub valid: bool,
    pub pickable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFrame {
    pub tool: Tool,
    pub hovered: Option<BrickId>,
    pub bricks: Vec<BrickView>,
    pub ghost: Option<GhostView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_msg_from_script_line() {
        let line = r#"{"type":"Click","pointer":{"via":"hit","point":[1.5,1.2,0.5],"normal":[0,1,0],"node":3}}"#;
        let msg: InputMsg = serde_json::from_str(line).unwrap();
        assert_eq!(
            msg,
            InputMsg::Click {
                pointer: PointerMsg::Hit {
                    point: [1.5, 1.2, 0.5],
                    normal: Some([0.0, 1.0, 0.0]),
                    node: Some(3),
                },
            }
        );

        let ground: InputMsg = serde_json::from_str(
            r#"{"type":"PointerMove","pointer":{"via":"hit","point":[0.2,0,0.4]}}"#,
        )
        .unwrap();
        assert!(matches!(
            ground,
            InputMsg::PointerMove {
                pointer: PointerMsg::Hit { node: None, normal: None, .. }
            }
        ));

        let tool: InputMsg = serde_json::from_str(r#"{"type":"SetTool","tool":"rotate"}"#).unwrap();
        assert_eq!(tool, InputMsg::SetTool { tool: Tool::Rotate });

        let brick: InputMsg =
            serde_json::from_str(r#"{"type":"SetBrickType","brick":"castle_gate"}"#).unwrap();
        assert_eq!(
            brick,
            InputMsg::SetBrickType {
                brick: BrickType::Unit1x1,
            }
        );
    }

    #[test]
    fn frame_roundtrip() {
        let frame = SceneFrame {
            tool: Tool::Build,
            hovered: None,
            bricks: vec![BrickView {
                brick: Brick {
                    id: 0,
                    position: [1.0, 0.6, 1.0],
                    color: BrickColor::Yellow,
                    kind: BrickType::Turntable2x2,
                    rotation: GridRotation::Deg0,
                    internal_rotation: Some(0.5),
                },
                node: 0,
                hex: BrickColor::Yellow.hex().to_string(),
            }],
            ghost: Some(GhostView {
                position: [0.5, 1.8, 0.5],
                kind: BrickType::Unit1x1,
                rotation: GridRotation::Deg0,
                hex: "#FF0000".to_string(),
                opacity: 0.25,
                valid: false,
                pickable: false,
            }),
        };
        let json = serde_json::to_string(&frame).unwrap();
        let back: SceneFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, back);
    }
}
