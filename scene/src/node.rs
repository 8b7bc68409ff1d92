//! Scene node model: identity, kind, local transform, flags and payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tessera_core::math::{Quat, Transform, Vec2, Vec3};

use crate::error::SceneError;
use crate::payload::{NodePayload, PayloadData};

/// Unique integer identity of a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two disjoint node partitions. Operations never mix them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Gui,
    Go,
}

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Entity,
    Slice9Plane,
    Text,
    GuiContainer,
    GuiBox,
    GuiText,
    GoContainer,
    #[serde(rename = "go_sprite_component")]
    GoSprite,
    #[serde(rename = "go_label_component")]
    GoLabel,
    #[serde(rename = "go_model_component")]
    GoModel,
    #[serde(rename = "go_animated_model_component")]
    GoAnimatedModel,
    #[serde(rename = "go_audio_component")]
    GoAudio,
    Component,
}

impl NodeKind {
    pub const ALL: [NodeKind; 13] = [
        Self::Entity,
        Self::Slice9Plane,
        Self::Text,
        Self::GuiContainer,
        Self::GuiBox,
        Self::GuiText,
        Self::GoContainer,
        Self::GoSprite,
        Self::GoLabel,
        Self::GoModel,
        Self::GoAnimatedModel,
        Self::GoAudio,
        Self::Component,
    ];

    /// Stable string tag, identical to the serialized form.
    pub fn type_tag(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Slice9Plane => "slice9_plane",
            Self::Text => "text",
            Self::GuiContainer => "gui_container",
            Self::GuiBox => "gui_box",
            Self::GuiText => "gui_text",
            Self::GoContainer => "go_container",
            Self::GoSprite => "go_sprite_component",
            Self::GoLabel => "go_label_component",
            Self::GoModel => "go_model_component",
            Self::GoAnimatedModel => "go_animated_model_component",
            Self::GoAudio => "go_audio_component",
            Self::Component => "component",
        }
    }

    pub fn domain(self) -> Domain {
        match self {
            Self::GuiContainer | Self::GuiBox | Self::GuiText => Domain::Gui,
            _ => Domain::Go,
        }
    }

    /// Inline leaf kinds, joined to their parent path with `#` instead of `/`.
    pub fn is_component(self) -> bool {
        matches!(
            self,
            Self::GoSprite | Self::GoLabel | Self::GoModel | Self::GoAnimatedModel | Self::GoAudio | Self::Component
        )
    }

    /// GUI kinds that take part in draw ordering.
    pub fn is_gui_drawable(self) -> bool {
        matches!(self, Self::GuiBox | Self::GuiText)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}

impl FromStr for NodeKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_tag() == s)
            .ok_or_else(|| SceneError::UnknownKind(s.to_string()))
    }
}

/// Protection flags carried by a few privileged nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// Skipped when serializing its parent or the scene.
    pub no_saving: bool,
    /// Ignored by delete operations.
    pub no_removing: bool,
}

/// Axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Overlap of two rectangles. Disjoint rectangles give an empty rect.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let min = Vec2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = Vec2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        Rect {
            min,
            max: Vec2::new(max.x.max(min.x), max.y.max(min.y)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }
}

/// A node in the scene arena.
///
/// Parent and children are ids into the owning [`NodeStore`](crate::NodeStore);
/// they, the name and the GUI draw state are maintained by the store. The
/// transform, flags, visibility and payload can be edited freely through
/// [`NodeStore::update`](crate::NodeStore::update).
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attached: bool,
    pub(crate) name: String,
    pub(crate) render_order: Option<u32>,
    pub(crate) clip_rect: Option<Rect>,
    kind: NodeKind,
    /// Local transform relative to the parent.
    pub transform: Transform,
    pub active: bool,
    pub visible: bool,
    pub flags: NodeFlags,
    pub payload: NodePayload,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, params: &PayloadData) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            attached: false,
            name: format!("{}{}", kind.type_tag(), id.0),
            render_order: None,
            clip_rect: None,
            kind,
            transform: Transform::identity(),
            active: params.active.unwrap_or(true),
            visible: true,
            flags: NodeFlags::default(),
            payload: NodePayload::for_kind(kind, params),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn domain(&self) -> Domain {
        self.kind.domain()
    }

    /// `false` between `create` and the first `add`/`move`.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    pub fn scale(&self) -> Vec2 {
        self.transform.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.transform.scale = scale;
    }

    /// Draw order among GUI drawables under the same container; later is on top.
    pub fn render_order(&self) -> Option<u32> {
        self.render_order
    }

    /// World-space clip rectangle inherited from clipping ancestors.
    pub fn clip_rect(&self) -> Option<Rect> {
        self.clip_rect
    }
}
