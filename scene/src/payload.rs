//! Type-specific node payloads.
//!
//! Every [`NodeKind`] maps to exactly one [`NodePayload`] variant. The
//! serialized form is the flat [`PayloadData`] record, which doubles as the
//! parameter set accepted by [`NodeStore::create`](crate::NodeStore::create).
//! Payloads write only fields that differ from their defaults, and reset to
//! defaults before applying incoming data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tessera_core::math::Vec2;

use crate::node::NodeKind;

/// Default width and height of sized nodes.
pub const DEFAULT_SIZE: f32 = 32.0;

const DEFAULT_COLOR: &str = "#fff";
const DEFAULT_PIVOT: [f32; 2] = [0.5, 0.5];
const DEFAULT_ANCHOR: [f32; 2] = [-1.0, -1.0];
const DEFAULT_FONT_SIZE: f32 = 32.0;

/// Flat, sparse payload record. `None` means "default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atlas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clipping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub looped: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
}

impl PayloadData {
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Some([width, height]);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_texture(mut self, texture: impl Into<String>, atlas: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self.atlas = Some(atlas.into());
        self
    }

    #[must_use]
    pub fn with_clipping(mut self, clipping: bool) -> Self {
        self.clipping = Some(clipping);
        self
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn put<T: PartialEq + Clone>(slot: &mut Option<T>, value: &T, default: &T) {
    if value != default {
        *slot = Some(value.clone());
    }
}

fn put_vec2(slot: &mut Option<[f32; 2]>, value: Vec2, default: [f32; 2]) {
    put(slot, &[value.x, value.y], &default);
}

fn take_vec2(value: Option<[f32; 2]>, default: [f32; 2]) -> Vec2 {
    let [x, y] = value.unwrap_or(default);
    Vec2::new(x, y)
}

/// Sprite-like plane (9-slice): Slice9Plane, GuiBox, GoSprite.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneData {
    pub size: Vec2,
    pub pivot: Vec2,
    pub anchor: Vec2,
    pub slice: Vec2,
    pub color: String,
    pub alpha: f32,
    pub texture: String,
    pub atlas: String,
    /// Children are clipped to this box (GuiBox only).
    pub clipping: bool,
}

impl Default for PlaneData {
    fn default() -> Self {
        Self {
            size: Vec2::new(DEFAULT_SIZE, DEFAULT_SIZE),
            pivot: take_vec2(None, DEFAULT_PIVOT),
            anchor: take_vec2(None, DEFAULT_ANCHOR),
            slice: Vec2::zeros(),
            color: DEFAULT_COLOR.to_string(),
            alpha: 1.0,
            texture: String::new(),
            atlas: String::new(),
            clipping: false,
        }
    }
}

impl PlaneData {
    fn write(&self, out: &mut PayloadData) {
        let d = Self::default();
        put_vec2(&mut out.size, self.size, [DEFAULT_SIZE, DEFAULT_SIZE]);
        put_vec2(&mut out.pivot, self.pivot, DEFAULT_PIVOT);
        put_vec2(&mut out.anchor, self.anchor, DEFAULT_ANCHOR);
        put_vec2(&mut out.slice, self.slice, [0.0, 0.0]);
        put(&mut out.color, &self.color, &d.color);
        put(&mut out.alpha, &self.alpha, &d.alpha);
        put(&mut out.texture, &self.texture, &d.texture);
        put(&mut out.atlas, &self.atlas, &d.atlas);
        put(&mut out.clipping, &self.clipping, &d.clipping);
    }

    fn read(&mut self, data: &PayloadData) {
        *self = Self::default();
        self.size = take_vec2(data.size, [DEFAULT_SIZE, DEFAULT_SIZE]);
        self.pivot = take_vec2(data.pivot, DEFAULT_PIVOT);
        self.anchor = take_vec2(data.anchor, DEFAULT_ANCHOR);
        self.slice = take_vec2(data.slice, [0.0, 0.0]);
        if let Some(color) = &data.color {
            self.color.clone_from(color);
        }
        if let Some(alpha) = data.alpha {
            self.alpha = alpha;
        }
        if let Some(texture) = &data.texture {
            self.texture.clone_from(texture);
        }
        if let Some(atlas) = &data.atlas {
            self.atlas.clone_from(atlas);
        }
        self.clipping = data.clipping.unwrap_or(false);
    }
}

/// Text label: Text, GuiText, GoLabel.
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    pub text: String,
    pub size: Vec2,
    pub pivot: Vec2,
    pub anchor: Vec2,
    pub color: String,
    pub alpha: f32,
    pub font: String,
    pub font_size: f32,
}

impl Default for TextData {
    fn default() -> Self {
        Self {
            text: String::new(),
            size: Vec2::new(DEFAULT_SIZE, DEFAULT_SIZE),
            pivot: take_vec2(None, DEFAULT_PIVOT),
            anchor: take_vec2(None, DEFAULT_ANCHOR),
            color: DEFAULT_COLOR.to_string(),
            alpha: 1.0,
            font: String::new(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl TextData {
    fn write(&self, out: &mut PayloadData) {
        let d = Self::default();
        put(&mut out.text, &self.text, &d.text);
        put_vec2(&mut out.size, self.size, [DEFAULT_SIZE, DEFAULT_SIZE]);
        put_vec2(&mut out.pivot, self.pivot, DEFAULT_PIVOT);
        put_vec2(&mut out.anchor, self.anchor, DEFAULT_ANCHOR);
        put(&mut out.color, &self.color, &d.color);
        put(&mut out.alpha, &self.alpha, &d.alpha);
        put(&mut out.font, &self.font, &d.font);
        put(&mut out.font_size, &self.font_size, &d.font_size);
    }

    fn read(&mut self, data: &PayloadData) {
        *self = Self::default();
        if let Some(text) = &data.text {
            self.text.clone_from(text);
        }
        self.size = take_vec2(data.size, [DEFAULT_SIZE, DEFAULT_SIZE]);
        self.pivot = take_vec2(data.pivot, DEFAULT_PIVOT);
        self.anchor = take_vec2(data.anchor, DEFAULT_ANCHOR);
        if let Some(color) = &data.color {
            self.color.clone_from(color);
        }
        self.alpha = data.alpha.unwrap_or(1.0);
        if let Some(font) = &data.font {
            self.font.clone_from(font);
        }
        self.font_size = data.font_size.unwrap_or(DEFAULT_FONT_SIZE);
    }
}

/// Mesh model, optionally animated: GoModel, GoAnimatedModel.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub size: Vec2,
    pub mesh: String,
    pub texture: String,
    pub animation: String,
    pub animations: Vec<String>,
}

impl Default for ModelData {
    fn default() -> Self {
        Self {
            size: Vec2::new(DEFAULT_SIZE, DEFAULT_SIZE),
            mesh: String::new(),
            texture: String::new(),
            animation: String::new(),
            animations: Vec::new(),
        }
    }
}

impl ModelData {
    fn write(&self, out: &mut PayloadData) {
        put_vec2(&mut out.size, self.size, [DEFAULT_SIZE, DEFAULT_SIZE]);
        put(&mut out.mesh, &self.mesh, &String::new());
        put(&mut out.texture, &self.texture, &String::new());
        put(&mut out.animation, &self.animation, &String::new());
        put(&mut out.animations, &self.animations, &Vec::new());
    }

    fn read(&mut self, data: &PayloadData) {
        *self = Self {
            size: take_vec2(data.size, [DEFAULT_SIZE, DEFAULT_SIZE]),
            mesh: data.mesh.clone().unwrap_or_default(),
            texture: data.texture.clone().unwrap_or_default(),
            animation: data.animation.clone().unwrap_or_default(),
            animations: data.animations.clone().unwrap_or_default(),
        };
    }
}

/// Sound source: GoAudio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    pub sound: String,
    pub volume: f32,
    pub looped: bool,
    pub speed: f32,
}

impl Default for AudioData {
    fn default() -> Self {
        Self {
            sound: String::new(),
            volume: 1.0,
            looped: false,
            speed: 1.0,
        }
    }
}

impl AudioData {
    fn write(&self, out: &mut PayloadData) {
        let d = Self::default();
        put(&mut out.sound, &self.sound, &d.sound);
        put(&mut out.volume, &self.volume, &d.volume);
        put(&mut out.looped, &self.looped, &d.looped);
        put(&mut out.speed, &self.speed, &d.speed);
    }

    fn read(&mut self, data: &PayloadData) {
        *self = Self {
            sound: data.sound.clone().unwrap_or_default(),
            volume: data.volume.unwrap_or(1.0),
            looped: data.looped.unwrap_or(false),
            speed: data.speed.unwrap_or(1.0),
        };
    }
}

/// Generic script component with string properties: Component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentData {
    pub component: String,
    pub properties: BTreeMap<String, String>,
}

impl ComponentData {
    fn write(&self, out: &mut PayloadData) {
        put(&mut out.component, &self.component, &String::new());
        put(&mut out.properties, &self.properties, &BTreeMap::new());
    }

    fn read(&mut self, data: &PayloadData) {
        *self = Self {
            component: data.component.clone().unwrap_or_default(),
            properties: data.properties.clone().unwrap_or_default(),
        };
    }
}

/// Closed union of per-kind payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    /// Entity, GuiContainer, GoContainer.
    Empty,
    Plane(PlaneData),
    Text(TextData),
    Model(ModelData),
    Audio(AudioData),
    Component(ComponentData),
}

impl NodePayload {
    /// Builds the payload for `kind` from creation parameters.
    pub fn for_kind(kind: NodeKind, params: &PayloadData) -> Self {
        let mut payload = match kind {
            NodeKind::Entity | NodeKind::GuiContainer | NodeKind::GoContainer => Self::Empty,
            NodeKind::Slice9Plane | NodeKind::GuiBox | NodeKind::GoSprite => Self::Plane(PlaneData::default()),
            NodeKind::Text | NodeKind::GuiText | NodeKind::GoLabel => Self::Text(TextData::default()),
            NodeKind::GoModel | NodeKind::GoAnimatedModel => Self::Model(ModelData::default()),
            NodeKind::GoAudio => Self::Audio(AudioData::default()),
            NodeKind::Component => Self::Component(ComponentData::default()),
        };
        payload.read(params);
        payload
    }

    /// Serialize hook: writes non-default fields into `out`.
    pub fn write(&self, out: &mut PayloadData) {
        match self {
            Self::Empty => {}
            Self::Plane(p) => p.write(out),
            Self::Text(t) => t.write(out),
            Self::Model(m) => m.write(out),
            Self::Audio(a) => a.write(out),
            Self::Component(c) => c.write(out),
        }
    }

    /// Deserialize hook: resets to defaults, then applies `data`.
    pub fn read(&mut self, data: &PayloadData) {
        match self {
            Self::Empty => {}
            Self::Plane(p) => p.read(data),
            Self::Text(t) => t.read(data),
            Self::Model(m) => m.read(data),
            Self::Audio(a) => a.read(data),
            Self::Component(c) => c.read(data),
        }
    }

    pub fn size(&self) -> Option<Vec2> {
        match self {
            Self::Plane(p) => Some(p.size),
            Self::Text(t) => Some(t.size),
            Self::Model(m) => Some(m.size),
            _ => None,
        }
    }

    pub fn set_size(&mut self, size: Vec2) -> bool {
        match self {
            Self::Plane(p) => p.size = size,
            Self::Text(t) => t.size = size,
            Self::Model(m) => m.size = size,
            _ => return false,
        }
        true
    }

    pub fn pivot(&self) -> Option<Vec2> {
        match self {
            Self::Plane(p) => Some(p.pivot),
            Self::Text(t) => Some(t.pivot),
            _ => None,
        }
    }

    pub fn set_pivot(&mut self, pivot: Vec2) -> bool {
        match self {
            Self::Plane(p) => p.pivot = pivot,
            Self::Text(t) => t.pivot = pivot,
            _ => return false,
        }
        true
    }

    pub fn anchor(&self) -> Option<Vec2> {
        match self {
            Self::Plane(p) => Some(p.anchor),
            Self::Text(t) => Some(t.anchor),
            _ => None,
        }
    }

    pub fn set_anchor(&mut self, anchor: Vec2) -> bool {
        match self {
            Self::Plane(p) => p.anchor = anchor,
            Self::Text(t) => t.anchor = anchor,
            _ => return false,
        }
        true
    }

    pub fn slice(&self) -> Option<Vec2> {
        match self {
            Self::Plane(p) => Some(p.slice),
            _ => None,
        }
    }

    pub fn set_slice(&mut self, slice: Vec2) -> bool {
        match self {
            Self::Plane(p) => {
                p.slice = slice;
                true
            }
            _ => false,
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            Self::Plane(p) => Some(&p.color),
            Self::Text(t) => Some(&t.color),
            _ => None,
        }
    }

    pub fn set_color(&mut self, color: &str) -> bool {
        match self {
            Self::Plane(p) => p.color = color.to_string(),
            Self::Text(t) => t.color = color.to_string(),
            _ => return false,
        }
        true
    }

    pub fn alpha(&self) -> Option<f32> {
        match self {
            Self::Plane(p) => Some(p.alpha),
            Self::Text(t) => Some(t.alpha),
            _ => None,
        }
    }

    pub fn set_alpha(&mut self, alpha: f32) -> bool {
        match self {
            Self::Plane(p) => p.alpha = alpha,
            Self::Text(t) => t.alpha = alpha,
            _ => return false,
        }
        true
    }

    /// Texture reference as `(texture, atlas)`.
    pub fn texture(&self) -> Option<(&str, &str)> {
        match self {
            Self::Plane(p) => Some((&p.texture, &p.atlas)),
            Self::Model(m) => Some((&m.texture, "")),
            _ => None,
        }
    }

    pub fn set_texture(&mut self, texture: &str, atlas: &str) -> bool {
        match self {
            Self::Plane(p) => {
                p.texture = texture.to_string();
                p.atlas = atlas.to_string();
            }
            Self::Model(m) => m.texture = texture.to_string(),
            _ => return false,
        }
        true
    }

    /// Whether this payload clips its descendants.
    pub fn clips_children(&self) -> bool {
        matches!(self, Self::Plane(p) if p.clipping)
    }
}
