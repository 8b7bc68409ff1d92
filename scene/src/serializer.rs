//! Conversion between live subtrees and the flat [`NodeDto`] tree.
//!
//! A serialized subtree stores the transform of its top node in world space
//! (or local space, see [`Space`]) and every nested child in local space, so
//! deserializing a whole scene reproduces it exactly. Scene files are RON
//! arrays of root-level DTOs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_core::math::{self, Transform, Vec2, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::node::{NodeId, NodeKind};
use crate::payload::PayloadData;
use crate::store::{NodeStore, Placement};

/// Decimal places kept for floats in serialized data.
pub const FLOAT_PRECISION: u32 = 4;

/// Serialized node, recursively holding its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u32>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub visible: bool,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 2],
    #[serde(default)]
    pub payload: PayloadData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDto>,
}

impl NodeDto {
    /// Largest id in this subtree.
    pub fn max_id(&self) -> u32 {
        self.children
            .iter()
            .map(NodeDto::max_id)
            .fold(self.id.unwrap_or(0), u32::max)
    }

    /// Returns `true` if `id` appears anywhere in this subtree.
    pub fn contains_id(&self, id: u32) -> bool {
        self.id == Some(id) || self.children.iter().any(|c| c.contains_id(id))
    }

    /// Copy of this subtree with `offset` added to every id and parent id.
    ///
    /// Returns `None` if any shifted id would overflow.
    pub fn shifted(&self, offset: u32) -> Option<NodeDto> {
        let shift = |id: Option<u32>| match id {
            Some(id) => id.checked_add(offset).map(Some),
            None => Some(None),
        };
        Some(NodeDto {
            id: shift(self.id)?,
            parent_id: shift(self.parent_id)?,
            children: self
                .children
                .iter()
                .map(|c| c.shifted(offset))
                .collect::<Option<Vec<_>>>()?,
            ..self.clone()
        })
    }

    /// Drops ids and parent ids from this subtree.
    pub fn strip_identity(&mut self) {
        self.id = None;
        self.parent_id = None;
        for child in &mut self.children {
            child.strip_identity();
        }
    }

    fn transform(&self) -> Transform {
        let [x, y, z] = self.position;
        let [sx, sy] = self.scale;
        Transform {
            position: Vec3::new(x, y, z),
            rotation: math::quat_from_array(self.rotation),
            scale: Vec2::new(sx, sy),
        }
    }
}

/// Coordinate space of the top node of a serialized subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Space {
    #[default]
    World,
    /// Relative to the current parent; used for snapshots restored in place.
    Local,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    pub strip_identity: bool,
    /// Skip all children.
    pub shallow: bool,
    pub space: Space,
}

fn round(v: f32) -> f32 {
    math::round_to(v, FLOAT_PRECISION)
}

fn round_pair(v: Option<[f32; 2]>) -> Option<[f32; 2]> {
    v.map(|[x, y]| [round(x), round(y)])
}

impl NodeStore {
    /// Serializes `id` with its top transform in world space.
    pub fn serialize(&self, id: NodeId, strip_identity: bool, shallow: bool) -> Option<NodeDto> {
        self.serialize_with(
            id,
            SerializeOptions {
                strip_identity,
                shallow,
                space: Space::World,
            },
        )
    }

    pub fn serialize_with(&self, id: NodeId, options: SerializeOptions) -> Option<NodeDto> {
        let node = self.get(id)?;
        let transform = match (options.space, node.parent()) {
            (Space::World, Some(_)) => self.world_transform(id)?,
            _ => node.transform,
        };
        self.serialize_node(id, transform, options)
    }

    fn serialize_node(&self, id: NodeId, transform: Transform, options: SerializeOptions) -> Option<NodeDto> {
        let node = self.get(id)?;
        let mut payload = PayloadData::default();
        node.payload.write(&mut payload);
        if !node.active {
            payload.active = Some(false);
        }
        payload.size = round_pair(payload.size);
        payload.pivot = round_pair(payload.pivot);
        payload.anchor = round_pair(payload.anchor);
        payload.slice = round_pair(payload.slice);
        for scalar in [
            &mut payload.alpha,
            &mut payload.font_size,
            &mut payload.volume,
            &mut payload.speed,
        ] {
            *scalar = scalar.map(round);
        }

        let children = if options.shallow {
            Vec::new()
        } else {
            node.children()
                .iter()
                .filter_map(|c| self.get(*c))
                .filter(|c| !c.flags.no_saving)
                .filter_map(|c| self.serialize_node(c.id(), c.transform, options))
                .collect()
        };

        let [px, py, pz] = [transform.position.x, transform.position.y, transform.position.z];
        Some(NodeDto {
            id: (!options.strip_identity).then_some(id.0),
            parent_id: if options.strip_identity {
                None
            } else {
                node.parent().map(|p| p.0)
            },
            kind: node.kind(),
            name: node.name().to_string(),
            visible: node.visible,
            position: [round(px), round(py), round(pz)],
            rotation: math::quat_to_array(transform.rotation).map(round),
            scale: [round(transform.scale.x), round(transform.scale.y)],
            payload,
            children,
        })
    }

    /// Rebuilds a subtree from `dto` and attaches it last under `parent`.
    ///
    /// With `preserve_id` the DTO ids are requested explicitly; collisions
    /// still get fresh ids. Returns the id of the new top node.
    pub fn deserialize(&mut self, dto: &NodeDto, preserve_id: bool, parent: Option<NodeId>) -> NodeId {
        self.deserialize_at(dto, preserve_id, parent, None)
    }

    /// Like [`deserialize`](Self::deserialize), inserting before `before`.
    ///
    /// The DTO transform is written as the node's local transform.
    pub fn deserialize_at(
        &mut self,
        dto: &NodeDto,
        preserve_id: bool,
        parent: Option<NodeId>,
        before: Option<NodeId>,
    ) -> NodeId {
        let explicit = if preserve_id { dto.id.map(NodeId) } else { None };
        let id = self.create(dto.kind, &dto.payload, explicit);
        let name = dto.name.clone();
        self.update(id, |node| {
            node.transform = dto.transform();
            node.visible = dto.visible;
        });
        self.rename(id, &name);
        if !self.move_node_with(id, parent, before, Placement::KeepLocal) {
            log::error!("Could not attach deserialized node {id}, attaching at root");
            self.move_node_with(id, None, None, Placement::KeepLocal);
        }
        for child in &dto.children {
            self.deserialize(child, preserve_id, Some(id));
        }
        id
    }

    /// Serializes every saveable root, in order.
    pub fn save_scene(&self) -> Vec<NodeDto> {
        self.roots()
            .iter()
            .filter_map(|r| self.get(*r))
            .filter(|n| !n.flags.no_saving)
            .filter_map(|n| self.serialize_with(n.id(), SerializeOptions::default()))
            .collect()
    }

    /// Replaces the whole store with `scene`, keeping the saved ids.
    pub fn load_scene(&mut self, scene: &[NodeDto]) {
        self.clear();
        for dto in scene {
            self.deserialize(dto, true, None);
        }
        log::info!("Loaded scene with {} nodes", self.len());
    }

    /// Loads `scene` under a new root GoContainer named `name`.
    ///
    /// All ids are shifted past both the current counter and the largest id
    /// in `scene`, so nothing collides with live nodes. Returns `None` and
    /// leaves the store untouched if the shifted ids do not fit in `u32`.
    pub fn import_scene(&mut self, scene: &[NodeDto], name: &str) -> Option<NodeId> {
        let max = scene.iter().map(NodeDto::max_id).max().unwrap_or(0);
        let shifted = self
            .id_counter()
            .max(max)
            .checked_add(2)
            .and_then(|offset| {
                let dtos = scene.iter().map(|dto| dto.shifted(offset)).collect::<Option<Vec<_>>>()?;
                Some((offset, dtos))
            });
        let Some((offset, shifted)) = shifted else {
            log::error!("Cannot import '{name}': ids up to {max} leave no room past the id counter");
            return None;
        };

        let container = self.create(NodeKind::GoContainer, &PayloadData::default(), None);
        self.rename(container, name);
        self.add(container, None, None);
        if self.id_counter() < offset {
            self.set_id_counter(offset);
        }
        for dto in &shifted {
            self.deserialize(dto, true, Some(container));
        }
        Some(container)
    }

    /// Writes the whole scene to a RON file.
    pub fn save_scene_file(&self, path: &Path) -> SceneResult<()> {
        let text = scene_to_ron(&self.save_scene())?;
        fs::write(path, text).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replaces the store with the scene stored in a RON file.
    pub fn load_scene_file(&mut self, path: &Path) -> SceneResult<()> {
        let scene = read_scene_file(path)?;
        self.load_scene(&scene);
        Ok(())
    }
}

/// Reads and decodes a RON scene file.
pub fn read_scene_file(path: &Path) -> SceneResult<Vec<NodeDto>> {
    let text = fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    scene_from_ron(&text)
}

/// Pretty RON encoding of a scene.
pub fn scene_to_ron(scene: &[NodeDto]) -> SceneResult<String> {
    let config = ron::ser::PrettyConfig::default().extensions(ron::extensions::Extensions::IMPLICIT_SOME);
    ron::ser::to_string_pretty(scene, config).map_err(|e| SceneError::Encode(e.to_string()))
}

pub fn scene_from_ron(text: &str) -> SceneResult<Vec<NodeDto>> {
    ron::from_str(text).map_err(|e| SceneError::Decode(e.to_string()))
}

/// Editor bookkeeping saved next to a scene file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub id_counter: u32,
}

impl NodeStore {
    pub fn session_state(&self) -> SessionState {
        SessionState {
            id_counter: self.id_counter(),
        }
    }

    pub fn restore_session(&mut self, state: SessionState) {
        self.set_id_counter(state.id_counter);
    }
}

pub fn session_to_ron(state: &SessionState) -> SceneResult<String> {
    ron::ser::to_string_pretty(state, ron::ser::PrettyConfig::default()).map_err(|e| SceneError::Encode(e.to_string()))
}

pub fn session_from_ron(text: &str) -> SceneResult<SessionState> {
    ron::from_str(text).map_err(|e| SceneError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::math::Vec3;

    #[test]
    fn children_are_local_and_top_is_world() {
        let mut store = NodeStore::new();
        let a = store.create(NodeKind::GoContainer, &PayloadData::default(), None);
        store.add(a, None, None);
        store.update(a, |n| n.set_position(Vec3::new(10.0, 0.0, 0.0)));
        let b = store.create(NodeKind::GoSprite, &PayloadData::default(), None);
        store.add(b, Some(a), None);
        store.update(b, |n| n.set_position(Vec3::new(1.0, 2.0, 0.0)));

        let dto = store.serialize(b, false, false).unwrap();
        assert_eq!(dto.position, [11.0, 2.0, 0.0]);
        assert_eq!(dto.parent_id, Some(a.0));

        let dto = store.serialize(a, false, false).unwrap();
        assert_eq!(dto.children[0].position, [1.0, 2.0, 0.0]);
    }

    #[test]
    fn strip_and_shallow() {
        let mut store = NodeStore::new();
        let a = store.create(NodeKind::Entity, &PayloadData::default(), None);
        store.add(a, None, None);
        let b = store.create(NodeKind::Entity, &PayloadData::default(), None);
        store.add(b, Some(a), None);

        let dto = store.serialize(a, true, true).unwrap();
        assert_eq!(dto.id, None);
        assert!(dto.children.is_empty());
        let dto = store.serialize(a, true, false).unwrap();
        assert_eq!(dto.children[0].id, None);
        assert_eq!(dto.children[0].parent_id, None);
    }

    #[test]
    fn no_saving_children_are_skipped() {
        let mut store = NodeStore::new();
        let a = store.create(NodeKind::Entity, &PayloadData::default(), None);
        store.add(a, None, None);
        let hidden = store.create(NodeKind::Entity, &PayloadData::default(), None);
        store.add(hidden, Some(a), None);
        store.update(hidden, |n| n.flags.no_saving = true);

        assert!(store.serialize(a, false, false).unwrap().children.is_empty());
    }

    #[test]
    fn floats_are_rounded() {
        let mut store = NodeStore::new();
        let a = store.create(NodeKind::Entity, &PayloadData::default(), None);
        store.add(a, None, None);
        store.update(a, |n| n.set_position(Vec3::new(0.123456, -0.00001, 2.0)));
        let dto = store.serialize(a, false, false).unwrap();
        assert_eq!(dto.position, [0.1235, 0.0, 2.0]);
    }

    #[test]
    fn scalar_payload_fields_are_rounded() {
        let mut store = NodeStore::new();
        let params = PayloadData {
            volume: Some(0.333333),
            speed: Some(1.987654),
            ..PayloadData::default()
        };
        let audio = store.create(NodeKind::GoAudio, &params, None);
        store.add(audio, None, None);
        let sprite = store.create(NodeKind::GoSprite, &PayloadData::default(), None);
        store.add(sprite, None, None);
        store.update(sprite, |n| {
            n.payload.set_alpha(0.666666);
        });

        let audio = store.serialize(audio, false, false).unwrap();
        assert_eq!(audio.payload.volume, Some(0.3333));
        assert_eq!(audio.payload.speed, Some(1.9877));
        let sprite = store.serialize(sprite, false, false).unwrap();
        assert_eq!(sprite.payload.alpha, Some(0.6667));
    }

    #[test]
    fn max_id_and_shift() {
        let mut store = NodeStore::new();
        let a = store.create(NodeKind::Entity, &PayloadData::default(), Some(NodeId(3)));
        store.add(a, None, None);
        let b = store.create(NodeKind::Entity, &PayloadData::default(), Some(NodeId(9)));
        store.add(b, Some(a), None);

        let dto = store.serialize(a, false, false).unwrap();
        assert_eq!(dto.max_id(), 9);
        assert!(dto.shifted(u32::MAX - 9).is_none());
        let dto = dto.shifted(10).unwrap();
        assert_eq!(dto.id, Some(13));
        assert_eq!(dto.children[0].id, Some(19));
        assert_eq!(dto.children[0].parent_id, Some(13));
    }

    #[test]
    fn session_state_text() {
        let text = session_to_ron(&SessionState { id_counter: 42 }).unwrap();
        assert_eq!(session_from_ron(&text).unwrap().id_counter, 42);
    }
}
