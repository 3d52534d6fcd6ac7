//! The custom FBX serializer
//!
//! Composes an FBX scene from DCC scene nodes. This exporter exists to
//! keep the emitted data as clean as possible for game engines, and it
//! supports animation baking at a decimal framerate to help reduce euler
//! filter abnormalities.
//!
//! One serializer serves one export: gather the configured nodes, reserve
//! a shell per node, link the shells into a mirrored hierarchy, fill each
//! shell with its type-specific data, optionally bake animation, then emit.

use std::path::{Path, PathBuf};

use glam::DVec3;
use indexmap::IndexMap;
use log::{info, warn};

use crate::config::{ExportRange, ExportSet, MeshSettings, ObjectSet};
use crate::document::FbxDocument;
use crate::error::{Error, SceneError, StructuralError};
use crate::gather::Gatherer;
use crate::math::{decompose, Trs};
use crate::objects::{
    ColorElement, ModelKind, NodeAttributeKind, NormalElement, ObjectId, ObjectNode,
    SmoothingElement, TransformChannel, UvElement, VectorElement,
};
use crate::scene::{short_name, LinearUnit, MeshSample, NodeHandle, NodeKind, SceneAdapter};
use crate::time::{inclusive_range, FbxTime, TimeMode};
use crate::version::{FileFormat, FileVersion};

/// Name of the single animation stack every file carries.
const TAKE_NAME: &str = "Take 001";

/// Name of the single animation layer on that stack.
const LAYER_NAME: &str = "BaseLayer";

/// Non-savable model property holding the source handle.
const HANDLE_PROPERTY: &str = "handle";

/// Keeps the entries whose mask slot is set, preserving order.
fn filter_by_mask<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(value, _)| value.clone())
        .collect()
}

/// What a shell will be filled with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShellKind {
    /// A skeleton limb.
    Skeleton,
    /// A polygonal mesh.
    Mesh,
    /// A camera.
    Camera,
    /// A bare transform.
    Null,
}

impl ShellKind {
    fn from_node(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Joint => ShellKind::Skeleton,
            NodeKind::Mesh => ShellKind::Mesh,
            NodeKind::Camera => ShellKind::Camera,
            NodeKind::Transform => ShellKind::Null,
        }
    }

    fn model_kind(&self) -> ModelKind {
        match self {
            ShellKind::Skeleton => ModelKind::LimbNode,
            ShellKind::Mesh => ModelKind::Mesh,
            ShellKind::Camera => ModelKind::Camera,
            ShellKind::Null => ModelKind::Null,
        }
    }
}

/// An FBX node reserved for a gathered scene node.
#[derive(Debug, Clone)]
pub struct NodeShell {
    /// Source node handle.
    pub handle: NodeHandle,
    /// Short node name the FBX node was created with.
    pub name: String,
    /// Which type-specific block fills this shell.
    pub kind: ShellKind,
    /// The document model backing this shell.
    pub model: ObjectId,
}

/// Composes FBX files from DCC scene nodes.
///
/// Holds the document, the single anim stack/layer pair, and the
/// handle-to-shell map for the duration of one export. Nothing survives
/// into the next export; create a fresh serializer per file.
pub struct FbxSerializer<'a, S: SceneAdapter> {
    scene: &'a mut S,
    namespace: String,
    document: FbxDocument,
    anim_stack: ObjectId,
    anim_layer: ObjectId,
    shells: IndexMap<NodeHandle, NodeShell>,
    materials: IndexMap<NodeHandle, ObjectId>,
    curves: IndexMap<(ObjectId, TransformChannel), [ObjectId; 3]>,
}

impl<'a, S: SceneAdapter> FbxSerializer<'a, S> {
    /// Creates a serializer over the given scene.
    ///
    /// `namespace` is prepended to every gather pattern. The document is
    /// initialized with the host's axis settings and the mandatory anim
    /// stack and layer; every FBX needs at least one animation layer, even
    /// for mesh-only exports.
    pub fn new(scene: &'a mut S, namespace: impl Into<String>) -> Self {
        let mut document = FbxDocument::new();
        document.set_up_axis(scene.up_axis());

        if scene.linear_unit() != LinearUnit::Centimeter {
            warn!("Scene units are not centimeters; emitting centimeters anyway");
        }

        let anim_stack = document.add_anim_stack(TAKE_NAME);
        let anim_layer = document.add_anim_layer(LAYER_NAME);
        document.connect_oo(anim_layer, anim_stack);
        document.set_active_stack(anim_stack);

        FbxSerializer {
            scene,
            namespace: namespace.into(),
            document,
            anim_stack,
            anim_layer,
            shells: IndexMap::new(),
            materials: IndexMap::new(),
            curves: IndexMap::new(),
        }
    }

    /// The document being assembled; exposed for inspection.
    pub fn document(&self) -> &FbxDocument {
        &self.document
    }

    /// The single animation stack every export carries.
    pub fn anim_stack(&self) -> ObjectId {
        self.anim_stack
    }

    /// The single animation layer on that stack.
    pub fn anim_layer(&self) -> ObjectId {
        self.anim_layer
    }

    /// Shells reserved so far, in allocation order.
    pub fn shells(&self) -> impl Iterator<Item = &NodeShell> {
        self.shells.values()
    }

    /// Whether a shell exists for the given handle.
    pub fn has_handle(&self, handle: NodeHandle) -> bool {
        self.shells.contains_key(&handle)
    }

    /// The shell reserved for a handle, if any.
    pub fn shell(&self, handle: NodeHandle) -> Option<&NodeShell> {
        self.shells.get(&handle)
    }

    fn gather(&self, set: &ObjectSet) -> Vec<NodeHandle> {
        Gatherer::new(&*self.scene, &self.namespace).gather(set)
    }

    /// Reserves one shell per handle.
    ///
    /// Reservation is idempotent per handle; a handle that re-gathers with
    /// a different kind is a structural error. No parent links are made
    /// here, so shells can be reserved in any order.
    fn allocate(&mut self, handles: &[NodeHandle]) -> Result<(), Error> {
        for &handle in handles {
            let kind = match self.scene.kind(handle) {
                Ok(kind) => ShellKind::from_node(kind),
                Err(error) => {
                    warn!("Skipping unresolvable node: {error}");
                    continue;
                }
            };

            if let Some(existing) = self.shells.get(&handle) {
                if existing.kind != kind {
                    return Err(StructuralError::DuplicateShell(handle).into());
                }
                continue;
            }

            let full_name = match self.scene.name(handle) {
                Ok(name) => name,
                Err(error) => {
                    warn!("Skipping unresolvable node: {error}");
                    continue;
                }
            };
            let name = short_name(&full_name).to_string();

            let model = self.document.add_model(&name, kind.model_kind());
            // Hash codes are not persistent, so the reverse-lookup property
            // must never reach the file.
            self.document
                .model_mut(model)?
                .set_non_savable(HANDLE_PROPERTY, handle.to_string());

            self.shells.insert(
                handle,
                NodeShell {
                    handle,
                    name,
                    kind,
                    model,
                },
            );
        }

        Ok(())
    }

    /// Mirrors the source hierarchy onto the reserved shells.
    ///
    /// A shell whose source parent was not gathered attaches to the FBX
    /// root. Runs after every reservation, so gather order cannot change
    /// the outcome.
    fn link(&mut self) {
        let links: Vec<(ObjectId, Option<ObjectId>)> = self
            .shells
            .values()
            .map(|shell| {
                let parent = self
                    .scene
                    .parent(shell.handle)
                    .and_then(|parent| self.shells.get(&parent))
                    .map(|parent| parent.model);
                (shell.model, parent)
            })
            .collect();

        for (child, parent) in links {
            self.document.set_parent(child, parent);
        }
    }

    /// Reads a shell's source handle back from its model.
    fn associated_handle(&self, model: ObjectId) -> Result<NodeHandle, Error> {
        let model = self.document.model(model)?;
        model
            .non_savable(HANDLE_PROPERTY)
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| StructuralError::BadHandleProperty(model.name().to_string()).into())
    }

    /// Copies the local transform of a source node onto its shell.
    ///
    /// Inheritance is pinned to `RSrs`: rotation and scale inherited from
    /// the parent, no segment-scale compensation. Pivots and pre/post
    /// rotation stay zero and shear is not copied.
    fn copy_transform(&mut self, handle: NodeHandle) -> Result<(), Error> {
        let shell = self
            .shells
            .get(&handle)
            .ok_or(StructuralError::MissingShell(handle))?;
        let model = shell.model;

        let matrix = self.scene.local_matrix(handle).map_err(Error::Scene)?;
        let order = self.scene.rotation_order(handle).map_err(Error::Scene)?;
        let trs = decompose(&matrix, order);

        let target = self.document.model_mut(model)?;
        target.translation = trs.translation;
        target.rotation = trs.euler_degrees;
        target.scaling = trs.scale;
        target.rotation_order = order;
        target.rotation_active = true;

        Ok(())
    }

    /// Fills a skeleton shell: transform plus a limb-node attribute.
    fn compose_skeleton(&mut self, handle: NodeHandle) -> Result<(), Error> {
        let shell = self
            .shells
            .get(&handle)
            .ok_or(StructuralError::MissingShell(handle))?;
        let (model, name) = (shell.model, shell.name.clone());

        info!("Creating \"{name}\" joint");
        self.copy_transform(handle)?;

        let attribute = self
            .document
            .add_node_attribute(&name, NodeAttributeKind::LimbNode);
        self.document.connect_oo(attribute, model);

        Ok(())
    }

    /// Fills a camera shell: transform plus a camera attribute.
    fn compose_camera(&mut self, handle: NodeHandle) -> Result<(), Error> {
        let shell = self
            .shells
            .get(&handle)
            .ok_or(StructuralError::MissingShell(handle))?;
        let (model, name) = (shell.model, shell.name.clone());

        info!("Creating \"{name}\" camera");
        self.copy_transform(handle)?;

        let attribute = self
            .document
            .add_node_attribute(&name, NodeAttributeKind::Camera);
        self.document.connect_oo(attribute, model);

        Ok(())
    }

    /// Creates (or reuses) the material for one assignment and attaches it
    /// to the mesh model.
    fn attach_material(
        &mut self,
        mesh_model: ObjectId,
        node: Option<NodeHandle>,
        texture_path: &str,
    ) -> Result<(), Error> {
        let material = match node {
            Some(handle) => {
                if let Some(existing) = self.materials.get(&handle) {
                    *existing
                } else {
                    let full_name = match self.scene.name(handle) {
                        Ok(name) => name,
                        Err(error) => {
                            warn!("Skipping unresolvable material: {error}");
                            return Ok(());
                        }
                    };
                    let material = self.document.add_material(short_name(&full_name));

                    if !texture_path.is_empty() {
                        let stem = Path::new(texture_path)
                            .file_stem()
                            .map(|stem| stem.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        let texture = self.document.add_texture(stem, texture_path);
                        self.document.connect_op(texture, material, "DiffuseColor");
                    }

                    self.materials.insert(handle, material);
                    material
                }
            }
            None => self.document.add_material(""),
        };

        self.document.connect_oo(material, mesh_model);
        Ok(())
    }

    /// Copies geometry tables into a shell's mesh attribute.
    ///
    /// Faces whose vertex indices fall outside the control-point range are
    /// bad adapter data: they are logged and skipped, and every per-face
    /// and per-face-vertex table is filtered alongside so the emitted
    /// arrays stay aligned.
    fn copy_mesh(
        &mut self,
        geometry: ObjectId,
        sample: &MeshSample,
        settings: &MeshSettings,
    ) -> Result<(), Error> {
        let num_face_vertices = sample.num_face_vertices();
        let vertex_count = sample.positions.len() as u32;

        let mut keep_face = Vec::with_capacity(sample.face_vertex_indices.len());
        let mut keep_face_vertex = Vec::with_capacity(num_face_vertices);
        for (face_index, face) in sample.face_vertex_indices.iter().enumerate() {
            let keep = face.iter().all(|&vertex| vertex < vertex_count);
            if !keep {
                warn!("Skipping face {face_index}: vertex index out of range");
            }
            keep_face.push(keep);
            keep_face_vertex.extend(std::iter::repeat(keep).take(face.len()));
        }
        let dropped_faces = keep_face.iter().any(|keep| !*keep);

        let target = self.document.geometry_mut(geometry)?;

        target.init_control_points(sample.positions.len());
        for (index, position) in sample.positions.iter().enumerate() {
            target.set_control_point(index, *position);
        }

        for (face, keep) in sample.face_vertex_indices.iter().zip(&keep_face) {
            if !*keep {
                continue;
            }
            target.begin_polygon();
            for &vertex in face {
                target.add_polygon_vertex(vertex);
            }
            target.end_polygon();
        }

        // Adjacency is derived from the face-vertex stream; this must run
        // after the last polygon and exactly once.
        target.build_edge_array()?;

        target.material_indices = filter_by_mask(&sample.face_material_indices, &keep_face);

        if settings.include_normals {
            target.normals = Some(NormalElement {
                values: filter_by_mask(&sample.face_vertex_normals, &keep_face_vertex),
            });
        } else {
            info!("Skipping face-vertex normals...");
        }

        if settings.include_smoothings {
            if let Some(edge_smoothings) = &sample.edge_smoothings {
                if dropped_faces {
                    // The source edge list no longer lines up with the
                    // edges derived from the surviving faces.
                    warn!("Dropped faces invalidate edge smoothings; skipping");
                } else {
                    target.smoothing = Some(SmoothingElement::ByEdge(edge_smoothings.clone()));
                }
            } else if let Some(groups) = &sample.smoothing_groups {
                target.smoothing = Some(SmoothingElement::ByPolygon(filter_by_mask(
                    groups, &keep_face,
                )));
            }
        } else {
            info!("Skipping smoothings...");
        }

        if settings.include_color_sets {
            for set in &sample.color_sets {
                info!("Creating \"{}\" colour set...", set.name);
                target.color_sets.push(ColorElement {
                    name: set.name.clone(),
                    colors: set.colors.clone(),
                    indices: filter_by_mask(&set.face_vertex_indices, &keep_face_vertex),
                });
            }
        } else {
            info!("Skipping color sets...");
        }

        for set in &sample.uv_sets {
            info!("Creating \"{}\" UV set...", set.name);
            target.uv_sets.push(UvElement {
                name: set.name.clone(),
                uvs: set.uvs.clone(),
                indices: filter_by_mask(&set.face_vertex_indices, &keep_face_vertex),
            });
        }

        if settings.include_normals && settings.include_tangents_and_binormals {
            for set in &sample.uv_sets {
                let (Some(tangents), Some(binormals)) = (&set.tangents, &set.binormals) else {
                    warn!("UV set \"{}\" has no tangent data", set.name);
                    continue;
                };

                if tangents.len() != num_face_vertices || binormals.len() != num_face_vertices {
                    warn!("UV set \"{}\" tangent data is incomplete", set.name);
                    continue;
                }

                target.tangent_sets.push(VectorElement {
                    name: set.name.clone(),
                    values: filter_by_mask(tangents, &keep_face_vertex),
                });
                target.binormal_sets.push(VectorElement {
                    name: set.name.clone(),
                    values: filter_by_mask(binormals, &keep_face_vertex),
                });
            }
        } else {
            info!("Skipping tangents and binormals...");
        }

        Ok(())
    }

    /// Builds the skin deformer for a mesh shell.
    ///
    /// One cluster per influencing limb whose shell exists; influences
    /// outside the export are skipped. Weights are copied as authored.
    fn create_skin(
        &mut self,
        mesh_handle: NodeHandle,
        mesh_model: ObjectId,
        geometry: ObjectId,
        name: &str,
    ) -> Result<(), Error> {
        let sample = match self.scene.skin(mesh_handle) {
            Ok(Some(sample)) => sample,
            Ok(None) => {
                warn!("Mesh \"{name}\" has no skin; skipping deformer");
                return Ok(());
            }
            Err(error) => {
                warn!("Skipping skin on \"{name}\": {error}");
                return Ok(());
            }
        };

        let skin = self.document.add_skin(name);
        self.document.connect_oo(skin, geometry);

        let mesh_global = self.document.global_transform(mesh_model)?;

        // Reserve/link already ran, so limb references resolve through the
        // shell map; clusters never point at nodes made during skinning.
        let mut clusters: IndexMap<u32, ObjectId> = IndexMap::new();
        let mut pose_entries = vec![(mesh_model, mesh_global)];
        for (&influence_id, influence_handle) in &sample.influences {
            let Some(limb) = self.shells.get(influence_handle) else {
                warn!("{}", SceneError::UnknownInfluence(*influence_handle));
                continue;
            };
            let (limb_model, limb_name) = (limb.model, limb.name.clone());

            let cluster = self.document.add_cluster(&limb_name);
            self.document.connect_oo(cluster, skin);
            self.document.connect_oo(limb_model, cluster);

            // Link transform comes from the composed FBX scene, not the
            // source, so it matches what importers will evaluate.
            let link_global = self.document.global_transform(limb_model)?;
            let target = self.document.cluster_mut(cluster)?;
            target.transform = mesh_global;
            target.transform_link = link_global;

            clusters.insert(influence_id, cluster);
            pose_entries.push((limb_model, link_global));
        }

        for (&vertex, weights) in &sample.weights {
            for (&influence_id, weight) in weights {
                let Some(&cluster) = clusters.get(&influence_id) else {
                    continue;
                };
                self.document
                    .cluster_mut(cluster)?
                    .add_control_point_index(vertex as i32, weight.into_inner());
            }
        }

        // Importers match poses to deformers by name.
        let pose = self.document.add_bind_pose(name);
        for (model, matrix) in pose_entries {
            self.document.bind_pose_mut(pose)?.add(model, matrix);
        }

        Ok(())
    }

    /// Fills a mesh shell: materials, geometry and optionally a skin.
    fn compose_mesh(&mut self, handle: NodeHandle, settings: &MeshSettings) -> Result<(), Error> {
        let shell = self
            .shells
            .get(&handle)
            .ok_or(StructuralError::MissingShell(handle))?;
        let (model, name) = (shell.model, shell.name.clone());

        info!("Creating \"{name}\" mesh");

        let sample = match self.scene.mesh(handle) {
            Ok(sample) => sample,
            Err(error) => {
                warn!("Skipping mesh \"{name}\": {error}");
                return Ok(());
            }
        };

        for assignment in &sample.materials {
            self.attach_material(model, assignment.node, &assignment.texture_path)?;
        }

        let geometry = self.document.add_geometry(&name);
        self.document.connect_oo(geometry, model);
        self.copy_mesh(geometry, &sample, settings)?;

        if settings.include_skins {
            self.create_skin(handle, model, geometry, &name)?;
        }

        if settings.include_blendshapes {
            warn!("Blendshape export is not supported; skipping");
        }

        Ok(())
    }

    /// Stamps the time mode and default span onto the document.
    fn update_time_range(&mut self, start_frame: f64, end_frame: f64) {
        let mode = TimeMode::Frames30;
        self.document.set_time_mode(mode);
        self.document.set_time_span(
            FbxTime::from_frame(start_frame, mode),
            FbxTime::from_frame(end_frame, mode),
        );
    }

    fn ensure_curves(
        &mut self,
        model: ObjectId,
        node_name: &str,
        channel: TransformChannel,
        defaults: DVec3,
    ) -> Result<[ObjectId; 3], Error> {
        if let Some(curves) = self.curves.get(&(model, channel)) {
            return Ok(*curves);
        }

        let bundle_name = match channel {
            TransformChannel::Translation => "T",
            TransformChannel::Rotation => "R",
            TransformChannel::Scaling => "S",
        };

        let curve_node = self.document.add_curve_node(bundle_name);
        self.document.curve_node_mut(curve_node)?.defaults = defaults;
        self.document.connect_oo(curve_node, self.anim_layer);
        self.document
            .connect_op(curve_node, model, channel.property());

        let mut curves = [ObjectId::ROOT; 3];
        for (index, axis) in ["X", "Y", "Z"].iter().enumerate() {
            let curve = self.document.add_anim_curve(format!(
                "{node_name}_anim_{}{axis}",
                channel.curve_name()
            ));
            self.document
                .connect_op(curve, curve_node, format!("d|{axis}"));
            curves[index] = curve;
        }

        self.curves.insert((model, channel), curves);
        Ok(curves)
    }

    /// Keys translate, rotate and scale of one shell at the given time.
    fn bake_node(&mut self, model: ObjectId, time: FbxTime) -> Result<(), Error> {
        let handle = self.associated_handle(model)?;

        let matrix = self.scene.local_matrix(handle).map_err(Error::Scene)?;
        let order = self.scene.rotation_order(handle).map_err(Error::Scene)?;
        let trs = decompose(&matrix, order);

        let node_name = self.document.model(model)?.name().to_string();

        let channels = [
            (TransformChannel::Translation, trs.translation),
            (TransformChannel::Rotation, trs.euler_degrees),
            (TransformChannel::Scaling, trs.scale),
        ];

        for (channel, value) in channels {
            let curves = self.ensure_curves(model, &node_name, channel, value)?;
            for (axis, curve) in curves.into_iter().enumerate() {
                let component = match axis {
                    0 => value.x,
                    1 => value.y,
                    _ => value.z,
                };
                self.document.anim_curve_mut(curve)?.add_key(time, component);
            }
        }

        Ok(())
    }

    /// Bakes the transforms of the given shells over a frame range.
    ///
    /// The loop starts one range-length before `start_frame` so nodes that
    /// rely on internal caching can prime, but only in-range frames write
    /// keys. The viewport stays suspended for the whole run and is resumed
    /// on every exit path.
    fn bake_animation(
        &mut self,
        models: &[ObjectId],
        start_frame: f64,
        end_frame: f64,
        step: f64,
    ) -> Result<(), Error> {
        info!("Exporting range: {start_frame} : {end_frame} @ {step} step");

        self.scene.suspend_viewport();
        let result = self.bake_loop(models, start_frame, end_frame, step);
        self.scene.resume_viewport();
        result
    }

    fn bake_loop(
        &mut self,
        models: &[ObjectId],
        start_frame: f64,
        end_frame: f64,
        step: f64,
    ) -> Result<(), Error> {
        let mode = self.document.time_mode();
        let run_up = end_frame - start_frame;

        for frame in inclusive_range(start_frame - run_up, end_frame, step) {
            self.scene.set_frame(frame);

            if frame < start_frame || frame > end_frame {
                // Run-up frames only drive the scene's evaluators.
                continue;
            }

            let time = FbxTime::from_frame(frame, mode);
            for &model in models {
                self.bake_node(model, time)?;
            }
        }

        Ok(())
    }

    /// Re-roots every direct child of the FBX root onto its bind transform.
    ///
    /// Existing transform curves on the current stack are destroyed first,
    /// which zeroes world-space drift for rigs whose root carries motion.
    fn move_to_origin(&mut self) -> Result<(), Error> {
        for child in self.document.children_of_root() {
            for curve_node in self.document.curve_nodes_of(child) {
                for curve in self.document.curves_of(curve_node) {
                    self.document.remove_object(curve);
                }
                self.document.remove_object(curve_node);
            }
            self.curves.retain(|key, _| key.0 != child);

            let handle = self.associated_handle(child)?;
            let (bind, order) = match (
                self.scene.bind_matrix(handle),
                self.scene.rotation_order(handle),
            ) {
                (Ok(bind), Ok(order)) => (bind, order),
                (Err(error), _) | (_, Err(error)) => {
                    warn!("Leaving root child in place: {error}");
                    continue;
                }
            };

            let Trs {
                translation,
                euler_degrees,
                scale,
            } = decompose(&bind, order);

            let model = self.document.model_mut(child)?;
            model.translation = translation;
            model.rotation = euler_degrees;
            model.scaling = scale;
        }

        Ok(())
    }

    fn save_as(
        &self,
        path: &Path,
        version: FileVersion,
        format: FileFormat,
    ) -> Result<Option<PathBuf>, Error> {
        self.document.save(path, version, format)?;
        Ok(Some(path.to_path_buf()))
    }

    /// Serializes the nodes from the supplied export set.
    ///
    /// Returns the output path on success, or `None` when the set resolves
    /// to nothing (logged, not an error). Structural and I/O failures are
    /// returned as errors and produce no file.
    pub fn serialize_export_set(
        &mut self,
        export_set: &ExportSet,
        path: impl AsRef<Path>,
        version: FileVersion,
        format: FileFormat,
    ) -> Result<Option<PathBuf>, Error> {
        let joints = self.gather(&export_set.skeleton);
        let cameras = self.gather(&export_set.camera);
        let meshes = self.gather(&export_set.mesh);

        if joints.is_empty() && cameras.is_empty() && meshes.is_empty() {
            warn!("Export set \"{}\" resolved to nothing", export_set.name);
            return Ok(None);
        }

        self.allocate(&joints)?;
        self.allocate(&cameras)?;
        self.allocate(&meshes)?;
        self.link();

        // Handles that failed to reserve were already logged; only shells
        // get composed.
        for &joint in &joints {
            if self.has_handle(joint) {
                self.compose_skeleton(joint)?;
            }
        }
        for &camera in &cameras {
            if self.has_handle(camera) {
                self.compose_camera(camera)?;
            }
        }
        for &mesh in &meshes {
            if self.has_handle(mesh) {
                self.compose_mesh(mesh, &export_set.mesh_settings)?;
            }
        }

        self.save_as(path.as_ref(), version, format)
    }

    /// Serializes the skeleton of an export set baked over a range.
    ///
    /// `export_set` is the set the range resolves to. With `use_timeline`
    /// the host's active range wins over the configured frames.
    pub fn serialize_export_range(
        &mut self,
        export_range: &ExportRange,
        export_set: &ExportSet,
        path: impl AsRef<Path>,
        version: FileVersion,
        format: FileFormat,
    ) -> Result<Option<PathBuf>, Error> {
        let joints = self.gather(&export_set.skeleton);
        if joints.is_empty() {
            warn!(
                "Export range \"{}\" resolved to an empty skeleton",
                export_range.name
            );
            return Ok(None);
        }

        self.allocate(&joints)?;
        self.link();
        for &joint in &joints {
            if self.has_handle(joint) {
                self.compose_skeleton(joint)?;
            }
        }

        let (start_frame, end_frame) = if export_range.use_timeline {
            self.scene.timeline()
        } else {
            (export_range.start_frame, export_range.end_frame)
        };

        let step = if export_range.step > 0.0 {
            export_range.step
        } else {
            warn!("Invalid step {}; using 1", export_range.step);
            1.0
        };

        self.update_time_range(start_frame, end_frame);

        let models: Vec<ObjectId> = joints
            .iter()
            .filter_map(|handle| self.shells.get(handle))
            .map(|shell| shell.model)
            .collect();
        self.bake_animation(&models, start_frame, end_frame, step)?;

        if export_range.move_to_origin {
            self.move_to_origin()?;
        }

        self.save_as(path.as_ref(), version, format)
    }
}
