use paste::paste;

/// Topology class of a computational grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshType {
    Structured,
    Unstruc2d,
    UnstrucLayered,
    Unstruc3d,
}

/// Describes a computational grid's topology and its coordinate-variable
/// bindings. Dimensions and coordinate variables are referenced by name;
/// the collection resolves them on demand.
///
/// Spatial dimension names are ordered fastest-varying to slowest-varying.
/// Coordinate variable names are ordered by geometric axis (X, Y, Z as
/// available); the count of bound coordinate variables is the mesh's
/// topological dimension, which may be less than its geometric dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    name: String,
    dim_names: Vec<String>,
    coord_vars: Vec<String>,
    mesh_type: MeshType,
    node_dim: String,
    face_dim: String,
    layers_dim: Option<String>,
    max_nodes_per_face: usize,
    max_faces_per_node: usize,
    face_node_var: Option<String>,
    node_face_var: Option<String>,
    face_edge_var: Option<String>,
    face_face_var: Option<String>,
    edge_node_var: Option<String>,
    edge_face_var: Option<String>,
}

macro_rules! connectivity_var {
    ($field:ident) => {
        paste! {
            /// No-op on structured meshes, which carry no connectivity.
            pub fn [<set_ $field>]<S: Into<String>>(&mut self, name: S) {
                if self.mesh_type != MeshType::Structured {
                    self.$field = Some(name.into());
                }
            }

            pub fn $field(&self) -> Option<&str> {
                self.$field.as_deref()
            }
        }
    };
}

impl Mesh {
    /// A structured mesh over the given spatial dimensions.
    pub fn structured<S: Into<String>>(
        name: S,
        dim_names: Vec<String>,
        coord_vars: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dim_names,
            coord_vars,
            mesh_type: MeshType::Structured,
            node_dim: String::new(),
            face_dim: String::new(),
            layers_dim: None,
            max_nodes_per_face: 0,
            max_faces_per_node: 0,
            face_node_var: None,
            node_face_var: None,
            face_edge_var: None,
            face_face_var: None,
            edge_node_var: None,
            edge_face_var: None,
        }
    }

    /// An unstructured mesh with a single layer of cells.
    pub fn unstructured_2d<S: Into<String>>(
        name: S,
        node_dim: String,
        face_dim: String,
        max_nodes_per_face: usize,
        max_faces_per_node: usize,
        coord_vars: Vec<String>,
    ) -> Self {
        Self {
            node_dim,
            face_dim,
            max_nodes_per_face,
            max_faces_per_node,
            coord_vars,
            mesh_type: MeshType::Unstruc2d,
            ..Self::structured(name, vec![], vec![])
        }
    }

    /// An unstructured mesh extruded through a layers dimension.
    pub fn unstructured_layered<S: Into<String>>(
        name: S,
        node_dim: String,
        face_dim: String,
        layers_dim: String,
        max_nodes_per_face: usize,
        max_faces_per_node: usize,
        coord_vars: Vec<String>,
    ) -> Self {
        Self {
            layers_dim: Some(layers_dim),
            mesh_type: MeshType::UnstrucLayered,
            ..Self::unstructured_2d(
                name,
                node_dim,
                face_dim,
                max_nodes_per_face,
                max_faces_per_node,
                coord_vars,
            )
        }
    }

    /// A fully unstructured 3D mesh.
    pub fn unstructured_3d<S: Into<String>>(
        name: S,
        node_dim: String,
        face_dim: String,
        max_nodes_per_face: usize,
        max_faces_per_node: usize,
        coord_vars: Vec<String>,
    ) -> Self {
        Self {
            mesh_type: MeshType::Unstruc3d,
            ..Self::unstructured_2d(
                name,
                node_dim,
                face_dim,
                max_nodes_per_face,
                max_faces_per_node,
                coord_vars,
            )
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh_type(&self) -> MeshType {
        self.mesh_type
    }

    /// Spatial dimension names, fastest-varying first. Empty for
    /// unstructured meshes, whose extents come from the node/face/layers
    /// dimensions instead.
    pub fn dim_names(&self) -> &[String] {
        &self.dim_names
    }

    pub fn coord_vars(&self) -> &[String] {
        &self.coord_vars
    }

    /// The number of bound coordinate axes. Distinct from, and never more
    /// than, the geometric dimension.
    pub fn topology_dim(&self) -> usize {
        self.coord_vars.len()
    }

    pub fn node_dim(&self) -> &str {
        &self.node_dim
    }

    pub fn face_dim(&self) -> &str {
        &self.face_dim
    }

    pub fn layers_dim(&self) -> Option<&str> {
        self.layers_dim.as_deref()
    }

    pub fn max_nodes_per_face(&self) -> usize {
        self.max_nodes_per_face
    }

    pub fn max_faces_per_node(&self) -> usize {
        self.max_faces_per_node
    }

    connectivity_var!(face_node_var);
    connectivity_var!(node_face_var);
    connectivity_var!(face_edge_var);
    connectivity_var!(face_face_var);
    connectivity_var!(edge_node_var);
    connectivity_var!(edge_face_var);
}
