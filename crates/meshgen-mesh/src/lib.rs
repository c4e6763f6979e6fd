//! Regular-grid terrain meshing: the vertex layout shared with hosts, buffer
//! sizing, and extraction of positions, normals, tangents, uvs and indices from
//! a height field.

mod descriptor;
mod error;
mod extract;
mod vertex;

pub use descriptor::GeometryDescriptor;
pub use error::MeshError;
pub use extract::{GridMesh, extract_grid_mesh, vertex_index};
pub use vertex::TerrainVertex;
