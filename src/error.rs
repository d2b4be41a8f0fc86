use thiserror::Error;

/// Defects in the mesh or adjacency graph handed to the tectonic engine.
/// These point at a broken mesh provider, not at a recoverable runtime state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralDefect {
    #[error("face {neighbor} is listed as a neighbor of {face} but does not list {face} back")]
    AsymmetricAdjacency { face: u32, neighbor: u32 },

    #[error("face {face} lists out-of-range neighbor {neighbor}")]
    NeighborOutOfRange { face: u32, neighbor: u32 },

    #[error("face {face} lists itself as a neighbor")]
    SelfNeighbor { face: u32 },

    #[error("face {face} has no neighbors")]
    IsolatedFace { face: u32 },

    #[error("{count} faces left without a craton after growth (first: {example})")]
    UnassignedFaces { count: usize, example: u32 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Structural defect: {0}")]
    StructuralDefect(#[from] StructuralDefect),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defects_convert_and_display() {
        let err: Error = StructuralDefect::UnassignedFaces { count: 3, example: 4 }.into();
        assert!(matches!(
            err,
            Error::StructuralDefect(StructuralDefect::UnassignedFaces { count: 3, example: 4 })
        ));
        assert_eq!(
            err.to_string(),
            "Structural defect: 3 faces left without a craton after growth (first: 4)"
        );
        assert_eq!(
            StructuralDefect::AsymmetricAdjacency { face: 1, neighbor: 2 }.to_string(),
            "face 2 is listed as a neighbor of 1 but does not list 1 back"
        );
    }
}
