use std::path::PathBuf;

use thiserror::Error;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cannot read ground truth at {path}: {msg}")]
    GroundTruth { path: PathBuf, msg: String },
    #[error("density map at {path} is {height}x{width}, too small to downsample by {factor}")]
    TooSmall {
        path: PathBuf,
        height: usize,
        width: usize,
        factor: usize,
    },
    #[error("ground truth {path} is {gt_height}x{gt_width} but its image is {height}x{width}")]
    ShapeMismatch {
        path: PathBuf,
        gt_height: usize,
        gt_width: usize,
        height: usize,
        width: usize,
    },
    #[error("{path} is not inside an `images` directory")]
    NotInImagesDir { path: PathBuf },
}
