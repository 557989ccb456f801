pub mod camera_rig;
pub mod config;
pub mod constants;
pub mod curve;
pub mod dust;
pub mod error;
pub mod export;
pub mod foliage;
pub mod frames;
pub mod gesture;
pub mod greeting;
pub mod input;
pub mod layout;
pub mod media;
pub mod mesh;
pub mod orbit;
pub mod ornaments;
pub mod ribbon;
pub mod scene;
pub mod star;
pub mod state;

pub static FOLIAGE_WGSL: &str = include_str!("../shaders/foliage.wgsl");
pub static SPRITES_WGSL: &str = include_str!("../shaders/sprites.wgsl");
pub static MESH_WGSL: &str = include_str!("../shaders/mesh.wgsl");
pub static RIBBON_WGSL: &str = include_str!("../shaders/ribbon.wgsl");
pub static PHOTO_WGSL: &str = include_str!("../shaders/photo.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

pub use config::SceneConfig;
pub use error::{CollaboratorError, Severity};
pub use scene::{Scene, SceneEvent, SceneEvents};
pub use state::*;
