use glam::Vec3;

// Shared tuning constants for the tree scene. Everything here is fixed at
// startup; `SceneConfig::default()` is built from these values.

// Tree shape and populations
pub const TREE_HEIGHT: f32 = 15.0;
pub const TREE_RADIUS: f32 = 6.0;
pub const FOLIAGE_COUNT: usize = 12_000;
pub const ORNAMENT_COUNT: usize = 220; // requested; culling keeps fewer
pub const DUST_COUNT: usize = 2_000;
pub const DEFAULT_SEED: u64 = 42;

// Post-processing
pub const BLOOM_THRESHOLD: f32 = 0.8;
pub const BLOOM_INTENSITY: f32 = 1.5;

// Palette (linear-ish sRGB triples)
pub const EMERALD_DEEP: [f32; 3] = [0.0, 0.259, 0.145]; // #004225
pub const EMERALD_LIGHT: [f32; 3] = [0.102, 0.420, 0.267]; // #1a6b44
pub const GOLD_HIGH: [f32; 3] = [1.0, 0.843, 0.0]; // #FFD700
pub const GOLD_DARK: [f32; 3] = [0.855, 0.647, 0.125]; // #DAA520
pub const RED_VELVET: [f32; 3] = [1.0, 0.059, 0.231]; // #ff0f3b
pub const SILVER: [f32; 3] = [0.910, 0.910, 0.910]; // #E8E8E8
pub const SNOW_WHITE: [f32; 3] = [1.0, 1.0, 1.0];
pub const HAT_RED: [f32; 3] = [0.769, 0.118, 0.227]; // #c41e3a
pub const HAT_WHITE: [f32; 3] = [0.973, 0.976, 0.980]; // #f8f9fa

// Chaos (scattered) volumes
pub const FOLIAGE_CHAOS_RADIUS: f32 = 40.0;
pub const ORNAMENT_CHAOS_RADIUS: f32 = 35.0;

// Foliage morph
pub const FOLIAGE_PROGRESS_RATE: f32 = 0.8; // lerp factor per second
pub const FOLIAGE_SWAY_THRESHOLD: f32 = 0.8; // eased progress above which wind applies
pub const FOLIAGE_SWAY_AMPLITUDE: f32 = 0.2;
pub const FOLIAGE_BASE_POINT_SIZE: f32 = 250.0;

// Ornament classes
pub const GIFT_PROBABILITY: f32 = 0.4;
pub const LIGHT_PROBABILITY: f32 = 0.2;
pub const GIFT_SPEED: f32 = 0.8;
pub const BALL_SPEED: f32 = 2.0;
pub const LIGHT_SPEED: f32 = 3.5;
pub const GIFT_SCALE: f32 = 0.6;
pub const BALL_SCALE: f32 = 0.45;
pub const LIGHT_SCALE: f32 = 0.15;
pub const GIFT_SCALE_VARIANCE: f32 = 0.045;
pub const CULL_BASE: f32 = 0.1;
pub const CULL_HEIGHT_GAIN: f32 = 0.4;
pub const SILVER_CHANCE_LOW: f32 = 0.22;
pub const SILVER_CHANCE_HIGH: f32 = 0.05;
pub const SILVER_HEIGHT_SPLIT: f32 = 0.7;
pub const SCATTER_RATE_FACTOR: f32 = 0.5; // speed multiplier while scattering
pub const GIFT_SPIN_RATE: [f32; 2] = [0.5, 0.3]; // rad/s about x, y
pub const LIGHT_PULSE_FREQ: f32 = 5.0;
pub const LIGHT_PULSE_AMPLITUDE: f32 = 0.3;

// Ambient dust
pub const DUST_HALF_EXTENTS: Vec3 = Vec3::new(25.0, 20.0, 20.0);
pub const DUST_GOLD_FRACTION: f32 = 0.2;
pub const DUST_GOLD_LIFT: f32 = 0.0001;
pub const DUST_GOLD_SWAY: f32 = 0.0003;
pub const DUST_WHITE_GRAVITY: f32 = 0.00034;
pub const DUST_WHITE_SWAY: f32 = 0.0002;
pub const DUST_DRAG: f32 = 0.96;
pub const DUST_MAX_SPEED: f32 = 0.15;
pub const DUST_GATHER_RADIUS: f32 = 14.4;
pub const DUST_HOVER_RADIUS: f32 = 1.5;
pub const DUST_GATHER_STRENGTH: f32 = 0.015;
pub const DUST_HOVER_DAMPING: f32 = 0.95;
pub const DUST_JITTER: f32 = 0.004; // full width of the per-axis jitter
pub const DUST_INTERACTION_CAP: usize = 224;
pub const DUST_REFERENCE_HZ: f32 = 60.0;
pub const DUST_MAX_STEP_SCALE: f32 = 3.0;
pub const DUST_PLANE_MAX_DISTANCE: f32 = 100.0;
pub const DUST_SIZE_PULSE: f32 = 0.3;

// Ribbon and frames
pub const RIBBON_RADIUS_PAD: f32 = 0.2;
pub const RIBBON_TURNS: f32 = 4.0;
pub const RIBBON_MIN_RADIUS: f32 = 0.5;
pub const RIBBON_SEGMENTS: usize = 300;
pub const RIBBON_WIDTH: f32 = 0.7;
pub const REVEAL_RATE: f32 = 0.5;
pub const HIDE_RATE: f32 = 2.75;
pub const FRAME_COUNT: usize = 10;
pub const FRAME_T_START: f32 = 0.02;
pub const FRAME_T_SPAN: f32 = 0.95;
pub const FRAME_SURFACE_OFFSET: f32 = 0.55;
pub const FRAME_CHAOS_EXTENT: f32 = 20.0;
pub const FRAME_CHAOS_SPIN: f32 = 0.2; // full width of the per-axis rotation rate
pub const FRAME_BOB_AMPLITUDE: f32 = 0.5;
pub const FRAME_FLOAT_RATE: f32 = 0.5;
pub const FRAME_ATTACH_RATE: f32 = 2.0;
pub const FRAME_HOVER_SCALE: f32 = 1.15;
pub const FRAME_HOVER_RATE: f32 = 10.0;
pub const FRAME_PICK_RADIUS: f32 = 0.8;
pub const FRAME_BORDER_SIZE: [f32; 3] = [1.4, 1.4, 0.1];
pub const FRAME_BACKING_SIZE: [f32; 3] = [1.35, 1.35, 0.05];
pub const FRAME_PHOTO_SIZE: f32 = 1.2;
pub const MEDIA_SLOT_SCAN: usize = 50;

// Orbit / input
pub const DRAG_YAW_GAIN: f32 = 0.0008;
pub const PITCH_GAIN: f32 = 0.01815;
pub const POLAR_EPSILON: f32 = 0.01;
pub const YAW_DAMPING: f32 = 0.92;
pub const YAW_EPSILON: f32 = 0.0001;
pub const AUTO_ROTATE_RATE: f32 = -0.5;
pub const ZOOM_GAIN: f32 = 0.02;
pub const MIN_ZOOM: f32 = 14.0;
pub const MAX_ZOOM: f32 = 36.0;
pub const INITIAL_DISTANCE: f32 = 24.0;
pub const INITIAL_POLAR: f32 = std::f32::consts::PI / 2.2;

// Camera rig
pub const CAMERA_FOV_DEGREES: f32 = 45.0;
pub const CAMERA_CENTER_HEIGHT: f32 = 5.0;
pub const CAMERA_SMOOTHING: f32 = 3.0;
pub const CAMERA_INITIAL_POSITION: Vec3 = Vec3::new(0.0, 10.0, 24.0);
pub const TREE_GROUP_OFFSET: Vec3 = Vec3::new(0.0, 4.5, 0.0);

// Gesture interpretation
pub const GESTURE_MOVE_THRESHOLD: f32 = 0.005;
pub const GESTURE_SPIN_GAIN: f32 = 0.15;
pub const GESTURE_PITCH_GAIN: f32 = 150.0;
pub const GESTURE_FOLD_RATIO: f32 = 1.1;
pub const GESTURE_OPEN_EXPANSION: f32 = 1.2;
pub const GESTURE_ASSEMBLE_FRAMES: u32 = 3;

// Greeting character
pub const HAT_ANCHOR: Vec3 = Vec3::new(2.5, 6.0, 6.0);
pub const HAT_FOCUSED_SCALE: f32 = 2.5;
pub const HAT_COLLIDER_RADIUS: f32 = 2.8;
pub const HAT_COLLIDER_OFFSET: Vec3 = Vec3::new(0.0, 1.2, 0.0);
pub const HAT_TILT: f32 = -0.2;
pub const HAT_SPEAK_PULSE: f32 = 0.05;
pub const HAT_SPEAK_FREQ: f32 = 10.0;
pub const HAT_CONE_COUNT: usize = 12_000;
pub const HAT_BRIM_COUNT: usize = 9_000;
pub const HAT_POMPOM_COUNT: usize = 3_500;

// Top star
pub const STAR_POINTS: usize = 5;
pub const STAR_OUTER_RADIUS: f32 = 1.2;
pub const STAR_INNER_RADIUS: f32 = 0.5;
pub const STAR_DEPTH: f32 = 0.4;

// Wallpaper export
pub const EXPORT_DISTANCE: f32 = 32.0;
pub const EXPORT_SETTLE_SECS: f32 = 1.0;
pub const EXPORT_RECORD_SECS: f32 = 13.0;
pub const EXPORT_BITRATE: u32 = 12_000_000;
pub const EXPORT_FPS: u32 = 60;

// Pointer
pub const DOUBLE_CLICK_SECS: f32 = 0.3;
/// Pointer travel in pixels still treated as the same spot.
pub const CLICK_SLOP_PX: f32 = 5.0;

#[inline]
pub fn palette(rgb: [f32; 3]) -> Vec3 {
    Vec3::from(rgb)
}
