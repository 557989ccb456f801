use crate::constants::*;

/// Startup configuration for a [`crate::scene::Scene`].
///
/// Built once from the constants and never changed after construction.
/// Tests shrink the counts to keep runs fast.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub seed: u64,
    pub tree_height: f32,
    pub tree_radius: f32,
    pub foliage_count: usize,
    pub ornament_count: usize,
    pub dust_count: usize,
    pub ribbon_turns: f32,
    pub ribbon_segments: usize,
    pub ribbon_width: f32,
    pub frame_count: usize,
    pub gift_probability: f32,
    pub light_probability: f32,
    pub bloom_threshold: f32,
    pub bloom_intensity: f32,
    /// Build the greeting character's point clouds. Off in small test configs.
    pub hat_points: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            tree_height: TREE_HEIGHT,
            tree_radius: TREE_RADIUS,
            foliage_count: FOLIAGE_COUNT,
            ornament_count: ORNAMENT_COUNT,
            dust_count: DUST_COUNT,
            ribbon_turns: RIBBON_TURNS,
            ribbon_segments: RIBBON_SEGMENTS,
            ribbon_width: RIBBON_WIDTH,
            frame_count: FRAME_COUNT,
            gift_probability: GIFT_PROBABILITY,
            light_probability: LIGHT_PROBABILITY,
            bloom_threshold: BLOOM_THRESHOLD,
            bloom_intensity: BLOOM_INTENSITY,
            hat_points: true,
        }
    }
}

impl SceneConfig {
    /// A reduced population for tests and quick previews.
    pub fn small(seed: u64) -> Self {
        Self {
            seed,
            foliage_count: 500,
            ornament_count: 60,
            dust_count: 400,
            hat_points: false,
            ..Self::default()
        }
    }

    /// Panics on parameters the layout and curve math cannot handle.
    pub fn assert_valid(&self) {
        assert!(
            self.tree_height > 0.0,
            "tree height must be positive, got {}",
            self.tree_height
        );
        assert!(
            self.tree_radius > RIBBON_MIN_RADIUS,
            "tree radius must exceed {}, got {}",
            RIBBON_MIN_RADIUS,
            self.tree_radius
        );
        assert!(self.ribbon_turns > 0.0, "ribbon needs at least part of a turn");
        assert!(self.ribbon_segments > 0, "ribbon needs at least one segment");
        assert!(self.ribbon_width > 0.0, "ribbon width must be positive");
        let weights = self.gift_probability + self.light_probability;
        assert!(
            self.gift_probability >= 0.0 && self.light_probability >= 0.0 && weights <= 1.0,
            "ornament class weights must be non-negative and sum to at most 1"
        );
    }
}
