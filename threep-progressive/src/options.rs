//! Encoder configuration

/// Largest combined ring size (`|ring(a)| + |ring(b)|`) of a collapsible edge
pub const DEFAULT_MAX_COMBINED_RING: usize = 15;

/// Limits applied while simplifying a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Edges whose endpoint rings together exceed this size are never collapsed
    pub max_combined_ring: usize,
    /// Stop after this many collapses
    pub max_collapses: Option<usize>,
    /// Stop once the live vertex count drops to this value
    pub min_vertices: Option<usize>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            max_combined_ring: DEFAULT_MAX_COMBINED_RING,
            max_collapses: None,
            min_vertices: None,
        }
    }
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_combined_ring(mut self, max_combined_ring: usize) -> Self {
        self.max_combined_ring = max_combined_ring;
        self
    }

    pub fn with_max_collapses(mut self, max_collapses: usize) -> Self {
        self.max_collapses = Some(max_collapses);
        self
    }

    pub fn with_min_vertices(mut self, min_vertices: usize) -> Self {
        self.min_vertices = Some(min_vertices);
        self
    }

    /// True once `collapses` collapses have left `live_vertices` vertices
    pub fn is_exhausted(&self, collapses: usize, live_vertices: usize) -> bool {
        self.max_collapses.is_some_and(|max| collapses >= max)
            || self.min_vertices.is_some_and(|min| live_vertices <= min)
    }
}
