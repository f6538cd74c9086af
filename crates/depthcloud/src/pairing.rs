use std::collections::BTreeMap;

/// Error types for frame pairing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairingError {
    /// No color frame has a matching depth map.
    #[error("No matching frame/depth pairs found ({} color frames without depth)", missing.len())]
    NoPairsFound {
        /// Every color frame identifier, in ascending order.
        missing: Vec<String>,
    },
}

/// A color frame and the depth map sharing its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePair<C, D> {
    /// The shared identifier, usually the file stem.
    pub id: String,
    /// The color frame.
    pub color: C,
    /// The depth map.
    pub depth: D,
}

/// The result of matching color frames with depth maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePairs<C, D> {
    /// Matched pairs in ascending identifier order.
    pub pairs: Vec<FramePair<C, D>>,
    /// Identifiers of color frames without a depth map, ascending.
    pub missing: Vec<String>,
}

/// Match color frames to depth maps by identifier.
///
/// Color frames drive the match: every color identifier ends up in exactly one of
/// `pairs` or `missing`. Depth maps without a color frame are ignored. Identifiers
/// are compared exactly, case included.
///
/// # Arguments
///
/// * `colors` - Color frames keyed by identifier.
/// * `depths` - Depth maps keyed by identifier.
///
/// # Errors
///
/// [`PairingError::NoPairsFound`] if no color frame has a depth map. A partial match
/// is not an error.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use depthcloud::pairing::pair_frames;
///
/// let colors = BTreeMap::from([("a".to_string(), "a.jpg"), ("b".to_string(), "b.jpg")]);
/// let depths = BTreeMap::from([("a".to_string(), "a.npy")]);
///
/// let matched = pair_frames(colors, depths).unwrap();
/// assert_eq!(matched.pairs.len(), 1);
/// assert_eq!(matched.pairs[0].depth, "a.npy");
/// assert_eq!(matched.missing, vec!["b".to_string()]);
/// ```
pub fn pair_frames<C, D>(
    colors: BTreeMap<String, C>,
    mut depths: BTreeMap<String, D>,
) -> Result<FramePairs<C, D>, PairingError> {
    let mut pairs = Vec::new();
    let mut missing = Vec::new();

    // BTreeMap iterates in ascending key order
    for (id, color) in colors {
        match depths.remove(&id) {
            Some(depth) => pairs.push(FramePair { id, color, depth }),
            None => missing.push(id),
        }
    }

    if pairs.is_empty() {
        return Err(PairingError::NoPairsFound { missing });
    }

    Ok(FramePairs { pairs, missing })
}
