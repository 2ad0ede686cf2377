use crate::LayoutConfig;
use flowgrid_core::Position;
use std::collections::BTreeMap;

/// Turn a level partition into canvas coordinates.
///
/// The level index drives x. Within a level, nodes are spaced
/// `node_spacing` apart and centred on `center_y`; if centring would put the
/// first node above `min_y`, the whole column is shifted down to start there.
pub fn assign_positions(
    levels: &[Vec<String>],
    config: &LayoutConfig,
) -> BTreeMap<String, Position> {
    let mut positions = BTreeMap::new();
    for (level, ids) in levels.iter().enumerate() {
        let x = config.base_x + level as f64 * config.level_spacing;
        let total_height = ids.len().saturating_sub(1) as f64 * config.node_spacing;
        let first_y = (config.center_y - total_height / 2.0).max(config.min_y);
        for (i, id) in ids.iter().enumerate() {
            let y = first_y + i as f64 * config.node_spacing;
            positions.insert(id.clone(), Position::new(x, y));
        }
    }
    positions
}

/// Lay out nodes left to right on the centre line, in the given order.
pub fn row_positions<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    config: &LayoutConfig,
) -> BTreeMap<String, Position> {
    let y = config.center_y.max(config.min_y);
    ids.into_iter()
        .enumerate()
        .map(|(i, id)| {
            let x = config.base_x + i as f64 * config.level_spacing;
            (id.to_string(), Position::new(x, y))
        })
        .collect()
}
