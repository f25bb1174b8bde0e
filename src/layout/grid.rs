use crate::foundation::{
    core::FrameSize,
    error::{SpriteError, SpriteResult},
};

/// Destination of one frame inside the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct GridPlacement {
    /// Position of the frame in the input sequence.
    pub index: usize,
    pub column: u32,
    pub row: u32,
    /// Left edge of the cell on the canvas.
    pub dest_x: u32,
    /// Top edge of the cell on the canvas.
    pub dest_y: u32,
}

/// Sheet geometry derived from frame count, cell size and grid settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct GridPlan {
    pub columns: u32,
    /// Row count after auto-derivation.
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub sheet_width: u32,
    pub sheet_height: u32,
    /// Placements in input order; frames past `columns * rows` are absent.
    pub placements: Vec<GridPlacement>,
    /// Frames that did not fit the grid.
    pub dropped: usize,
}

impl GridPlan {
    pub fn capacity(&self) -> usize {
        (self.columns as usize).saturating_mul(self.rows as usize)
    }

    pub fn is_zero_area(&self) -> bool {
        self.sheet_width == 0 || self.sheet_height == 0
    }
}

/// Lay `frame_count` cells of size `cell` out on a grid.
///
/// `rows <= 0` derives the row count as `ceil(frame_count / columns)`. Negative
/// `padding`/`spacing` count as zero. A non-positive cell axis counts as zero too: cells
/// still get placed and the sheet keeps its padding and spacing on that axis.
pub fn plan_grid(
    frame_count: usize,
    columns: i32,
    rows: i32,
    cell: FrameSize,
    padding: i32,
    spacing: i32,
) -> SpriteResult<GridPlan> {
    if columns <= 0 {
        return Err(SpriteError::invalid_input(format!(
            "invalid layout: columns must be >= 1 (got {columns})"
        )));
    }
    let columns = columns as u32;
    let rows = if rows <= 0 {
        u32::try_from(frame_count.div_ceil(columns as usize))
            .map_err(|_| SpriteError::invalid_input("invalid layout: too many rows"))?
    } else {
        rows as u32
    };

    let padding = i64::from(padding.max(0));
    let spacing = i64::from(spacing.max(0));
    let cell_w = i64::from(cell.width.max(0));
    let cell_h = i64::from(cell.height.max(0));

    let sheet_width = axis_extent(columns, cell_w, padding, spacing)?;
    let sheet_height = axis_extent(rows, cell_h, padding, spacing)?;

    let capacity = (columns as usize).saturating_mul(rows as usize);
    let placed = frame_count.min(capacity);
    let placements = (0..placed)
        .map(|index| {
            let column = (index % columns as usize) as u32;
            let row = (index / columns as usize) as u32;
            // In range: both offsets are bounded by the already-checked sheet extents.
            let dest_x = padding + i64::from(column) * (cell_w + spacing);
            let dest_y = padding + i64::from(row) * (cell_h + spacing);
            GridPlacement {
                index,
                column,
                row,
                dest_x: dest_x as u32,
                dest_y: dest_y as u32,
            }
        })
        .collect();

    Ok(GridPlan {
        columns,
        rows,
        cell_width: cell_w as u32,
        cell_height: cell_h as u32,
        sheet_width,
        sheet_height,
        placements,
        dropped: frame_count - placed,
    })
}

fn axis_extent(cells: u32, cell: i64, padding: i64, spacing: i64) -> SpriteResult<u32> {
    let cells = i64::from(cells);
    let gaps = (cells - 1).max(0);
    let extent = 2 * padding + cells * cell + gaps * spacing;
    u32::try_from(extent.max(0)).map_err(|_| {
        SpriteError::invalid_input(format!(
            "invalid layout: sheet extent {extent} px overflows"
        ))
    })
}

/// Near-square grid for `frame_count` frames, as chosen when a folder is first loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutSuggestion {
    pub columns: i32,
    pub rows: i32,
}

/// `columns = ceil(sqrt(n))`, `rows = ceil(n / columns)`; `None` for an empty set.
pub fn suggest_layout(frame_count: usize) -> Option<LayoutSuggestion> {
    if frame_count == 0 {
        return None;
    }
    let mut columns = frame_count.isqrt();
    if columns * columns < frame_count {
        columns += 1;
    }
    let rows = frame_count.div_ceil(columns);
    Some(LayoutSuggestion {
        columns: i32::try_from(columns).ok()?,
        rows: i32::try_from(rows).ok()?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
