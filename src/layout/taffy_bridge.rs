//! Taffy Bridge - Converts OTP styles to Taffy styles and reads results back.

use taffy::{
    AlignItems, AvailableSpace, Dimension as TaffyDimension, Display, FlexDirection,
    JustifyContent as TaffyJustifyContent, LengthPercentage, Layout, NodeId, Rect as TaffyRect,
    Size, Style, TaffyTree,
};

use crate::config::{CellStyle, ContainerStyle, OtpConfig};
use crate::error::Result;
use crate::types::{BorderStyle, JustifyContent, Rect};

/// Absolute rectangles for one OTP row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OtpLayout {
    pub container: Rect,
    /// One rectangle per slot, in slot order.
    pub cells: Vec<Rect>,
}

// =============================================================================
// STYLE CONVERSION
// =============================================================================

fn to_taffy_justify_content(justify: JustifyContent) -> TaffyJustifyContent {
    match justify {
        JustifyContent::FlexStart => TaffyJustifyContent::FlexStart,
        JustifyContent::Center => TaffyJustifyContent::Center,
        JustifyContent::FlexEnd => TaffyJustifyContent::FlexEnd,
        JustifyContent::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        JustifyContent::SpaceAround => TaffyJustifyContent::SpaceAround,
        JustifyContent::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    }
}

fn length(cells: u16) -> LengthPercentage {
    LengthPercentage::Length(cells as f32)
}

fn border_rect(border: BorderStyle) -> TaffyRect<LengthPercentage> {
    let (top, right, bottom, left) = border.insets();
    TaffyRect {
        top: length(top),
        right: length(right),
        bottom: length(bottom),
        left: length(left),
    }
}

fn screen_style(width: u16, height: u16, justify: TaffyJustifyContent) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: FlexDirection::Column,
        justify_content: Some(justify),
        align_items: Some(AlignItems::Center),
        size: Size {
            width: TaffyDimension::Length(width as f32),
            height: TaffyDimension::Length(height as f32),
        },
        ..Default::default()
    }
}

fn container_style(style: &ContainerStyle, justify: TaffyJustifyContent) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: FlexDirection::Row,
        justify_content: Some(justify),
        align_items: Some(AlignItems::Center),
        size: Size {
            width: TaffyDimension::Percent(1.0),
            height: TaffyDimension::Auto,
        },
        padding: TaffyRect {
            top: length(style.padding),
            right: length(style.padding),
            bottom: length(style.padding),
            left: length(style.padding),
        },
        border: border_rect(style.border),
        gap: Size {
            width: length(style.gap),
            height: length(0),
        },
        ..Default::default()
    }
}

fn cell_style(style: &CellStyle) -> Style {
    Style {
        size: Size {
            width: TaffyDimension::Length(style.width as f32),
            height: TaffyDimension::Length(style.height as f32),
        },
        flex_shrink: 0.0,
        ..Default::default()
    }
}

// =============================================================================
// COMPUTE
// =============================================================================

/// Outer width and height of the row: cells, gaps, padding and border.
fn row_extent(config: &OtpConfig) -> (u32, u32) {
    let cell = &config.input_style;
    let container = &config.container_style;
    let (top, right, bottom, left) = container.border.insets();
    let count = config.length as u32;

    let width = count * cell.width as u32
        + count.saturating_sub(1) * container.gap as u32
        + 2 * container.padding as u32
        + (left + right) as u32;
    let height = cell.height as u32 + 2 * container.padding as u32 + (top + bottom) as u32;
    (width, height)
}

fn to_cells(value: f32) -> u16 {
    value.round().clamp(0.0, u16::MAX as f32) as u16
}

fn absolute_rect(origin: (f32, f32), layout: &Layout) -> Rect {
    Rect::new(
        to_cells(origin.0 + layout.location.x),
        to_cells(origin.1 + layout.location.y),
        to_cells(layout.size.width),
        to_cells(layout.size.height),
    )
}

/// Lay out `config.length` cells centered in a terminal of the given size.
///
/// A row wider or taller than the terminal is pinned to the top-left edge
/// and overflows right and down. Centering it would push the leading cells
/// to negative offsets.
pub fn compute_otp_layout(config: &OtpConfig, terminal_width: u16, terminal_height: u16) -> Result<OtpLayout> {
    let mut tree: TaffyTree<()> = TaffyTree::new();

    let (row_width, row_height) = row_extent(config);
    let row_justify = if row_width > terminal_width as u32 {
        TaffyJustifyContent::FlexStart
    } else {
        to_taffy_justify_content(config.container_style.justify)
    };
    let screen_justify = if row_height > terminal_height as u32 {
        TaffyJustifyContent::FlexStart
    } else {
        TaffyJustifyContent::Center
    };

    let cell = cell_style(&config.input_style);
    let cells: Vec<NodeId> = (0..config.length)
        .map(|_| tree.new_leaf(cell.clone()))
        .collect::<std::result::Result<_, _>>()?;
    let container = tree.new_with_children(container_style(&config.container_style, row_justify), &cells)?;
    let screen = tree.new_with_children(
        screen_style(terminal_width, terminal_height, screen_justify),
        &[container],
    )?;

    tree.compute_layout(
        screen,
        Size {
            width: AvailableSpace::Definite(terminal_width as f32),
            height: AvailableSpace::Definite(terminal_height as f32),
        },
    )?;

    let container_layout = tree.layout(container)?;
    let origin = (container_layout.location.x, container_layout.location.y);

    let mut result = OtpLayout {
        container: absolute_rect((0.0, 0.0), container_layout),
        cells: Vec::with_capacity(cells.len()),
    };
    for node in cells {
        result.cells.push(absolute_rect(origin, tree.layout(node)?));
    }

    tracing::trace!(
        terminal_width,
        terminal_height,
        container = ?result.container,
        "otp layout computed"
    );
    Ok(result)
}

// =============================================================================
// TESTS
// =============================================================================
