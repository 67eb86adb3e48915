//! Configuration types for fibermap generation.
//!
//! All types implement [`serde::Deserialize`] and fall back to defaults for
//! missing fields, so a configuration file only needs to list what it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Row geometry of the topology overview.
//! - [`TableConfig`] - Placement of the per-origin wiring tables.
//! - [`StyleConfig`] - Cell sizes and colours used by the SVG export.
//!
//! # Example
//!
//! ```
//! # use fibermap::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().group_rows(), 8);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

use crate::error::FibermapError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    table: TableConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    pub fn new(layout: LayoutConfig, table: TableConfig, style: StyleConfig) -> Self {
        Self {
            layout,
            table,
            style,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn table(&self) -> &TableConfig {
        &self.table
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Checks that the geometry leaves room for every block.
    ///
    /// # Errors
    ///
    /// Returns [`FibermapError::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), FibermapError> {
        self.layout.validate()?;
        self.table.validate()
    }
}

/// Row geometry of the topology overview.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Rows occupied by one box or cable block, including its spacer rows.
    #[serde(default = "LayoutConfig::default_group_rows")]
    group_rows: u32,

    /// Row the first origin is drawn on.
    #[serde(default = "LayoutConfig::default_first_row")]
    first_row: u32,
}

impl LayoutConfig {
    /// Rows carrying text in every block.
    pub const BLOCK_ROWS: u32 = 4;

    pub fn new(group_rows: u32, first_row: u32) -> Self {
        Self {
            group_rows,
            first_row,
        }
    }

    pub fn group_rows(&self) -> u32 {
        self.group_rows
    }

    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    fn default_group_rows() -> u32 {
        8
    }

    fn default_first_row() -> u32 {
        2
    }

    fn validate(&self) -> Result<(), FibermapError> {
        if self.group_rows <= Self::BLOCK_ROWS {
            return Err(FibermapError::Config(format!(
                "layout.group_rows must exceed {}, got {}",
                Self::BLOCK_ROWS,
                self.group_rows
            )));
        }
        if self.first_row == 0 {
            return Err(FibermapError::Config(
                "layout.first_row is 1-based and must not be 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::new(Self::default_group_rows(), Self::default_first_row())
    }
}

/// Placement of the per-origin wiring tables.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Row holding local fibre 0 of offset 0.
    #[serde(default = "TableConfig::default_first_data_row")]
    first_data_row: u32,

    /// Ports per ODF before numbering moves to the next one.
    #[serde(default = "TableConfig::default_odf_max_port")]
    odf_max_port: u32,

    /// Columns per distribution tier group.
    #[serde(default = "TableConfig::default_group_width")]
    group_width: u32,
}

impl TableConfig {
    /// Header rows above the data: navigation link plus two title rows.
    pub const HEADER_ROWS: u32 = 3;

    /// Columns a tier group needs: box code/type/no., splice state, spacer
    /// and the five fibre columns.
    pub const MIN_GROUP_WIDTH: u32 = 10;

    pub fn new(first_data_row: u32, odf_max_port: u32, group_width: u32) -> Self {
        Self {
            first_data_row,
            odf_max_port,
            group_width,
        }
    }

    pub fn first_data_row(&self) -> u32 {
        self.first_data_row
    }

    pub fn odf_max_port(&self) -> u32 {
        self.odf_max_port
    }

    pub fn group_width(&self) -> u32 {
        self.group_width
    }

    fn default_first_data_row() -> u32 {
        4
    }

    fn default_odf_max_port() -> u32 {
        144
    }

    fn default_group_width() -> u32 {
        10
    }

    fn validate(&self) -> Result<(), FibermapError> {
        if self.first_data_row <= Self::HEADER_ROWS {
            return Err(FibermapError::Config(format!(
                "table.first_data_row must be below the header rows (> {}), got {}",
                Self::HEADER_ROWS,
                self.first_data_row
            )));
        }
        if self.odf_max_port == 0 {
            return Err(FibermapError::Config(
                "table.odf_max_port must be positive".to_string(),
            ));
        }
        if self.group_width < Self::MIN_GROUP_WIDTH {
            return Err(FibermapError::Config(format!(
                "table.group_width must be at least {}, got {}",
                Self::MIN_GROUP_WIDTH,
                self.group_width
            )));
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new(
            Self::default_first_data_row(),
            Self::default_odf_max_port(),
            Self::default_group_width(),
        )
    }
}

/// Cell sizes and colours used by the SVG export.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    /// Widths of the overview columns, from column 1. Missing columns use
    /// `default_column_width`.
    #[serde(default = "StyleConfig::default_topology_columns")]
    topology_columns: Vec<f32>,

    /// Widths of one wiring table group, repeated for every group.
    #[serde(default = "StyleConfig::default_table_columns")]
    table_columns: Vec<f32>,

    #[serde(default = "StyleConfig::fallback_column_width")]
    default_column_width: f32,

    #[serde(default = "StyleConfig::default_row_height")]
    row_height: f32,

    #[serde(default = "StyleConfig::default_font_size")]
    font_size: f32,

    /// Sheet background as an SVG colour string.
    #[serde(default)]
    background_color: Option<String>,
}

impl StyleConfig {
    pub fn topology_columns(&self) -> &[f32] {
        &self.topology_columns
    }

    pub fn table_columns(&self) -> &[f32] {
        &self.table_columns
    }

    pub fn default_column_width(&self) -> f32 {
        self.default_column_width
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    fn default_topology_columns() -> Vec<f32> {
        vec![72.0, 288.0, 192.0, 288.0, 192.0, 288.0, 192.0]
    }

    fn default_table_columns() -> Vec<f32> {
        vec![
            120.0, 60.0, 60.0, 48.0, 24.0, 48.0, 48.0, 36.0, 36.0, 36.0,
        ]
    }

    fn fallback_column_width() -> f32 {
        64.0
    }

    fn default_row_height() -> f32 {
        20.0
    }

    fn default_font_size() -> f32 {
        11.0
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            topology_columns: Self::default_topology_columns(),
            table_columns: Self::default_table_columns(),
            default_column_width: Self::fallback_column_width(),
            row_height: Self::default_row_height(),
            font_size: Self::default_font_size(),
            background_color: None,
        }
    }
}
