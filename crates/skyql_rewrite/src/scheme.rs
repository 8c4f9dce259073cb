use serde::{Deserialize, Serialize};
use skyql_error::{Result, SkyqlError};

use crate::columns::RelevantColumns;

/// How a catalog is split into chunks and subchunks.
///
/// Only the parts needed for rewriting queries are described here. Unknown
/// fields are rejected when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartitioningScheme {
    /// Longitude-like position column, e.g. `ra`.
    pub lon_column: String,
    /// Latitude-like position column, e.g. `decl`.
    pub lat_column: String,
    /// Additional columns whose extents are stored in the partition map.
    pub extra_columns: Vec<String>,
    /// Number of declination stripes, each stripe holds a row of chunks.
    pub num_stripes: u32,
    /// Number of sub-stripes per stripe, determines subchunk size.
    pub num_sub_stripes: u32,
    /// Overlap margin in degrees.
    pub overlap: f64,
    /// Partitioned table whose references are rewritten per subchunk.
    pub director_table: String,
}

impl Default for PartitioningScheme {
    fn default() -> Self {
        PartitioningScheme {
            lon_column: "ra".to_string(),
            lat_column: "decl".to_string(),
            extra_columns: Vec::new(),
            num_stripes: 85,
            num_sub_stripes: 12,
            overlap: 0.01667,
            director_table: "Object".to_string(),
        }
    }
}

impl PartitioningScheme {
    /// Deserialize and validate a scheme from json.
    pub fn from_json(s: &str) -> Result<Self> {
        let scheme: PartitioningScheme = serde_json::from_str(s)?;
        scheme.validate()?;
        Ok(scheme)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_stripes == 0 {
            return Err(SkyqlError::InvalidScheme(
                "num_stripes must be positive".to_string(),
            ));
        }
        if self.num_sub_stripes == 0 {
            return Err(SkyqlError::InvalidScheme(
                "num_sub_stripes must be positive".to_string(),
            ));
        }
        if !self.overlap.is_finite() || self.overlap < 0.0 {
            return Err(SkyqlError::InvalidScheme(format!(
                "overlap must be a non-negative number of degrees, got {}",
                self.overlap
            )));
        }

        let names = [
            ("lon_column", &self.lon_column),
            ("lat_column", &self.lat_column),
            ("director_table", &self.director_table),
        ];
        for (field, name) in names {
            if name.trim().is_empty() {
                return Err(SkyqlError::InvalidScheme(format!("{field} is empty")));
            }
        }
        if self.extra_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(SkyqlError::InvalidScheme(
                "extra_columns contains an empty name".to_string(),
            ));
        }

        if self.lon_column.eq_ignore_ascii_case(&self.lat_column) {
            return Err(SkyqlError::InvalidScheme(format!(
                "lon_column and lat_column are both '{}'",
                self.lon_column
            )));
        }

        Ok(())
    }

    /// Columns that partition pruning can use.
    pub fn relevant_columns(&self) -> RelevantColumns {
        [&self.lon_column, &self.lat_column]
            .into_iter()
            .chain(&self.extra_columns)
            .cloned()
            .collect()
    }
}
