use std::fs;
use std::path::PathBuf;

use clap::Args;
use skyql_error::Result;
use skyql_rewrite::scheme::PartitioningScheme;

#[derive(Debug, Clone, Args)]
pub struct SchemeArgs {
    /// JSON file describing the partitioning scheme.
    ///
    /// Fields not present in the file take their default values. Without a
    /// file, tables are partitioned on `ra` and `decl` with `Object` as the
    /// director table.
    #[clap(long, env = "SKYQL_SCHEME")]
    pub scheme: Option<PathBuf>,
}

impl SchemeArgs {
    pub fn load(&self) -> Result<PartitioningScheme> {
        match &self.scheme {
            Some(path) => PartitioningScheme::from_json(&fs::read_to_string(path)?),
            None => Ok(PartitioningScheme::default()),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct PartmapArgs {
    #[clap(flatten)]
    pub scheme: SchemeArgs,
    /// Query to compute the partition map query for.
    pub sql: String,
}

#[derive(Debug, Clone, Args)]
pub struct ChunkArgs {
    /// Chunk to generate queries for.
    #[clap(long)]
    pub chunk: i64,
    /// Comma separated subchunks of the chunk.
    #[clap(long, value_delimiter = ',', num_args = 1..)]
    pub subchunks: Vec<i64>,
    /// Logical table to rewrite.
    #[clap(long, default_value = "Object")]
    pub table: String,
    pub sql: String,
}

#[derive(Debug, Clone, Args)]
pub struct FanoutArgs {
    #[clap(flatten)]
    pub scheme: SchemeArgs,
    /// File containing `chunk,subchunk` lines. Read from stdin if omitted.
    #[clap(long)]
    pub rows: Option<PathBuf>,
    pub sql: String,
}
