use std::fs::File;
use std::io::{BufRead, Write};

use clap::Subcommand;
use skyql_error::Result;
use skyql_rewrite::chunk_query::ChunkQueryGenerator;
use skyql_rewrite::rewriter::QueryRewriter;
use tracing::info;

use crate::args::{ChunkArgs, FanoutArgs, PartmapArgs};
use crate::rows::read_rows;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the partition map query for a query.
    Partmap(PartmapArgs),
    /// Print the rewritten queries for one chunk.
    Chunk(ChunkArgs),
    /// Read partition map rows and print the rewritten queries for every
    /// chunk.
    Fanout(FanoutArgs),
}

impl Commands {
    /// Run the command, reading any rows from `stdin` and writing results to
    /// `out`.
    pub fn run(self, stdin: impl BufRead, out: &mut impl Write) -> Result<()> {
        match self {
            Commands::Partmap(args) => args.run(stdin, out),
            Commands::Chunk(args) => args.run(stdin, out),
            Commands::Fanout(args) => args.run(stdin, out),
        }
    }
}

trait RunCommand {
    fn run(self, stdin: impl BufRead, out: &mut impl Write) -> Result<()>;
}

impl RunCommand for PartmapArgs {
    fn run(self, _stdin: impl BufRead, out: &mut impl Write) -> Result<()> {
        let scheme = self.scheme.load()?;
        let rewriter = QueryRewriter::try_new(self.sql, &scheme)?;
        writeln!(out, "{}", rewriter.partition_map_query()?)?;
        Ok(())
    }
}

impl RunCommand for ChunkArgs {
    fn run(self, _stdin: impl BufRead, out: &mut impl Write) -> Result<()> {
        let generator = ChunkQueryGenerator::try_new(&self.sql, [self.table])?;
        writeln!(out, "{}", generator.generate(self.chunk, &self.subchunks))?;
        Ok(())
    }
}

impl RunCommand for FanoutArgs {
    fn run(self, stdin: impl BufRead, out: &mut impl Write) -> Result<()> {
        let scheme = self.scheme.load()?;
        let rewriter = QueryRewriter::try_new(self.sql, &scheme)?;

        let rows = match &self.rows {
            Some(path) => read_rows(File::open(path)?)?,
            None => read_rows(stdin)?,
        };
        let mapping = rewriter.collect(rows);
        info!(chunks = mapping.len(), "collected partition map rows");

        for batch in rewriter.chunk_queries(mapping)? {
            writeln!(out, "{batch}")?;
        }
        Ok(())
    }
}
