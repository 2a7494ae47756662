//! Graphviz dump of a lifetime tree.
//!
//! One record per node (stage id, weight, offset) and one edge per
//! parent/child link. The output is a diagnostic convention, not a
//! stable format. Render with `dot -Tsvg`.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::tree::LifetimeTree;

impl LifetimeTree {
    /// Render the tree as a Graphviz `digraph`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph lifetime_tree {\n");
        out.push_str("  node [shape=record];\n");
        if let Some(size) = self.arena_size() {
            let _ = writeln!(out, "  label=\"arena {size} bytes\";");
        }
        for idx in self.preorder() {
            let node = self.node(idx);
            let offset = match node.offset() {
                Some(offset) => offset.to_string(),
                None => "?".to_string(),
            };
            let _ = writeln!(
                out,
                "  n{} [label=\"{{stage {}|weight {}|offset {}}}\"];",
                idx.0,
                node.stage(),
                node.weight(),
                offset,
            );
            for child in node.children() {
                let _ = writeln!(out, "  n{} -> n{};", idx.0, child.0);
            }
        }
        out.push_str("}\n");
        out
    }

    /// Write [`dump`](Self::dump) output to any writer.
    pub fn dump_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.dump().as_bytes())?;
        writer.flush()
    }

    /// Write [`dump`](Self::dump) output to a `.dot` file.
    pub fn dump_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        self.dump_to(BufWriter::new(File::create(path)?))
    }
}
