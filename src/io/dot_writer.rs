use std::io::Write;

use super::super::graph::*;

/// produces a minimalistic DOT representation of the tree; `highlighted` edges are drawn red
pub trait DotWriter {
    fn try_write_dot<W: Write>(&self, writer: W, highlighted: &[Edge]) -> Result<(), std::io::Error>;
}

impl DotWriter for Tree {
    fn try_write_dot<W: Write>(
        &self,
        mut writer: W,
        highlighted: &[Edge],
    ) -> Result<(), std::io::Error> {
        write!(writer, "graph T {{")?;
        for u in self.nodes().filter(|&u| self.degree_of(u) == 0) {
            write!(writer, "v{u}; ")?;
        }
        for edge @ Edge(u, v) in self.edges() {
            if highlighted.iter().any(|h| h.normalized() == edge) {
                write!(writer, "v{u}--v{v}[color=red]; ")?;
            } else {
                write!(writer, "v{u}--v{v}; ")?;
            }
        }
        write!(writer, r"}}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hard_coded() {
        let tree = Tree::test_only_from([(0, 1), (2, 1)]);
        let mut buffer: Vec<u8> = Vec::new();
        tree.try_write_dot(&mut buffer, &[Edge(2, 1)]).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "graph T {v0--v1; v1--v2[color=red]; }"
        );

        let mut buffer: Vec<u8> = Vec::new();
        Tree::new(1).try_write_dot(&mut buffer, &[]).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "graph T {v0; }");
    }
}
