use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{graph::*, instance::MulticutInstance};

pub type Result<T> = std::io::Result<T>;

/// On-disk form of an instance:
/// `{ "nodes": n, "edges": [[u, v], ...], "demand_pairs": [[s, t], ...], "budget": k }`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescription {
    pub nodes: NumNodes,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub demand_pairs: Vec<(Node, Node)>,
    pub budget: i64,
}

impl InstanceDescription {
    pub fn from_instance(instance: &MulticutInstance) -> Self {
        Self {
            nodes: instance.tree.vertices_range().end,
            edges: instance.tree.edges().collect(),
            demand_pairs: instance.demand_pairs.clone(),
            budget: instance.budget,
        }
    }

    /// Builds the tree; fails if the edges do not form a tree on `0..nodes`
    pub fn into_instance(self) -> Result<MulticutInstance> {
        let tree = Tree::from_edges(self.nodes, self.edges)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;

        Ok(MulticutInstance {
            tree,
            demand_pairs: self.demand_pairs,
            budget: self.budget,
        })
    }
}

pub trait InstanceJsonReader: Sized {
    fn try_read_json<R: Read>(reader: R) -> Result<Self>;
    fn try_read_json_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

pub trait InstanceJsonWriter {
    fn try_write_json<W: Write>(&self, writer: W) -> Result<()>;
    fn try_write_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl InstanceJsonReader for MulticutInstance {
    fn try_read_json<R: Read>(reader: R) -> Result<Self> {
        let description: InstanceDescription = serde_json::from_reader(reader)?;
        description.into_instance()
    }

    fn try_read_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Self::try_read_json(reader)
    }
}

impl InstanceJsonWriter for MulticutInstance {
    fn try_write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &InstanceDescription::from_instance(self))?;
        Ok(())
    }

    fn try_write_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.try_write_json(&mut writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn read_hard_coded() {
        let json = r#"{
            "nodes": 4,
            "edges": [[0, 1], [1, 2], [1, 3]],
            "demand_pairs": [[0, 2], [3, 2]],
            "budget": 2
        }"#;

        let instance = MulticutInstance::try_read_json(json.as_bytes()).unwrap();
        assert_eq!(instance.tree.number_of_nodes(), 4);
        assert_eq!(instance.tree.number_of_edges(), 3);
        assert_eq!(instance.demand_pairs, vec![(0, 2), (3, 2)]);
        assert_eq!(instance.budget, 2);
    }

    #[test]
    fn reject_non_trees() {
        let cycle = r#"{ "nodes": 3, "edges": [[0, 1], [1, 2], [2, 0]], "budget": 1 }"#;
        let error = MulticutInstance::try_read_json(cycle.as_bytes()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);

        let garbage = r#"{ "nodes": 3, "edges": "#;
        assert!(MulticutInstance::try_read_json(garbage.as_bytes()).is_err());
    }

    #[test]
    fn file_round_trip() {
        let mut rng = Pcg64::seed_from_u64(0x1234);
        let dir = tempfile::tempdir().unwrap();

        for i in 0..5 {
            let instance = MulticutInstance::random(&mut rng, 10 + 5 * i, 4 + i as usize, 3);
            let path = dir.path().join(format!("instance{i}.json"));
            instance.try_write_json_file(&path).unwrap();

            let read = MulticutInstance::try_read_json_file(&path).unwrap();
            assert_eq!(
                read.tree.edges().sorted().collect_vec(),
                instance.tree.edges().sorted().collect_vec()
            );
            assert_eq!(read.demand_pairs, instance.demand_pairs);
            assert_eq!(read.budget, instance.budget);
        }
    }
}
